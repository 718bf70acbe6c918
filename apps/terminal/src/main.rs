use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{HttpEventGateway, RegistrationController, RegistrationView, SubmitOutcome};
use shared::domain::EventRecord;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, DEFAULT_CONFIG_PATH};

const CHANGE_EMAIL_COMMAND: &str = "change";

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the event gateway, e.g. https://host/api/events
    #[arg(long)]
    gateway_url: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config);
    if let Some(url) = args.gateway_url.clone() {
        settings.gateway_base_url = Some(url);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let base_url = settings.gateway_base_url()?;
    let mut http = reqwest::Client::builder();
    if let Some(timeout) = settings.request_timeout() {
        http = http.timeout(timeout);
    }
    let http = http.build().context("failed to build gateway http client")?;
    let gateway = HttpEventGateway::with_client(http, base_url);

    let controller = RegistrationController::new(Arc::new(gateway));
    spawn_state_logger(&controller);

    println!("Loading event...");
    if !controller.activate().await {
        bail!("event is still loading; the gateway did not return an active event");
    }

    let snapshot = controller.snapshot().await;
    if let Some(event) = &snapshot.event {
        print_event(event);
    }

    let mut input = BufReader::new(io::stdin()).lines();
    let mut prefill_username = args.username;
    let mut prefill_email = args.email;

    loop {
        match controller.snapshot().await.view() {
            RegistrationView::Loading => bail!("event disappeared while registering"),
            RegistrationView::IdentityForm { error, .. } => {
                if let Some(error) = error {
                    println!("Error: {error}");
                }
                println!("\n== Event Registration ==");
                let username = match prefill_username.take() {
                    Some(username) => username,
                    None => prompt(&mut input, "Username").await?,
                };
                let email = match prefill_email.take() {
                    Some(email) => email,
                    None => prompt(&mut input, "Email").await?,
                };
                controller.set_username(username).await;
                controller.set_email(email).await;
                println!("Processing...");
                report_ignored(controller.submit_identity().await);
            }
            RegistrationView::OtpForm { email, error, .. } => {
                if let Some(error) = error {
                    println!("Error: {error}");
                }
                println!("\n== Verify Identity ==");
                println!(
                    "Enter the code sent to {email} (or '{CHANGE_EMAIL_COMMAND}' to edit your details)."
                );
                let code = prompt(&mut input, "One-Time Password").await?;
                if code.eq_ignore_ascii_case(CHANGE_EMAIL_COMMAND) {
                    controller.reset_to_identity().await;
                    continue;
                }
                controller.set_otp_code(code).await;
                println!("Verifying...");
                report_ignored(controller.submit_otp().await);
            }
            RegistrationView::AlreadyRegistered => {
                println!("\nYou are already registered for this event.");
                break;
            }
            RegistrationView::Verified => {
                println!("\nSuccess!");
                println!(
                    "Please check your email for the link to complete your personalized setup or access the event."
                );
                break;
            }
        }
    }

    Ok(())
}

fn spawn_state_logger(controller: &Arc<RegistrationController>) {
    let mut snapshots = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(snapshot) = snapshots.recv().await {
            debug!(step = ?snapshot.step, state = ?snapshot.state, "registration: state changed");
        }
    });
}

fn report_ignored(outcome: SubmitOutcome) {
    if let SubmitOutcome::Ignored(reason) = outcome {
        debug!(?reason, "submission ignored");
    }
}

fn print_event(event: &EventRecord) {
    println!("\n{}", event.title);
    println!("{}", event.description);
    println!(
        "{} - {}",
        event.start_date.format("%a %b %d %Y"),
        event.end_date.format("%a %b %d %Y")
    );
    if let Some(poster) = &event.poster {
        println!("Poster: {poster}");
    }
}

async fn prompt(input: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    stdout.write_all(format!("{label}: ").as_bytes()).await?;
    stdout.flush().await?;

    match input.next_line().await? {
        Some(line) => Ok(line.trim().to_string()),
        None => bail!("input closed before registration finished"),
    }
}
