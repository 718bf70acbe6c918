use super::*;

use async_trait::async_trait;
use shared::{
    error::GatewayErrorBody,
    protocol::{LatestEventResponse, RegisterInitRequest, VerifyOtpRequest},
};

use crate::error::GatewayError;

/// Serves a canned `/latest/` body as the HTTP binding would decode it.
struct CannedLatestEvent {
    body: Result<String, GatewayError>,
}

#[async_trait]
impl EventGateway for CannedLatestEvent {
    async fn latest_event(&self) -> Result<EventRecord, GatewayError> {
        let body = self.body.clone()?;
        serde_json::from_str::<LatestEventResponse>(&body)
            .map(LatestEventResponse::into_record)
            .map_err(|err| GatewayError::Decode(err.to_string()))
    }

    async fn register_init(&self, _request: &RegisterInitRequest) -> Result<(), GatewayError> {
        Err(GatewayError::Transport("not scripted".into()))
    }

    async fn verify_otp(&self, _request: &VerifyOtpRequest) -> Result<(), GatewayError> {
        Err(GatewayError::Transport("not scripted".into()))
    }
}

fn loader(body: Result<&str, GatewayError>) -> EventLoader {
    EventLoader::new(Arc::new(CannedLatestEvent {
        body: body.map(str::to_string),
    }))
}

const RECORD: &str = r#"{
    "id": 3,
    "title": "Members Mixer",
    "description": "Bring a friend",
    "start_date": "2025-05-01T17:00:00Z",
    "end_date": "2025-05-01T21:00:00Z",
    "poster": null
}"#;

#[tokio::test]
async fn wrapped_and_bare_events_load_identically() {
    let wrapped = loader(Ok(&format!(r#"{{"data": {RECORD}}}"#)))
        .load()
        .await
        .expect("wrapped");
    let bare = loader(Ok(RECORD)).load().await.expect("bare");

    assert_eq!(wrapped, bare);
    assert_eq!(wrapped.title, "Members Mixer");
}

#[tokio::test]
async fn rejected_fetch_leaves_event_unset() {
    let loader = loader(Err(GatewayError::rejected(503, GatewayErrorBody::default())));

    assert_eq!(loader.load().await, None);
    assert!(matches!(
        loader.fetch().await,
        Err(RegistrationError::UnrecoverableLoadFailure(_))
    ));
}

#[tokio::test]
async fn unparseable_body_leaves_event_unset() {
    assert_eq!(loader(Ok("[]")).load().await, None);
}

#[tokio::test]
async fn naive_and_date_only_timestamps_load_in_both_shapes() {
    let naive = RECORD
        .replace("2025-05-01T17:00:00Z", "2025-05-01T17:00:00")
        .replace("2025-05-01T21:00:00Z", "2025-05-01");

    let wrapped = loader(Ok(&format!(r#"{{"data": {naive}}}"#)))
        .load()
        .await
        .expect("wrapped");
    let bare = loader(Ok(&naive)).load().await.expect("bare");

    assert_eq!(wrapped, bare);
    assert_eq!(wrapped.start_date.to_rfc3339(), "2025-05-01T17:00:00+00:00");
    assert_eq!(wrapped.end_date.to_rfc3339(), "2025-05-01T00:00:00+00:00");
}

#[tokio::test]
async fn load_failure_reports_the_broken_field() {
    let undated = RECORD.replace("2025-05-01T17:00:00Z", "tbd");
    let err = loader(Ok(&format!(r#"{{"data": {undated}}}"#)))
        .fetch()
        .await
        .expect_err("bad start date");

    assert!(
        err.to_string().contains("invalid timestamp 'tbd'"),
        "unhelpful error: {err}"
    );
}
