//! Registration state machine: identity submission, OTP verification and the
//! "change email" regression between them.

use std::sync::Arc;

use shared::{
    domain::{EventId, EventRecord},
    protocol::{RegisterInitRequest, VerifyOtpRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::RegistrationError,
    event_loader::EventLoader,
    gateway::EventGateway,
    types::{RegistrationDraft, RegistrationSnapshot, RegistrationState, Step},
};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// A request for this session is still in flight.
    Busy,
    /// The session already reached `Verified` or `AlreadyRegistered`.
    Terminal,
    WrongStep,
    EventNotLoaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored(IgnoredReason),
    Settled(RegistrationState),
}

#[derive(Default)]
struct SessionState {
    event: Option<EventRecord>,
    step: Step,
    status: RegistrationState,
    draft: RegistrationDraft,
}

impl SessionState {
    fn snapshot(&self) -> RegistrationSnapshot {
        RegistrationSnapshot {
            event: self.event.clone(),
            step: self.step,
            state: self.status.clone(),
            draft: self.draft.clone(),
        }
    }

    /// Checks whether a submission for `step` may start and returns the event
    /// it is scoped to.
    fn admit(&self, step: Step) -> Result<EventId, IgnoredReason> {
        if self.status.is_submitting() {
            return Err(IgnoredReason::Busy);
        }
        if self.status.is_terminal() {
            return Err(IgnoredReason::Terminal);
        }
        if self.step != step {
            return Err(IgnoredReason::WrongStep);
        }
        self.event
            .as_ref()
            .map(|event| event.id.clone())
            .ok_or(IgnoredReason::EventNotLoaded)
    }
}

pub struct RegistrationController {
    gateway: Arc<dyn EventGateway>,
    inner: Mutex<SessionState>,
    // Held for the whole load so concurrent activations share one request.
    activation: Mutex<()>,
    snapshots: broadcast::Sender<RegistrationSnapshot>,
}

impl RegistrationController {
    pub fn new(gateway: Arc<dyn EventGateway>) -> Arc<Self> {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Arc::new(Self {
            gateway,
            inner: Mutex::new(SessionState::default()),
            activation: Mutex::new(()),
            snapshots,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistrationSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn snapshot(&self) -> RegistrationSnapshot {
        self.inner.lock().await.snapshot()
    }

    fn publish(&self, state: &SessionState) {
        // No subscribers is fine; renderers can always poll `snapshot`.
        let _ = self.snapshots.send(state.snapshot());
    }

    /// Runs the event loader unless an event is already present. Returns
    /// whether an event is available afterwards. Callers racing an in-flight
    /// load wait for it instead of issuing their own.
    pub async fn activate(&self) -> bool {
        let _activation = self.activation.lock().await;
        if self.inner.lock().await.event.is_some() {
            return true;
        }

        let Some(event) = EventLoader::new(Arc::clone(&self.gateway)).load().await else {
            return false;
        };

        let mut guard = self.inner.lock().await;
        if guard.event.is_none() {
            guard.event = Some(event);
            self.publish(&guard);
        }
        true
    }

    pub async fn set_username(&self, username: impl Into<String>) {
        let mut guard = self.inner.lock().await;
        guard.draft.username = username.into();
        self.publish(&guard);
    }

    pub async fn set_email(&self, email: impl Into<String>) {
        let mut guard = self.inner.lock().await;
        guard.draft.email = email.into();
        self.publish(&guard);
    }

    pub async fn set_otp_code(&self, otp_code: impl Into<String>) {
        let mut guard = self.inner.lock().await;
        guard.draft.otp_code = otp_code.into();
        self.publish(&guard);
    }

    pub async fn submit_identity(&self) -> SubmitOutcome {
        let request = {
            let mut guard = self.inner.lock().await;
            let event_id = match guard.admit(Step::CollectIdentity) {
                Ok(event_id) => event_id,
                Err(reason) => {
                    debug!(?reason, "registration: identity submit ignored");
                    return SubmitOutcome::Ignored(reason);
                }
            };
            guard.status = RegistrationState::Submitting;
            self.publish(&guard);
            RegisterInitRequest {
                username: guard.draft.username.clone(),
                email: guard.draft.email.clone(),
                event_id,
            }
        };

        let result = self.gateway.register_init(&request).await;

        let mut guard = self.inner.lock().await;
        match result {
            Ok(()) => {
                info!(event_id = %request.event_id, "registration: otp requested");
                guard.step = Step::CollectOtp;
                guard.status = RegistrationState::Idle;
            }
            Err(err) => {
                let failure = RegistrationError::from_identity_failure(&err);
                warn!(%err, %failure, "registration: identity submit failed");
                guard.status = failure.into_state();
            }
        }
        self.publish(&guard);
        SubmitOutcome::Settled(guard.status.clone())
    }

    pub async fn submit_otp(&self) -> SubmitOutcome {
        let request = {
            let mut guard = self.inner.lock().await;
            let event_id = match guard.admit(Step::CollectOtp) {
                Ok(event_id) => event_id,
                Err(reason) => {
                    debug!(?reason, "registration: otp submit ignored");
                    return SubmitOutcome::Ignored(reason);
                }
            };
            guard.status = RegistrationState::Submitting;
            self.publish(&guard);
            VerifyOtpRequest {
                email: guard.draft.email.clone(),
                otp_code: guard.draft.otp_code.clone(),
                event_id,
            }
        };

        let result = self.gateway.verify_otp(&request).await;

        let mut guard = self.inner.lock().await;
        match result {
            Ok(()) => {
                info!(event_id = %request.event_id, "registration: verified");
                guard.status = RegistrationState::Verified;
            }
            Err(err) => {
                let failure = RegistrationError::from_verification_failure(&err);
                warn!(%err, %failure, "registration: otp verification failed");
                guard.status = failure.into_state();
            }
        }
        self.publish(&guard);
        SubmitOutcome::Settled(guard.status.clone())
    }

    /// "Change email": back to the identity form, keeping username and email.
    pub async fn reset_to_identity(&self) -> bool {
        let mut guard = self.inner.lock().await;
        if guard.step != Step::CollectOtp
            || guard.status.is_submitting()
            || guard.status.is_terminal()
        {
            return false;
        }

        guard.draft.otp_code.clear();
        guard.step = Step::CollectIdentity;
        guard.status = RegistrationState::Idle;
        self.publish(&guard);
        true
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
