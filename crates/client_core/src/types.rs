//! Registration state, draft input and the read-only snapshot handed to renderers.

use shared::domain::EventRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    CollectIdentity,
    CollectOtp,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegistrationState {
    #[default]
    Idle,
    Submitting,
    Error {
        message: String,
    },
    AlreadyRegistered,
    Verified,
}

impl RegistrationState {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// No further transitions are accepted once terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AlreadyRegistered | Self::Verified)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationDraft {
    pub username: String,
    pub email: String,
    pub otp_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSnapshot {
    pub event: Option<EventRecord>,
    pub step: Step,
    pub state: RegistrationState,
    pub draft: RegistrationDraft,
}

/// What a renderer should show for a given snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationView {
    Loading,
    IdentityForm {
        busy: bool,
        error: Option<String>,
    },
    OtpForm {
        email: String,
        busy: bool,
        error: Option<String>,
    },
    AlreadyRegistered,
    Verified,
}

impl RegistrationSnapshot {
    pub fn view(&self) -> RegistrationView {
        match &self.state {
            RegistrationState::Verified => return RegistrationView::Verified,
            RegistrationState::AlreadyRegistered => return RegistrationView::AlreadyRegistered,
            _ => {}
        }

        if self.event.is_none() {
            return RegistrationView::Loading;
        }

        let busy = self.state.is_submitting();
        let error = self.state.error_message().map(str::to_string);
        match self.step {
            Step::CollectIdentity => RegistrationView::IdentityForm { busy, error },
            Step::CollectOtp => RegistrationView::OtpForm {
                email: self.draft.email.clone(),
                busy,
                error,
            },
        }
    }
}
