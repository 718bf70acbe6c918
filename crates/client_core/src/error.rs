use shared::error::GatewayErrorBody;
use thiserror::Error;

use crate::types::RegistrationState;

pub const GENERIC_REQUEST_FAILURE: &str = "Request failed";
pub const GENERIC_TRANSPORT_FAILURE: &str = "Something went wrong";
pub const GENERIC_VERIFICATION_FAILURE: &str = "Verification failed";

const ALREADY_REGISTERED_MARKER: &str = "already registered";

/// Failure talking to the remote event gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(String),
    #[error("gateway rejected request with status {status}")]
    Rejected {
        status: u16,
        body: GatewayErrorBody,
    },
    #[error("malformed gateway payload: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn rejected(status: u16, body: GatewayErrorBody) -> Self {
        Self::Rejected { status, body }
    }

    pub fn body(&self) -> Option<&GatewayErrorBody> {
        match self {
            Self::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("network failure: {message}")]
    NetworkFailure { message: String },
    #[error("{message}")]
    ValidationFailure { message: String },
    #[error("{message}")]
    AlreadyRegisteredConflict { message: String },
    #[error("failed to load the active event: {0}")]
    UnrecoverableLoadFailure(String),
}

impl RegistrationError {
    /// Classifies a failed `register-init` call.
    pub fn from_identity_failure(err: &GatewayError) -> Self {
        let structured = err.body().and_then(GatewayErrorBody::registration_message);
        let message = match (err, structured) {
            (_, Some(message)) => message,
            (GatewayError::Rejected { .. }, None) => GENERIC_REQUEST_FAILURE.to_string(),
            (_, None) => GENERIC_TRANSPORT_FAILURE.to_string(),
        };

        if message.to_lowercase().contains(ALREADY_REGISTERED_MARKER) {
            Self::AlreadyRegisteredConflict { message }
        } else {
            Self::classified(err, message)
        }
    }

    /// Classifies a failed `verify-otp` call.
    pub fn from_verification_failure(err: &GatewayError) -> Self {
        let message = err
            .body()
            .and_then(GatewayErrorBody::verification_message)
            .unwrap_or_else(|| GENERIC_VERIFICATION_FAILURE.to_string());
        Self::classified(err, message)
    }

    fn classified(err: &GatewayError, message: String) -> Self {
        match err {
            GatewayError::Rejected { .. } => Self::ValidationFailure { message },
            GatewayError::Transport(_) | GatewayError::Decode(_) => {
                Self::NetworkFailure { message }
            }
        }
    }

    /// Text shown to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::NetworkFailure { message }
            | Self::ValidationFailure { message }
            | Self::AlreadyRegisteredConflict { message }
            | Self::UnrecoverableLoadFailure(message) => message.as_str(),
        }
    }

    pub fn into_state(self) -> RegistrationState {
        match self {
            Self::AlreadyRegisteredConflict { .. } => RegistrationState::AlreadyRegistered,
            other => RegistrationState::error(other.message()),
        }
    }
}
