//! Client-side event registration: loads the active event, then walks a
//! visitor through identity submission and OTP verification against the
//! remote event gateway.

pub mod controller;
pub mod error;
pub mod event_loader;
pub mod gateway;
pub mod types;

pub use controller::{IgnoredReason, RegistrationController, SubmitOutcome};
pub use error::{GatewayError, RegistrationError};
pub use event_loader::EventLoader;
pub use gateway::{EventGateway, HttpEventGateway};
pub use types::{
    RegistrationDraft, RegistrationSnapshot, RegistrationState, RegistrationView, Step,
};
