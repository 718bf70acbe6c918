use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure body returned by the gateway on a non-success status.
///
/// The backend is inconsistent about where it puts the human-readable reason,
/// so the body is kept as raw JSON and inspected field by field. Anything that is
/// not a JSON object behaves like an empty body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayErrorBody(Value);

impl GatewayErrorBody {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).map(Self).unwrap_or_default()
    }

    pub fn message(&self) -> Option<String> {
        text_at(&self.0, &["message"])
    }

    pub fn nested_error(&self) -> Option<String> {
        text_at(&self.0, &["errors", "error"])
    }

    pub fn error(&self) -> Option<String> {
        text_at(&self.0, &["error"])
    }

    /// Reason for a rejected `register-init`: `message`, then `errors.error`,
    /// then `error`.
    pub fn registration_message(&self) -> Option<String> {
        self.message()
            .or_else(|| self.nested_error())
            .or_else(|| self.error())
    }

    /// Reason for a rejected `verify-otp`. Only `error` is consulted.
    pub fn verification_message(&self) -> Option<String> {
        self.error()
    }
}

fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }

    let text = match current {
        Value::String(text) => text.as_str(),
        // DRF-style validation errors come back as lists of strings.
        Value::Array(items) => items.iter().find_map(Value::as_str)?,
        _ => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registration_message_prefers_message_then_nested_then_error() {
        let body = GatewayErrorBody::new(json!({
            "message": "top",
            "errors": {"error": "nested"},
            "error": "flat"
        }));
        assert_eq!(body.registration_message().as_deref(), Some("top"));

        let body = GatewayErrorBody::new(json!({"errors": {"error": "nested"}, "error": "flat"}));
        assert_eq!(body.registration_message().as_deref(), Some("nested"));

        let body = GatewayErrorBody::new(json!({"error": "flat"}));
        assert_eq!(body.registration_message().as_deref(), Some("flat"));
    }

    #[test]
    fn verification_message_ignores_other_fields() {
        let body = GatewayErrorBody::new(json!({"message": "nope"}));
        assert_eq!(body.verification_message(), None);

        let body = GatewayErrorBody::new(json!({"message": "nope", "error": "Invalid OTP"}));
        assert_eq!(body.verification_message().as_deref(), Some("Invalid OTP"));
    }

    #[test]
    fn empty_strings_and_non_text_values_are_skipped() {
        let body = GatewayErrorBody::new(json!({"message": "", "errors": {"error": 42}, "error": "x"}));
        assert_eq!(body.registration_message().as_deref(), Some("x"));
    }

    #[test]
    fn list_values_contribute_their_first_string() {
        let body = GatewayErrorBody::new(json!({"errors": {"error": ["Email taken", "other"]}}));
        assert_eq!(body.registration_message().as_deref(), Some("Email taken"));
    }

    #[test]
    fn non_json_bodies_behave_like_empty_ones() {
        let body = GatewayErrorBody::from_slice(b"<html>502 Bad Gateway</html>");
        assert_eq!(body, GatewayErrorBody::default());
        assert_eq!(body.registration_message(), None);
    }
}
