/// Model provider trait and shared request/error types.
///
/// The review layer builds a [`ModelRequest`] and hands it to a
/// [`ModelProvider`]; the provider only moves text across the wire.
pub mod gemini;
pub mod mock;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// The three kinds of outbound call the tutor makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Analyze,
    Trace,
    Refine,
}

impl RequestKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Analyze => "analyze",
            RequestKind::Trace => "trace",
            RequestKind::Refine => "refine",
        }
    }

    /// Generic user-facing failure message for this kind of request.
    #[must_use]
    pub fn failure_message(self) -> &'static str {
        match self {
            RequestKind::Analyze => "אירעה שגיאה בניתוח הקוד. אנא נסה שנית.",
            RequestKind::Trace => "אירעה שגיאה בסימולציית הריצה.",
            RequestKind::Refine => "אירעה שגיאה בעדכון הקוד.",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shown for every request kind when no API key is configured.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "מפתח ה-API חסר. הגדירו אותו במשתנה הסביבה שבהגדרות והפעילו מחדש.";

/// Errors that can occur during a model round trip.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("API key is missing (checked: {0})")]
    MissingCredential(String),

    #[error("no response from model")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl ModelError {
    /// Localized message for the end user. Raw diagnostics stay in the logs.
    #[must_use]
    pub fn user_message(&self, kind: RequestKind) -> String {
        match self {
            ModelError::MissingCredential(_) => MISSING_CREDENTIAL_MESSAGE.to_string(),
            _ => kind.failure_message().to_string(),
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        ModelError::Transport(e.to_string())
    }
}

/// One outbound call: prompt, declared response shape and sampling temperature.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub kind: RequestKind,
    pub prompt: String,
    pub response_schema: Value,
    pub temperature: f32,
}

impl ModelRequest {
    pub fn new(kind: RequestKind, prompt: impl Into<String>, response_schema: Value) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            response_schema,
            temperature: 0.2,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Trait for generative-model backends.
///
/// Implementations must be `Send + Sync` so a single provider can be shared
/// behind `Arc` by every request path.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Model identifier the provider targets.
    fn model(&self) -> &str;

    /// Fails with [`ModelError::MissingCredential`] when the provider cannot
    /// authenticate. Called before any request is built.
    fn check_credentials(&self) -> Result<(), ModelError>;

    /// Send the request and return the raw reply text, `None` if the body
    /// carried no text at all.
    async fn generate(&self, request: &ModelRequest) -> Result<Option<String>, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message_is_shared() {
        let err = ModelError::MissingCredential("GEMINI_API_KEY".into());
        assert_eq!(
            err.user_message(RequestKind::Analyze),
            err.user_message(RequestKind::Trace)
        );
        assert_eq!(err.user_message(RequestKind::Refine), MISSING_CREDENTIAL_MESSAGE);
        // The variable name is configurable, so the message names none
        assert!(!MISSING_CREDENTIAL_MESSAGE.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_other_errors_use_generic_kind_message() {
        let err = ModelError::MalformedResponse("expected value at line 1".into());
        let msg = err.user_message(RequestKind::Trace);
        assert_eq!(msg, RequestKind::Trace.failure_message());
        assert!(!msg.contains("expected value"), "diagnostics must not leak");

        let err = ModelError::Transport("HTTP 503".into());
        assert_eq!(
            err.user_message(RequestKind::Analyze),
            RequestKind::Analyze.failure_message()
        );
    }

    #[test]
    fn test_request_builder() {
        let req = ModelRequest::new(RequestKind::Trace, "prompt", Value::Null).with_temperature(0.1);
        assert_eq!(req.kind, RequestKind::Trace);
        assert!((req.temperature - 0.1).abs() < f32::EPSILON);
    }
}
