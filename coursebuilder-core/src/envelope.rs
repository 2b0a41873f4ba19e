//! Result shapes returned by gateway operations.
//!
//! Every operation returns `Result<T, Failure>`. Both halves serialize to the
//! JSON envelope callers of the HTTP API are used to: URL payloads become
//! `{"status": true, "url": ...}` and failures become
//! `{"status": false, "message": ...}`.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::CourseBuilderError;

/// A failed operation, carrying a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Failure {}

impl From<CourseBuilderError> for Failure {
    fn from(error: CourseBuilderError) -> Self {
        Self::new(error.to_string())
    }
}

impl Serialize for Failure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Failure", 2)?;
        state.serialize_field("status", &false)?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}

/// A URL composed for the caller to open in a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPayload {
    pub url: String,
}

impl UrlPayload {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Serialize for UrlPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("UrlPayload", 2)?;
        state.serialize_field("status", &true)?;
        state.serialize_field("url", &self.url)?;
        state.end()
    }
}

/// Render an operation result as its JSON envelope.
pub fn to_envelope<T: Serialize>(result: &Result<T, Failure>) -> Value {
    let rendered = match result {
        Ok(payload) => serde_json::to_value(payload),
        Err(failure) => serde_json::to_value(failure),
    };
    rendered.unwrap_or_else(|e| {
        serde_json::json!({"status": false, "message": format!("unserializable payload: {}", e)})
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_envelope() {
        let result: Result<UrlPayload, Failure> = Err(Failure::new("token is empty: []"));
        assert_eq!(
            to_envelope(&result),
            json!({"status": false, "message": "token is empty: []"})
        );
    }

    #[test]
    fn test_url_envelope() {
        let result: Result<UrlPayload, Failure> = Ok(UrlPayload::new("https://cb.test/x"));
        assert_eq!(
            to_envelope(&result),
            json!({"status": true, "url": "https://cb.test/x"})
        );
    }

    #[test]
    fn test_raw_payload_passes_through() {
        let result: Result<Value, Failure> = Ok(json!({"id": 7, "title": "Intro"}));
        assert_eq!(to_envelope(&result), json!({"id": 7, "title": "Intro"}));
    }
}
