//! Session tokens issued by the verification endpoint.
//!
//! This module provides:
//! - [`Token`] - A validated, single-use session token
//! - [`TokenError`] - Why a token response was rejected
//! - [`validate_token`] - Shape and validity checks on a raw token response

use serde_json::Value;
use thiserror::Error;

use crate::secret::Secret;

/// Error type for rejected token responses.
///
/// Every variant carries the server's diagnostic messages joined with `"; "`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The response was not a JSON object (including an absent response).
    #[error("wrong token object: [{message}]")]
    Malformed { message: String },

    /// The `token` field is missing or empty.
    #[error("token is empty: [{message}]")]
    Empty { message: String },

    /// The `valid` flag is missing or not `true`.
    #[error("token is not valid: [{message}]")]
    NotValid { message: String },
}

/// A session token that passed validation.
///
/// Tokens authorize exactly one downstream call. They are never stored or
/// reused; callers consume them immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    value: Secret,

    /// Diagnostic messages the server attached to the token.
    pub messages: Vec<String>,
}

impl Token {
    /// Create a token from its string value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Secret::new(value.into()),
            messages: Vec::new(),
        }
    }

    /// The token string, for embedding in a request or URL.
    pub fn expose(&self) -> &str {
        self.value.expose()
    }
}

/// Collect the entries of a response's `message` array.
///
/// Non-string entries are rendered as JSON; a missing or non-array `message`
/// yields no entries.
pub fn server_messages(response: &Value) -> Vec<String> {
    response
        .get("message")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| match entry {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Check that a raw token response is usable.
///
/// Fails when the response is not an object, when `token` is missing or
/// empty, or when `valid` is missing or not `true`.
pub fn validate_token(response: &Value) -> Result<Token, TokenError> {
    let messages = server_messages(response);
    let message = messages.join("; ");

    let Some(record) = response.as_object() else {
        return Err(TokenError::Malformed { message });
    };

    let value = match record.get("token") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(TokenError::Empty { message }),
    };

    if record.get("valid") != Some(&Value::Bool(true)) {
        return Err(TokenError::NotValid { message });
    }

    Ok(Token {
        value: Secret::new(value),
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_token_accepted() {
        let token = validate_token(&json!({"token": "abc", "valid": true})).unwrap();
        assert_eq!(token.expose(), "abc");
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = validate_token(&json!({"token": "", "valid": true}));
        assert!(matches!(result, Err(TokenError::Empty { .. })));
    }

    #[test]
    fn test_missing_token_rejected() {
        let result = validate_token(&json!({"valid": true}));
        assert!(matches!(result, Err(TokenError::Empty { .. })));
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let result = validate_token(&json!({"token": "abc", "valid": false}));
        assert!(matches!(result, Err(TokenError::NotValid { .. })));

        let result = validate_token(&json!({"token": "abc"}));
        assert!(matches!(result, Err(TokenError::NotValid { .. })));

        let result = validate_token(&json!({"token": "abc", "valid": "true"}));
        assert!(matches!(result, Err(TokenError::NotValid { .. })));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            validate_token(&Value::Null),
            Err(TokenError::Malformed { .. })
        ));
        assert!(matches!(
            validate_token(&json!(["abc"])),
            Err(TokenError::Malformed { .. })
        ));
    }

    #[test]
    fn test_messages_joined_into_error() {
        let err = validate_token(&json!({
            "token": "abc",
            "valid": false,
            "message": ["license expired", "contact support"]
        }))
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "token is not valid: [license expired; contact support]"
        );
    }

    #[test]
    fn test_token_debug_redacted() {
        let token = Token::new("very-secret-token");
        assert!(!format!("{:?}", token).contains("very-secret-token"));
    }
}
