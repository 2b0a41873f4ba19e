//! The token handshake with the verification endpoint.
//!
//! [`TokenBroker`] turns the configured credentials into a session token:
//!
//! 1. the shared secret is encrypted with the supplier's public key,
//! 2. the result is base64-encoded and posted with the license key and
//!    customer id to `{verification_url}api/token/get`,
//! 3. the JSON reply is checked by [`TokenBroker::validate_token`].
//!
//! # Plaintext fallback
//!
//! If encryption fails for any reason (unparsable key, primitive error) the
//! broker sends the base64 of the *plaintext* secret instead. The verification
//! server accepts this form, so the fallback is kept, but it is logged at
//! `warn` level every time it happens.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::cipher::SecretCipher;
use crate::config::{ConfigStore, Field};
use crate::token::{Token, TokenError, validate_token};
use crate::transport::{BasicAuth, FormRequest, Transport};

/// Path of the token endpoint, relative to the verification URL.
pub const TOKEN_PATH: &str = "api/token/get";

/// Characters kept when sanitizing a callback URL.
const URL_PUNCTUATION: &str = "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=";

/// Performs the token handshake for one operation.
///
/// A broker borrows its collaborators and holds no state of its own, so every
/// call to [`request_token`](Self::request_token) starts from scratch.
pub struct TokenBroker<'a, T: Transport, C: SecretCipher> {
    config: &'a ConfigStore,
    transport: &'a T,
    cipher: &'a C,
}

impl<'a, T: Transport, C: SecretCipher> TokenBroker<'a, T, C> {
    pub fn new(config: &'a ConfigStore, transport: &'a T, cipher: &'a C) -> Self {
        Self {
            config,
            transport,
            cipher,
        }
    }

    /// Request a token from the verification endpoint.
    ///
    /// When `callback_url` is a well-formed absolute URL it is forwarded as
    /// `save_callback_url` so the builder can notify it when the resource is
    /// saved. Transport failures are logged and yield `Value::Null`; the
    /// subsequent [`validate_token`](Self::validate_token) call turns that
    /// into an error.
    pub async fn request_token(&self, callback_url: Option<&str>) -> Value {
        let mut request = FormRequest::new(format!("{}{}", self.config.verification_url(), TOKEN_PATH))
            .field("key", self.config.license_key())
            .field("secret", self.encoded_secret())
            .field("id", self.config.get_field(Field::CustomerId).to_text())
            .with_auth(BasicAuth::optional(
                self.config.verification_username(),
                self.config.verification_password(),
            ));

        if let Some(callback) = callback_url.filter(|url| !url.is_empty()) {
            if is_valid_callback_url(callback) {
                request = request.field("save_callback_url", callback);
            } else {
                debug!(callback, "dropping malformed callback URL");
            }
        }

        match self.transport.post_form(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "token request failed, treating response as empty");
                Value::Null
            }
        }
    }

    /// Validate a raw token response.
    pub fn validate_token(&self, response: &Value) -> Result<Token, TokenError> {
        validate_token(response)
    }

    /// Request and validate a token in one step.
    pub async fn acquire(&self, callback_url: Option<&str>) -> Result<Token, TokenError> {
        let response = self.request_token(callback_url).await;
        let token = self.validate_token(&response)?;
        debug!("session token acquired");
        Ok(token)
    }

    /// The secret as transmitted: base64 of the ciphertext, or of the
    /// plaintext if encryption failed.
    fn encoded_secret(&self) -> String {
        let secret = self.config.secret();
        match self
            .cipher
            .encrypt(secret.expose().as_bytes(), &self.config.public_key())
        {
            Ok(ciphertext) => BASE64.encode(ciphertext),
            Err(e) => {
                warn!(
                    error = %e,
                    "secret encryption failed, sending the plaintext secret base64-encoded"
                );
                BASE64.encode(secret.expose().as_bytes())
            }
        }
    }
}

/// Drop every character that may not appear in a URL.
pub fn sanitize_url(url: &str) -> String {
    url.chars()
        .filter(|c| c.is_ascii_alphanumeric() || URL_PUNCTUATION.contains(*c))
        .collect()
}

/// Whether a callback URL may be forwarded to the verification endpoint.
///
/// The sanitized form must be non-empty and parse as an absolute URL with a
/// host.
pub fn is_valid_callback_url(url: &str) -> bool {
    let sanitized = sanitize_url(url);
    if sanitized.is_empty() {
        return false;
    }

    Url::parse(&sanitized)
        .map(|parsed| parsed.host_str().is_some_and(|host| !host.is_empty()))
        .unwrap_or(false)
}
