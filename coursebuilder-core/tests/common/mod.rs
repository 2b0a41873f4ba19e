//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use coursebuilder_core::{
    CipherError, ConfigStore, FormRequest, SecretCipher, Transport, TransportError,
};
use parking_lot::Mutex;
use serde_json::{Value, json};

pub const SECRET: &str = "0123456789abcdef0123456789abcdef";

/// Transport double that replays scripted responses and records requests.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// gateway.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    responses: Arc<Mutex<VecDeque<Result<Value, TransportError>>>>,
    requests: Arc<Mutex<Vec<FormRequest>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful JSON response.
    pub fn respond(self, body: Value) -> Self {
        self.responses.lock().push_back(Ok(body));
        self
    }

    /// Queue a connection failure.
    pub fn fail(self) -> Self {
        self.responses.lock().push_back(Err(TransportError::Connection {
            message: "connection refused".to_string(),
        }));
        self
    }

    /// Queue a valid token response followed by `body`.
    pub fn token_then(self, token: &str, body: Value) -> Self {
        self.respond(json!({"token": token, "valid": true})).respond(body)
    }

    pub fn requests(&self) -> Vec<FormRequest> {
        self.requests.lock().clone()
    }

    pub fn request(&self, index: usize) -> FormRequest {
        self.requests()[index].clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post_form(&self, request: FormRequest) -> Result<Value, TransportError> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Connection {
                    message: "no scripted response".to_string(),
                })
            })
    }
}

/// Cipher double that always fails, forcing the plaintext fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCipher;

impl SecretCipher for FailingCipher {
    fn encrypt(&self, _secret: &[u8], _public_key: &str) -> Result<Vec<u8>, CipherError> {
        Err(CipherError::EncryptionFailed {
            message: "primitive unavailable".to_string(),
        })
    }
}

/// Cipher double that reverses the input, so tests can tell it ran.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReversingCipher;

impl SecretCipher for ReversingCipher {
    fn encrypt(&self, secret: &[u8], _public_key: &str) -> Result<Vec<u8>, CipherError> {
        Ok(secret.iter().rev().copied().collect())
    }
}

/// A fully populated store pointing at the given endpoints.
pub fn test_config(verification_url: &str, builder_url: &str) -> ConfigStore {
    let mut config = ConfigStore::new();
    config
        .set_license_key("AB-1A2B3C-0D-1A2B3D-0099")
        .set_customer_id(42)
        .set_secret(SECRET)
        .set_public_key("not a pem key")
        .set_verification_url(verification_url)
        .set_course_builder_url(builder_url);
    config
}
