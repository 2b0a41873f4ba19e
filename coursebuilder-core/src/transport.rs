//! HTTP transport abstraction.
//!
//! Every call the client makes is a form-encoded POST, optionally with HTTP
//! Basic auth, whose response body is JSON. [`Transport`] captures exactly
//! that primitive so the token handshake and resource operations can be
//! exercised without a network; [`ReqwestTransport`] is the default
//! implementation.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::secret::Secret;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// The response body was not valid JSON.
    #[error("invalid response body: {message}")]
    Decode { message: String },
}

/// HTTP Basic credentials for an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: Secret,
}

impl BasicAuth {
    /// Credentials to attach, or `None` when both parts are empty.
    pub fn optional(username: impl Into<String>, password: Secret) -> Option<Self> {
        let username = username.into();
        if username.is_empty() && password.is_empty() {
            None
        } else {
            Some(Self { username, password })
        }
    }
}

/// A form-encoded POST request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    /// Absolute target URL.
    pub url: String,

    /// Form fields, in the order they are encoded.
    pub fields: Vec<(String, String)>,

    /// Basic auth credentials, if the endpoint requires them.
    pub auth: Option<BasicAuth>,
}

impl FormRequest {
    /// Create a request with no fields and no auth.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fields: Vec::new(),
            auth: None,
        }
    }

    /// Append a form field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Attach basic auth credentials.
    pub fn with_auth(mut self, auth: Option<BasicAuth>) -> Self {
        self.auth = auth;
        self
    }

    /// Look up the value of a form field by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Sends one form-encoded POST and decodes the JSON response.
///
/// Implementations must not retry; timeouts are their own concern.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_form(&self, request: FormRequest) -> Result<Value, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default `reqwest` client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport around a preconfigured client (timeouts, TLS, proxies).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_form(&self, request: FormRequest) -> Result<Value, TransportError> {
        debug!(url = %request.url, fields = request.fields.len(), "sending form request");

        let mut builder = self
            .client
            .post(&request.url)
            .header(ACCEPT, "application/json")
            .form(&request.fields);

        if let Some(auth) = &request.auth {
            builder = builder.basic_auth(&auth.username, Some(auth.password.expose()));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Connection {
                message: e.to_string(),
            })?;

        debug!(url = %request.url, status = %response.status(), "received response");

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Connection {
                message: e.to_string(),
            })?;

        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            message: e.to_string(),
        })
    }
}
