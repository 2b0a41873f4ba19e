//! # CourseBuilder Core
//!
//! Client library for the CourseBuilder licensing and builder services.
//!
//! This crate provides:
//! - [`ConfigStore`] - Write-once credentials and endpoint settings
//! - [`TokenBroker`] - The token handshake with the verification endpoint
//! - [`ResourceGateway`] - Create, fetch and render courses, templates and certificates
//! - [`Transport`] and [`SecretCipher`] - Seams for the HTTP client and the
//!   public-key primitive, with `reqwest` and RSA implementations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coursebuilder_core::{ConfigStore, ResourceAttributes, ResourceGateway};
//!
//! async fn new_course(config: ConfigStore) -> Result<serde_json::Value, coursebuilder_core::Failure> {
//!     let gateway = ResourceGateway::new(config);
//!     gateway.create_course(&ResourceAttributes::new("Onboarding")).await
//! }
//! ```

pub mod broker;
pub mod cipher;
pub mod config;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod model;
pub mod secret;
pub mod token;
pub mod transport;

// Re-export commonly used types at crate root
pub use config::{
    ConfigStore,
    ConfigValue,
    Field,
};

pub use broker::TokenBroker;

pub use cipher::{
    CipherError,
    RsaCipher,
    SecretCipher,
};

pub use envelope::{
    Failure,
    UrlPayload,
    to_envelope,
};

pub use error::CourseBuilderError;

pub use gateway::ResourceGateway;

pub use model::{
    ResourceAttributes,
    ResourceType,
};

pub use secret::Secret;

pub use token::{
    Token,
    TokenError,
};

pub use transport::{
    BasicAuth,
    FormRequest,
    ReqwestTransport,
    Transport,
    TransportError,
};
