//! Resource operations against the builder and verification endpoints.
//!
//! [`ResourceGateway`] is the public face of the client. Each operation runs
//! the full token handshake, then makes at most one follow-on request (or
//! composes a URL locally) with the fresh token:
//!
//! ```text
//! UNAUTHENTICATED -> TOKEN_RECEIVED -> AUTHENTICATED -> DONE
//!        \                  \                \
//!         +------------------+----------------+--> FAILED
//! ```
//!
//! Tokens are never kept between operations. Every failure is reported as a
//! [`Failure`] value; nothing escapes an operation as a panic or a raw error.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() {
//! use coursebuilder_core::{ConfigStore, ResourceGateway, ResourceType};
//!
//! let mut config = ConfigStore::new();
//! config
//!     .set_license_key("AB-1A2B3C-0D-1A2B3D-0099")
//!     .set_customer_id(42)
//!     .set_secret("0123456789abcdef0123456789abcdef")
//!     .set_public_key("/etc/coursebuilder/public.pem")
//!     .set_verification_url("https://license.example.com")
//!     .set_course_builder_url("https://builder.example.com");
//!
//! let gateway = ResourceGateway::new(config);
//! match gateway.get_create_url(ResourceType::Course, "https://lms.example.com/cb").await {
//!     Ok(payload) => println!("open {}", payload.url),
//!     Err(failure) => eprintln!("failed: {}", failure),
//! }
//! # }
//! ```

use std::fmt::Display;

use serde_json::Value;
use tracing::{info, warn};

use crate::broker::TokenBroker;
use crate::cipher::{RsaCipher, SecretCipher};
use crate::config::ConfigStore;
use crate::envelope::{Failure, UrlPayload};
use crate::error::CourseBuilderError;
use crate::model::{ResourceAttributes, ResourceType};
use crate::token::Token;
use crate::transport::{BasicAuth, FormRequest, ReqwestTransport, Transport};

/// Path of the builder API, relative to the builder URL.
pub const BUILDER_API_PATH: &str = "api";

/// Path of the account info endpoint, relative to the verification URL.
pub const ACCOUNT_INFO_PATH: &str = "api/token/info";

/// Public operation set of the client.
pub struct ResourceGateway<T: Transport = ReqwestTransport, C: SecretCipher = RsaCipher> {
    config: ConfigStore,
    transport: T,
    cipher: C,
}

impl ResourceGateway {
    /// Create a gateway with the default HTTP transport and RSA cipher.
    pub fn new(config: ConfigStore) -> Self {
        Self::with_parts(config, ReqwestTransport::new(), RsaCipher)
    }
}

impl<T: Transport, C: SecretCipher> ResourceGateway<T, C> {
    /// Create a gateway with explicit collaborators.
    pub fn with_parts(config: ConfigStore, transport: T, cipher: C) -> Self {
        Self {
            config,
            transport,
            cipher,
        }
    }

    /// The settings this gateway was built with.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Create a resource and return the builder's response.
    pub async fn create_resource(
        &self,
        resource_type: ResourceType,
        attributes: &ResourceAttributes,
    ) -> Result<Value, Failure> {
        let outcome = async {
            let token = self.authenticate(None).await?;
            let attributes = serde_json::to_string(attributes).unwrap_or_else(|_| "{}".to_string());
            let request = self
                .builder_request()
                .field("action", "create")
                .field("type", resource_type.as_str())
                .field("token", token.expose())
                .field("attributes", attributes)
                .field("options", "{}")
                .field("course_data", "{}")
                .field("template_data", "{}")
                .field("resources", "[]")
                .field("tags", "{}");
            Ok::<_, CourseBuilderError>(self.transport.post_form(request).await?)
        };
        conclude("create", outcome.await)
    }

    /// Fetch the details of a resource: slides, rendered previews and metadata.
    pub async fn get_resource_details(&self, id: impl Display) -> Result<Value, Failure> {
        let outcome = async {
            let token = self.authenticate(None).await?;
            let request = self
                .builder_request()
                .field("action", "details")
                .field("id", id.to_string())
                .field("token", token.expose());
            Ok::<_, CourseBuilderError>(self.transport.post_form(request).await?)
        };
        conclude("details", outcome.await)
    }

    /// URL where a user can create a new resource of the given type.
    ///
    /// The callback URL is bound to the token so the builder can notify it
    /// when the resource is saved.
    pub async fn get_create_url(
        &self,
        resource_type: ResourceType,
        callback_url: &str,
    ) -> Result<UrlPayload, Failure> {
        let outcome = async {
            let token = self.authenticate(Some(callback_url)).await?;
            Ok::<_, CourseBuilderError>(UrlPayload::new(format!(
                "{}token/{}/{}/create",
                self.config.course_builder_url(),
                token.expose(),
                resource_type.plural()
            )))
        };
        conclude("create-url", outcome.await)
    }

    /// URL where a user can view and edit an existing resource.
    pub async fn get_resource_url(
        &self,
        id: impl Display,
        callback_url: &str,
    ) -> Result<UrlPayload, Failure> {
        let outcome = async {
            let token = self.authenticate(Some(callback_url)).await?;
            Ok::<_, CourseBuilderError>(UrlPayload::new(format!(
                "{}token/{}/show/{}",
                self.config.course_builder_url(),
                token.expose(),
                id
            )))
        };
        conclude("url", outcome.await)
    }

    /// The rendered player document for a resource, as returned by the builder.
    pub async fn get_preview(&self, id: impl Display) -> Result<Value, Failure> {
        let outcome = async {
            let token = self.authenticate(None).await?;
            let request = self
                .builder_request()
                .field("action", "preview")
                .field("id", id.to_string())
                .field("token", token.expose());
            Ok::<_, CourseBuilderError>(self.transport.post_form(request).await?)
        };
        conclude("preview", outcome.await)
    }

    /// URL of the player for a resource.
    ///
    /// `params` become the URL fragment as `k=v` pairs joined by `&`, in
    /// iteration order and without percent-encoding. With `wrapper` off the
    /// player renders only the course container, which suits embedding.
    pub async fn get_preview_url<I, K, V>(
        &self,
        id: impl Display,
        params: I,
        wrapper: bool,
    ) -> Result<UrlPayload, Failure>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Display,
    {
        let outcome = async {
            let token = self.authenticate(None).await?;
            let mut url = format!(
                "{}token/{}/preview/{}/{}",
                self.config.course_builder_url(),
                token.expose(),
                id,
                u8::from(wrapper)
            );
            if let Some(fragment) = preview_fragment(params) {
                url.push('#');
                url.push_str(&fragment);
            }
            Ok::<_, CourseBuilderError>(UrlPayload::new(url))
        };
        conclude("preview-url", outcome.await)
    }

    /// Account metadata from the verification endpoint.
    pub async fn get_account_details(&self) -> Result<Value, Failure> {
        let outcome = async {
            let token = self.authenticate(None).await?;
            let request = FormRequest::new(format!(
                "{}{}",
                self.config.verification_url(),
                ACCOUNT_INFO_PATH
            ))
            .field("action", "account-info")
            .field("token", token.expose())
            .with_auth(BasicAuth::optional(
                self.config.verification_username(),
                self.config.verification_password(),
            ));
            Ok::<_, CourseBuilderError>(self.transport.post_form(request).await?)
        };
        conclude("account", outcome.await)
    }

    pub async fn create_course(&self, attributes: &ResourceAttributes) -> Result<Value, Failure> {
        self.create_resource(ResourceType::Course, attributes).await
    }

    pub async fn create_template(&self, attributes: &ResourceAttributes) -> Result<Value, Failure> {
        self.create_resource(ResourceType::Template, attributes).await
    }

    pub async fn create_certificate(
        &self,
        attributes: &ResourceAttributes,
    ) -> Result<Value, Failure> {
        self.create_resource(ResourceType::Certificate, attributes).await
    }

    pub async fn get_create_course_url(&self, callback_url: &str) -> Result<UrlPayload, Failure> {
        self.get_create_url(ResourceType::Course, callback_url).await
    }

    pub async fn get_create_template_url(&self, callback_url: &str) -> Result<UrlPayload, Failure> {
        self.get_create_url(ResourceType::Template, callback_url).await
    }

    pub async fn get_create_certificate_url(
        &self,
        callback_url: &str,
    ) -> Result<UrlPayload, Failure> {
        self.get_create_url(ResourceType::Certificate, callback_url).await
    }

    // Resources share one id space on the builder, so the per-type URL and
    // details lookups differ only in name.

    pub async fn get_course_url(
        &self,
        id: impl Display,
        callback_url: &str,
    ) -> Result<UrlPayload, Failure> {
        self.get_resource_url(id, callback_url).await
    }

    pub async fn get_template_url(
        &self,
        id: impl Display,
        callback_url: &str,
    ) -> Result<UrlPayload, Failure> {
        self.get_resource_url(id, callback_url).await
    }

    pub async fn get_certificate_url(
        &self,
        id: impl Display,
        callback_url: &str,
    ) -> Result<UrlPayload, Failure> {
        self.get_resource_url(id, callback_url).await
    }

    pub async fn get_course_details(&self, id: impl Display) -> Result<Value, Failure> {
        self.get_resource_details(id).await
    }

    pub async fn get_template_details(&self, id: impl Display) -> Result<Value, Failure> {
        self.get_resource_details(id).await
    }

    pub async fn get_certificate_details(&self, id: impl Display) -> Result<Value, Failure> {
        self.get_resource_details(id).await
    }

    /// Run the handshake and return a validated, single-use token.
    async fn authenticate(&self, callback_url: Option<&str>) -> Result<Token, CourseBuilderError> {
        let broker = TokenBroker::new(&self.config, &self.transport, &self.cipher);
        Ok(broker.acquire(callback_url).await?)
    }

    fn builder_request(&self) -> FormRequest {
        FormRequest::new(format!(
            "{}{}",
            self.config.course_builder_url(),
            BUILDER_API_PATH
        ))
        .with_auth(BasicAuth::optional(
            self.config.course_builder_username(),
            self.config.course_builder_password(),
        ))
    }
}

/// Build the preview URL fragment, or `None` when there are no params.
fn preview_fragment<I, K, V>(params: I) -> Option<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Display,
    V: Display,
{
    let mut hash = String::new();
    for (key, value) in params {
        hash.push_str(&format!("&{}={}", key, value));
    }
    if hash.is_empty() {
        return None;
    }
    Some(hash.trim_start_matches(['&', ' ']).to_string())
}

/// Convert an operation outcome into its public shape, logging failures.
fn conclude<P>(operation: &str, outcome: Result<P, CourseBuilderError>) -> Result<P, Failure> {
    match outcome {
        Ok(payload) => {
            info!(operation, "operation completed");
            Ok(payload)
        }
        Err(e) => {
            warn!(operation, error = %e, "operation failed");
            Err(Failure::from(e))
        }
    }
}
