//! CLI settings handling.
//!
//! Settings live in a TOML file, by default
//! `<config dir>/coursebuilder/client.toml`:
//!
//! ```toml
//! log_level = "info"
//!
//! [credentials]
//! license_key = "AB-1A2B3C-0D-1A2B3D-0099"
//! customer_id = 42
//! secret = "0123456789abcdef0123456789abcdef"
//! public_key = "/etc/coursebuilder/public.pem"
//!
//! [verification]
//! url = "https://license.example.com"
//!
//! [course_builder]
//! url = "https://builder.example.com"
//! username = "staging"
//! password = "staging-pass"
//! ```

use anyhow::{Context, Result};
use coursebuilder_core::{ConfigStore, Secret};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientSettings {
    /// Path of the file that was loaded.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Logging level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    pub credentials: Credentials,

    #[serde(default)]
    pub verification: Endpoint,

    #[serde(default)]
    pub course_builder: Endpoint,
}

/// Static credentials issued by the CourseBuilder supplier.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub license_key: String,
    pub customer_id: i64,
    #[serde(deserialize_with = "deserialize_secret")]
    pub secret: Secret,
    /// PEM text, or a path to a PEM file.
    pub public_key: String,
}

/// Base URL and optional basic auth for one endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub password: Secret,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<Secret, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(Secret::new)
}

impl ClientSettings {
    /// Write these settings into a fresh store.
    pub fn to_store(&self) -> ConfigStore {
        let mut store = ConfigStore::new();
        store
            .set_license_key(&self.credentials.license_key)
            .set_customer_id(self.credentials.customer_id)
            .set_secret(self.credentials.secret.clone())
            .set_public_key(&self.credentials.public_key)
            .set_verification_url(&self.verification.url)
            .set_verification_username(&self.verification.username)
            .set_verification_password(self.verification.password.clone())
            .set_course_builder_url(&self.course_builder.url)
            .set_course_builder_username(&self.course_builder.username)
            .set_course_builder_password(self.course_builder.password.clone());
        store
    }
}

/// Default location of the settings file.
pub fn default_config_path() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().join("client.toml"))
        .unwrap_or_else(|| PathBuf::from("coursebuilder.toml"))
}

/// Load settings from `path`, or from the default location.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    let contents = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read settings from {:?}", config_path))?;
    let mut settings: ClientSettings = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse settings from {:?}", config_path))?;

    settings.config_path = config_path;
    Ok(settings)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "aidenko", "coursebuilder")
}
