//! Write-once connection settings.
//!
//! [`ConfigStore`] holds the credentials and endpoint settings the client
//! needs. Each declared [`Field`] may be written exactly once; later writes
//! and writes to undeclared names are ignored without error. Values pass
//! through a per-field [`FieldStrategy`] on the way in, which is how base URLs
//! get their trailing slash and how a public key path is replaced by the
//! file's contents.
//!
//! # Example
//!
//! ```
//! use coursebuilder_core::config::{ConfigStore, Field};
//!
//! let mut store = ConfigStore::new();
//! store
//!     .set_license_key("AB-1A2B3C-0D-1A2B3D-0099")
//!     .set_customer_id(42)
//!     .set_course_builder_url("  https://cb.test// ");
//!
//! assert_eq!(store.course_builder_url(), "https://cb.test/");
//!
//! // Already written: ignored.
//! store.set_customer_id(7);
//! assert_eq!(store.customer_id(), Some(42));
//!
//! // Accessor-style names resolve to the same fields.
//! assert_eq!(Field::from_accessor("getCourseBuilderUrl"), Some(Field::CourseBuilderUrl));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::secret::Secret;

/// A value held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Text(String),
    Integer(i64),
    /// Text of a sensitive field; redacted in `Debug` and `Display`.
    Secret(Secret),
}

impl ConfigValue {
    /// The value rendered as plain text, as it is sent on the wire.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Secret(s) => s.expose().to_string(),
        }
    }

    /// Borrow the textual content, if the value is textual.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Secret(s) => Some(s.expose()),
            Self::Integer(_) => None,
        }
    }

    /// Interpret the value as an integer.
    ///
    /// Text is parsed after trimming; anything unparsable yields `None`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Secret(s) => s.expose().trim().parse().ok(),
        }
    }

    fn into_secret(self) -> Self {
        match self {
            Self::Secret(_) => self,
            other => Self::Secret(Secret::new(other.to_text())),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Secret(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for ConfigValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for ConfigValue {
    fn from(n: i32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<u32> for ConfigValue {
    fn from(n: u32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<Secret> for ConfigValue {
    fn from(s: Secret) -> Self {
        Self::Secret(s)
    }
}

/// A declared configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    LicenseKey,
    CustomerId,
    Secret,
    PublicKey,
    VerificationUrl,
    VerificationUsername,
    VerificationPassword,
    CourseBuilderUrl,
    CourseBuilderUsername,
    CourseBuilderPassword,
}

impl Field {
    /// Every declared field.
    pub const ALL: [Field; 10] = [
        Self::LicenseKey,
        Self::CustomerId,
        Self::Secret,
        Self::PublicKey,
        Self::VerificationUrl,
        Self::VerificationUsername,
        Self::VerificationPassword,
        Self::CourseBuilderUrl,
        Self::CourseBuilderUsername,
        Self::CourseBuilderPassword,
    ];

    /// The property name of this field (`course_builder_url`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::LicenseKey => "license_key",
            Self::CustomerId => "customer_id",
            Self::Secret => "secret",
            Self::PublicKey => "public_key",
            Self::VerificationUrl => "verification_url",
            Self::VerificationUsername => "verification_username",
            Self::VerificationPassword => "verification_password",
            Self::CourseBuilderUrl => "course_builder_url",
            Self::CourseBuilderUsername => "course_builder_username",
            Self::CourseBuilderPassword => "course_builder_password",
        }
    }

    /// Look up a field by its property name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Look up a field by a conventional accessor name such as
    /// `setCourseBuilderUrl` or `getSecret`.
    ///
    /// See [`accessor_to_property`] for the mapping rule.
    pub fn from_accessor(accessor: &str) -> Option<Self> {
        Self::from_name(&accessor_to_property(accessor))
    }

    /// Whether values of this field are confidential.
    pub fn is_sensitive(&self) -> bool {
        matches!(
            self,
            Self::Secret | Self::VerificationPassword | Self::CourseBuilderPassword
        )
    }

    /// The transformation applied to values of this field.
    pub fn strategy(&self) -> FieldStrategy {
        match self {
            Self::PublicKey => FieldStrategy::FileOrLiteral,
            Self::VerificationUrl | Self::CourseBuilderUrl => FieldStrategy::BaseUrl,
            _ => FieldStrategy::Plain,
        }
    }

    /// Value reported for a field that has never been written.
    pub fn default_value(&self) -> ConfigValue {
        match self {
            Self::CustomerId => ConfigValue::Integer(0),
            field if field.is_sensitive() => ConfigValue::Secret(Secret::default()),
            _ => ConfigValue::Text(String::new()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Map an accessor name to a property name.
///
/// A leading `set` or `get` verb is stripped, an underscore is inserted
/// before every uppercase letter that follows a word character, and the
/// result is lowercased: `setCourseBuilderUrl` becomes `course_builder_url`.
pub fn accessor_to_property(accessor: &str) -> String {
    let stem = accessor
        .strip_prefix("set")
        .or_else(|| accessor.strip_prefix("get"))
        .unwrap_or(accessor);

    let mut property = String::with_capacity(stem.len() + 4);
    let mut previous: Option<char> = None;
    for c in stem.chars() {
        if c.is_uppercase() && previous.is_some_and(|p| p.is_alphanumeric() || p == '_') {
            property.push('_');
        }
        property.extend(c.to_lowercase());
        previous = Some(c);
    }
    property
}

/// Per-field value transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStrategy {
    /// Stored and returned unchanged.
    Plain,
    /// If the value names a readable file, the file's contents are stored
    /// instead of the value.
    FileOrLiteral,
    /// Surrounding whitespace and slashes are trimmed and exactly one
    /// trailing slash is appended.
    BaseUrl,
}

impl FieldStrategy {
    /// Transform a value before it is stored.
    pub fn on_set(&self, value: ConfigValue) -> ConfigValue {
        match self {
            Self::Plain => value,
            Self::FileOrLiteral => read_file_or_literal(value),
            Self::BaseUrl => ConfigValue::Text(normalize_base_url(&value.to_text())),
        }
    }

    /// Transform a stored value before it is returned.
    pub fn on_get(&self, value: ConfigValue) -> ConfigValue {
        value
    }
}

/// Trim whitespace and slashes from both ends and append a single `/`.
pub fn normalize_base_url(url: &str) -> String {
    format!(
        "{}/",
        url.trim_matches(|c: char| c.is_whitespace() || c == '/')
    )
}

fn read_file_or_literal(value: ConfigValue) -> ConfigValue {
    let Some(candidate) = value.as_str() else {
        return value;
    };

    let path = Path::new(candidate);
    if !path.is_file() {
        return value;
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => {
            debug!(path = %path.display(), "loaded public key from file");
            ConfigValue::Text(contents)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "public key file unreadable, keeping value as given");
            value
        }
    }
}

macro_rules! field_setters {
    ($($(#[$doc:meta])* $setter:ident => $field:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $setter(&mut self, value: impl Into<ConfigValue>) -> &mut Self {
                self.set_field(Field::$field, value)
            }
        )*
    };
}

/// Write-once store for connection settings.
///
/// The store is filled during setup and read afterwards; it is not meant to
/// be shared mutably.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    values: BTreeMap<Field, ConfigValue>,
}

impl ConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a field by property name.
    ///
    /// Unknown names and fields that were already written are ignored.
    pub fn set(&mut self, name: &str, value: impl Into<ConfigValue>) -> &mut Self {
        match Field::from_name(name) {
            Some(field) => self.set_field(field, value),
            None => {
                debug!(property = name, "ignoring write to undeclared property");
                self
            }
        }
    }

    /// Read a field by property name.
    ///
    /// Returns `None` for undeclared names; declared fields that were never
    /// written report their default value.
    pub fn get(&self, name: &str) -> Option<ConfigValue> {
        Field::from_name(name).map(|field| self.get_field(field))
    }

    /// Write a field through an accessor-style name (`setCourseBuilderUrl`).
    pub fn set_by_accessor(&mut self, accessor: &str, value: impl Into<ConfigValue>) -> &mut Self {
        self.set(&accessor_to_property(accessor), value)
    }

    /// Read a field through an accessor-style name (`getCourseBuilderUrl`).
    pub fn get_by_accessor(&self, accessor: &str) -> Option<ConfigValue> {
        self.get(&accessor_to_property(accessor))
    }

    /// Write a field. A second write to the same field is a no-op.
    pub fn set_field(&mut self, field: Field, value: impl Into<ConfigValue>) -> &mut Self {
        if self.values.contains_key(&field) {
            debug!(property = %field, "property already set, ignoring write");
            return self;
        }

        let mut value = field.strategy().on_set(value.into());
        if field.is_sensitive() {
            value = value.into_secret();
        }
        self.values.insert(field, value);
        self
    }

    /// Read a field, falling back to its default when unwritten.
    pub fn get_field(&self, field: Field) -> ConfigValue {
        let raw = self
            .values
            .get(&field)
            .cloned()
            .unwrap_or_else(|| field.default_value());
        field.strategy().on_get(raw)
    }

    /// Whether the field has been written.
    pub fn is_written(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    field_setters! {
        /// License key of the client installation.
        set_license_key => LicenseKey;
        /// Numeric customer identifier.
        set_customer_id => CustomerId;
        /// Shared secret, encrypted before it is sent.
        set_secret => Secret;
        /// PEM public key, or a path to a file containing it.
        set_public_key => PublicKey;
        set_verification_url => VerificationUrl;
        set_verification_username => VerificationUsername;
        set_verification_password => VerificationPassword;
        set_course_builder_url => CourseBuilderUrl;
        set_course_builder_username => CourseBuilderUsername;
        set_course_builder_password => CourseBuilderPassword;
    }

    pub fn license_key(&self) -> String {
        self.text(Field::LicenseKey)
    }

    /// The customer id, if it holds an integer.
    pub fn customer_id(&self) -> Option<i64> {
        self.get_field(Field::CustomerId).as_integer()
    }

    pub fn secret(&self) -> Secret {
        self.secret_of(Field::Secret)
    }

    pub fn public_key(&self) -> String {
        self.text(Field::PublicKey)
    }

    pub fn verification_url(&self) -> String {
        self.text(Field::VerificationUrl)
    }

    pub fn verification_username(&self) -> String {
        self.text(Field::VerificationUsername)
    }

    pub fn verification_password(&self) -> Secret {
        self.secret_of(Field::VerificationPassword)
    }

    pub fn course_builder_url(&self) -> String {
        self.text(Field::CourseBuilderUrl)
    }

    pub fn course_builder_username(&self) -> String {
        self.text(Field::CourseBuilderUsername)
    }

    pub fn course_builder_password(&self) -> Secret {
        self.secret_of(Field::CourseBuilderPassword)
    }

    fn text(&self, field: Field) -> String {
        self.get_field(field).to_text()
    }

    fn secret_of(&self, field: Field) -> Secret {
        match self.get_field(field) {
            ConfigValue::Secret(secret) => secret,
            other => Secret::new(other.to_text()),
        }
    }
}
