//! Domain model types for the CourseBuilder API.
//!
//! This module defines:
//! - [`ResourceType`] - The kind of builder resource (course, template, certificate)
//! - [`ResourceAttributes`] - Free-text metadata sent when a resource is created

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of resource stored by the builder endpoint.
///
/// All three kinds are structurally identical on the wire and differ only by
/// this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Course,
    Template,
    Certificate,
}

impl ResourceType {
    /// All resource types, in declaration order.
    pub const ALL: [ResourceType; 3] = [Self::Course, Self::Template, Self::Certificate];

    /// The type tag as sent to the builder endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Template => "template",
            Self::Certificate => "certificate",
        }
    }

    /// The plural path segment used in builder URLs (`courses`, ...).
    pub fn plural(&self) -> String {
        format!("{}s", self.as_str())
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ParseResourceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "course" => Ok(Self::Course),
            "template" => Ok(Self::Template),
            "certificate" => Ok(Self::Certificate),
            other => Err(ParseResourceTypeError {
                got: other.to_string(),
            }),
        }
    }
}

/// Error parsing a resource type name.
#[derive(Debug, thiserror::Error)]
#[error("unknown resource type '{got}': expected course, template or certificate")]
pub struct ParseResourceTypeError {
    pub got: String,
}

/// Free-text attributes of a resource, sent as a JSON object on create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAttributes {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub notes: String,
}

impl ResourceAttributes {
    /// Create attributes with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}
