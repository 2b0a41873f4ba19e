//! Top-level error types for the CourseBuilder client.

use thiserror::Error;

use crate::token::TokenError;
use crate::transport::TransportError;

/// Top-level error type encompassing all client errors.
///
/// Public gateway operations never return this directly; it is converted to
/// a [`Failure`](crate::envelope::Failure) at the operation boundary.
#[derive(Debug, Error)]
pub enum CourseBuilderError {
    /// The token response was rejected.
    #[error("{0}")]
    Token(#[from] TokenError),

    /// A request to an endpoint failed.
    #[error("{0}")]
    Transport(#[from] TransportError),
}
