//! Error types for the token registry service.

use dip721_interface::SchemaError;
use thiserror::Error;

/// Errors raised while serving registry calls.
///
/// `NftError` values are ordinary replies and never appear here. A
/// [`RegistryError::Rejected`] is the call-level refusal a client sees when
/// a guard fails before or instead of a reply.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Call refused by an authorization guard
    #[error("Call to {method} rejected: {reason}")]
    Rejected {
        /// Wire method name
        method: String,
        /// Human-readable reason
        reason: String,
    },

    /// Method not part of the active interface flavor
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Arguments could not be decoded
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Arguments or reply do not match the interface schema
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot persistence failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RegistryError {
    /// Create a rejection for `method`.
    #[must_use]
    pub fn rejected(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid arguments error.
    #[must_use]
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a storage error.
    #[must_use]
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the call was refused by a guard rather than failing.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Whether the caller supplied a malformed request.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownMethod(_) | Self::InvalidArguments(_) | Self::Schema(_)
        )
    }
}
