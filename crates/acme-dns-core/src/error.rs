//! Error types for the ACME DNS-01 reconciler
//!
//! This module defines all error types used throughout the crate.
//!
//! "Not found" outcomes of the resolver and locator are not errors: they
//! are returned as `Option::None`. Everything in [`Error`] aborts the
//! current Present/CleanUp call.

use crate::reconciler::Mutation;
use crate::traits::DomainId;
use thiserror::Error;

/// Result type alias for reconciler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the ACME DNS-01 reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// The provider has no domain for the challenge zone
    #[error("Domain not found at provider: {0}")]
    DomainNotFound(String),

    /// The provider answered "not found" for a required object
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP client errors (network, timeouts, unreadable bodies)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// A mutation was accepted but the following commit failed.
    ///
    /// The provider is left holding an uncommitted change for `domain_id`.
    /// Nothing is rolled back.
    #[error("Inconsistent state on domain {domain_id}: {mutation} is pending but commit failed: {source}")]
    InconsistentState {
        /// Domain the pending change belongs to
        domain_id: DomainId,
        /// The mutation left uncommitted
        mutation: Mutation,
        /// The commit failure
        #[source]
        source: Box<Error>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "domain not found" error
    pub fn domain_not_found(zone: impl Into<String>) -> Self {
        Self::DomainNotFound(zone.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Wrap a commit failure that followed an accepted mutation
    pub fn inconsistent_state(domain_id: DomainId, mutation: Mutation, source: Error) -> Self {
        Self::InconsistentState {
            domain_id,
            mutation,
            source: Box::new(source),
        }
    }

    /// Whether the provider reported the requested object as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether retrying the whole Present/CleanUp call may succeed
    ///
    /// The reconciler never retries; this is for the caller.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited(_) | Self::Provider { .. } => true,
            Self::InconsistentState { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
