//! Error types for the access control evaluator

use thiserror::Error;

/// Boxed error returned by scope attribute resolvers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Access control errors
#[derive(Debug, Error)]
pub enum AccessControlError {
    /// No resolver is registered for the prefix of a scope
    #[error("no resolver found")]
    ResolverNotFound,

    /// A registered resolver failed
    #[error("could not resolve {scope}: {source}")]
    Resolution {
        scope: String,
        #[source]
        source: BoxError,
    },

    /// The caller cancelled the evaluation while a scope was being resolved
    #[error("scope resolution cancelled")]
    Cancelled,

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Metric registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl AccessControlError {
    /// Whether this error only means "no resolver could be found"
    pub fn is_resolver_not_found(&self) -> bool {
        matches!(self, Self::ResolverNotFound)
    }
}

/// Result type for access control operations
pub type Result<T> = std::result::Result<T, AccessControlError>;
