//! Error taxonomy for selection and dispatch.

use asak_core::ConfigError;
use asak_providers::ProviderError;
use thiserror::Error;

/// Everything `Selector` and `QuotaTracker` can fail with.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The configuration violates an invariant; no selector was built.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A usage snapshot does not match the configured models; state is unchanged.
    #[error("invalid usage records: {0}")]
    RecordsInvalid(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("invalid mode '{0}': expected one of index, available, random")]
    InvalidMode(String),

    /// Nothing passed both the filter and the quota gate.
    #[error("no model is available")]
    NoModelAvailable,

    /// Raised by the completion service, passed through untouched.
    #[error(transparent)]
    Upstream(#[from] ProviderError),
}

impl RouterError {
    /// Whether a later retry could succeed without changing the request.
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::NoModelAvailable)
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
