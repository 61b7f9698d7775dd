//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use custom_domain_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Domain name rejected before any provider call
    #[error("Invalid domain '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    /// Domain already attached to another tenant, or tenant already owns a different domain
    #[error("Domain {domain} conflicts with tenant {tenant_id}")]
    Conflict { domain: String, tenant_id: String },

    /// No domain configuration for this tenant
    #[error("No domain configured for tenant: {0}")]
    NotFound(String),

    /// Transient provider failure, retry on the next reconciliation pass
    #[error("Provider temporarily unavailable: {0}")]
    ProviderUnavailable(ProviderError),

    /// Fatal provider failure
    #[error("{0}")]
    Provider(ProviderError),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ProviderError> for CoreError {
    /// Splits provider failures by whether retrying can help.
    fn from(err: ProviderError) -> Self {
        if err.is_fatal() {
            Self::Provider(err)
        } else {
            Self::ProviderUnavailable(err)
        }
    }
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::InvalidDomain { .. }
            | Self::Conflict { .. }
            | Self::NotFound(_)
            | Self::ValidationError(_) => true,
            Self::Provider(e) | Self::ProviderUnavailable(e) => e.is_expected(),
            Self::StorageError(_) | Self::SerializationError(_) => false,
        }
    }

    /// Whether the failure may clear up on its own.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::StorageError(_))
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
