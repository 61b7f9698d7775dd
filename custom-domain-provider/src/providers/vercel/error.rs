//! Vercel error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::VercelClient;

/// Vercel error code mapping
/// Reference: <https://vercel.com/docs/rest-api/reference/errors>
impl ProviderErrorMapper for VercelClient {
    fn provider_name(&self) -> &'static str {
        "vercel"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();

        match raw.code.as_deref() {
            // Already attached to this project (rewritten from domain_already_in_use in http.rs)
            Some("domain_already_exists") => ProviderError::DomainExists {
                provider,
                domain: context.domain_or_unknown(),
                raw_message: Some(raw.message),
            },

            // Claimed by another project or account
            Some("domain_already_in_use" | "domain_taken" | "domain_not_available") => {
                ProviderError::DomainInUse {
                    provider,
                    domain: context.domain_or_unknown(),
                    raw_message: Some(raw.message),
                }
            }

            Some("invalid_domain" | "invalid_name" | "invalid_domain_name" | "domain_not_allowed") => {
                ProviderError::InvalidDomain {
                    provider,
                    domain: context.domain_or_unknown(),
                    raw_message: Some(raw.message),
                }
            }

            Some("not_found" | "domain_not_found") => ProviderError::DomainNotFound {
                provider,
                domain: context.domain_or_unknown(),
                raw_message: Some(raw.message),
            },

            Some("forbidden" | "team_unauthorized") => ProviderError::PermissionDenied {
                provider,
                raw_message: Some(raw.message),
            },

            Some("unauthorized" | "invalid_token" | "missing_token") => {
                ProviderError::InvalidCredentials {
                    provider,
                    raw_message: Some(raw.message),
                }
            }

            Some("domain_limit_reached" | "payment_required") => ProviderError::QuotaExceeded {
                provider,
                raw_message: Some(raw.message),
            },

            Some("rate_limited") => ProviderError::RateLimited {
                provider,
                retry_after: None,
                raw_message: Some(raw.message),
            },

            // Unmapped code: fall back on HTTP status
            _ => match raw.status {
                Some(401) => ProviderError::InvalidCredentials {
                    provider,
                    raw_message: Some(raw.message),
                },
                Some(402) => ProviderError::QuotaExceeded {
                    provider,
                    raw_message: Some(raw.message),
                },
                Some(403) => ProviderError::PermissionDenied {
                    provider,
                    raw_message: Some(raw.message),
                },
                Some(404) => ProviderError::DomainNotFound {
                    provider,
                    domain: context.domain_or_unknown(),
                    raw_message: Some(raw.message),
                },
                _ => self.unknown_error(raw),
            },
        }
    }
}
