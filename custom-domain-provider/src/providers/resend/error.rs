//! Resend error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::ResendClient;

/// Resend error name mapping
/// Reference: <https://resend.com/docs/api-reference/errors>
impl ProviderErrorMapper for ResendClient {
    fn provider_name(&self) -> &'static str {
        "resend"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();

        match raw.code.as_deref() {
            // validation_error 同时覆盖“已存在”和“域名非法”两种情况，只能看消息
            Some("validation_error") if raw.message.to_lowercase().contains("already") => {
                ProviderError::DomainExists {
                    provider,
                    domain: context.domain_or_unknown(),
                    raw_message: Some(raw.message),
                }
            }
            // 只有 `name` 字段的校验失败才是域名本身的问题
            Some("validation_error" | "invalid_parameter")
                if raw.message.to_lowercase().contains("name") =>
            {
                ProviderError::InvalidDomain {
                    provider,
                    domain: context.domain_or_unknown(),
                    raw_message: Some(raw.message),
                }
            }
            Some("validation_error" | "invalid_parameter") => self.unknown_error(raw),

            Some("missing_api_key" | "invalid_api_key") => ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            },

            Some("restricted_api_key" | "invalid_access") => ProviderError::PermissionDenied {
                provider,
                raw_message: Some(raw.message),
            },

            Some("not_found") => ProviderError::DomainNotFound {
                provider,
                domain: context.domain_or_unknown(),
                raw_message: Some(raw.message),
            },

            Some("rate_limit_exceeded") => ProviderError::RateLimited {
                provider,
                retry_after: None,
                raw_message: Some(raw.message),
            },

            Some("daily_quota_exceeded" | "monthly_quota_exceeded") => {
                ProviderError::QuotaExceeded {
                    provider,
                    raw_message: Some(raw.message),
                }
            }

            _ => match raw.status {
                Some(401) => ProviderError::InvalidCredentials {
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
