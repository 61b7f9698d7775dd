use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{EmailDomain, HostingRegistration, HostingStatus};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// HTTP 状态码
    pub status: Option<u16>,
    /// 错误码（各 Provider 格式不同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: Some(code.into()),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// 错误上下文信息（内部使用）
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 域名或 Provider 侧 ID（用于 `DomainNotFound` 等错误）
    pub domain: Option<String>,
}

impl ErrorContext {
    pub fn domain(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
        }
    }

    pub fn domain_or_unknown(&self) -> String {
        self.domain.clone().unwrap_or_else(|| "<unknown>".to_string())
    }
}

/// Provider 错误映射 Trait（内部使用）
/// 各 Provider 实现此 trait 以将原始 API 错误映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：未知错误（fallback）
    ///
    /// 5xx 响应归为网络错误，保证调用方按瞬时错误处理。
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        if matches!(raw.status, Some(500..=599)) {
            return ProviderError::NetworkError {
                provider: self.provider_name().to_string(),
                detail: raw.message,
            };
        }
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Web-hosting provider: attaches custom domains to a project and reports
/// whether the provider can serve them.
#[async_trait]
pub trait HostingDomainClient: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// Attach `domain` to the configured project.
    ///
    /// Idempotent: a domain already attached to this project is reported as
    /// success with `verified = false`, never as an error.
    async fn register(&self, domain: &str) -> Result<HostingRegistration>;

    /// Detach `domain` from the project.
    async fn deregister(&self, domain: &str) -> Result<()>;

    /// Fetch ownership verification plus the provider's view of DNS resolution.
    async fn check_status(&self, domain: &str) -> Result<HostingStatus>;
}

/// Transactional-email provider: owns sending domains and their
/// SPF/DKIM/DMARC/MX record sets.
#[async_trait]
pub trait EmailDomainClient: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// Create a sending domain.
    ///
    /// Idempotent: if the domain already exists, its current state is returned via
    /// [`lookup`](Self::lookup).
    async fn register(&self, domain: &str) -> Result<EmailDomain>;

    /// Find an existing sending domain by name.
    async fn lookup(&self, domain: &str) -> Result<EmailDomain>;

    /// Ask the provider to re-check DNS and return the refreshed record set.
    async fn verify(&self, provider_id: &str) -> Result<EmailDomain>;

    /// Delete the sending domain.
    async fn deregister(&self, provider_id: &str) -> Result<()>;
}
