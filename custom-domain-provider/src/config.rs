//! Client configuration
//!
//! Credentials and endpoints are read once by the embedding application and
//! injected into client constructors. Nothing in this crate reads the environment.

use std::time::Duration;

use thiserror::Error;

/// Default hosting API endpoint.
pub const DEFAULT_HOSTING_API_BASE: &str = "https://api.vercel.com";
/// Default email API endpoint.
pub const DEFAULT_EMAIL_API_BASE: &str = "https://api.resend.com";

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration error raised when a client config is incomplete or malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent or empty.
    #[error("missing required setting: {0}")]
    Missing(String),

    /// A setting is present but unusable.
    #[error("invalid setting {key}: {detail}")]
    Invalid { key: String, detail: String },

    /// The underlying HTTP client could not be constructed (TLS backend, etc.).
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

/// HTTP timeouts shared by both clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Web-hosting provider settings (project-scoped).
#[derive(Clone)]
pub struct HostingConfig {
    pub api_token: String,
    pub project_id: String,
    /// Team scope, appended as `teamId` to every request when set.
    pub team_id: Option<String>,
    pub api_base: String,
    pub http: HttpClientConfig,
}

impl HostingConfig {
    #[must_use]
    pub fn new(api_token: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            project_id: project_id.into(),
            team_id: None,
            api_base: DEFAULT_HOSTING_API_BASE.to_string(),
            http: HttpClientConfig::default(),
        }
    }

    #[must_use]
    pub fn with_team_id(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn with_http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require("hosting api_token", &self.api_token)?;
        require("hosting project_id", &self.project_id)?;
        validate_api_base("hosting api_base", &self.api_base)
    }
}

impl std::fmt::Debug for HostingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostingConfig")
            .field("api_token", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("team_id", &self.team_id)
            .field("api_base", &self.api_base)
            .field("http", &self.http)
            .finish()
    }
}

/// Transactional-email provider settings (account-scoped).
#[derive(Clone)]
pub struct EmailConfig {
    pub api_token: String,
    /// Sending region requested on domain creation (e.g. `us-east-1`).
    pub region: Option<String>,
    pub api_base: String,
    pub http: HttpClientConfig,
}

impl EmailConfig {
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            region: None,
            api_base: DEFAULT_EMAIL_API_BASE.to_string(),
            http: HttpClientConfig::default(),
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn with_http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require("email api_token", &self.api_token)?;
        validate_api_base("email api_base", &self.api_base)
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_token", &"<redacted>")
            .field("region", &self.region)
            .field("api_base", &self.api_base)
            .field("http", &self.http)
            .finish()
    }
}

fn require(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing(key.to_string()));
    }
    Ok(())
}

fn validate_api_base(key: &str, value: &str) -> Result<(), ConfigError> {
    if !(value.starts_with("https://") || value.starts_with("http://")) {
        return Err(ConfigError::Invalid {
            key: key.to_string(),
            detail: format!("expected an http(s) URL, got '{value}'"),
        });
    }
    Ok(())
}
