//! Process configuration, read once at startup.
//!
//! Everything the daemon needs (provider credentials, DNS targets, cadence)
//! is collected into [`AppConfig`] and injected downward; no other module
//! touches the environment.

use std::path::PathBuf;
use std::time::Duration;

use custom_domain_core::{ReconcilePolicy, WebTarget};
use custom_domain_provider::{ConfigError, EmailConfig, HostingConfig, HttpClientConfig};

pub const ENV_HOSTING_TOKEN: &str = "CUSTOM_DOMAIN_HOSTING_TOKEN";
pub const ENV_HOSTING_PROJECT_ID: &str = "CUSTOM_DOMAIN_HOSTING_PROJECT_ID";
pub const ENV_HOSTING_TEAM_ID: &str = "CUSTOM_DOMAIN_HOSTING_TEAM_ID";
pub const ENV_HOSTING_API_BASE: &str = "CUSTOM_DOMAIN_HOSTING_API_BASE";
pub const ENV_APEX_IP: &str = "CUSTOM_DOMAIN_APEX_IP";
pub const ENV_EDGE_HOSTNAME: &str = "CUSTOM_DOMAIN_EDGE_HOSTNAME";
pub const ENV_EMAIL_TOKEN: &str = "CUSTOM_DOMAIN_EMAIL_TOKEN";
pub const ENV_EMAIL_API_BASE: &str = "CUSTOM_DOMAIN_EMAIL_API_BASE";
pub const ENV_EMAIL_REGION: &str = "CUSTOM_DOMAIN_EMAIL_REGION";
pub const ENV_DB_PATH: &str = "CUSTOM_DOMAIN_DB_PATH";
pub const ENV_PENDING_INTERVAL_SECS: &str = "CUSTOM_DOMAIN_PENDING_INTERVAL_SECS";
pub const ENV_ACTIVE_INTERVAL_SECS: &str = "CUSTOM_DOMAIN_ACTIVE_INTERVAL_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "CUSTOM_DOMAIN_HTTP_TIMEOUT_SECS";

/// Complete daemon configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub hosting: HostingConfig,
    /// `None` when no email token is configured; tenants cannot enable email then.
    pub email: Option<EmailConfig>,
    pub web_target: WebTarget,
    /// SQLite database file; in-memory storage when unset.
    pub db_path: Option<PathBuf>,
    pub policy: ReconcilePolicy,
}

impl AppConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required =
            |key: &str| get(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

        let http_timeout = parse_secs(ENV_HTTP_TIMEOUT_SECS, get(ENV_HTTP_TIMEOUT_SECS))?;
        let mut http = HttpClientConfig::default();
        if let Some(timeout) = http_timeout {
            http.request_timeout = timeout;
        }

        let mut hosting = HostingConfig::new(
            required(ENV_HOSTING_TOKEN)?,
            required(ENV_HOSTING_PROJECT_ID)?,
        )
        .with_http(http);
        if let Some(team_id) = get(ENV_HOSTING_TEAM_ID) {
            hosting = hosting.with_team_id(team_id);
        }
        if let Some(api_base) = get(ENV_HOSTING_API_BASE) {
            hosting = hosting.with_api_base(api_base);
        }
        hosting.validate()?;

        let email = match get(ENV_EMAIL_TOKEN) {
            Some(token) => {
                let mut email = EmailConfig::new(token).with_http(http);
                if let Some(api_base) = get(ENV_EMAIL_API_BASE) {
                    email = email.with_api_base(api_base);
                }
                if let Some(region) = get(ENV_EMAIL_REGION) {
                    email = email.with_region(region);
                }
                email.validate()?;
                Some(email)
            }
            None => None,
        };

        let mut web_target = WebTarget::default();
        if let Some(apex_ip) = get(ENV_APEX_IP) {
            if apex_ip.parse::<std::net::IpAddr>().is_err() {
                return Err(ConfigError::Invalid {
                    key: ENV_APEX_IP.to_string(),
                    detail: format!("'{apex_ip}' is not an IP address"),
                });
            }
            web_target.apex_ip = apex_ip;
        }
        if let Some(edge_hostname) = get(ENV_EDGE_HOSTNAME) {
            web_target.edge_hostname = edge_hostname.trim_end_matches('.').to_lowercase();
        }

        let mut policy = ReconcilePolicy::default();
        if let Some(interval) = parse_secs(ENV_PENDING_INTERVAL_SECS, get(ENV_PENDING_INTERVAL_SECS))? {
            policy.pending_interval = interval;
        }
        if let Some(interval) = parse_secs(ENV_ACTIVE_INTERVAL_SECS, get(ENV_ACTIVE_INTERVAL_SECS))? {
            policy.active_interval = interval;
        }

        Ok(Self {
            hosting,
            email,
            web_target,
            db_path: get(ENV_DB_PATH).map(PathBuf::from),
            policy,
        })
    }
}

/// 解析正整数秒数
fn parse_secs(key: &str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            detail: format!("expected a positive number of seconds, got '{raw}'"),
        }),
    }
}
