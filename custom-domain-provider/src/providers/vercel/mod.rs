//! Vercel hosting client (project domains API)

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::config::{ConfigError, HostingConfig};
use crate::providers::common::create_http_client;

pub(crate) use types::{AddDomainBody, VercelDomainConfig, VercelErrorBody, VercelProjectDomain};

/// Vercel 项目域名 API 客户端
pub struct VercelClient {
    pub(crate) client: Client,
    pub(crate) config: HostingConfig,
}

impl VercelClient {
    pub fn new(config: HostingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            client: create_http_client(&config.http)?,
            config,
        })
    }
}
