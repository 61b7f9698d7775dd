//! Resend email client (sending domains API)

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::config::{ConfigError, EmailConfig};
use crate::providers::common::create_http_client;

pub(crate) use types::{
    CreateDomainBody, ResendDomain, ResendDomainList, ResendErrorBody, ResendRecord,
    ResendVerifyResponse,
};

/// Resend 发信域名 API 客户端
pub struct ResendClient {
    pub(crate) client: Client,
    pub(crate) config: EmailConfig,
}

impl ResendClient {
    pub fn new(config: EmailConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            client: create_http_client(&config.http)?,
            config,
        })
    }
}
