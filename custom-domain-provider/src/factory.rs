//! Client factory functions.

use std::sync::Arc;

use crate::config::ConfigError;
#[cfg(feature = "resend")]
use crate::config::EmailConfig;
#[cfg(feature = "vercel")]
use crate::config::HostingConfig;
#[cfg(feature = "resend")]
use crate::providers::ResendClient;
#[cfg(feature = "vercel")]
use crate::providers::VercelClient;
#[cfg(feature = "resend")]
use crate::traits::EmailDomainClient;
#[cfg(feature = "vercel")]
use crate::traits::HostingDomainClient;

/// Creates the hosting client, wrapped in `Arc<dyn HostingDomainClient>` for
/// sharing across async tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use custom_domain_provider::{create_hosting_client, HostingConfig};
///
/// let hosting = create_hosting_client(
///     HostingConfig::new("vercel-token", "prj_123").with_team_id("team_456"),
/// ).unwrap();
/// assert_eq!(hosting.id(), "vercel");
/// ```
#[cfg(feature = "vercel")]
pub fn create_hosting_client(
    config: HostingConfig,
) -> Result<Arc<dyn HostingDomainClient>, ConfigError> {
    Ok(Arc::new(VercelClient::new(config)?))
}

/// Creates the email client, wrapped in `Arc<dyn EmailDomainClient>`.
#[cfg(feature = "resend")]
pub fn create_email_client(config: EmailConfig) -> Result<Arc<dyn EmailDomainClient>, ConfigError> {
    Ok(Arc::new(ResendClient::new(config)?))
}
