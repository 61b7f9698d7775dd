//! # custom-domain-provider
//!
//! Clients for the two external providers a tenant custom domain depends on:
//! a web-hosting project that must serve the domain, and a transactional-email
//! account that must be allowed to send from it.
//!
//! ## Supported Providers
//!
//! | Capability | Provider | Feature Flag | Auth Method |
//! |------------|----------|-------------|-------------|
//! | [`HostingDomainClient`] | [Vercel](https://vercel.com/) | `vercel` | Bearer Token (project + optional team scope) |
//! | [`EmailDomainClient`] | [Resend](https://resend.com/) | `resend` | Bearer Token |
//!
//! ## Feature Flags
//!
//! - **`all-providers`** *(default)*: enable both clients.
//! - **`vercel`** / **`resend`**: enable a single client.
//! - **`native-tls`** *(default)* / **`rustls`**: TLS backend for `reqwest`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use custom_domain_provider::{
//!     create_email_client, create_hosting_client, EmailConfig, HostingConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hosting = create_hosting_client(HostingConfig::new("token", "prj_123"))?;
//!     let email = create_email_client(EmailConfig::new("re_123"))?;
//!
//!     // Register is idempotent: an already-attached domain is a success.
//!     let registration = hosting.register("shop.example.com").await?;
//!     println!("hosting id: {}", registration.provider_id);
//!
//!     let sending = email.register("shop.example.com").await?;
//!     for record in &sending.records {
//!         println!("{} {} -> {}", record.record_type, record.name, record.value);
//!     }
//!
//!     let status = hosting.check_status("shop.example.com").await?;
//!     println!("verified={} dns={}", status.verified, status.dns_configured);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All client operations return [`Result<T, ProviderError>`](ProviderError).
//! Callers driving reconciliation only need two questions answered:
//!
//! - [`ProviderError::is_fatal`]: retrying will not help (invalid domain name,
//!   domain owned by someone else, credentials / permissions / quota).
//! - [`ProviderError::is_transient`]: try again on the next pass (network,
//!   timeout, 429, 5xx, unparseable response).
//!
//! Requests are single-shot; there is no internal retry loop.

mod config;
mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

pub use config::{
    ConfigError, DEFAULT_EMAIL_API_BASE, DEFAULT_HOSTING_API_BASE, EmailConfig, HostingConfig,
    HttpClientConfig,
};

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
#[cfg(feature = "resend")]
pub use factory::create_email_client;
#[cfg(feature = "vercel")]
pub use factory::create_hosting_client;

// Re-export capability traits only (internal traits are not exported)
pub use traits::{EmailDomainClient, HostingDomainClient};

pub use types::{
    DnsRecordType, EmailDomain, EmailDomainStatus, HostingRegistration, HostingStatus,
    ProviderDnsRecord,
};

pub use utils::log_sanitizer::truncate_for_log;

// Re-export concrete clients (behind feature flags)
#[cfg(feature = "vercel")]
pub use providers::VercelClient;

#[cfg(feature = "resend")]
pub use providers::ResendClient;
