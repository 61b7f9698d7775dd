//! Application wiring for tenant custom domains.
//!
//! Provides `AppConfig` (environment configuration), `AppState` (service
//! container), `AppStateBuilder` (adapter injection), the storage adapters and
//! the `ReconciliationScheduler` that drives periodic checks.

pub mod adapters;
pub mod config;
pub mod scheduler;

use std::sync::Arc;

use custom_domain_core::error::{CoreError, CoreResult};
use custom_domain_core::services::{
    DomainProvisioningService, ReconcileOutcome, ReconcilePolicy, ServiceContext, WebTarget,
};
use custom_domain_core::traits::DomainConfigRepository;
use custom_domain_core::types::DomainConfig;
use custom_domain_provider::{
    create_email_client, create_hosting_client, ConfigError, EmailDomainClient,
    HostingDomainClient,
};

pub use config::AppConfig;
pub use scheduler::ReconciliationScheduler;

/// Platform-agnostic application state.
///
/// Every frontend (daemon, admin API) constructs this once at startup via
/// `AppStateBuilder`.
pub struct AppState {
    /// Service context (storage adapter and provider clients)
    pub ctx: Arc<ServiceContext>,
    /// Provisioning / reconciliation service
    pub provisioning: Arc<DomainProvisioningService>,
    /// Reconciliation cadence
    pub policy: ReconcilePolicy,
}

impl AppState {
    /// Attach `domain` to `tenant_id`.
    pub async fn attach(
        &self,
        tenant_id: &str,
        domain: &str,
        email_enabled: bool,
    ) -> CoreResult<DomainConfig> {
        self.provisioning.attach(tenant_id, domain, email_enabled).await
    }

    /// Admin "check now": reconcile synchronously.
    ///
    /// Also takes a config out of `error`. A transient provider failure is not
    /// an error here: the outcome carries the timestamped config plus the
    /// deferred cause in `deferred`.
    pub async fn check_now(&self, tenant_id: &str) -> CoreResult<ReconcileOutcome> {
        let outcome = self.provisioning.retry(tenant_id).await?;
        if let Some(err) = &outcome.deferred {
            log::warn!(
                "Check of {} for tenant {tenant_id} deferred, try again later: {err}",
                outcome.config.domain
            );
        }
        Ok(outcome)
    }

    /// Current configuration, no provider calls.
    pub async fn get_config(&self, tenant_id: &str) -> CoreResult<DomainConfig> {
        self.provisioning.get_config(tenant_id).await
    }

    /// Detach the tenant's domain.
    pub async fn detach(&self, tenant_id: &str) -> CoreResult<DomainConfig> {
        self.provisioning.detach(tenant_id).await
    }

    /// Scheduler bound to this state's service and cadence.
    #[must_use]
    pub fn scheduler(&self) -> ReconciliationScheduler {
        ReconciliationScheduler::new(Arc::clone(&self.provisioning), self.policy)
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required
/// - `repository`: where `DomainConfig` documents are stored
/// - `hosting_client`: the web-hosting provider
///
/// # Optional
/// - `email_client`: without it tenants cannot enable email
/// - `web_target`: defaults to the hosting provider's public targets
/// - `policy`: defaults to `ReconcilePolicy::default()`
#[derive(Default)]
pub struct AppStateBuilder {
    repository: Option<Arc<dyn DomainConfigRepository>>,
    hosting_client: Option<Arc<dyn HostingDomainClient>>,
    email_client: Option<Arc<dyn EmailDomainClient>>,
    web_target: Option<WebTarget>,
    policy: Option<ReconcilePolicy>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the provider clients described by `config`.
    ///
    /// The repository still has to be supplied.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let hosting = create_hosting_client(config.hosting.clone())?;
        let email = config
            .email
            .clone()
            .map(create_email_client)
            .transpose()?;

        let mut builder = Self::new()
            .hosting_client(hosting)
            .web_target(config.web_target.clone())
            .policy(config.policy);
        builder.email_client = email;
        Ok(builder)
    }

    #[must_use]
    pub fn repository(mut self, repo: Arc<dyn DomainConfigRepository>) -> Self {
        self.repository = Some(repo);
        self
    }

    #[must_use]
    pub fn hosting_client(mut self, client: Arc<dyn HostingDomainClient>) -> Self {
        self.hosting_client = Some(client);
        self
    }

    #[must_use]
    pub fn email_client(mut self, client: Arc<dyn EmailDomainClient>) -> Self {
        self.email_client = Some(client);
        self
    }

    #[must_use]
    pub fn web_target(mut self, target: WebTarget) -> Self {
        self.web_target = Some(target);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing.
    pub fn build(self) -> CoreResult<AppState> {
        let repository = self
            .repository
            .ok_or_else(|| CoreError::ValidationError("repository is required".to_string()))?;
        let hosting = self.hosting_client.ok_or_else(|| {
            CoreError::ValidationError("hosting_client is required".to_string())
        })?;

        if self.email_client.is_none() {
            log::info!("No email provider configured, email sending domains are disabled");
        }

        let ctx = Arc::new(ServiceContext::new(
            repository,
            hosting,
            self.email_client,
            self.web_target.unwrap_or_default(),
        ));
        let provisioning = Arc::new(DomainProvisioningService::new(Arc::clone(&ctx)));

        Ok(AppState {
            ctx,
            provisioning,
            policy: self.policy.unwrap_or_default(),
        })
    }
}
