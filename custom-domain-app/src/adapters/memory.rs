//! In-process `DomainConfigRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use custom_domain_core::error::{CoreError, CoreResult};
use custom_domain_core::traits::DomainConfigRepository;
use custom_domain_core::types::{DomainConfig, DomainStatus};

/// Keeps every `DomainConfig` in a map keyed by tenant.
///
/// State is lost on restart; suitable for tests and single-process setups.
#[derive(Default)]
pub struct InMemoryDomainConfigRepository {
    configs: RwLock<HashMap<String, DomainConfig>>,
}

impl InMemoryDomainConfigRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DomainConfigRepository for InMemoryDomainConfigRepository {
    async fn find_by_tenant(&self, tenant_id: &str) -> CoreResult<Option<DomainConfig>> {
        Ok(self.configs.read().await.get(tenant_id).cloned())
    }

    async fn find_by_domain(&self, domain: &str) -> CoreResult<Option<DomainConfig>> {
        Ok(self
            .configs
            .read()
            .await
            .values()
            .find(|c| c.domain == domain)
            .cloned())
    }

    async fn list_by_status(&self, statuses: &[DomainStatus]) -> CoreResult<Vec<DomainConfig>> {
        let mut configs: Vec<DomainConfig> = self
            .configs
            .read()
            .await
            .values()
            .filter(|c| statuses.contains(&c.status))
            .cloned()
            .collect();
        configs.sort_by(|a, b| a.tenant_id.cmp(&b.tenant_id));
        Ok(configs)
    }

    async fn save(&self, config: &DomainConfig) -> CoreResult<()> {
        let mut configs = self.configs.write().await;
        // 同一写锁内检查，保证域名唯一
        if let Some(owner) = configs
            .values()
            .find(|c| c.domain == config.domain && c.tenant_id != config.tenant_id)
        {
            return Err(CoreError::Conflict {
                domain: config.domain.clone(),
                tenant_id: owner.tenant_id.clone(),
            });
        }
        configs.insert(config.tenant_id.clone(), config.clone());
        Ok(())
    }

    async fn delete(&self, tenant_id: &str) -> CoreResult<()> {
        self.configs.write().await.remove(tenant_id);
        Ok(())
    }
}
