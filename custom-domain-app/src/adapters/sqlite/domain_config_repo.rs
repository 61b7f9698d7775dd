//! `DomainConfigRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};

use custom_domain_core::error::{CoreError, CoreResult};
use custom_domain_core::traits::DomainConfigRepository;
use custom_domain_core::types::{DomainConfig, DomainStatus};

use super::entity::domain_config;
use super::SqliteStore;

impl domain_config::Model {
    /// Decode the stored JSON document.
    fn into_config(self) -> CoreResult<DomainConfig> {
        serde_json::from_str(&self.document).map_err(|e| {
            CoreError::SerializationError(format!(
                "Invalid document for tenant {}: {e}",
                self.tenant_id
            ))
        })
    }
}

fn config_to_active_model(config: &DomainConfig) -> CoreResult<domain_config::ActiveModel> {
    let document = serde_json::to_string(config)
        .map_err(|e| CoreError::SerializationError(e.to_string()))?;

    Ok(domain_config::ActiveModel {
        tenant_id: Set(config.tenant_id.clone()),
        domain: Set(config.domain.clone()),
        status: Set(config.status.as_str().to_string()),
        document: Set(document),
        updated_at: Set(config.updated_at.to_rfc3339()),
    })
}

#[async_trait]
impl DomainConfigRepository for SqliteStore {
    async fn find_by_tenant(&self, tenant_id: &str) -> CoreResult<Option<DomainConfig>> {
        domain_config::Entity::find_by_id(tenant_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query domain config: {e}")))?
            .map(domain_config::Model::into_config)
            .transpose()
    }

    async fn find_by_domain(&self, domain: &str) -> CoreResult<Option<DomainConfig>> {
        domain_config::Entity::find()
            .filter(domain_config::Column::Domain.eq(domain))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query domain config: {e}")))?
            .map(domain_config::Model::into_config)
            .transpose()
    }

    async fn list_by_status(&self, statuses: &[DomainStatus]) -> CoreResult<Vec<DomainConfig>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let rows = domain_config::Entity::find()
            .filter(domain_config::Column::Status.is_in(statuses.iter().map(DomainStatus::as_str)))
            .order_by_asc(domain_config::Column::TenantId)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to list domain configs: {e}")))?;

        rows.into_iter().map(domain_config::Model::into_config).collect()
    }

    async fn save(&self, config: &DomainConfig) -> CoreResult<()> {
        // 先检查域名归属，给出 Conflict 而不是唯一约束的存储错误
        let owner = domain_config::Entity::find()
            .filter(domain_config::Column::Domain.eq(config.domain.as_str()))
            .filter(domain_config::Column::TenantId.ne(config.tenant_id.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query domain config: {e}")))?;
        if let Some(owner) = owner {
            return Err(CoreError::Conflict {
                domain: config.domain.clone(),
                tenant_id: owner.tenant_id,
            });
        }

        let active_model = config_to_active_model(config)?;
        domain_config::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(domain_config::Column::TenantId)
                    .update_columns([
                        domain_config::Column::Domain,
                        domain_config::Column::Status,
                        domain_config::Column::Document,
                        domain_config::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to save domain config: {e}")))?;

        log::debug!(
            "Saved domain config for tenant {} ({}, {})",
            config.tenant_id,
            config.domain,
            config.status
        );
        Ok(())
    }

    async fn delete(&self, tenant_id: &str) -> CoreResult<()> {
        domain_config::Entity::delete_many()
            .filter(domain_config::Column::TenantId.eq(tenant_id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                CoreError::StorageError(format!("Failed to delete domain config: {e}"))
            })?;

        Ok(())
    }
}
