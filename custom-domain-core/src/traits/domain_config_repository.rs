//! 域名配置持久化抽象 Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{DomainConfig, DomainStatus};

/// 域名配置仓库 Trait
///
/// 每个租户至多一条配置，域名在所有租户间唯一。
///
/// 平台实现:
/// - `InMemoryDomainConfigRepository` (测试 / 单进程部署)
/// - `SqliteStore` (`SeaORM`)
#[async_trait]
pub trait DomainConfigRepository: Send + Sync {
    /// 按租户查询
    async fn find_by_tenant(&self, tenant_id: &str) -> CoreResult<Option<DomainConfig>>;

    /// 按域名查询（用于跨租户冲突检查）
    ///
    /// # Arguments
    /// * `domain` - 已规范化的域名
    async fn find_by_domain(&self, domain: &str) -> CoreResult<Option<DomainConfig>>;

    /// 列出指定状态的所有配置
    async fn list_by_status(&self, statuses: &[DomainStatus]) -> CoreResult<Vec<DomainConfig>>;

    /// 保存或整体覆盖租户的配置
    ///
    /// # Note
    /// 单条文档写入须是原子的；并发写入同一租户时后写者胜出
    async fn save(&self, config: &DomainConfig) -> CoreResult<()>;

    /// 删除租户的配置（不存在时视为成功）
    async fn delete(&self, tenant_id: &str) -> CoreResult<()>;
}
