//! 业务逻辑服务层

mod dns_record_planner;
mod domain_provisioning_service;

pub use dns_record_planner::{
    classify, registrable_domain, relative_host, DnsRecordPlanner, RecordPlan, WebTarget,
    DEFAULT_APEX_IP, DEFAULT_EDGE_HOSTNAME,
};
pub use domain_provisioning_service::{
    DomainProvisioningService, ReconcileOutcome, ReconcilePolicy, SweepFailure, SweepReport,
};

use std::sync::Arc;

use custom_domain_provider::{EmailDomainClient, HostingDomainClient};

use crate::error::{CoreError, CoreResult};
use crate::traits::DomainConfigRepository;

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入存储实现与服务商客户端。
pub struct ServiceContext {
    /// 域名配置仓库
    pub repository: Arc<dyn DomainConfigRepository>,
    /// 托管服务客户端
    pub hosting: Arc<dyn HostingDomainClient>,
    /// 邮件服务客户端（未配置时租户不能启用邮件）
    pub email: Option<Arc<dyn EmailDomainClient>>,
    /// DNS 记录规划器
    pub planner: DnsRecordPlanner,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(
        repository: Arc<dyn DomainConfigRepository>,
        hosting: Arc<dyn HostingDomainClient>,
        email: Option<Arc<dyn EmailDomainClient>>,
        web_target: WebTarget,
    ) -> Self {
        Self {
            repository,
            hosting,
            email,
            planner: DnsRecordPlanner::new(web_target),
        }
    }

    /// 获取邮件客户端
    pub fn email_client(&self) -> CoreResult<&Arc<dyn EmailDomainClient>> {
        self.email.as_ref().ok_or_else(|| {
            CoreError::ValidationError("email provider is not configured".to_string())
        })
    }
}
