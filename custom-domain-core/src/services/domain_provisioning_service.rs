//! 自定义域名接入与验证编排服务
//!
//! 所有状态都在 `DomainConfig` 中；每个操作在全部服务商调用结束后只写入一次，
//! 中途取消（future 被 drop）不会留下部分写入。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use custom_domain_provider::ProviderError;
use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{DomainConfig, DomainRecord, DomainStatus, RecordPurpose};
use crate::utils::validate_domain;

/// 默认：未激活配置的检查间隔（5 分钟）
const DEFAULT_PENDING_INTERVAL: Duration = Duration::from_secs(5 * 60);
/// 默认：已激活配置的漂移检查间隔（6 小时）
const DEFAULT_ACTIVE_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// 定期检查节奏
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilePolicy {
    /// `pending` / `verifying` 配置的检查间隔
    pub pending_interval: Duration,
    /// `active` 配置的检查间隔
    pub active_interval: Duration,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            pending_interval: DEFAULT_PENDING_INTERVAL,
            active_interval: DEFAULT_ACTIVE_INTERVAL,
        }
    }
}

impl ReconcilePolicy {
    /// 配置在 `now` 时是否需要检查；`error` 状态只能手动重试
    #[must_use]
    pub fn is_due(&self, config: &DomainConfig, now: DateTime<Utc>) -> bool {
        let interval = match config.status {
            DomainStatus::Error => return false,
            DomainStatus::Active => self.active_interval,
            DomainStatus::Pending | DomainStatus::Verifying => self.pending_interval,
        };
        match config.last_checked_at {
            None => true,
            Some(last) => now.signed_duration_since(last).to_std().unwrap_or_default() >= interval,
        }
    }
}

/// 单次检查结果
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// 写入存储后的配置
    pub config: DomainConfig,
    /// 遇到瞬时错误时为 Some：状态未变，下次检查重试
    pub deferred: Option<ProviderError>,
}

/// 批量检查中失败的租户
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepFailure {
    pub tenant_id: String,
    pub domain: String,
    pub error: String,
    /// 下次检查可能自行恢复
    pub transient: bool,
}

/// 批量检查汇总
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub checked: usize,
    pub activated: usize,
    pub failed: Vec<SweepFailure>,
}

/// 自定义域名编排服务
pub struct DomainProvisioningService {
    ctx: Arc<ServiceContext>,
}

impl DomainProvisioningService {
    /// 创建服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 获取租户的域名配置
    pub async fn get_config(&self, tenant_id: &str) -> CoreResult<DomainConfig> {
        self.ctx
            .repository
            .find_by_tenant(tenant_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(tenant_id.to_string()))
    }

    /// 为租户接入域名
    ///
    /// 依次向托管服务和（如启用）邮件服务注册，合并 DNS 记录后以 `pending` 保存。
    /// 不等待验证。任何注册错误都直接返回，不保存任何状态；
    /// 首次接入时邮件注册失败会注销刚注册的托管域名。
    pub async fn attach(
        &self,
        tenant_id: &str,
        domain: &str,
        email_enabled: bool,
    ) -> CoreResult<DomainConfig> {
        let domain = validate_domain(domain)?;
        if email_enabled {
            self.ctx.email_client()?;
        }

        if let Some(owner) = self.ctx.repository.find_by_domain(&domain).await? {
            if owner.tenant_id != tenant_id {
                log::warn!(
                    "Domain {domain} requested by tenant {tenant_id} is attached to tenant {}",
                    owner.tenant_id
                );
                return Err(CoreError::Conflict {
                    domain,
                    tenant_id: owner.tenant_id,
                });
            }
        }

        let existing = self.ctx.repository.find_by_tenant(tenant_id).await?;
        if let Some(current) = &existing {
            if current.domain != domain {
                return Err(CoreError::Conflict {
                    domain: current.domain.clone(),
                    tenant_id: tenant_id.to_string(),
                });
            }
        }

        let now = Utc::now();
        let plan = self.ctx.planner.plan(&domain, email_enabled);
        let mut config =
            DomainConfig::new(tenant_id, domain.clone(), plan.domain_type, email_enabled, now);
        if let Some(previous) = &existing {
            config.created_at = previous.created_at;
            config.configured_at = previous.configured_at;
            config.hosting_provider_id.clone_from(&previous.hosting_provider_id);
            if email_enabled {
                config.email_provider_id.clone_from(&previous.email_provider_id);
            }
        }

        // 托管服务
        let mut challenges = Vec::new();
        match self.ctx.hosting.register(&domain).await {
            Ok(registration) => {
                config.hosting_registered = true;
                config.hosting_provider_id = Some(registration.provider_id);
                challenges = self
                    .ctx
                    .planner
                    .challenge_records(&domain, &registration.challenges);
            }
            Err(e) => {
                if e.is_fatal() {
                    log::error!("Hosting registration for {domain} failed: {e}");
                } else {
                    log::warn!("Hosting registration for {domain} failed, try again later: {e}");
                }
                return Err(e.into());
            }
        }

        // 邮件服务
        let mut email_records = Vec::new();
        if email_enabled {
            let client = self.ctx.email_client()?;
            match client.register(&domain).await {
                Ok(sending) => {
                    config.email_provider_id = Some(sending.provider_id);
                    config.email_verified = sending.status.is_verified();
                    email_records = sending.records;
                }
                Err(e) => {
                    if e.is_fatal() {
                        log::error!("Email registration for {domain} failed: {e}");
                    } else {
                        log::warn!("Email registration for {domain} failed, try again later: {e}");
                    }
                    if existing.is_none() {
                        self.deregister_hosting(&domain).await;
                    }
                    return Err(e.into());
                }
            }
        } else if let Some(previous_id) = existing.as_ref().and_then(|c| c.email_provider_id.as_deref()) {
            // 重新接入时关闭了邮件
            self.deregister_email(previous_id).await;
        }

        config.records = plan.with_email_records(&email_records, now);
        config.replace_challenges(challenges);

        self.ctx.repository.save(&config).await?;
        log::info!(
            "Attached {domain} to tenant {tenant_id} ({:?}, email={email_enabled}, {} records)",
            config.domain_type,
            config.records.len()
        );
        Ok(config)
    }

    /// 检查租户的域名
    pub async fn reconcile(&self, tenant_id: &str) -> CoreResult<ReconcileOutcome> {
        let config = self.get_config(tenant_id).await?;
        self.reconcile_config(config).await
    }

    /// 手动重试：`error` -> `verifying` 后立即检查，其他状态等同于 [`reconcile`](Self::reconcile)
    pub async fn retry(&self, tenant_id: &str) -> CoreResult<ReconcileOutcome> {
        let mut config = self.get_config(tenant_id).await?;
        if config.status == DomainStatus::Error {
            log::info!(
                "Retrying {} for tenant {tenant_id} (was: {})",
                config.domain,
                config.error_message.as_deref().unwrap_or("-")
            );
            config.status = DomainStatus::Verifying;
            config.error_message = None;
        }
        self.reconcile_config(config).await
    }

    /// 以服务商当前状态为准更新配置
    ///
    /// - 全部必需验证通过 -> `active`（首次写入 `configured_at`）
    /// - 仍有未验证项 -> `verifying`（`active` 也会回退）
    /// - 致命错误 -> `error` 并记录 `error_message`
    /// - 瞬时错误 -> 状态不变，只更新 `last_checked_at`
    ///
    /// `error` 状态的配置只更新 `last_checked_at`，需要通过 [`retry`](Self::retry) 恢复。
    pub async fn reconcile_config(&self, mut config: DomainConfig) -> CoreResult<ReconcileOutcome> {
        let now = Utc::now();
        if config.status == DomainStatus::Error {
            log::debug!("Skipping {}: in error state, waiting for retry", config.domain);
            config.last_checked_at = Some(now);
            self.ctx.repository.save(&config).await?;
            return Ok(ReconcileOutcome {
                config,
                deferred: None,
            });
        }

        let mut next = config.clone();

        // 两个服务商依次调用，便于按服务商区分错误
        if let Err(e) = self.check_hosting(&mut next, now).await {
            return self.settle_error(config, next, e, now).await;
        }
        if next.email_enabled {
            if let Err(e) = self.check_email(&mut next, now).await {
                return self.settle_error(config, next, e, now).await;
            }
        }

        let previous = next.status;
        if next.fully_verified() {
            next.status = DomainStatus::Active;
            next.configured_at.get_or_insert(now);
            if previous != DomainStatus::Active {
                log::info!("{} is now active for tenant {}", next.domain, next.tenant_id);
            }
        } else {
            next.status = DomainStatus::Verifying;
            if previous == DomainStatus::Active {
                log::warn!(
                    "{} lost verification (hosting={}, email={}), back to verifying",
                    next.domain,
                    next.hosting_verified,
                    next.email_verified
                );
            }
        }
        next.error_message = None;
        next.last_checked_at = Some(now);
        next.updated_at = now;

        self.ctx.repository.save(&next).await?;
        Ok(ReconcileOutcome {
            config: next,
            deferred: None,
        })
    }

    /// 解除租户的域名
    ///
    /// 服务商注销失败只记录日志，配置总会被删除。
    pub async fn detach(&self, tenant_id: &str) -> CoreResult<DomainConfig> {
        let config = self.get_config(tenant_id).await?;

        if config.hosting_registered || config.hosting_provider_id.is_some() {
            self.deregister_hosting(&config.domain).await;
        }
        if let Some(provider_id) = &config.email_provider_id {
            self.deregister_email(provider_id).await;
        }

        self.ctx.repository.delete(tenant_id).await?;
        log::info!("Detached {} from tenant {tenant_id}", config.domain);
        Ok(config)
    }

    /// 检查所有到期的配置
    ///
    /// 逐个顺序检查；单个租户失败只记入报告，不会中断整轮检查。
    pub async fn reconcile_due(
        &self,
        now: DateTime<Utc>,
        policy: &ReconcilePolicy,
    ) -> CoreResult<SweepReport> {
        let candidates = self
            .ctx
            .repository
            .list_by_status(&[
                DomainStatus::Pending,
                DomainStatus::Verifying,
                DomainStatus::Active,
            ])
            .await?;

        let mut report = SweepReport::default();
        for config in candidates.into_iter().filter(|c| policy.is_due(c, now)) {
            let tenant_id = config.tenant_id.clone();
            let domain = config.domain.clone();
            let was_active = config.status == DomainStatus::Active;
            report.checked += 1;

            match self.reconcile_config(config).await {
                Ok(outcome) => {
                    if let Some(err) = outcome.deferred {
                        report.failed.push(SweepFailure {
                            tenant_id,
                            domain,
                            error: err.to_string(),
                            transient: true,
                        });
                    } else if outcome.config.status == DomainStatus::Error {
                        report.failed.push(SweepFailure {
                            tenant_id,
                            domain,
                            error: outcome.config.error_message.unwrap_or_default(),
                            transient: false,
                        });
                    } else if outcome.config.status == DomainStatus::Active && !was_active {
                        report.activated += 1;
                    }
                }
                Err(e) => {
                    log::error!("Reconciliation of {domain} for tenant {tenant_id} failed: {e}");
                    report.failed.push(SweepFailure {
                        tenant_id,
                        domain,
                        error: e.to_string(),
                        transient: e.is_transient(),
                    });
                }
            }
        }

        Ok(report)
    }

    // ===== 内部方法 =====

    /// 托管服务：必要时补注册，然后查询验证与解析状态
    async fn check_hosting(
        &self,
        config: &mut DomainConfig,
        now: DateTime<Utc>,
    ) -> Result<(), ProviderError> {
        let hosting = &self.ctx.hosting;

        if !config.hosting_registered {
            let registration = hosting.register(&config.domain).await?;
            config.hosting_registered = true;
            config.hosting_provider_id = Some(registration.provider_id);
            if !registration.challenges.is_empty() {
                let challenges = self
                    .ctx
                    .planner
                    .challenge_records(&config.domain, &registration.challenges);
                config.replace_challenges(challenges);
            }
        }

        match hosting.check_status(&config.domain).await {
            Ok(status) => {
                if !status.challenges.is_empty() {
                    let challenges = self
                        .ctx
                        .planner
                        .challenge_records(&config.domain, &status.challenges);
                    config.replace_challenges(challenges);
                }
                config.hosting_verified = status.verified && status.dns_configured;
                config.mark_web_records(status.verified, status.dns_configured, now);
                log::debug!(
                    "Hosting status for {}: verified={}, dns_configured={}, configured_by={:?}",
                    config.domain,
                    status.verified,
                    status.dns_configured,
                    status.configured_by
                );
                Ok(())
            }
            // 服务商侧已被移除：下次检查重新注册
            Err(ProviderError::DomainNotFound { .. }) => {
                log::warn!(
                    "{} is no longer registered with {}, will re-register",
                    config.domain,
                    hosting.id()
                );
                config.hosting_registered = false;
                config.hosting_verified = false;
                config.mark_web_records(false, false, now);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// 邮件服务：必要时补注册，然后触发验证并整体替换 email 记录
    async fn check_email(
        &self,
        config: &mut DomainConfig,
        now: DateTime<Utc>,
    ) -> Result<(), ProviderError> {
        let Some(client) = self.ctx.email.as_ref() else {
            log::warn!(
                "{} has email enabled but no email provider is configured",
                config.domain
            );
            config.email_verified = false;
            return Ok(());
        };

        let provider_id = match &config.email_provider_id {
            Some(id) => id.clone(),
            None => {
                let sending = client.register(&config.domain).await?;
                config.email_provider_id = Some(sending.provider_id.clone());
                sending.provider_id
            }
        };

        match client.verify(&provider_id).await {
            Ok(sending) => {
                config.email_verified = sending.status.is_verified();
                config.replace_email_records(
                    sending
                        .records
                        .iter()
                        .map(|r| DomainRecord::email(r, now))
                        .collect(),
                );
                Ok(())
            }
            Err(ProviderError::DomainNotFound { .. }) => {
                log::warn!(
                    "Sending domain {provider_id} for {} no longer exists, will re-register",
                    config.domain
                );
                config.email_provider_id = None;
                config.email_verified = false;
                for record in &mut config.records {
                    if record.purpose == RecordPurpose::Email {
                        record.mark_verified(false, now);
                    }
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// 致命错误写入 `error`；瞬时错误只在原配置上更新检查时间
    async fn settle_error(
        &self,
        original: DomainConfig,
        mut attempted: DomainConfig,
        err: ProviderError,
        now: DateTime<Utc>,
    ) -> CoreResult<ReconcileOutcome> {
        if err.is_fatal() {
            log::error!("{} moved to error: {err}", attempted.domain);
            attempted.status = DomainStatus::Error;
            attempted.error_message = Some(err.to_string());
            attempted.last_checked_at = Some(now);
            attempted.updated_at = now;
            self.ctx.repository.save(&attempted).await?;
            return Ok(ReconcileOutcome {
                config: attempted,
                deferred: None,
            });
        }

        log::warn!(
            "Check of {} deferred, status stays {}: {err}",
            original.domain,
            original.status
        );
        let mut config = original;
        config.last_checked_at = Some(now);
        self.ctx.repository.save(&config).await?;
        Ok(ReconcileOutcome {
            config,
            deferred: Some(err),
        })
    }

    async fn deregister_hosting(&self, domain: &str) {
        match self.ctx.hosting.deregister(domain).await {
            Ok(()) | Err(ProviderError::DomainNotFound { .. }) => {}
            Err(e) => log::warn!("Failed to deregister {domain} from hosting provider: {e}"),
        }
    }

    async fn deregister_email(&self, provider_id: &str) {
        let Some(client) = self.ctx.email.as_ref() else {
            log::warn!("Cannot deregister sending domain {provider_id}: no email provider configured");
            return;
        };
        match client.deregister(provider_id).await {
            Ok(()) | Err(ProviderError::DomainNotFound { .. }) => {}
            Err(e) => log::warn!("Failed to deregister sending domain {provider_id}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        create_test_service, email_domain, invalid_domain_error, timeout_error, TestHarness,
    };
    use crate::types::{
        DnsRecordType, DomainType, EmailDomainStatus, HostingRegistration, HostingStatus,
        ProviderDnsRecord,
    };
    use chrono::Duration as TimeDelta;

    fn not_found(domain: &str) -> ProviderError {
        ProviderError::DomainNotFound {
            provider: "mock".to_string(),
            domain: domain.to_string(),
            raw_message: None,
        }
    }

    // ===== attach =====

    #[tokio::test]
    async fn test_attach_subdomain_without_email() {
        let TestHarness { service, repo, .. } = create_test_service(false);

        let config = service.attach("tenant-1", "blog.example.com", false).await.unwrap();

        assert_eq!(config.domain_type, DomainType::Subdomain);
        assert_eq!(config.status, DomainStatus::Pending);
        assert!(config.hosting_registered);
        assert!(!config.hosting_verified);
        assert_eq!(config.hosting_provider_id.as_deref(), Some("blog.example.com"));
        assert_eq!(config.records.len(), 1);
        let record = &config.records[0];
        assert_eq!(record.record_type, DnsRecordType::Cname);
        assert_eq!(record.host, "blog");
        assert_eq!(record.purpose, RecordPurpose::Web);
        assert!(!record.verified);

        assert_eq!(repo.get("tenant-1").await, Some(config));
    }

    #[tokio::test]
    async fn test_attach_root_with_email_merges_records() {
        let TestHarness { service, email, .. } = create_test_service(true);

        let config = service.attach("tenant-2", "example.org", true).await.unwrap();

        assert_eq!(config.domain_type, DomainType::Root);
        assert_eq!(config.email_provider_id.as_deref(), Some("em_example.org"));
        assert_eq!(config.records.len(), 5);

        let web: Vec<_> = config.web_records().collect();
        assert_eq!(web.len(), 2);
        assert_eq!((web[0].record_type, web[0].host.as_str()), (DnsRecordType::A, "@"));
        assert_eq!((web[1].record_type, web[1].host.as_str()), (DnsRecordType::Cname, "www"));

        let mail: Vec<_> = config.email_records().collect();
        assert_eq!(mail.len(), 3);
        assert_eq!(mail.iter().filter(|r| r.record_type == DnsRecordType::Txt).count(), 2);
        assert_eq!(mail[2].host, "resend._domainkey");
        assert!(config.records.iter().all(|r| !r.verified));

        assert_eq!(email.calls().await, vec!["register:example.org".to_string()]);
    }

    #[tokio::test]
    async fn test_attach_is_idempotent() {
        let TestHarness { service, hosting, .. } = create_test_service(true);

        let first = service.attach("tenant-1", "Example.com", true).await.unwrap();
        let second = service.attach("tenant-1", "example.com.", true).await.unwrap();

        assert_eq!(first.hosting_provider_id, second.hosting_provider_id);
        assert_eq!(first.email_provider_id, second.email_provider_id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.records.len(), first.records.len());
        assert_eq!(hosting.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_reattach_through_already_exists_keeps_provider_id() {
        let TestHarness { service, hosting, .. } = create_test_service(false);
        hosting.track_project_domains().await;

        let first = service.attach("tenant-1", "shop.example.com", false).await.unwrap();
        assert_eq!(first.hosting_provider_id.as_deref(), Some("dom_1"));
        assert_eq!(hosting.already_exists_count(), 0);

        let second = service.attach("tenant-1", "shop.example.com", false).await.unwrap();
        assert_eq!(hosting.already_exists_count(), 1);
        assert!(second.hosting_registered);
        assert_eq!(second.hosting_provider_id, first.hosting_provider_id);
        assert_eq!(second.records, first.records);
        assert_eq!(second.status, DomainStatus::Pending);
    }

    #[tokio::test]
    async fn test_attach_conflicts() {
        let TestHarness { service, .. } = create_test_service(false);
        service.attach("tenant-1", "example.com", false).await.unwrap();

        let taken = service.attach("tenant-2", "example.com", false).await;
        assert!(
            matches!(taken, Err(CoreError::Conflict { ref tenant_id, .. }) if tenant_id == "tenant-1")
        );

        let other = service.attach("tenant-1", "other.com", false).await;
        assert!(
            matches!(other, Err(CoreError::Conflict { ref domain, .. }) if domain == "example.com")
        );
    }

    #[tokio::test]
    async fn test_attach_rejects_invalid_domain_before_provider_calls() {
        let TestHarness { service, hosting, repo, .. } = create_test_service(false);

        let result = service.attach("tenant-1", "not a domain", false).await;
        assert!(matches!(result, Err(CoreError::InvalidDomain { .. })));
        assert!(hosting.calls().await.is_empty());
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_attach_email_without_client() {
        let TestHarness { service, .. } = create_test_service(false);
        let result = service.attach("tenant-1", "example.com", true).await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_attach_fatal_hosting_error_saves_nothing() {
        let TestHarness { service, hosting, repo, .. } = create_test_service(false);
        hosting.set_register(Err(invalid_domain_error("example.com"))).await;

        let result = service.attach("tenant-1", "example.com", false).await;
        assert!(matches!(result, Err(CoreError::Provider(_))));
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_attach_fatal_email_error_rolls_back_hosting() {
        let TestHarness { service, hosting, email, repo } = create_test_service(true);
        email
            .set_register(Err(ProviderError::QuotaExceeded {
                provider: "mock".to_string(),
                raw_message: None,
            }))
            .await;

        let result = service.attach("tenant-1", "example.com", true).await;
        assert!(matches!(result, Err(CoreError::Provider(_))));
        assert!(hosting.calls().await.contains(&"deregister:example.com".to_string()));
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_attach_transient_hosting_error_is_surfaced() {
        let TestHarness { service, hosting, repo, .. } = create_test_service(false);
        hosting.set_register(Err(timeout_error())).await;

        let result = service.attach("tenant-1", "example.com", false).await;
        assert!(matches!(
            result,
            Err(CoreError::ProviderUnavailable(ProviderError::Timeout { .. }))
        ));
        assert_eq!(repo.save_count(), 0);
        assert!(repo.get("tenant-1").await.is_none());

        // 调用方重试即可
        hosting
            .set_register(Ok(HostingRegistration {
                provider_id: "example.com".to_string(),
                verified: false,
                challenges: Vec::new(),
            }))
            .await;
        let config = service.attach("tenant-1", "example.com", false).await.unwrap();
        assert!(config.hosting_registered);
        assert_eq!(config.status, DomainStatus::Pending);
    }

    #[tokio::test]
    async fn test_attach_transient_email_error_rolls_back_hosting() {
        let TestHarness { service, hosting, email, repo } = create_test_service(true);
        email
            .set_register(Err(ProviderError::RateLimited {
                provider: "mock".to_string(),
                retry_after: Some(30),
                raw_message: None,
            }))
            .await;

        let result = service.attach("tenant-1", "example.com", true).await;
        assert!(matches!(result, Err(CoreError::ProviderUnavailable(_))));
        assert!(hosting.calls().await.contains(&"deregister:example.com".to_string()));
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_reattach_email_error_keeps_hosting_and_stored_config() {
        let TestHarness { service, hosting, email, repo } = create_test_service(true);
        let first = service.attach("tenant-1", "example.com", true).await.unwrap();
        email.set_register(Err(timeout_error())).await;

        let result = service.attach("tenant-1", "example.com", true).await;
        assert!(matches!(result, Err(CoreError::ProviderUnavailable(_))));
        assert!(!hosting.calls().await.contains(&"deregister:example.com".to_string()));
        assert_eq!(repo.get("tenant-1").await, Some(first));
    }

    #[tokio::test]
    async fn test_attach_stores_hosting_challenges() {
        let TestHarness { service, hosting, .. } = create_test_service(false);
        hosting
            .set_register(Ok(HostingRegistration {
                provider_id: "blog.example.com".to_string(),
                verified: false,
                challenges: vec![ProviderDnsRecord {
                    record_type: DnsRecordType::Txt,
                    name: "_vercel.example.com".to_string(),
                    value: "vc-domain-verify=blog.example.com,abc".to_string(),
                    priority: None,
                    verified: false,
                }],
            }))
            .await;

        let config = service.attach("tenant-1", "blog.example.com", false).await.unwrap();
        assert_eq!(config.records.len(), 2);
        assert!(config.records[1].is_challenge());
        assert_eq!(config.records[1].host, "_vercel");
    }

    #[tokio::test]
    async fn test_reattach_without_email_deregisters_sending_domain() {
        let TestHarness { service, email, .. } = create_test_service(true);
        service.attach("tenant-1", "example.com", true).await.unwrap();

        let config = service.attach("tenant-1", "example.com", false).await.unwrap();
        assert!(!config.email_enabled);
        assert!(config.email_provider_id.is_none());
        assert_eq!(config.email_records().count(), 0);
        assert!(email.calls().await.contains(&"deregister:em_example.com".to_string()));
    }

    // ===== reconcile =====

    #[tokio::test]
    async fn test_reconcile_all_verified_activates_in_one_step() {
        let TestHarness { service, hosting, email, .. } = create_test_service(true);
        service.attach("tenant-1", "example.org", true).await.unwrap();
        hosting.set_verified(true).await;
        email.set_verified(true).await;

        let outcome = service.reconcile("tenant-1").await.unwrap();
        let config = outcome.config;

        assert!(outcome.deferred.is_none());
        assert_eq!(config.status, DomainStatus::Active);
        assert!(config.hosting_verified);
        assert!(config.email_verified);
        assert!(config.configured_at.is_some());
        assert!(config.last_checked_at.is_some());
        assert!(config.records.iter().all(|r| r.verified && r.verified_at.is_some()));
    }

    #[tokio::test]
    async fn test_reconcile_unverified_moves_to_verifying_and_never_back_to_pending() {
        let TestHarness { service, .. } = create_test_service(true);
        service.attach("tenant-1", "example.org", true).await.unwrap();

        for _ in 0..3 {
            let outcome = service.reconcile("tenant-1").await.unwrap();
            assert_eq!(outcome.config.status, DomainStatus::Verifying);
            assert!(outcome.config.configured_at.is_none());
        }
    }

    #[tokio::test]
    async fn test_reconcile_requires_dns_configured_for_hosting() {
        let TestHarness { service, hosting, .. } = create_test_service(false);
        service.attach("tenant-1", "example.com", false).await.unwrap();
        hosting
            .set_status(Ok(HostingStatus {
                verified: true,
                dns_configured: false,
                configured_by: None,
                challenges: Vec::new(),
            }))
            .await;

        let config = service.reconcile("tenant-1").await.unwrap().config;
        assert!(!config.hosting_verified);
        assert_eq!(config.status, DomainStatus::Verifying);
    }

    #[tokio::test]
    async fn test_active_regresses_to_verifying_and_keeps_configured_at() {
        let TestHarness { service, hosting, .. } = create_test_service(false);
        service.attach("tenant-1", "example.com", false).await.unwrap();
        hosting.set_verified(true).await;
        let active = service.reconcile("tenant-1").await.unwrap().config;
        assert_eq!(active.status, DomainStatus::Active);

        hosting.set_verified(false).await;
        let regressed = service.reconcile("tenant-1").await.unwrap().config;
        assert_eq!(regressed.status, DomainStatus::Verifying);
        assert_eq!(regressed.configured_at, active.configured_at);
        assert!(regressed.web_records().all(|r| !r.verified));

        hosting.set_verified(true).await;
        let again = service.reconcile("tenant-1").await.unwrap().config;
        assert_eq!(again.status, DomainStatus::Active);
        assert_eq!(again.configured_at, active.configured_at);
    }

    #[tokio::test]
    async fn test_transient_error_leaves_status_unchanged() {
        let TestHarness { service, hosting, repo, .. } = create_test_service(false);
        service.attach("tenant-1", "example.com", false).await.unwrap();
        hosting.set_status(Err(timeout_error())).await;

        let outcome = service.reconcile("tenant-1").await.unwrap();
        assert!(matches!(outcome.deferred, Some(ProviderError::Timeout { .. })));
        assert_eq!(outcome.config.status, DomainStatus::Pending);
        assert!(outcome.config.error_message.is_none());
        assert!(outcome.config.last_checked_at.is_some());

        let stored = repo.get("tenant-1").await.unwrap();
        assert_eq!(stored.status, DomainStatus::Pending);
        assert_eq!(stored.last_checked_at, outcome.config.last_checked_at);
    }

    #[tokio::test]
    async fn test_transient_email_error_discards_hosting_updates() {
        let TestHarness { service, hosting, email, .. } = create_test_service(true);
        service.attach("tenant-1", "example.org", true).await.unwrap();
        hosting.set_verified(true).await;
        email
            .set_verify(Err(ProviderError::NetworkError {
                provider: "mock".to_string(),
                detail: "502 Bad Gateway".to_string(),
            }))
            .await;

        let outcome = service.reconcile("tenant-1").await.unwrap();
        assert!(outcome.deferred.is_some());
        assert_eq!(outcome.config.status, DomainStatus::Pending);
        assert!(!outcome.config.hosting_verified);
    }

    #[tokio::test]
    async fn test_fatal_error_moves_to_error_and_retry_recovers() {
        let TestHarness { service, hosting, repo, .. } = create_test_service(false);
        service.attach("tenant-1", "example.com", false).await.unwrap();
        hosting.set_status(Err(invalid_domain_error("example.com"))).await;

        let failed = service.reconcile("tenant-1").await.unwrap().config;
        assert_eq!(failed.status, DomainStatus::Error);
        assert!(failed.error_message.as_deref().unwrap_or_default().contains("Invalid domain"));

        // error 状态不会被普通检查改变，只记录检查时间
        hosting.set_verified(true).await;
        let untouched = service.reconcile("tenant-1").await.unwrap().config;
        assert_eq!(untouched.status, DomainStatus::Error);
        assert_eq!(untouched.error_message, failed.error_message);
        assert!(untouched.last_checked_at >= failed.last_checked_at);
        assert_eq!(repo.get("tenant-1").await.unwrap().last_checked_at, untouched.last_checked_at);

        let recovered = service.retry("tenant-1").await.unwrap().config;
        assert_eq!(recovered.status, DomainStatus::Active);
        assert!(recovered.error_message.is_none());
    }

    #[tokio::test]
    async fn test_retry_with_transient_error_stays_verifying() {
        let TestHarness { service, hosting, repo, .. } = create_test_service(false);
        service.attach("tenant-1", "example.com", false).await.unwrap();
        hosting.set_status(Err(invalid_domain_error("example.com"))).await;
        service.reconcile("tenant-1").await.unwrap();

        hosting.set_status(Err(timeout_error())).await;
        let outcome = service.retry("tenant-1").await.unwrap();
        assert!(outcome.deferred.is_some());
        assert_eq!(outcome.config.status, DomainStatus::Verifying);
        assert!(outcome.config.error_message.is_none());
        assert_eq!(repo.get("tenant-1").await.unwrap().status, DomainStatus::Verifying);
    }

    #[tokio::test]
    async fn test_hosting_domain_removed_clears_registration() {
        let TestHarness { service, hosting, .. } = create_test_service(false);
        service.attach("tenant-1", "example.com", false).await.unwrap();
        hosting.set_verified(true).await;
        service.reconcile("tenant-1").await.unwrap();

        hosting.set_status(Err(not_found("example.com"))).await;
        let outcome = service.reconcile("tenant-1").await.unwrap();
        assert!(outcome.deferred.is_none());
        assert!(!outcome.config.hosting_registered);
        assert!(!outcome.config.hosting_verified);
        assert_eq!(outcome.config.status, DomainStatus::Verifying);

        // 下一次检查重新注册
        hosting.set_verified(true).await;
        let config = service.reconcile("tenant-1").await.unwrap().config;
        assert!(config.hosting_registered);
        assert_eq!(config.status, DomainStatus::Active);
        let registers = hosting
            .calls()
            .await
            .iter()
            .filter(|c| c.starts_with("register:"))
            .count();
        assert_eq!(registers, 2);
    }

    #[tokio::test]
    async fn test_email_records_replaced_wholesale() {
        let TestHarness { service, hosting, email, .. } = create_test_service(true);
        service.attach("tenant-1", "example.org", true).await.unwrap();
        hosting.set_verified(true).await;

        let mut refreshed = email_domain("em_example.org", "example.org", EmailDomainStatus::PartiallyVerified, false);
        refreshed.records.truncate(1);
        refreshed.records[0].verified = true;
        email.set_verify(Ok(refreshed)).await;

        let config = service.reconcile("tenant-1").await.unwrap().config;
        let mail: Vec<_> = config.email_records().collect();
        assert_eq!(mail.len(), 1);
        assert!(mail[0].verified);
        assert!(!config.email_verified);
        assert_eq!(config.status, DomainStatus::Verifying);
        assert_eq!(config.web_records().count(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_unknown_tenant() {
        let TestHarness { service, .. } = create_test_service(false);
        assert!(matches!(
            service.reconcile("nobody").await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reconcile_storage_error_propagates() {
        let TestHarness { service, repo, .. } = create_test_service(false);
        service.attach("tenant-1", "example.com", false).await.unwrap();
        repo.set_save_error(Some("disk full".to_string())).await;

        let result = service.reconcile("tenant-1").await;
        assert!(matches!(result, Err(CoreError::StorageError(_))));
        assert_eq!(repo.get("tenant-1").await.unwrap().status, DomainStatus::Pending);
    }

    // ===== detach =====

    #[tokio::test]
    async fn test_detach_is_best_effort() {
        let TestHarness { service, hosting, email, repo } = create_test_service(true);
        service.attach("tenant-1", "example.org", true).await.unwrap();
        hosting.set_deregister_error(Some(timeout_error())).await;
        email.set_deregister_error(Some(timeout_error())).await;

        let removed = service.detach("tenant-1").await.unwrap();
        assert_eq!(removed.domain, "example.org");
        assert!(repo.get("tenant-1").await.is_none());
        assert!(hosting.calls().await.contains(&"deregister:example.org".to_string()));
        assert!(email.calls().await.contains(&"deregister:em_example.org".to_string()));

        // 域名可以被其他租户接入
        service.attach("tenant-2", "example.org", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_detach_unknown_tenant() {
        let TestHarness { service, .. } = create_test_service(false);
        assert!(matches!(service.detach("nobody").await, Err(CoreError::NotFound(_))));
    }

    // ===== reconcile_due =====

    #[test]
    fn test_policy_due_rules() {
        let policy = ReconcilePolicy::default();
        let now = Utc::now();
        let mut config = DomainConfig::new("t", "example.com", DomainType::Root, false, now);

        assert!(policy.is_due(&config, now));

        config.last_checked_at = Some(now - TimeDelta::minutes(4));
        assert!(!policy.is_due(&config, now));
        config.last_checked_at = Some(now - TimeDelta::minutes(5));
        assert!(policy.is_due(&config, now));

        config.status = DomainStatus::Active;
        assert!(!policy.is_due(&config, now));
        config.last_checked_at = Some(now - TimeDelta::hours(7));
        assert!(policy.is_due(&config, now));

        config.status = DomainStatus::Error;
        config.last_checked_at = None;
        assert!(!policy.is_due(&config, now));
    }

    #[tokio::test]
    async fn test_reconcile_due_reports_per_tenant() {
        let TestHarness { service, hosting, repo, .. } = create_test_service(false);
        service.attach("tenant-a", "a.example.com", false).await.unwrap();
        service.attach("tenant-b", "b.example.com", false).await.unwrap();

        // 已失败的配置不参与定期检查
        let mut failed = DomainConfig::new("tenant-c", "c.example.com", DomainType::Subdomain, false, Utc::now());
        failed.status = DomainStatus::Error;
        repo.insert(failed).await;

        hosting.set_verified(true).await;
        let report = service
            .reconcile_due(Utc::now(), &ReconcilePolicy::default())
            .await
            .unwrap();
        assert_eq!(report.checked, 2);
        assert_eq!(report.activated, 2);
        assert!(report.failed.is_empty());

        // 刚检查过的配置不会再次到期
        let report = service
            .reconcile_due(Utc::now(), &ReconcilePolicy::default())
            .await
            .unwrap();
        assert_eq!(report.checked, 0);

        // 漂移检查：瞬时错误记入报告但不中断
        hosting.set_status(Err(timeout_error())).await;
        let later = Utc::now() + TimeDelta::hours(7);
        let report = service
            .reconcile_due(later, &ReconcilePolicy::default())
            .await
            .unwrap();
        assert_eq!(report.checked, 2);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed.iter().all(|f| f.transient));
        assert_eq!(repo.get("tenant-a").await.unwrap().status, DomainStatus::Active);
    }
}
