//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use custom_domain_provider::{
    DnsRecordType, EmailDomain, EmailDomainClient, EmailDomainStatus, HostingDomainClient,
    HostingRegistration, HostingStatus, ProviderDnsRecord, ProviderError,
};
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::services::{DomainProvisioningService, ServiceContext, WebTarget};
use crate::traits::DomainConfigRepository;
use crate::types::{DomainConfig, DomainStatus};

type ProviderResult<T> = custom_domain_provider::Result<T>;

// ===== MockDomainConfigRepository =====

pub struct MockDomainConfigRepository {
    configs: RwLock<HashMap<String, DomainConfig>>,
    /// 如果 Some，save 时返回此错误
    save_error: RwLock<Option<String>>,
    saves: AtomicUsize,
}

impl MockDomainConfigRepository {
    pub fn new() -> Self {
        Self {
            configs: RwLock::new(HashMap::new()),
            save_error: RwLock::new(None),
            saves: AtomicUsize::new(0),
        }
    }

    pub async fn set_save_error(&self, err: Option<String>) {
        *self.save_error.write().await = err;
    }

    /// 成功写入次数
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn get(&self, tenant_id: &str) -> Option<DomainConfig> {
        self.configs.read().await.get(tenant_id).cloned()
    }

    /// 直接写入，不计入 `save_count`
    pub async fn insert(&self, config: DomainConfig) {
        self.configs
            .write()
            .await
            .insert(config.tenant_id.clone(), config);
    }
}

#[async_trait]
impl DomainConfigRepository for MockDomainConfigRepository {
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
        if let Some(ref msg) = *self.save_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        let mut store = self.configs.write().await;
        if let Some(owner) = store
            .values()
            .find(|c| c.domain == config.domain && c.tenant_id != config.tenant_id)
        {
            return Err(CoreError::Conflict {
                domain: config.domain.clone(),
                tenant_id: owner.tenant_id.clone(),
            });
        }
        store.insert(config.tenant_id.clone(), config.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, tenant_id: &str) -> CoreResult<()> {
        self.configs.write().await.remove(tenant_id);
        Ok(())
    }
}

// ===== MockHostingClient =====

/// 可编程的托管服务 mock，未设置时 register 成功、status 未验证
pub struct MockHostingClient {
    register_result: RwLock<Option<ProviderResult<HostingRegistration>>>,
    /// 开启后按项目记录已挂载的域名，重复注册走“已存在”分支
    project: RwLock<Option<HashMap<String, String>>>,
    already_exists: AtomicUsize,
    status_result: RwLock<Option<ProviderResult<HostingStatus>>>,
    deregister_error: RwLock<Option<ProviderError>>,
    calls: RwLock<Vec<String>>,
}

impl MockHostingClient {
    pub fn new() -> Self {
        Self {
            register_result: RwLock::new(None),
            project: RwLock::new(None),
            already_exists: AtomicUsize::new(0),
            status_result: RwLock::new(None),
            deregister_error: RwLock::new(None),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// 模拟真实项目：首次注册分配 ID，再次注册返回已挂载的域名
    pub async fn track_project_domains(&self) {
        *self.project.write().await = Some(HashMap::new());
    }

    /// 走“已存在即成功”分支的注册次数
    pub fn already_exists_count(&self) -> usize {
        self.already_exists.load(Ordering::SeqCst)
    }

    pub async fn set_register(&self, result: ProviderResult<HostingRegistration>) {
        *self.register_result.write().await = Some(result);
    }

    pub async fn set_status(&self, result: ProviderResult<HostingStatus>) {
        *self.status_result.write().await = Some(result);
    }

    /// 设置为已验证且 DNS 已配置
    pub async fn set_verified(&self, verified: bool) {
        self.set_status(Ok(HostingStatus {
            verified,
            dns_configured: verified,
            configured_by: verified.then(|| "CNAME".to_string()),
            challenges: Vec::new(),
        }))
        .await;
    }

    pub async fn set_deregister_error(&self, err: Option<ProviderError>) {
        *self.deregister_error.write().await = err;
    }

    /// 调用记录，格式 `method:domain`
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    async fn record(&self, call: String) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl HostingDomainClient for MockHostingClient {
    fn id(&self) -> &'static str {
        "mock-hosting"
    }

    async fn register(&self, domain: &str) -> ProviderResult<HostingRegistration> {
        self.record(format!("register:{domain}")).await;
        if let Some(project) = self.project.write().await.as_mut() {
            if let Some(id) = project.get(domain) {
                self.already_exists.fetch_add(1, Ordering::SeqCst);
                return Ok(HostingRegistration {
                    provider_id: id.clone(),
                    verified: false,
                    challenges: Vec::new(),
                });
            }
            let id = format!("dom_{}", project.len() + 1);
            project.insert(domain.to_string(), id.clone());
            return Ok(HostingRegistration {
                provider_id: id,
                verified: false,
                challenges: Vec::new(),
            });
        }
        match &*self.register_result.read().await {
            Some(result) => result.clone(),
            None => Ok(HostingRegistration {
                provider_id: domain.to_string(),
                verified: false,
                challenges: Vec::new(),
            }),
        }
    }

    async fn deregister(&self, domain: &str) -> ProviderResult<()> {
        self.record(format!("deregister:{domain}")).await;
        if let Some(err) = &*self.deregister_error.read().await {
            return Err(err.clone());
        }
        if let Some(project) = self.project.write().await.as_mut() {
            project.remove(domain);
        }
        Ok(())
    }

    async fn check_status(&self, domain: &str) -> ProviderResult<HostingStatus> {
        self.record(format!("check_status:{domain}")).await;
        match &*self.status_result.read().await {
            Some(result) => result.clone(),
            None => Ok(HostingStatus {
                verified: false,
                dns_configured: false,
                configured_by: None,
                challenges: Vec::new(),
            }),
        }
    }
}

// ===== MockEmailClient =====

/// 可编程的邮件服务 mock，默认返回两条 TXT 和一条 CNAME
pub struct MockEmailClient {
    register_result: RwLock<Option<ProviderResult<EmailDomain>>>,
    verify_result: RwLock<Option<ProviderResult<EmailDomain>>>,
    deregister_error: RwLock<Option<ProviderError>>,
    calls: RwLock<Vec<String>>,
}

impl MockEmailClient {
    pub fn new() -> Self {
        Self {
            register_result: RwLock::new(None),
            verify_result: RwLock::new(None),
            deregister_error: RwLock::new(None),
            calls: RwLock::new(Vec::new()),
        }
    }

    pub async fn set_register(&self, result: ProviderResult<EmailDomain>) {
        *self.register_result.write().await = Some(result);
    }

    pub async fn set_verify(&self, result: ProviderResult<EmailDomain>) {
        *self.verify_result.write().await = Some(result);
    }

    /// verify 返回整体验证状态，记录标记与之一致
    pub async fn set_verified(&self, verified: bool) {
        let status = if verified {
            EmailDomainStatus::Verified
        } else {
            EmailDomainStatus::Pending
        };
        self.set_verify(Ok(email_domain("em_mock", "mock", status, verified)))
            .await;
    }

    pub async fn set_deregister_error(&self, err: Option<ProviderError>) {
        *self.deregister_error.write().await = err;
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    async fn record(&self, call: String) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl EmailDomainClient for MockEmailClient {
    fn id(&self) -> &'static str {
        "mock-email"
    }

    async fn register(&self, domain: &str) -> ProviderResult<EmailDomain> {
        self.record(format!("register:{domain}")).await;
        match &*self.register_result.read().await {
            Some(result) => result.clone(),
            None => Ok(email_domain(
                &format!("em_{domain}"),
                domain,
                EmailDomainStatus::NotStarted,
                false,
            )),
        }
    }

    async fn lookup(&self, domain: &str) -> ProviderResult<EmailDomain> {
        self.record(format!("lookup:{domain}")).await;
        Ok(email_domain(
            &format!("em_{domain}"),
            domain,
            EmailDomainStatus::NotStarted,
            false,
        ))
    }

    async fn verify(&self, provider_id: &str) -> ProviderResult<EmailDomain> {
        self.record(format!("verify:{provider_id}")).await;
        match &*self.verify_result.read().await {
            Some(result) => result.clone(),
            None => Ok(email_domain(
                provider_id,
                "mock",
                EmailDomainStatus::Pending,
                false,
            )),
        }
    }

    async fn deregister(&self, provider_id: &str) -> ProviderResult<()> {
        self.record(format!("deregister:{provider_id}")).await;
        match &*self.deregister_error.read().await {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

// ===== 工厂方法 =====

/// 邮件服务商返回的记录：SPF、DMARC（TXT）与 DKIM（CNAME）
pub fn email_records(verified: bool) -> Vec<ProviderDnsRecord> {
    vec![
        ProviderDnsRecord {
            record_type: DnsRecordType::Txt,
            name: "send".to_string(),
            value: "v=spf1 include:amazonses.com ~all".to_string(),
            priority: None,
            verified,
        },
        ProviderDnsRecord {
            record_type: DnsRecordType::Txt,
            name: "_dmarc".to_string(),
            value: "v=DMARC1; p=none;".to_string(),
            priority: None,
            verified,
        },
        ProviderDnsRecord {
            record_type: DnsRecordType::Cname,
            name: "resend._domainkey".to_string(),
            value: "resend._domainkey.amazonses.com".to_string(),
            priority: None,
            verified,
        },
    ]
}

pub fn email_domain(
    provider_id: &str,
    name: &str,
    status: EmailDomainStatus,
    verified: bool,
) -> EmailDomain {
    EmailDomain {
        provider_id: provider_id.to_string(),
        name: name.to_string(),
        status,
        records: email_records(verified),
        created_at: None,
    }
}

pub fn timeout_error() -> ProviderError {
    ProviderError::Timeout {
        provider: "mock".to_string(),
        detail: "request timed out".to_string(),
    }
}

pub fn invalid_domain_error(domain: &str) -> ProviderError {
    ProviderError::InvalidDomain {
        provider: "mock".to_string(),
        domain: domain.to_string(),
        raw_message: Some("The domain name is invalid".to_string()),
    }
}

pub struct TestHarness {
    pub service: DomainProvisioningService,
    pub repo: Arc<MockDomainConfigRepository>,
    pub hosting: Arc<MockHostingClient>,
    pub email: Arc<MockEmailClient>,
}

/// 创建测试用 `DomainProvisioningService`
pub fn create_test_service(with_email: bool) -> TestHarness {
    let repo = Arc::new(MockDomainConfigRepository::new());
    let hosting = Arc::new(MockHostingClient::new());
    let email = Arc::new(MockEmailClient::new());

    let email_client: Option<Arc<dyn EmailDomainClient>> = if with_email {
        Some(email.clone())
    } else {
        None
    };
    let ctx = Arc::new(ServiceContext::new(
        repo.clone(),
        hosting.clone(),
        email_client,
        WebTarget::default(),
    ));

    TestHarness {
        service: DomainProvisioningService::new(ctx),
        repo,
        hosting,
        email,
    }
}
