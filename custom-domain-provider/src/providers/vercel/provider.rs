//! Vercel HostingDomainClient trait 实现

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::providers::common::normalize_domain_name;
use crate::traits::{ErrorContext, HostingDomainClient, ProviderErrorMapper};
use crate::types::{DnsRecordType, HostingRegistration, HostingStatus, ProviderDnsRecord};

use super::types::VercelVerification;
use super::{AddDomainBody, VercelClient, VercelDomainConfig, VercelProjectDomain};

impl VercelClient {
    fn project_domain_path(&self, domain: &str) -> String {
        format!(
            "/v9/projects/{}/domains/{}",
            urlencoding::encode(&self.config.project_id),
            urlencoding::encode(domain)
        )
    }

    /// 将 Vercel 验证挑战转换为统一 DNS 记录（名称保持完整域名）
    pub(crate) fn challenges(
        &self,
        verification: Option<Vec<VercelVerification>>,
    ) -> Result<Vec<ProviderDnsRecord>> {
        verification
            .unwrap_or_default()
            .into_iter()
            .map(|v| {
                Ok(ProviderDnsRecord {
                    record_type: DnsRecordType::parse(&v.record_type, self.provider_name())?,
                    name: normalize_domain_name(&v.domain),
                    value: v.value,
                    priority: None,
                    verified: false,
                })
            })
            .collect()
    }
}

#[async_trait]
impl HostingDomainClient for VercelClient {
    fn id(&self) -> &'static str {
        "vercel"
    }

    async fn register(&self, domain: &str) -> Result<HostingRegistration> {
        let path = format!(
            "/v10/projects/{}/domains",
            urlencoding::encode(&self.config.project_id)
        );
        let result: Result<VercelProjectDomain> = self
            .post(&path, &AddDomainBody { name: domain }, ErrorContext::domain(domain))
            .await;

        match result {
            Ok(created) => {
                log::info!(
                    "[vercel] Attached {} to project (verified={})",
                    created.name,
                    created.verified
                );
                Ok(HostingRegistration {
                    provider_id: created.name,
                    verified: created.verified,
                    challenges: self.challenges(created.verification)?,
                })
            }
            // 已挂载到本项目：视为成功，验证状态留给下一次检查
            Err(ProviderError::DomainExists { .. }) => {
                log::info!("[vercel] {domain} already attached to project");
                Ok(HostingRegistration {
                    provider_id: domain.to_string(),
                    verified: false,
                    challenges: Vec::new(),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn deregister(&self, domain: &str) -> Result<()> {
        self.delete(&self.project_domain_path(domain), ErrorContext::domain(domain))
            .await?;
        log::info!("[vercel] Detached {domain} from project");
        Ok(())
    }

    async fn check_status(&self, domain: &str) -> Result<HostingStatus> {
        let project_domain: VercelProjectDomain = self
            .get(&self.project_domain_path(domain), ErrorContext::domain(domain))
            .await?;

        let config_path = format!("/v6/domains/{}/config", urlencoding::encode(domain));
        let config: VercelDomainConfig = self
            .get(&config_path, ErrorContext::domain(domain))
            .await?;

        Ok(HostingStatus {
            verified: project_domain.verified,
            dns_configured: !config.misconfigured,
            configured_by: config.configured_by,
            challenges: self.challenges(project_domain.verification)?,
        })
    }
}
