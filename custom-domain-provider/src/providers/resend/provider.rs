//! Resend EmailDomainClient trait 实现

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::providers::common::{normalize_domain_name, with_query};
use crate::traits::{EmailDomainClient, ErrorContext, ProviderErrorMapper};
use crate::types::{DnsRecordType, EmailDomain, EmailDomainStatus, ProviderDnsRecord};

use super::{
    CreateDomainBody, ResendClient, ResendDomain, ResendDomainList, ResendRecord,
    ResendVerifyResponse,
};

/// `GET /domains` 每页数量（API 上限）
const LIST_PAGE_SIZE: &str = "100";

impl ResendClient {
    fn list_path(after: Option<&str>) -> String {
        with_query("/domains", &[("limit", Some(LIST_PAGE_SIZE)), ("after", after)])
    }

    /// 状态字符串 -> 统一状态（未知值归为 `Unknown`）
    fn parse_status(status: &str) -> EmailDomainStatus {
        serde_json::from_value(serde_json::Value::String(status.to_string()))
            .unwrap_or(EmailDomainStatus::Unknown)
    }

    fn convert_record(&self, record: ResendRecord) -> Result<ProviderDnsRecord> {
        Ok(ProviderDnsRecord {
            record_type: DnsRecordType::parse(&record.record_type, self.provider_name())?,
            name: record.name,
            value: record.value,
            priority: record.priority,
            verified: record.status.as_deref() == Some("verified"),
        })
    }

    /// 将 Resend 域名转换为 `EmailDomain`
    pub(crate) fn convert_domain(&self, domain: ResendDomain) -> Result<EmailDomain> {
        let records = domain
            .records
            .into_iter()
            .map(|r| self.convert_record(r))
            .collect::<Result<Vec<_>>>()?;

        Ok(EmailDomain {
            provider_id: domain.id,
            name: domain.name,
            status: Self::parse_status(&domain.status),
            records,
            created_at: domain.created_at,
        })
    }

    async fn get_domain(&self, provider_id: &str) -> Result<EmailDomain> {
        let domain: ResendDomain = self
            .get(
                &format!("/domains/{}", urlencoding::encode(provider_id)),
                ErrorContext::domain(provider_id),
            )
            .await?;
        self.convert_domain(domain)
    }
}

#[async_trait]
impl EmailDomainClient for ResendClient {
    fn id(&self) -> &'static str {
        "resend"
    }

    async fn register(&self, domain: &str) -> Result<EmailDomain> {
        let body = CreateDomainBody {
            name: domain,
            region: self.config.region.as_deref(),
        };
        let result: Result<ResendDomain> = self
            .post("/domains", &body, ErrorContext::domain(domain))
            .await;

        match result {
            Ok(created) => {
                log::info!(
                    "[resend] Created sending domain {} ({} records)",
                    created.name,
                    created.records.len()
                );
                self.convert_domain(created)
            }
            Err(ProviderError::DomainExists { .. }) => {
                log::info!("[resend] {domain} already exists, looking it up");
                self.lookup(domain).await
            }
            Err(e) => Err(e),
        }
    }

    async fn lookup(&self, domain: &str) -> Result<EmailDomain> {
        let wanted = normalize_domain_name(domain);
        let mut after: Option<String> = None;

        loop {
            let page: ResendDomainList = self
                .get(&Self::list_path(after.as_deref()), ErrorContext::domain(domain))
                .await?;

            if let Some(found) = page
                .data
                .iter()
                .find(|d| normalize_domain_name(&d.name) == wanted)
            {
                // 列表不含记录，按 ID 取详情
                return self.get_domain(&found.id).await;
            }

            match page.next_cursor() {
                Some(next) if after.as_deref() != Some(next) => after = Some(next.to_string()),
                _ => break,
            }
        }

        Err(ProviderError::DomainNotFound {
            provider: self.provider_name().to_string(),
            domain: domain.to_string(),
            raw_message: None,
        })
    }

    async fn verify(&self, provider_id: &str) -> Result<EmailDomain> {
        let path = format!("/domains/{}/verify", urlencoding::encode(provider_id));
        let response: ResendVerifyResponse = self
            .post(&path, &serde_json::json!({}), ErrorContext::domain(provider_id))
            .await?;
        log::debug!("[resend] Verification triggered for {}", response.id);

        self.get_domain(provider_id).await
    }

    async fn deregister(&self, provider_id: &str) -> Result<()> {
        self.delete(
            &format!("/domains/{}", urlencoding::encode(provider_id)),
            ErrorContext::domain(provider_id),
        )
        .await?;
        log::info!("[resend] Deleted sending domain {provider_id}");
        Ok(())
    }
}
