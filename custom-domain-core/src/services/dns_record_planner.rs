//! DNS 记录规划
//!
//! 纯函数：根据域名结构计算租户需要发布的 web 记录，并把邮件服务商返回的
//! 记录原样合并进来。不访问网络，不返回错误（输入须已通过 `validate_domain`）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use custom_domain_provider::{DnsRecordType, ProviderDnsRecord};

use crate::types::{DomainRecord, DomainType};

/// 默认 apex A 记录目标（托管服务的 anycast IP）
pub const DEFAULT_APEX_IP: &str = "76.76.21.21";
/// 默认 CNAME 目标（托管服务的边缘主机名）
pub const DEFAULT_EDGE_HOSTNAME: &str = "cname.vercel-dns.com";

/// 视为一个整体的多段公共后缀
const MULTI_PART_SUFFIXES: &[&str] = &[
    // 日本
    "co.jp", "ne.jp", "or.jp", "ac.jp", "go.jp", "ad.jp", "ed.jp", "gr.jp", "lg.jp",
    // 英国
    "co.uk", "org.uk", "me.uk", "ac.uk", "gov.uk", "ltd.uk", "plc.uk",
    // 其他常见
    "com.au", "net.au", "org.au", "co.nz", "org.nz", "com.br", "com.cn", "net.cn", "org.cn",
    "com.hk", "com.tw", "co.kr", "co.in", "com.sg", "com.mx", "co.za",
];

/// 托管服务的静态 DNS 目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebTarget {
    pub apex_ip: String,
    pub edge_hostname: String,
}

impl Default for WebTarget {
    fn default() -> Self {
        Self {
            apex_ip: DEFAULT_APEX_IP.to_string(),
            edge_hostname: DEFAULT_EDGE_HOSTNAME.to_string(),
        }
    }
}

/// 规划结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPlan {
    pub domain_type: DomainType,
    /// web 记录，email 记录需通过 [`with_email_records`](Self::with_email_records) 合并
    pub records: Vec<DomainRecord>,
    email_enabled: bool,
}

impl RecordPlan {
    /// 合并邮件服务商返回的记录（打上 `email` 标签，内容不做任何修改）
    ///
    /// 未启用邮件时忽略传入的记录。
    #[must_use]
    pub fn with_email_records(
        mut self,
        email_records: &[ProviderDnsRecord],
        now: DateTime<Utc>,
    ) -> Vec<DomainRecord> {
        if self.email_enabled {
            self.records
                .extend(email_records.iter().map(|r| DomainRecord::email(r, now)));
        }
        self.records
    }
}

/// DNS 记录规划器
#[derive(Debug, Clone, Default)]
pub struct DnsRecordPlanner {
    target: WebTarget,
}

impl DnsRecordPlanner {
    #[must_use]
    pub fn new(target: WebTarget) -> Self {
        Self { target }
    }

    #[must_use]
    pub fn target(&self) -> &WebTarget {
        &self.target
    }

    /// 计算域名类型与 web 记录
    #[must_use]
    pub fn plan(&self, domain: &str, email_enabled: bool) -> RecordPlan {
        let domain_type = classify(domain);
        let records = match domain_type {
            DomainType::Root => vec![
                DomainRecord::web(DnsRecordType::A, "@", &self.target.apex_ip),
                DomainRecord::web(DnsRecordType::Cname, "www", &self.target.edge_hostname),
            ],
            DomainType::Subdomain => {
                let label = domain.split('.').next().unwrap_or(domain);
                vec![DomainRecord::web(
                    DnsRecordType::Cname,
                    label,
                    &self.target.edge_hostname,
                )]
            }
        };

        RecordPlan {
            domain_type,
            records,
            email_enabled,
        }
    }

    /// 将托管服务的归属验证挑战转换为 web TXT 记录
    ///
    /// 挑战名称为完整域名，转换为相对租户 zone 的主机名。
    #[must_use]
    pub fn challenge_records(&self, domain: &str, challenges: &[ProviderDnsRecord]) -> Vec<DomainRecord> {
        let zone = registrable_domain(domain);
        challenges
            .iter()
            .map(|c| {
                let mut record =
                    DomainRecord::web(c.record_type, relative_host(&c.name, zone), &c.value);
                record.priority = c.priority;
                record
            })
            .collect()
    }
}

/// 判断域名是否为顶级域名
#[must_use]
pub fn classify(domain: &str) -> DomainType {
    let labels = domain.split('.').count();
    let suffix_labels = if has_multi_part_suffix(domain) { 2 } else { 1 };
    if labels <= suffix_labels + 1 {
        DomainType::Root
    } else {
        DomainType::Subdomain
    }
}

fn has_multi_part_suffix(domain: &str) -> bool {
    let mut labels = domain.rsplit('.');
    match (labels.next(), labels.next()) {
        (Some(tld), Some(sld)) => MULTI_PART_SUFFIXES.contains(&format!("{sld}.{tld}").as_str()),
        _ => false,
    }
}

/// 租户在注册商处管理的 zone（可注册域名）
#[must_use]
pub fn registrable_domain(domain: &str) -> &str {
    let keep = if has_multi_part_suffix(domain) { 3 } else { 2 };
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() <= keep {
        return domain;
    }
    let skip: usize = labels[..labels.len() - keep].iter().map(|l| l.len() + 1).sum();
    &domain[skip..]
}

/// 完整域名 -> 相对 zone 的主机名（zone 本身为 `@`，zone 外的名称原样返回）
#[must_use]
pub fn relative_host(fqdn: &str, zone: &str) -> String {
    let fqdn = fqdn.trim_end_matches('.').to_lowercase();
    if fqdn == zone {
        return "@".to_string();
    }
    fqdn.strip_suffix(&format!(".{zone}"))
        .map_or(fqdn.clone(), str::to_string)
}
