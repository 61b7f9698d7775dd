//! 租户自定义域名配置类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use custom_domain_provider::{DnsRecordType, ProviderDnsRecord};

/// 域名类型（创建时确定，之后不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    /// 顶级域名，例如 `example.com`、`example.co.jp`
    Root,
    /// 子域名，例如 `blog.example.com`
    Subdomain,
}

/// 记录用途
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordPurpose {
    Web,
    Email,
}

/// 域名配置状态
///
/// `pending → verifying → {active, error}`；`error` 只能通过手动重试回到 `verifying`，
/// `active` 在后续检查发现未验证时回到 `verifying`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Pending,
    Verifying,
    Active,
    Error,
}

impl DomainStatus {
    /// 存储用字符串
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verifying => "verifying",
            Self::Active => "active",
            Self::Error => "error",
        }
    }

    /// 从存储字符串解析
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "verifying" => Some(Self::Verifying),
            "active" => Some(Self::Active),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一条租户需要在注册商处发布的 DNS 记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// 子域名标签，顶级域名为 `@`
    pub host: String,
    pub value: String,
    /// 仅 MX 有意义
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    pub purpose: RecordPurpose,
    #[serde(default)]
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

impl DomainRecord {
    /// 创建未验证的 web 记录
    #[must_use]
    pub fn web(record_type: DnsRecordType, host: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            record_type,
            host: host.into(),
            value: value.into(),
            priority: None,
            purpose: RecordPurpose::Web,
            verified: false,
            verified_at: None,
        }
    }

    /// 将邮件服务商返回的记录原样转换为 email 记录
    #[must_use]
    pub fn email(record: &ProviderDnsRecord, now: DateTime<Utc>) -> Self {
        Self {
            record_type: record.record_type,
            host: record.name.clone(),
            value: record.value.clone(),
            priority: record.priority,
            purpose: RecordPurpose::Email,
            verified: record.verified,
            verified_at: record.verified.then_some(now),
        }
    }

    /// 同一条记录（类型、主机、值相同）
    #[must_use]
    pub fn same_entry(&self, other: &Self) -> bool {
        self.purpose == other.purpose
            && self.record_type == other.record_type
            && self.host == other.host
            && self.value == other.value
    }

    /// 归属验证挑战（web 用途的 TXT 记录）
    #[must_use]
    pub fn is_challenge(&self) -> bool {
        self.purpose == RecordPurpose::Web && self.record_type == DnsRecordType::Txt
    }

    /// 更新验证标记；只在未验证 -> 已验证时写入 `verified_at`
    pub fn mark_verified(&mut self, verified: bool, now: DateTime<Utc>) {
        if verified && !self.verified {
            self.verified_at = Some(now);
        } else if !verified {
            self.verified_at = None;
        }
        self.verified = verified;
    }
}

/// 租户与域名的绑定关系
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainConfig {
    pub tenant_id: String,
    /// 规范化后的域名（小写、无末尾点）
    pub domain: String,
    pub domain_type: DomainType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting_provider_id: Option<String>,
    /// 归属已验证且 DNS 已指向托管服务
    #[serde(default)]
    pub hosting_verified: bool,
    /// 托管服务注册调用已成功
    #[serde(default)]
    pub hosting_registered: bool,

    #[serde(default)]
    pub email_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_provider_id: Option<String>,
    #[serde(default)]
    pub email_verified: bool,

    /// web 记录在前，email 记录在后
    #[serde(default)]
    pub records: Vec<DomainRecord>,

    pub status: DomainStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
    /// 首次进入 active 的时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configured_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainConfig {
    /// 创建新的 `pending` 配置
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        domain: impl Into<String>,
        domain_type: DomainType,
        email_enabled: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            domain: domain.into(),
            domain_type,
            hosting_provider_id: None,
            hosting_verified: false,
            hosting_registered: false,
            email_enabled,
            email_provider_id: None,
            email_verified: false,
            records: Vec::new(),
            status: DomainStatus::Pending,
            error_message: None,
            last_checked_at: None,
            configured_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 所有必需的验证均已通过
    #[must_use]
    pub fn fully_verified(&self) -> bool {
        self.hosting_verified && (!self.email_enabled || self.email_verified)
    }

    pub fn web_records(&self) -> impl Iterator<Item = &DomainRecord> {
        self.records.iter().filter(|r| r.purpose == RecordPurpose::Web)
    }

    pub fn email_records(&self) -> impl Iterator<Item = &DomainRecord> {
        self.records
            .iter()
            .filter(|r| r.purpose == RecordPurpose::Email)
    }

    /// 整体替换归属验证挑战记录，保持 web 记录在 email 记录之前
    pub fn replace_challenges(&mut self, challenges: Vec<DomainRecord>) {
        let previous: Vec<DomainRecord> =
            self.records.iter().filter(|r| r.is_challenge()).cloned().collect();
        let challenges = carry_verified_at(challenges, &previous);

        let (mut web, email): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .filter(|r| !r.is_challenge())
            .partition(|r| r.purpose == RecordPurpose::Web);
        web.extend(challenges);
        web.extend(email);
        self.records = web;
    }

    /// 整体替换 email 记录（服务商是唯一数据来源，不做 diff）
    pub fn replace_email_records(&mut self, records: Vec<DomainRecord>) {
        let previous: Vec<DomainRecord> = self.email_records().cloned().collect();
        let records = carry_verified_at(records, &previous);
        self.records.retain(|r| r.purpose == RecordPurpose::Web);
        self.records.extend(records);
    }

    /// 根据托管服务状态更新 web 记录验证标记
    ///
    /// 挑战记录跟随归属验证，A/CNAME 跟随 DNS 解析状态。
    pub fn mark_web_records(&mut self, ownership_verified: bool, dns_configured: bool, now: DateTime<Utc>) {
        for record in &mut self.records {
            if record.purpose != RecordPurpose::Web {
                continue;
            }
            let verified = if record.is_challenge() {
                ownership_verified
            } else {
                dns_configured
            };
            record.mark_verified(verified, now);
        }
    }
}

/// 保留已验证记录的原始 `verified_at`
fn carry_verified_at(mut records: Vec<DomainRecord>, previous: &[DomainRecord]) -> Vec<DomainRecord> {
    for record in &mut records {
        if !record.verified {
            continue;
        }
        if let Some(old) = previous
            .iter()
            .find(|old| old.verified && old.same_entry(record))
        {
            record.verified_at = old.verified_at;
        }
    }
    records
}
