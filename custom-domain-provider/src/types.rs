use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};

// ============ DNS Records ============

/// DNS record types a custom domain can require.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// Canonical name (alias) record.
    Cname,
    /// Text record (SPF, DKIM, DMARC, ownership challenges).
    Txt,
    /// Mail exchange record.
    Mx,
}

impl DnsRecordType {
    /// Upper-case wire name (`"A"`, `"CNAME"`, ...).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Cname => "CNAME",
            Self::Txt => "TXT",
            Self::Mx => "MX",
        }
    }

    /// Parse a provider-supplied record type, case-insensitively.
    pub fn parse(record_type: &str, provider: &str) -> Result<Self> {
        match record_type.to_uppercase().as_str() {
            "A" => Ok(Self::A),
            "CNAME" => Ok(Self::Cname),
            "TXT" => Ok(Self::Txt),
            "MX" => Ok(Self::Mx),
            _ => Err(ProviderError::ParseError {
                provider: provider.to_string(),
                detail: format!("unsupported record type: {record_type}"),
            }),
        }
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record as reported by a provider.
///
/// `name` is whatever the provider returns: a relative host for email providers,
/// a fully-qualified name for hosting ownership challenges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDnsRecord {
    pub record_type: DnsRecordType,
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// Whether the provider currently sees this record published correctly.
    pub verified: bool,
}

// ============ Hosting ============

/// Result of attaching a domain to the hosting project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostingRegistration {
    /// Provider-side identifier of the attachment.
    pub provider_id: String,
    /// Whether the provider already considers the domain verified.
    pub verified: bool,
    /// Ownership challenges the provider requires before it will serve the domain.
    #[serde(default)]
    pub challenges: Vec<ProviderDnsRecord>,
}

/// Current verification state of a hosted domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostingStatus {
    /// Ownership verified on the project.
    pub verified: bool,
    /// The provider currently observes DNS resolving to it.
    pub dns_configured: bool,
    /// Record type the provider saw the domain configured by (`"A"`, `"CNAME"`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configured_by: Option<String>,
    /// Outstanding ownership challenges, if any.
    #[serde(default)]
    pub challenges: Vec<ProviderDnsRecord>,
}

// ============ Email ============

/// Sending-domain status reported by the email provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmailDomainStatus {
    NotStarted,
    Pending,
    Verified,
    PartiallyVerified,
    PartiallyFailed,
    Failed,
    TemporaryFailure,
    #[serde(other)]
    Unknown,
}

impl EmailDomainStatus {
    /// Whether every record of the domain has been verified.
    #[must_use]
    pub fn is_verified(self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// A sending domain registered with the email provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmailDomain {
    pub provider_id: String,
    pub name: String,
    pub status: EmailDomainStatus,
    /// Authoritative SPF/DKIM/DMARC/MX records for the domain.
    pub records: Vec<ProviderDnsRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
