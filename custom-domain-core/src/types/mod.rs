//! 类型定义模块

mod domain_config;

pub use domain_config::{DomainConfig, DomainRecord, DomainStatus, DomainType, RecordPurpose};

// Re-export provider 库的公共类型
pub use custom_domain_provider::{
    DnsRecordType, EmailDomain, EmailDomainStatus, HostingRegistration, HostingStatus,
    ProviderDnsRecord,
};
