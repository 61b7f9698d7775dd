//! Custom Domain Core Library
//!
//! 多租户自定义域名接入的业务逻辑：
//! - 域名校验与 DNS 记录规划
//! - 托管服务 / 邮件服务的注册与验证编排
//! - 域名配置状态机（pending -> verifying -> active / error）
//!
//! 存储层通过 [`DomainConfigRepository`] 抽象，服务商通过
//! `custom-domain-provider` 的客户端 trait 注入，本库不依赖任何具体平台。

pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{
    DnsRecordPlanner, DomainProvisioningService, ReconcileOutcome, ReconcilePolicy,
    ServiceContext, SweepFailure, SweepReport, WebTarget,
};
pub use traits::DomainConfigRepository;
pub use types::{DomainConfig, DomainRecord, DomainStatus, DomainType, RecordPurpose};
pub use utils::validate_domain;
