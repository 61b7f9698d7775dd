//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use custom_domain_provider::{
    EmailConfig, EmailDomainClient, HostingConfig, HostingDomainClient, create_email_client,
    create_hosting_client,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got Err({:?})", res.as_ref().err());
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: Err({:?})",
            format_args!($($msg)+),
            res.as_ref().err()
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 生成唯一的测试子域名，例如 `cd-test-1a2b3c4d.example.com`
pub fn generate_test_domain(parent: &str) -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("cd-test-{}.{parent}", &uuid.to_string()[..8])
}

/// 托管测试上下文
pub struct HostingContext {
    pub client: Arc<dyn HostingDomainClient>,
    pub domain: String,
}

impl HostingContext {
    /// 从 `VERCEL_TOKEN` / `VERCEL_PROJECT_ID` / `VERCEL_TEAM_ID` / `TEST_DOMAIN` 创建
    pub fn from_env() -> Option<Self> {
        let token = env::var("VERCEL_TOKEN").ok()?;
        let project_id = env::var("VERCEL_PROJECT_ID").ok()?;
        let parent = env::var("TEST_DOMAIN").ok()?;

        let mut config = HostingConfig::new(token, project_id);
        if let Ok(team_id) = env::var("VERCEL_TEAM_ID") {
            config = config.with_team_id(team_id);
        }

        Some(Self {
            client: create_hosting_client(config).ok()?,
            domain: generate_test_domain(&parent),
        })
    }

    pub async fn cleanup(&self) {
        let _ = self.client.deregister(&self.domain).await;
    }
}

/// 邮件测试上下文
pub struct EmailContext {
    pub client: Arc<dyn EmailDomainClient>,
    pub domain: String,
}

impl EmailContext {
    /// 从 `RESEND_API_KEY` / `TEST_DOMAIN` 创建
    pub fn from_env() -> Option<Self> {
        let token = env::var("RESEND_API_KEY").ok()?;
        let parent = env::var("TEST_DOMAIN").ok()?;

        Some(Self {
            client: create_email_client(EmailConfig::new(token)).ok()?,
            domain: generate_test_domain(&parent),
        })
    }

    /// 按名称查找并删除测试域名
    pub async fn cleanup(&self) {
        if let Ok(found) = self.client.lookup(&self.domain).await {
            let _ = self.client.deregister(&found.provider_id).await;
        }
    }
}
