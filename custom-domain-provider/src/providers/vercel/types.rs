//! Vercel API 类型定义

use serde::{Deserialize, Serialize};

/// `POST /v10/projects/{project}/domains` 请求体
#[derive(Debug, Serialize)]
pub struct AddDomainBody<'a> {
    pub name: &'a str,
}

/// 项目域名（`/v9|v10/projects/{project}/domains`）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelProjectDomain {
    pub name: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub project_id: Option<String>,
    pub verified: bool,
    /// 归属验证挑战；已验证时为 null 或缺失
    #[serde(default)]
    pub verification: Option<Vec<VercelVerification>>,
}

/// 归属验证挑战记录
#[derive(Debug, Deserialize)]
pub struct VercelVerification {
    #[serde(rename = "type")]
    pub record_type: String,
    /// 完整域名，例如 `_vercel.example.com`
    pub domain: String,
    pub value: String,
}

/// 域名 DNS 配置（`/v6/domains/{domain}/config`）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelDomainConfig {
    #[serde(default)]
    pub configured_by: Option<String>,
    #[serde(default)]
    pub misconfigured: bool,
}

/// Vercel 错误响应
#[derive(Debug, Deserialize)]
pub struct VercelErrorBody {
    pub error: VercelErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelErrorDetail {
    pub code: String,
    pub message: String,
    /// 冲突时占用该域名的项目
    #[serde(default)]
    pub project_id: Option<String>,
}
