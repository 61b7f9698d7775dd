//! Resend API 类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `POST /domains` 请求体
#[derive(Debug, Serialize)]
pub struct CreateDomainBody<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<&'a str>,
}

/// 发信域名
#[derive(Debug, Deserialize)]
pub struct ResendDomain {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default, deserialize_with = "crate::utils::datetime::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
    /// 列表接口不返回记录
    #[serde(default)]
    pub records: Vec<ResendRecord>,
}

/// `GET /domains` 响应（按 `after` 游标分页）
#[derive(Debug, Deserialize)]
pub struct ResendDomainList {
    pub data: Vec<ResendDomain>,
    #[serde(default)]
    pub has_more: bool,
}

impl ResendDomainList {
    /// 下一页的游标：本页最后一个域名的 ID
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_more {
            self.data.last().map(|d| d.id.as_str())
        } else {
            None
        }
    }
}

/// 域名所需 DNS 记录
#[derive(Debug, Deserialize)]
pub struct ResendRecord {
    /// 记录用途：SPF / DKIM / DMARC / Receiving
    #[allow(dead_code)]
    #[serde(default)]
    pub record: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<u16>,
}

/// `POST /domains/{id}/verify` 响应
#[derive(Debug, Deserialize)]
pub struct ResendVerifyResponse {
    pub id: String,
}

/// Resend 错误响应
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendErrorBody {
    #[serde(default)]
    pub status_code: Option<u16>,
    pub name: String,
    pub message: String,
}
