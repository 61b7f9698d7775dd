//! Provider 公共工具函数

use reqwest::Client;

use crate::config::{ConfigError, HttpClientConfig};

// ============ HTTP Client ============

/// 创建带超时配置的 HTTP Client
pub fn create_http_client(config: &HttpClientConfig) -> Result<Client, ConfigError> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

// ============ 域名名称处理 ============

/// 去掉域名末尾的点并转小写
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_lowercase()
}

/// 拼接带查询参数的 URL，值会做 URL 编码
pub fn with_query(url: &str, params: &[(&str, Option<&str>)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter_map(|(k, v)| v.map(|v| format!("{k}={}", urlencoding::encode(v))))
        .collect();
    if query.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{}", query.join("&"))
    }
}
