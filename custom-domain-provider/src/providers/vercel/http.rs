//! Vercel HTTP 请求方法

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::providers::common::with_query;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::{VercelClient, VercelErrorBody};

impl VercelClient {
    /// 拼接完整 URL，附带 teamId
    pub(crate) fn url(&self, path: &str) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        with_query(
            &format!("{base}{path}"),
            &[("teamId", self.config.team_id.as_deref())],
        )
    }

    /// 发送请求，2xx 返回响应文本，其余映射为 `ProviderError`
    async fn send(
        &self,
        request: RequestBuilder,
        method: &str,
        url: &str,
        context: ErrorContext,
    ) -> Result<String> {
        let request = request.bearer_auth(&self.config.api_token);
        let response =
            HttpUtils::execute_request(request, self.provider_name(), method, url).await?;
        if response.is_success() {
            return Ok(response.body);
        }

        let err = self.map_error(self.raw_error(response.status, &response.body), context);
        if err.is_expected() {
            log::warn!("[{}] API error: {err}", self.provider_name());
        } else {
            log::error!("[{}] API error: {err}", self.provider_name());
        }
        Err(err)
    }

    /// 解析错误响应体
    pub(crate) fn raw_error(&self, status: u16, text: &str) -> RawApiError {
        match serde_json::from_str::<VercelErrorBody>(text) {
            Ok(body) => {
                let detail = body.error;
                // 同一项目内重复添加：视为已存在而不是被占用
                let code = if detail.code == "domain_already_in_use"
                    && detail.project_id.as_deref() == Some(self.config.project_id.as_str())
                {
                    "domain_already_exists".to_string()
                } else {
                    detail.code
                };
                RawApiError::with_code(code, detail.message)
            }
            Err(_) => RawApiError::new(truncate_for_log(text)),
        }
        .status(status)
    }

    /// 执行 GET 请求
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        context: ErrorContext,
    ) -> Result<T> {
        let url = self.url(path);
        let text = self
            .send(self.client.get(&url), "GET", &url, context)
            .await?;
        HttpUtils::parse_json(&text, self.provider_name())
    }

    /// 执行 POST 请求
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<T> {
        let url = self.url(path);
        let text = self
            .send(self.client.post(&url).json(body), "POST", &url, context)
            .await?;
        HttpUtils::parse_json(&text, self.provider_name())
    }

    /// 执行 DELETE 请求
    pub(crate) async fn delete(&self, path: &str, context: ErrorContext) -> Result<()> {
        let url = self.url(path);
        self.send(self.client.delete(&url), "DELETE", &url, context)
            .await?;
        Ok(())
    }
}
