//! Resend HTTP 请求方法

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::{ResendClient, ResendErrorBody};

impl ResendClient {
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base.trim_end_matches('/'))
    }

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
        let (status, text) = (response.status, response.body);

        let raw = match serde_json::from_str::<ResendErrorBody>(&text) {
            Ok(body) => RawApiError::with_code(body.name, body.message)
                .status(body.status_code.unwrap_or(status)),
            Err(_) => RawApiError::new(truncate_for_log(&text)).status(status),
        };

        let err = self.map_error(raw, context);
        if err.is_expected() {
            log::warn!("[{}] API error: {err}", self.provider_name());
        } else {
            log::error!("[{}] API error: {err}", self.provider_name());
        }
        Err(err)
    }

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

    pub(crate) async fn delete(&self, path: &str, context: ErrorContext) -> Result<()> {
        let url = self.url(path);
        self.send(self.client.delete(&url), "DELETE", &url, context)
            .await?;
        Ok(())
    }
}
