//! Shared HTTP plumbing
//!
//! Each client builds its own `RequestBuilder` (auth header, scope query, body)
//! and hands it to [`HttpUtils::execute_request`], which sends it exactly once
//! and turns transport-level failures into transient `ProviderError`s.
//! Retrying over time is the reconciliation caller's job.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Status and body of a response that reached the API (anything but 408, 429 and 5xx).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Send a request once.
    ///
    /// * 408 / client timeout -> `Timeout`
    /// * 429 -> `RateLimited` (with `Retry-After` when present)
    /// * 5xx / connection failure -> `NetworkError`
    /// * everything else -> `Ok(ApiResponse)`, mapping is left to the caller
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url: &str,
    ) -> Result<ApiResponse, ProviderError> {
        log::debug!("[{provider_name}] {method_name} {url}");

        let response = request_builder
            .send()
            .await
            .map_err(|e| transport_error(provider_name, &e))?;

        let status = response.status().as_u16();
        let retry_after = retry_after_secs(response.headers(), Utc::now());
        let body = response.text().await.map_err(|e| ProviderError::NetworkError {
            provider: provider_name.to_string(),
            detail: format!("failed to read response body: {e}"),
        })?;
        log::debug!(
            "[{provider_name}] {method_name} {url} -> {status}: {}",
            truncate_for_log(&body)
        );

        match status {
            408 => Err(ProviderError::Timeout {
                provider: provider_name.to_string(),
                detail: format!("{method_name} {url}: HTTP 408"),
            }),
            429 => {
                log::warn!("[{provider_name}] Rate limited, retry_after={retry_after:?}");
                Err(ProviderError::RateLimited {
                    provider: provider_name.to_string(),
                    retry_after,
                    raw_message: Some(truncate_for_log(&body)),
                })
            }
            500.. => {
                log::warn!("[{provider_name}] Server error (HTTP {status})");
                Err(ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: format!("HTTP {status}: {}", truncate_for_log(&body)),
                })
            }
            _ => Ok(ApiResponse { status, body }),
        }
    }

    /// Parse a JSON body into `T`.
    pub fn parse_json<T>(body: &str, provider_name: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(body).map_err(|e| {
            log::error!(
                "[{provider_name}] Unexpected response shape ({e}): {}",
                truncate_for_log(body)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }
}

fn transport_error(provider_name: &str, err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout {
            provider: provider_name.to_string(),
            detail: err.to_string(),
        }
    } else {
        ProviderError::NetworkError {
            provider: provider_name.to_string(),
            detail: err.to_string(),
        }
    }
}

/// `Retry-After` as seconds; accepts delta-seconds and HTTP-date forms.
fn retry_after_secs(headers: &HeaderMap, now: DateTime<Utc>) -> Option<u64> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(secs);
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some(u64::try_from(at.signed_duration_since(now).num_seconds()).unwrap_or(0))
}
