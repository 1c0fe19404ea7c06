// REST client: envelope decoding behind a client-side rate limit.
//
// The backend wraps every payload in `{ success, message, body }`; a
// `success: false` answer is a failure even on HTTP 200.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::errors::ApiError;
use crate::api::types::ApiEnvelope;
use crate::config::ApiConfig;

/// HTTP client for the ops backend. Every call waits on the rate limiter
/// before touching the wire.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl ApiClient {
    pub fn new(cfg: &ApiConfig) -> Result<Self, ApiError> {
        let quota = Quota::per_second(
            NonZeroU32::new(cfg.rate_limit.requests_per_second.max(1)).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(
            NonZeroU32::new(cfg.rate_limit.burst_capacity.max(1)).unwrap_or(NonZeroU32::MIN),
        );
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            token: cfg.token.clone(),
            limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let request = self.http.get(self.url(path)).query(query);
        self.execute(request).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.http.patch(self.url(path)).json(body);
        self.execute(request).await
    }

    /// DELETE; the envelope body, if any, is discarded.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.http.delete(self.url(path));
        let _: Option<serde_json::Value> = self.execute_optional(request).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let envelope = self.send(request).await?;
        envelope
            .body
            .ok_or_else(|| ApiError::Decode("response body missing".to_string()))
    }

    async fn execute_optional<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        Ok(self.send(request).await?.body)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiEnvelope<T>, ApiError> {
        self.limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        debug!("issuing API request");

        let response = request.send().await?;
        let status = response.status();
        if status.is_server_error() {
            return Err(ApiError::Server(format!("HTTP {status}")));
        }
        let bytes = response.bytes().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_slice(&bytes).map_err(|err| {
            if status.is_client_error() {
                ApiError::Rejected(format!("HTTP {status}"))
            } else {
                ApiError::Decode(err.to_string())
            }
        })?;
        if !envelope.success {
            return Err(ApiError::Rejected(envelope.message.unwrap_or_else(|| {
                format!("request rejected (HTTP {status})")
            })));
        }
        Ok(envelope)
    }
}
