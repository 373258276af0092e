//! OpenAI-compatible provider client
//!
//! Wraps `async_openai::Client` with a config that carries the composed
//! headers and default query. Chat completions are sent through the same
//! config with a raw `reqwest` call so the HTTP status is available for
//! retry decisions; the configured retry count is the only retry budget.

use super::{HeaderSet, VendorKind};
use crate::error::{ProviderError, Result};
use async_openai::{
    config::{Config, OPENAI_API_BASE},
    error::ApiError,
    types::{CreateChatCompletionRequest, CreateChatCompletionResponse},
    Client,
};
use backoff::ExponentialBackoffBuilder;
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

const REDACTED: &str = "***";
const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Everything a client is constructed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientOptions {
    pub vendor: VendorKind,
    pub api_key: Option<String>,
    /// `None` lets the client use its built-in default base URL
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub headers: HeaderSet,
    /// Absent (rather than empty) when no extra query parameters apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_query: Option<IndexMap<String, String>>,
}

impl ClientOptions {
    /// Base URL requests will actually go to
    pub fn api_base(&self) -> &str {
        self.base_url.as_deref().unwrap_or(OPENAI_API_BASE)
    }

    /// Copy with credential values masked, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.api_key.is_some() {
            copy.api_key = Some(REDACTED.to_string());
        }
        copy.headers = self
            .headers
            .clone()
            .into_iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(super::API_KEY_HEADER) {
                    (name, value.map(|_| REDACTED.to_string()))
                } else {
                    (name, value)
                }
            })
            .collect();
        copy
    }
}

/// `async_openai` config that applies composed headers and default query
#[derive(Debug, Clone)]
pub struct CompatibleConfig {
    api_base: String,
    api_key: SecretString,
    headers: HeaderMap,
    query: Vec<(String, String)>,
}

impl CompatibleConfig {
    pub fn from_options(options: &ClientOptions) -> Self {
        Self {
            api_base: options.api_base().to_string(),
            api_key: SecretString::from(options.api_key.clone().unwrap_or_default()),
            headers: options.headers.to_header_map(),
            query: options
                .default_query
                .iter()
                .flatten()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl Config for CompatibleConfig {
    fn headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        let key = self.api_key.expose_secret();
        if !key.is_empty() {
            match HeaderValue::from_str(&format!("Bearer {}", key)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => warn!(error = %e, "skipping invalid bearer token"),
            }
        }
        headers
    }

    // Paths start with '/', so a trailing slash on the base would double it
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    fn query(&self) -> Vec<(&str, &str)> {
        self.query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ApiError,
}

/// A configured chat-completions client
#[derive(Clone)]
pub struct CompatibleClient {
    options: ClientOptions,
    config: CompatibleConfig,
    http_client: reqwest::Client,
    client: Client<CompatibleConfig>,
}

impl CompatibleClient {
    /// Create a client; no connection is opened until the first request
    pub fn new(options: ClientOptions) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .build()
            .map_err(ProviderError::HttpClient)?;

        let config = CompatibleConfig::from_options(&options);

        // async-openai retries rate limits on its own; a zero budget makes
        // every failure surface on the first attempt
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(config.clone())
            .with_http_client(http_client.clone())
            .with_backoff(no_retry);

        Ok(Self {
            options,
            config,
            http_client,
            client,
        })
    }

    /// The options this client was built from
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The underlying `async_openai` client, for endpoints beyond chat
    ///
    /// Calls made through it are not retried.
    pub fn inner(&self) -> &Client<CompatibleConfig> {
        &self.client
    }

    /// Send a non-streaming chat completion request
    ///
    /// Transient failures are retried up to `max_retries` times with
    /// exponential backoff (1s, 2s, 4s, ...).
    pub async fn create_chat_completion(
        &self,
        request: CreateChatCompletionRequest,
    ) -> Result<CreateChatCompletionResponse> {
        let max_retries = self.options.max_retries;
        let mut attempt = 0;

        loop {
            match self.send_chat_completion(&request).await {
                Ok(response) => {
                    if attempt > 0 {
                        info!(attempt, "request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(error) if attempt < max_retries && error.is_retryable() => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = total_attempts(max_retries),
                        delay_secs = delay.as_secs_f64(),
                        error = %error,
                        "retrying after failure"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn send_chat_completion(
        &self,
        request: &CreateChatCompletionRequest,
    ) -> Result<CreateChatCompletionResponse> {
        let response = self
            .http_client
            .post(self.config.url(CHAT_COMPLETIONS_PATH))
            .query(&self.config.query())
            .headers(self.config.headers())
            .json(request)
            .send()
            .await
            .map_err(ProviderError::Transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ProviderError::Transport)?;

        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Build a status error from the body, which may or may not be JSON
fn status_error(status: StatusCode, body: &[u8]) -> ProviderError {
    let (kind, message) = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => (parsed.error.r#type, parsed.error.message),
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            (None, text.trim().chars().take(MAX_ERROR_BODY_CHARS).collect())
        }
    };

    ProviderError::Status {
        status: status.as_u16(),
        kind,
        message,
    }
}

fn total_attempts(max_retries: u32) -> u32 {
    max_retries.saturating_add(1)
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(6))
}
