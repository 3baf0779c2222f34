//! Plumbing shared by the HTTP-backed stores.

use log::warn;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::db::config::StoreConfig;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

const USER_AGENT: &str = concat!("dashboard-metrics/", env!("CARGO_PKG_VERSION"));

/// Credentials and endpoint validated at construction time.
#[derive(Debug, Clone)]
pub(crate) struct RemoteSettings {
    pub api_key: String,
    pub base_id: String,
    pub api_url: Url,
    pub page_size: usize,
    pub timeout: Duration,
}

impl RemoteSettings {
    pub fn from_config(
        config: &StoreConfig,
        backend: &str,
        default_url: &str,
    ) -> RepositoryResult<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            RepositoryError::configuration(format!(
                "{} store requires DATABASE_API_KEY",
                backend
            ))
        })?;
        let base_id = config.base_id.clone().ok_or_else(|| {
            RepositoryError::configuration(format!(
                "{} store requires DATABASE_BASE_ID",
                backend
            ))
        })?;
        let raw_url = config.api_url.as_deref().unwrap_or(default_url);
        let api_url = Url::parse(raw_url).map_err(|e| {
            RepositoryError::configuration(format!("Invalid DATABASE_API_URL '{}': {}", raw_url, e))
        })?;
        if api_url.cannot_be_a_base() {
            return Err(RepositoryError::configuration(format!(
                "Invalid DATABASE_API_URL '{}': not a base URL",
                raw_url
            )));
        }

        Ok(Self {
            api_key,
            base_id,
            api_url,
            page_size: config.page_size,
            timeout: config.timeout(),
        })
    }

    /// `api_url` with `segments` appended as individually encoded path segments.
    pub fn endpoint(&self, segments: &[&str]) -> RepositoryResult<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| RepositoryError::internal("API URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Lazily built, shared HTTP client.
#[derive(Debug, Default)]
pub(crate) struct LazyClient {
    cell: OnceCell<reqwest::Client>,
}

impl LazyClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, timeout: Duration) -> RepositoryResult<&reqwest::Client> {
        self.cell
            .get_or_try_init(|| async move {
                reqwest::Client::builder()
                    .timeout(timeout)
                    .user_agent(USER_AGENT)
                    .build()
                    .map_err(|e| {
                        RepositoryError::InternalError {
                            message: format!("Failed to build HTTP client: {}", e),
                            context: ErrorContext::new("build_client"),
                        }
                    })
            })
            .await
    }
}

/// Attach call context to a transport error.
pub(crate) fn transport_error(err: reqwest::Error, context: ErrorContext) -> RepositoryError {
    let mut context = context;
    if let Some(status) = err.status() {
        context = context.with_status(status.as_u16());
    }
    let message = err.to_string();
    if err.is_timeout() {
        RepositoryError::timeout_with_source(message, context, err)
    } else {
        RepositoryError::connection_with_source(message, context, err)
    }
}

/// Turn a non-success response into a query error carrying status and body.
pub(crate) async fn status_error(response: Response, context: ErrorContext) -> RepositoryError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let mut context = context.with_status(status.as_u16());
    if !body.is_empty() {
        context = context.with_details(truncate(&body, 512));
    }
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        context = context.retryable();
    }
    warn!("backend answered {} {}", status, context);
    RepositoryError::query_with_context(format!("Backend returned HTTP {}", status), context)
}

/// Read and decode a JSON body.
pub(crate) async fn decode_body<T: DeserializeOwned>(
    response: Response,
    context: ErrorContext,
) -> RepositoryResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(e, context.clone()))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        RepositoryError::decode_with_source("Unexpected response body", context, e)
    })
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
