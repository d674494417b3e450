//! HTTP client for the tracker API

use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::env;
use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::models::{ErrorBody, HealthStatus, Transaction, Wallet};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// - `API_BASE_URL`: server root (default `http://localhost:3000`)
    /// - `API_TIMEOUT_SECS`: per-request timeout (default 30)
    pub fn from_env() -> Self {
        let base_url = env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Thin typed wrapper over the REST endpoints.
///
/// Cloning is cheap; `reqwest::Client` is internally reference counted.
#[derive(Clone, Debug)]
pub struct TrackerClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl TrackerClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ClientError::Network(format!("Invalid base URL: {}", config.base_url)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn list_wallets(&self) -> Result<Vec<Wallet>> {
        self.request(Method::GET, &["wallets"], None).await
    }

    /// Create a wallet. The server answers with the whole collection, the new
    /// wallet last.
    pub async fn create_wallet(&self, address: &str) -> Result<Vec<Wallet>> {
        self.request(Method::POST, &["wallets"], Some(json!({ "address": address })))
            .await
    }

    pub async fn delete_wallet(&self, wallet_id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .request(Method::DELETE, &["wallets", wallet_id], None)
            .await?;
        Ok(())
    }

    /// Sync a wallet, returning only the newly generated transactions
    pub async fn sync_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>> {
        self.request(Method::POST, &["wallets", wallet_id, "sync"], None)
            .await
    }

    /// Transactions of one wallet. A `null` body is treated as no transactions.
    pub async fn wallet_transactions(&self, wallet_id: &str) -> Result<Vec<Transaction>> {
        let transactions: Option<Vec<Transaction>> = self
            .request(Method::GET, &["wallets", wallet_id], None)
            .await?;
        Ok(transactions.unwrap_or_default())
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.request(Method::GET, &["health"], None).await
    }

    /// Endpoint URL under the base path, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let url = self.endpoint(segments);
        log::debug!("{} {}", method, url);

        let mut builder = self.http_client.request(method.clone(), url.clone());
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(|e| {
            log::warn!("Request {} {} failed: {}", method, url, e);
            ClientError::from(e)
        })?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response.json::<T>().await.map_err(|e| {
            log::warn!("Could not decode response from {}: {}", url, e);
            ClientError::InvalidResponse(e.to_string())
        })
    }
}

async fn error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status));

    log::debug!("HTTP {}: {}", status, message);
    ClientError::Http { status, message }
}
