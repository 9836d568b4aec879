// Toggl API client
// Holds one pooled HTTP client shared by every proxied request

use base64::Engine as _;
use reqwest::{header, Client};
use serde_json::Value;
use tokio::time::Duration;

const TIME_ENTRIES_PATH: &str = "/me/time_entries";

/// Fixed password half of Toggl's basic-auth convention
const API_TOKEN_PASSWORD: &str = "api_token";

const USER_AGENT: &str = concat!("t2n-server/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Upstream replied with a non-success status
    #[error("upstream returned {status} {reason}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    /// Request could not complete or the reply was not JSON
    #[error("{0}")]
    Transport(String),
}

pub struct TogglClient {
    http_client: Client,
    base_url: String,
}

impl TogglClient {
    pub fn new(base_url: &str, request_timeout_secs: u64) -> Result<Self, String> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(Duration::from_secs(request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn time_entries_url(&self) -> String {
        format!("{}{}", self.base_url, TIME_ENTRIES_PATH)
    }

    /// `Basic base64("{api_token}:api_token")`
    pub fn basic_auth_value(api_token: &str) -> String {
        let raw = format!("{}:{}", api_token, API_TOKEN_PASSWORD);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }

    /// Fetch the time entries of the account owning `api_token` in `[start_date, end_date]`.
    ///
    /// Single attempt, no retries.
    pub async fn fetch_time_entries(
        &self,
        api_token: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Value, UpstreamError> {
        let auth = header::HeaderValue::from_str(&Self::basic_auth_value(api_token))
            .map_err(|e| UpstreamError::Transport(format!("Invalid API token: {}", e)))?;

        let response = self
            .http_client
            .get(self.time_entries_url())
            .query(&[("start_date", start_date), ("end_date", end_date)])
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| {
                UpstreamError::Transport(format!(
                    "Failed to read error body of {} response: {}",
                    status.as_u16(),
                    e
                ))
            })?;
            tracing::error!("Toggl API error: {} {}", status.as_u16(), body);
            // reqwest does not expose the wire reason phrase; the canonical one is used
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let data = response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::Transport(format!("Parse json failed: {}", e)))?;

        tracing::debug!("✓ Toggl time entries fetched | Status: {}", status);
        Ok(data)
    }
}
