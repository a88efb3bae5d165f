use crate::config::toml_config::HttpConfig;
use crate::domain::ports::Transport;
use crate::utils::error::{Result, SocProofError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

/// Status reported for failures that never produced an HTTP response.
pub const TRANSPORT_FAILURE_STATUS: i32 = -1;

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Transport with the default timeout and user agent from [`HttpConfig`].
    pub fn new() -> Self {
        let client = build_client(&HttpConfig::default()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to an unconfigured HTTP client");
            Client::new()
        });
        Self { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let client = build_client(config).map_err(|e| SocProofError::Config {
            message: format!("Failed to build HTTP client: {}", e),
        })?;
        Ok(Self { client })
    }

    /// Passes 2xx responses through; anything else becomes `HttpRequest`.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "request failed");
        Err(SocProofError::HttpRequest {
            status: i32::from(status.as_u16()),
            message: if body.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body
            },
        })
    }
}

fn build_client(config: &HttpConfig) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.as_str())
        .build()
}

fn transport_error(e: reqwest::Error) -> SocProofError {
    SocProofError::HttpRequest {
        status: TRANSPORT_FAILURE_STATUS,
        message: e.to_string(),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, url: &str, form: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;
        let response = Self::check_status(response).await?;

        let text = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&text)
            .map_err(|e| SocProofError::InvalidResponse(format!("Response is not valid JSON: {}", e)))
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let response = Self::check_status(response).await?;
        response.text().await.map_err(transport_error)
    }
}
