//! HTTP client for the relief portal backend.
//!
//! Provides a minimal bearer-authenticated client with JSON and multipart
//! helpers. [`ApiClient`] implements the workflow crate's `DraftStore` (for
//! every draft type) and `FileTransfer` collaborators; see [`api`].

pub mod api;

use anyhow::{Context, Result};
use relief_core::{ClientConfig, Config, ServiceError};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// HTTP client for the relief portal API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    api_base: String,
    token: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base(),
            token: config.token.clone(),
        })
    }

    /// Create client from environment: RELIEF_API_URL, RELIEF_API_VERSION,
    /// RELIEF_API_TOKEN and RELIEF_REQUEST_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self> {
        let config = Config::from_env()?;
        config.validate()?;
        Self::new(&config.client)
    }

    /// Versioned API root, e.g. `http://localhost:8080/api/v1`.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(status = status.as_u16(), "API request failed");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let response = self.send(self.client.get(self.build_url(path))).await?;
        Self::decode(response).await
    }

    /// GET request returning the raw response, for file downloads.
    pub async fn get_raw(&self, path: &str) -> Result<Response, ServiceError> {
        self.send(self.client.get(self.build_url(path))).await
    }

    /// PUT JSON body. The response body is ignored.
    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ServiceError> {
        self.send(self.client.put(self.build_url(path)).json(body))
            .await?;
        Ok(())
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let response = self
            .send(self.client.post(self.build_url(path)).json(body))
            .await?;
        Self::decode(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ServiceError> {
        let response = self
            .send(self.client.post(self.build_url(path)).multipart(form))
            .await?;
        Self::decode(response).await
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<(), ServiceError> {
        self.send(self.client.delete(self.build_url(path))).await?;
        Ok(())
    }
}
