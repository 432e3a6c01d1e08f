//! HTTP answering service — one remote endpoint speaking the query contract.
//!
//! Sends `POST <base_url>/query` with `{conversation_id, question}` and
//! reads the answer out of the JSON reply via a [`ResponseContract`].
//! Any non-2xx status is a failed attempt; a 2xx reply is always an answer,
//! even when the body is unreadable (the contract supplies a placeholder).

use async_trait::async_trait;
use parley_config::{EndpointConfig, ServiceConfig};
use parley_core::error::ServiceError;
use parley_core::service::{Answer, AnsweringService, HealthReport, QueryRequest, ResponseContract};
use tracing::{debug, warn};

/// A single answering endpoint.
///
/// The client carries no timeout of its own; deadlines belong to whoever
/// schedules the attempt (see [`crate::FallbackChain`]).
pub struct HttpAnsweringService {
    name: String,
    base_url: String,
    query_path: String,
    health_path: String,
    contract: ResponseContract,
    client: reqwest::Client,
}

impl HttpAnsweringService {
    /// Create a client for `base_url` with the default paths and contract.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
    ) -> std::result::Result<Self, ServiceError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| ServiceError::InvalidEndpoint(format!("{base_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ServiceError::NotConfigured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url,
            query_path: "/query".into(),
            health_path: "/health".into(),
            contract: ResponseContract::default(),
            client,
        })
    }

    /// Build from the config sections describing an endpoint and the wire
    /// contract.
    pub fn from_config(
        name: impl Into<String>,
        endpoint: &EndpointConfig,
        service: &ServiceConfig,
    ) -> std::result::Result<Self, ServiceError> {
        Ok(Self::new(name, endpoint.url.trim())?
            .with_paths(&service.query_path, &service.health_path)
            .with_contract(service.contract()))
    }

    pub fn with_paths(mut self, query_path: &str, health_path: &str) -> Self {
        self.query_path = query_path.to_string();
        self.health_path = health_path.to_string();
        self
    }

    pub fn with_contract(mut self, contract: ResponseContract) -> Self {
        self.contract = contract;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetch the service's own view of its health.
    pub async fn health_report(&self) -> std::result::Result<HealthReport, ServiceError> {
        let url = self.url(&self.health_path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status_code: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json::<HealthReport>()
            .await
            .map_err(|e| ServiceError::Network(format!("Failed to read health report: {e}")))
    }
}

#[async_trait]
impl AnsweringService for HttpAnsweringService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, request: QueryRequest) -> std::result::Result<Answer, ServiceError> {
        let url = self.url(&self.query_path);

        debug!(
            service = %self.name,
            url = %url,
            conversation_id = %request.conversation_id,
            "Sending query"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(service = %self.name, status = status.as_u16(), body = %error_body, "Service returned error");
            return Err(ServiceError::Status {
                status_code: status.as_u16(),
                message: error_body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Network(format!("Failed to read response body: {e}")))?;

        Ok(self.contract.extract(&body))
    }

    async fn health_check(&self) -> std::result::Result<bool, ServiceError> {
        Ok(self.health_report().await?.is_healthy())
    }
}
