//! Service fallback — ordered retry chain with optional per-entry deadlines.
//!
//! When an endpoint fails (network error, error status, deadline expiry),
//! the next endpoint in the chain is tried with the same request. Each entry
//! is attempted exactly once; the error of the last entry is what the caller
//! sees when every entry fails.

use async_trait::async_trait;
use parley_config::AppConfig;
use parley_core::error::ServiceError;
use parley_core::service::{Answer, AnsweringService, QueryRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::http::HttpAnsweringService;

/// A service that wraps an ordered list of services and falls back on failure.
pub struct FallbackChain {
    name: String,
    chain: Vec<FallbackEntry>,
}

/// A single entry in the fallback chain.
struct FallbackEntry {
    service: Arc<dyn AnsweringService>,
    timeout: Option<Duration>,
}

impl FallbackChain {
    /// Create a new fallback chain with no entries.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: Vec::new(),
        }
    }

    /// Add a service whose attempt is cancelled after `timeout`.
    pub fn add(mut self, service: Arc<dyn AnsweringService>, timeout: Duration) -> Self {
        self.chain.push(FallbackEntry {
            service,
            timeout: Some(timeout),
        });
        self
    }

    /// Add a service that is given as long as the transport allows.
    pub fn add_unbounded(mut self, service: Arc<dyn AnsweringService>) -> Self {
        self.chain.push(FallbackEntry {
            service,
            timeout: None,
        });
        self
    }

    /// The two-tier chain described by the configuration: primary with its
    /// deadline, then the fallback endpoint.
    pub fn from_config(config: &AppConfig) -> std::result::Result<Self, ServiceError> {
        let primary = HttpAnsweringService::from_config("primary", &config.primary, &config.service)?;
        let fallback =
            HttpAnsweringService::from_config("fallback", &config.fallback, &config.service)?;

        let chain = Self::new("widget");
        let chain = match config.primary.timeout() {
            Some(timeout) => chain.add(Arc::new(primary), timeout),
            None => chain.add_unbounded(Arc::new(primary)),
        };
        let chain = match config.fallback.timeout() {
            Some(timeout) => chain.add(Arc::new(fallback), timeout),
            None => chain.add_unbounded(Arc::new(fallback)),
        };
        Ok(chain)
    }

    /// Number of services in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[async_trait]
impl AnsweringService for FallbackChain {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, request: QueryRequest) -> std::result::Result<Answer, ServiceError> {
        let mut last_error = ServiceError::NotConfigured("No services in fallback chain".into());

        for (i, entry) in self.chain.iter().enumerate() {
            let service_name = entry.service.name().to_string();

            info!(
                service = %service_name,
                attempt = i + 1,
                total = self.chain.len(),
                "Fallback: trying service"
            );

            let attempt = entry.service.query(request.clone());
            let outcome = match entry.timeout {
                Some(timeout) => match tokio::time::timeout(timeout, attempt).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(
                            service = %service_name,
                            timeout_ms = timeout.as_millis() as u64,
                            "Fallback: service timed out, trying next"
                        );
                        last_error = ServiceError::Timeout(format!(
                            "Service '{}' timed out after {}ms",
                            service_name,
                            timeout.as_millis()
                        ));
                        continue;
                    }
                },
                None => attempt.await,
            };

            match outcome {
                Ok(answer) => return Ok(answer),
                Err(e) => {
                    warn!(
                        service = %service_name,
                        error = %e,
                        "Fallback: service failed, trying next"
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn health_check(&self) -> std::result::Result<bool, ServiceError> {
        for entry in &self.chain {
            if let Ok(true) = entry.service.health_check().await {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
