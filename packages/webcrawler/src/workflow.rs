//! Client for the external durable crawl-workflow engine.
//!
//! The engine performs the actual fetching, parsing, and page discovery;
//! this core only asks it to start or stop the crawl for a connector. Both
//! calls either resolve or fail; failures are propagated to the caller and
//! never retried here.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::types::ConnectorId;

#[async_trait]
pub trait CrawlWorkflowClient: Send + Sync {
    async fn launch(&self, connector_id: ConnectorId) -> Result<()>;
    async fn stop(&self, connector_id: ConnectorId) -> Result<()>;
}

const CRAWL_SERVICE: &str = "CrawlWebsite";

#[derive(Serialize)]
struct CrawlWorkflowRequest {
    connector_id: ConnectorId,
}

/// HTTP client for the workflow engine's ingress.
///
/// `launch` is fire-and-forget (`/send` suffix): the crawl runs for as long
/// as the site takes and the caller must not block on it. `stop` is awaited
/// so the caller knows the running workflow acknowledged the cancellation.
#[derive(Clone)]
pub struct HttpWorkflowClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpWorkflowClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: reqwest::Client::new(),
        }
    }

    async fn post(&self, handler: &str, fire_and_forget: bool, connector_id: ConnectorId) -> Result<()> {
        let mut url = format!("{}/{}/{}", self.base_url, CRAWL_SERVICE, handler);
        if fire_and_forget {
            url.push_str("/send");
        }

        tracing::debug!(
            connector_id = %connector_id,
            handler = handler,
            url = %url,
            "Invoking crawl workflow handler"
        );

        let response = self
            .http_client
            .post(&url)
            .json(&CrawlWorkflowRequest { connector_id })
            .send()
            .await
            .context("Failed to send crawl workflow request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            anyhow::bail!("Crawl workflow {} failed ({}): {}", handler, status, body);
        }

        Ok(())
    }
}

#[async_trait]
impl CrawlWorkflowClient for HttpWorkflowClient {
    async fn launch(&self, connector_id: ConnectorId) -> Result<()> {
        self.post("run", true, connector_id).await
    }

    async fn stop(&self, connector_id: ConnectorId) -> Result<()> {
        self.post("stop", false, connector_id).await
    }
}
