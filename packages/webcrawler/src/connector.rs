//! Webcrawler connector lifecycle.
//!
//! Every transition persists its state change first and calls the external
//! workflow engine second. If the external call fails after a successful
//! persist, the persisted state is authoritative and re-issuing the
//! lifecycle operation is the recovery path; nothing here retries or rolls
//! back on its own.

use std::sync::Arc;

use crate::error::ConnectorError;
use crate::models::{Connector, WebCrawlerConfiguration};
use crate::parents;
use crate::permissions;
use crate::storage::ConnectorStore;
use crate::types::{
    merge_headers, redact_headers, ConnectorId, ContentNode, DataSourceConfig, WebCrawlerConfig,
};
use crate::workflow::CrawlWorkflowClient;

/// The connector service: crawl configuration lifecycle plus the read-side
/// resolvers, over a store and a workflow engine client.
#[derive(Clone)]
pub struct WebcrawlerConnector {
    store: Arc<dyn ConnectorStore>,
    workflow: Arc<dyn CrawlWorkflowClient>,
}

impl WebcrawlerConnector {
    pub fn new(store: Arc<dyn ConnectorStore>, workflow: Arc<dyn CrawlWorkflowClient>) -> Self {
        Self { store, workflow }
    }

    async fn fetch_connector(
        &self,
        connector_id: ConnectorId,
    ) -> Result<Connector, ConnectorError> {
        self.store
            .fetch_connector(connector_id)
            .await?
            .ok_or(ConnectorError::ConnectorNotFound(connector_id))
    }

    /// Create a connector and start crawling.
    ///
    /// The connector and its configuration are committed before the launch
    /// call. A failed launch leaves them in place: the caller gets the
    /// workflow error and can recover with [`unpause`](Self::unpause),
    /// which re-issues the launch.
    pub async fn create(
        &self,
        data_source: DataSourceConfig,
        connection_id: String,
        configuration: WebCrawlerConfig,
    ) -> Result<ConnectorId, ConnectorError> {
        configuration.validate()?;
        let configuration = WebCrawlerConfig {
            url: configuration.url.trim().to_string(),
            ..configuration
        };

        let (connector, _) = self
            .store
            .create_connector(&data_source, &connection_id, &configuration)
            .await?;

        self.workflow
            .launch(connector.id)
            .await
            .map_err(ConnectorError::Workflow)?;

        tracing::info!(
            connector_id = %connector.id,
            "Launched crawl website workflow for connector"
        );
        Ok(connector.id)
    }

    /// The stored configuration with header values redacted. Callers feed
    /// this back through [`set_configuration`](Self::set_configuration);
    /// the sentinel values mean "keep what is stored".
    pub async fn configuration(
        &self,
        connector_id: ConnectorId,
    ) -> Result<WebCrawlerConfiguration, ConnectorError> {
        self.fetch_connector(connector_id).await?;
        let mut config = self
            .store
            .fetch_configuration(connector_id)
            .await?
            .ok_or(ConnectorError::ConfigurationNotFound(connector_id))?;
        config.headers = redact_headers(&config.headers);
        Ok(config)
    }

    /// Replace the crawl configuration and restart the workflow.
    ///
    /// Stop-then-launch is not atomic: a crawl in flight may complete one
    /// more page cycle before the stop takes effect. The workflow checks
    /// configuration freshness at safe points, so that window is harmless.
    pub async fn set_configuration(
        &self,
        connector_id: ConnectorId,
        configuration: WebCrawlerConfig,
    ) -> Result<(), ConnectorError> {
        configuration.validate()?;
        let connector = self.fetch_connector(connector_id).await?;
        let existing = self
            .store
            .fetch_configuration(connector.id)
            .await?
            .ok_or(ConnectorError::ConfigurationNotFound(connector_id))?;

        let configuration = WebCrawlerConfig {
            url: configuration.url.trim().to_string(),
            headers: merge_headers(&configuration.headers, &existing.headers),
            ..configuration
        };

        self.store
            .update_configuration(connector.id, &configuration)
            .await?
            .ok_or(ConnectorError::ConfigurationNotFound(connector_id))?;

        self.workflow
            .stop(connector.id)
            .await
            .map_err(ConnectorError::Workflow)?;
        self.workflow
            .launch(connector.id)
            .await
            .map_err(ConnectorError::Workflow)?;

        tracing::info!(
            connector_id = %connector.id,
            "Restarted crawl website workflow with updated configuration"
        );
        Ok(())
    }

    /// Mark the connector paused and stop the crawl.
    pub async fn pause(&self, connector_id: ConnectorId) -> Result<(), ConnectorError> {
        self.fetch_connector(connector_id).await?;
        self.store
            .set_connector_paused(connector_id, true)
            .await?
            .ok_or(ConnectorError::ConnectorNotFound(connector_id))?;
        self.workflow
            .stop(connector_id)
            .await
            .map_err(ConnectorError::Workflow)?;
        Ok(())
    }

    /// Clear the paused flag and launch the crawl.
    pub async fn unpause(&self, connector_id: ConnectorId) -> Result<(), ConnectorError> {
        self.fetch_connector(connector_id).await?;
        self.store
            .set_connector_paused(connector_id, false)
            .await?
            .ok_or(ConnectorError::ConnectorNotFound(connector_id))?;
        self.workflow
            .launch(connector_id)
            .await
            .map_err(ConnectorError::Workflow)?;
        Ok(())
    }

    /// Stop the crawl without touching the persisted pause state. Used as a
    /// standalone administrative control.
    pub async fn stop(&self, connector_id: ConnectorId) -> Result<(), ConnectorError> {
        self.workflow
            .stop(connector_id)
            .await
            .map_err(ConnectorError::Workflow)
    }

    /// Delete the connector and everything scoped to it.
    ///
    /// The workflow stop is best-effort: a failure is logged and the
    /// deletion proceeds, since the rows the workflow would write are about
    /// to go away with the connector.
    pub async fn cleanup(&self, connector_id: ConnectorId) -> Result<(), ConnectorError> {
        let connector = self.fetch_connector(connector_id).await?;

        if let Err(error) = self.workflow.stop(connector.id).await {
            tracing::error!(
                connector_id = %connector.id,
                error = %error,
                "Failed to stop crawl workflow while cleaning up connector"
            );
        }

        self.store.delete_connector(connector.id).await?;
        tracing::info!(connector_id = %connector.id, "Deleted webcrawler connector");
        Ok(())
    }

    /// Direct children of a node (the roots when `parent_internal_id` is
    /// absent), sorted by title.
    pub async fn retrieve_permissions(
        &self,
        connector_id: ConnectorId,
        parent_internal_id: Option<&str>,
    ) -> Result<Vec<ContentNode>, ConnectorError> {
        permissions::retrieve_permissions(self.store.as_ref(), connector_id, parent_internal_id)
            .await
    }

    /// Batch fetch of content nodes by internal id.
    pub async fn retrieve_content_nodes(
        &self,
        connector_id: ConnectorId,
        internal_ids: &[String],
    ) -> Result<Vec<ContentNode>, ConnectorError> {
        permissions::retrieve_content_nodes(self.store.as_ref(), connector_id, internal_ids).await
    }

    /// Ordered ancestor internal ids of a node, nearest-first.
    pub async fn retrieve_content_node_parents(
        &self,
        connector_id: ConnectorId,
        internal_id: &str,
    ) -> Result<Vec<String>, ConnectorError> {
        parents::retrieve_content_node_parents(self.store.as_ref(), connector_id, internal_id)
            .await
    }

    /// Store handle for callers wiring the crawl engine's write path.
    pub fn store(&self) -> &Arc<dyn ConnectorStore> {
        &self.store
    }
}
