//! Persistence facade for connectors, configurations, and the crawled
//! folder/page hierarchy.
//!
//! No business rules live here: absence is a valid `Ok(None)` / empty-vec
//! result, never an error, and callers decide whether that is fatal.
//! Hierarchy reads are always scoped by `(connector_id, configuration_id)`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Connector, Folder, Page, WebCrawlerConfiguration};
use crate::types::{ConfigurationId, ConnectorId, DataSourceConfig, WebCrawlerConfig};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[async_trait]
pub trait ConnectorStore: Send + Sync {
    // Connectors

    /// Persist a connector and its crawl configuration in one transaction.
    /// Header values in `configuration` are stored verbatim; sentinel
    /// merging happens in the lifecycle layer before this is called.
    async fn create_connector(
        &self,
        data_source: &DataSourceConfig,
        connection_id: &str,
        configuration: &WebCrawlerConfig,
    ) -> Result<(Connector, WebCrawlerConfiguration)>;

    async fn fetch_connector(&self, connector_id: ConnectorId) -> Result<Option<Connector>>;

    /// Returns the updated connector, or `None` when no such row exists.
    async fn set_connector_paused(
        &self,
        connector_id: ConnectorId,
        paused: bool,
    ) -> Result<Option<Connector>>;

    /// Delete the connector and, cascading, its configuration and every
    /// folder and page row scoped to it.
    async fn delete_connector(&self, connector_id: ConnectorId) -> Result<()>;

    // Configurations

    async fn fetch_configuration(
        &self,
        connector_id: ConnectorId,
    ) -> Result<Option<WebCrawlerConfiguration>>;

    /// Replace the stored configuration fields and headers. Returns the
    /// updated row, or `None` when the connector has no configuration.
    async fn update_configuration(
        &self,
        connector_id: ConnectorId,
        configuration: &WebCrawlerConfig,
    ) -> Result<Option<WebCrawlerConfiguration>>;

    /// Stamp the time the external engine finished a crawl.
    async fn mark_crawled(&self, connector_id: ConnectorId, at: DateTime<Utc>) -> Result<()>;

    // Folders

    /// Insert or refresh a folder row, keyed by
    /// `(connector_id, configuration_id, url)`.
    async fn upsert_folder(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        url: &str,
        parent_url: Option<&str>,
        internal_id: &str,
    ) -> Result<Folder>;

    async fn find_folder_by_url(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        url: &str,
    ) -> Result<Option<Folder>>;

    async fn find_folder_by_internal_id(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        internal_id: &str,
    ) -> Result<Option<Folder>>;

    /// Direct children folders of `parent_url`; `None` selects the roots.
    async fn find_folders_by_parent(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        parent_url: Option<&str>,
    ) -> Result<Vec<Folder>>;

    async fn find_folders_by_internal_ids(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        internal_ids: &[String],
    ) -> Result<Vec<Folder>>;

    // Pages

    /// Insert or refresh a page row, keyed by
    /// `(connector_id, configuration_id, url)`.
    async fn upsert_page(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        url: &str,
        parent_url: Option<&str>,
        document_id: &str,
        title: Option<&str>,
    ) -> Result<Page>;

    async fn find_page_by_document_id(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        document_id: &str,
    ) -> Result<Option<Page>>;

    /// Direct children pages of `parent_url`; `None` selects the roots.
    async fn find_pages_by_parent(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        parent_url: Option<&str>,
    ) -> Result<Vec<Page>>;

    async fn find_pages_by_document_ids(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        document_ids: &[String],
    ) -> Result<Vec<Page>>;
}
