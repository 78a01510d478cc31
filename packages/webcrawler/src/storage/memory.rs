//! In-memory [`ConnectorStore`] implementation for tests and local
//! development. One `RwLock` over the whole state keeps multi-table
//! operations (create, cascade delete) atomic, matching the transactional
//! boundaries of the Postgres store.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Connector, Folder, Page, WebCrawlerConfiguration};
use crate::storage::ConnectorStore;
use crate::types::{ConfigurationId, ConnectorId, DataSourceConfig, WebCrawlerConfig};

#[derive(Default)]
struct Inner {
    connectors: HashMap<ConnectorId, Connector>,
    configurations: HashMap<ConnectorId, WebCrawlerConfiguration>,
    folders: HashMap<(ConnectorId, ConfigurationId, String), Folder>,
    pages: HashMap<(ConnectorId, ConfigurationId, String), Page>,
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectorStore for MemoryStore {
    async fn create_connector(
        &self,
        data_source: &DataSourceConfig,
        connection_id: &str,
        configuration: &WebCrawlerConfig,
    ) -> Result<(Connector, WebCrawlerConfiguration)> {
        let now = Utc::now();
        let connector = Connector {
            id: ConnectorId::new(),
            workspace_id: data_source.workspace_id.clone(),
            data_source_name: data_source.data_source_name.clone(),
            connection_id: connection_id.to_string(),
            paused: false,
            created_at: now,
            updated_at: now,
        };
        let config = WebCrawlerConfiguration {
            id: ConfigurationId::new(),
            connector_id: connector.id,
            url: configuration.url.clone(),
            max_page_to_crawl: configuration.max_page_to_crawl,
            crawl_mode: configuration.crawl_mode,
            depth: configuration.depth,
            crawl_frequency: configuration.crawl_frequency,
            last_crawled_at: None,
            headers: configuration.headers.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.write().unwrap();
        inner.connectors.insert(connector.id, connector.clone());
        inner.configurations.insert(connector.id, config.clone());
        Ok((connector, config))
    }

    async fn fetch_connector(&self, connector_id: ConnectorId) -> Result<Option<Connector>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.connectors.get(&connector_id).cloned())
    }

    async fn set_connector_paused(
        &self,
        connector_id: ConnectorId,
        paused: bool,
    ) -> Result<Option<Connector>> {
        let mut inner = self.inner.write().unwrap();
        Ok(inner.connectors.get_mut(&connector_id).map(|connector| {
            connector.paused = paused;
            connector.updated_at = Utc::now();
            connector.clone()
        }))
    }

    async fn delete_connector(&self, connector_id: ConnectorId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.connectors.remove(&connector_id);
        inner.configurations.remove(&connector_id);
        inner.folders.retain(|(cid, _, _), _| *cid != connector_id);
        inner.pages.retain(|(cid, _, _), _| *cid != connector_id);
        Ok(())
    }

    async fn fetch_configuration(
        &self,
        connector_id: ConnectorId,
    ) -> Result<Option<WebCrawlerConfiguration>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.configurations.get(&connector_id).cloned())
    }

    async fn update_configuration(
        &self,
        connector_id: ConnectorId,
        configuration: &WebCrawlerConfig,
    ) -> Result<Option<WebCrawlerConfiguration>> {
        let mut inner = self.inner.write().unwrap();
        Ok(inner.configurations.get_mut(&connector_id).map(|stored| {
            stored.url = configuration.url.clone();
            stored.max_page_to_crawl = configuration.max_page_to_crawl;
            stored.crawl_mode = configuration.crawl_mode;
            stored.depth = configuration.depth;
            stored.crawl_frequency = configuration.crawl_frequency;
            stored.headers = configuration.headers.clone();
            stored.updated_at = Utc::now();
            stored.clone()
        }))
    }

    async fn mark_crawled(&self, connector_id: ConnectorId, at: DateTime<Utc>) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if let Some(stored) = inner.configurations.get_mut(&connector_id) {
            stored.last_crawled_at = Some(at);
            stored.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn upsert_folder(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        url: &str,
        parent_url: Option<&str>,
        internal_id: &str,
    ) -> Result<Folder> {
        let now = Utc::now();
        let key = (connector_id, configuration_id, url.to_string());
        let mut inner = self.inner.write().unwrap();
        let folder = inner
            .folders
            .entry(key)
            .and_modify(|existing| {
                existing.parent_url = parent_url.map(str::to_string);
                existing.internal_id = internal_id.to_string();
                existing.updated_at = now;
            })
            .or_insert_with(|| Folder {
                id: Uuid::now_v7(),
                connector_id,
                configuration_id,
                url: url.to_string(),
                parent_url: parent_url.map(str::to_string),
                internal_id: internal_id.to_string(),
                created_at: now,
                updated_at: now,
            });
        Ok(folder.clone())
    }

    async fn find_folder_by_url(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        url: &str,
    ) -> Result<Option<Folder>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .folders
            .get(&(connector_id, configuration_id, url.to_string()))
            .cloned())
    }

    async fn find_folder_by_internal_id(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        internal_id: &str,
    ) -> Result<Option<Folder>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .folders
            .values()
            .find(|folder| {
                folder.connector_id == connector_id
                    && folder.configuration_id == configuration_id
                    && folder.internal_id == internal_id
            })
            .cloned())
    }

    async fn find_folders_by_parent(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        parent_url: Option<&str>,
    ) -> Result<Vec<Folder>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .folders
            .values()
            .filter(|folder| {
                folder.connector_id == connector_id
                    && folder.configuration_id == configuration_id
                    && folder.parent_url.as_deref() == parent_url
            })
            .cloned()
            .collect())
    }

    async fn find_folders_by_internal_ids(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        internal_ids: &[String],
    ) -> Result<Vec<Folder>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .folders
            .values()
            .filter(|folder| {
                folder.connector_id == connector_id
                    && folder.configuration_id == configuration_id
                    && internal_ids.contains(&folder.internal_id)
            })
            .cloned()
            .collect())
    }

    async fn upsert_page(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        url: &str,
        parent_url: Option<&str>,
        document_id: &str,
        title: Option<&str>,
    ) -> Result<Page> {
        let now = Utc::now();
        let key = (connector_id, configuration_id, url.to_string());
        let mut inner = self.inner.write().unwrap();
        let page = inner
            .pages
            .entry(key)
            .and_modify(|existing| {
                existing.parent_url = parent_url.map(str::to_string);
                existing.document_id = document_id.to_string();
                existing.title = title.map(str::to_string);
                existing.updated_at = now;
            })
            .or_insert_with(|| Page {
                id: Uuid::now_v7(),
                connector_id,
                configuration_id,
                url: url.to_string(),
                parent_url: parent_url.map(str::to_string),
                document_id: document_id.to_string(),
                title: title.map(str::to_string),
                created_at: now,
                updated_at: now,
            });
        Ok(page.clone())
    }

    async fn find_page_by_document_id(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        document_id: &str,
    ) -> Result<Option<Page>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .pages
            .values()
            .find(|page| {
                page.connector_id == connector_id
                    && page.configuration_id == configuration_id
                    && page.document_id == document_id
            })
            .cloned())
    }

    async fn find_pages_by_parent(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        parent_url: Option<&str>,
    ) -> Result<Vec<Page>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .pages
            .values()
            .filter(|page| {
                page.connector_id == connector_id
                    && page.configuration_id == configuration_id
                    && page.parent_url.as_deref() == parent_url
            })
            .cloned()
            .collect())
    }

    async fn find_pages_by_document_ids(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        document_ids: &[String],
    ) -> Result<Vec<Page>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .pages
            .values()
            .filter(|page| {
                page.connector_id == connector_id
                    && page.configuration_id == configuration_id
                    && document_ids.contains(&page.document_id)
            })
            .cloned()
            .collect())
    }
}
