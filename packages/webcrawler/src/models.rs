//! Persisted records for the webcrawler connector.
//!
//! Folder and Page rows are written by the external crawl engine as it
//! discovers content; this core only queries and reasons about them. A Page
//! and a Folder may legitimately share the same normalized URL (a page that
//! also acts as a directory for sub-pages).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ConfigurationId, ConnectorId, CrawlFrequency, CrawlMode};

/// A webcrawler connector: one crawled website bound to a data source.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Connector {
    pub id: ConnectorId,
    pub workspace_id: String,
    pub data_source_name: String,
    pub connection_id: String,
    pub paused: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Crawl configuration, one per connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebCrawlerConfiguration {
    pub id: ConfigurationId,
    pub connector_id: ConnectorId,
    pub url: String,
    pub max_page_to_crawl: i32,
    pub crawl_mode: CrawlMode,
    pub depth: i32,
    pub crawl_frequency: CrawlFrequency,
    pub last_crawled_at: Option<DateTime<Utc>>,
    pub headers: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A directory-like grouping node in the crawled hierarchy. Has no document
/// content of its own; its title is derived from the URL at read time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Folder {
    pub id: Uuid,
    pub connector_id: ConnectorId,
    pub configuration_id: ConfigurationId,
    pub url: String,
    pub parent_url: Option<String>,
    pub internal_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A crawled document, addressable in the downstream content store via
/// `document_id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Page {
    pub id: Uuid,
    pub connector_id: ConnectorId,
    pub configuration_id: ConfigurationId,
    pub url: String,
    pub parent_url: Option<String>,
    pub document_id: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
