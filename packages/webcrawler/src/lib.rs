pub mod activities;
pub mod config;
pub mod connector;
pub mod error;
pub mod models;
pub mod parents;
pub mod permissions;
pub mod server;
pub mod storage;
pub mod types;
pub mod urls;
pub mod workflow;

// Re-exports for clean API
pub use connector::WebcrawlerConnector;
pub use error::ConnectorError;
pub use models::{Connector, Folder, Page, WebCrawlerConfiguration};
pub use storage::{ConnectorStore, MemoryStore, PostgresStore};
pub use types::{
    ConfigurationId, ConnectorId, ContentNode, ContentNodeType, CrawlFrequency, CrawlMode,
    DataSourceConfig, WebCrawlerConfig, DEPTH_OPTIONS, HEADER_REDACTED_VALUE,
    WEBCRAWLER_MAX_PAGES,
};
pub use urls::{
    display_name_for_page, folders_for_url, normalize_folder_url, stable_id_for_url, ResourceKind,
};
pub use workflow::{CrawlWorkflowClient, HttpWorkflowClient};
