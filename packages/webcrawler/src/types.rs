use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConnectorError;

/// Unique identifier for a connector
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct ConnectorId(pub Uuid);

impl ConnectorId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a crawl configuration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct ConfigurationId(pub Uuid);

impl ConfigurationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConfigurationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// System-wide ceiling on the page budget of a single crawl.
pub const WEBCRAWLER_MAX_PAGES: i32 = 512;

/// Allowed crawl depths.
pub const DEPTH_OPTIONS: [i32; 6] = [0, 1, 2, 3, 4, 5];

/// Sentinel returned in place of custom header values when a configuration is
/// echoed back to callers. An update carrying this value for a header means
/// "keep the stored value".
pub const HEADER_REDACTED_VALUE: &str = "<REDACTED>";

pub fn is_depth_option(depth: i32) -> bool {
    DEPTH_OPTIONS.contains(&depth)
}

/// Crawl scope: only children of the seed URL, or the whole website
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlMode {
    Child,
    Website,
}

impl std::fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrawlMode::Child => write!(f, "child"),
            CrawlMode::Website => write!(f, "website"),
        }
    }
}

impl std::str::FromStr for CrawlMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "child" => Ok(CrawlMode::Child),
            "website" => Ok(CrawlMode::Website),
            _ => Err(anyhow::anyhow!("Invalid crawl mode: {}", s)),
        }
    }
}

/// How often the external engine re-crawls the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlFrequency {
    Never,
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for CrawlFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrawlFrequency::Never => write!(f, "never"),
            CrawlFrequency::Daily => write!(f, "daily"),
            CrawlFrequency::Weekly => write!(f, "weekly"),
            CrawlFrequency::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for CrawlFrequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "never" => Ok(CrawlFrequency::Never),
            "daily" => Ok(CrawlFrequency::Daily),
            "weekly" => Ok(CrawlFrequency::Weekly),
            "monthly" => Ok(CrawlFrequency::Monthly),
            _ => Err(anyhow::anyhow!("Invalid crawl frequency: {}", s)),
        }
    }
}

/// Binding of a connector to the data source it feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub workspace_id: String,
    pub data_source_name: String,
}

/// Caller-facing crawl configuration blob, accepted on create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebCrawlerConfig {
    pub url: String,
    pub max_page_to_crawl: i32,
    pub crawl_mode: CrawlMode,
    pub depth: i32,
    pub crawl_frequency: CrawlFrequency,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl WebCrawlerConfig {
    pub fn validate(&self) -> Result<(), ConnectorError> {
        if !is_depth_option(self.depth) {
            return Err(ConnectorError::InvalidConfiguration(format!(
                "Invalid depth option {}. Expected one of: {:?}",
                self.depth, DEPTH_OPTIONS
            )));
        }
        if self.max_page_to_crawl > WEBCRAWLER_MAX_PAGES {
            return Err(ConnectorError::InvalidConfiguration(format!(
                "Maximum value for max_page_to_crawl is {}",
                WEBCRAWLER_MAX_PAGES
            )));
        }
        Ok(())
    }
}

/// Replace every header value with the redaction sentinel.
pub fn redact_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .keys()
        .map(|key| (key.clone(), HEADER_REDACTED_VALUE.to_string()))
        .collect()
}

/// Merge incoming headers against the stored ones: a sentinel value means
/// "keep what is stored" (the header is dropped when nothing is stored);
/// any other value wins as-is. Headers absent from `incoming` are dropped.
pub fn merge_headers(
    incoming: &BTreeMap<String, String>,
    existing: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    for (key, value) in incoming {
        if value != HEADER_REDACTED_VALUE {
            merged.insert(key.clone(), value.clone());
        } else if let Some(existing_value) = existing.get(key) {
            merged.insert(key.clone(), existing_value.clone());
        }
    }
    merged
}

/// Node kind exposed through the content tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentNodeType {
    Folder,
    File,
}

/// Uniform tree node exposed to permission and content-node consumers.
/// Computed on read, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub internal_id: String,
    pub parent_internal_id: Option<String>,
    pub title: String,
    pub source_url: Option<String>,
    pub expandable: bool,
    pub node_type: ContentNodeType,
    pub last_updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(depth: i32, max_pages: i32) -> WebCrawlerConfig {
        WebCrawlerConfig {
            url: "https://example.com".to_string(),
            max_page_to_crawl: max_pages,
            crawl_mode: CrawlMode::Website,
            depth,
            crawl_frequency: CrawlFrequency::Weekly,
            headers: BTreeMap::new(),
        }
    }

    #[test]
    fn test_validate_accepts_allowed_ranges() {
        for depth in DEPTH_OPTIONS {
            assert!(config_with(depth, WEBCRAWLER_MAX_PAGES).validate().is_ok());
        }
        assert!(config_with(2, 1).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_depth() {
        assert!(config_with(6, 100).validate().is_err());
        assert!(config_with(-1, 100).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_page_budget_over_maximum() {
        assert!(config_with(2, WEBCRAWLER_MAX_PAGES + 1).validate().is_err());
    }

    #[test]
    fn test_merge_headers_keeps_stored_value_for_sentinel() {
        let mut existing = BTreeMap::new();
        existing.insert("authorization".to_string(), "Bearer secret".to_string());

        let mut incoming = BTreeMap::new();
        incoming.insert("authorization".to_string(), HEADER_REDACTED_VALUE.to_string());

        let merged = merge_headers(&incoming, &existing);
        assert_eq!(merged.get("authorization").map(String::as_str), Some("Bearer secret"));
    }

    #[test]
    fn test_merge_headers_new_value_wins() {
        let mut existing = BTreeMap::new();
        existing.insert("authorization".to_string(), "old".to_string());

        let mut incoming = BTreeMap::new();
        incoming.insert("authorization".to_string(), "new".to_string());

        let merged = merge_headers(&incoming, &existing);
        assert_eq!(merged.get("authorization").map(String::as_str), Some("new"));
    }

    #[test]
    fn test_merge_headers_drops_sentinel_without_stored_value() {
        let existing = BTreeMap::new();

        let mut incoming = BTreeMap::new();
        incoming.insert("x-custom".to_string(), HEADER_REDACTED_VALUE.to_string());

        let merged = merge_headers(&incoming, &existing);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_merge_headers_drops_headers_missing_from_incoming() {
        let mut existing = BTreeMap::new();
        existing.insert("x-old".to_string(), "value".to_string());

        let merged = merge_headers(&BTreeMap::new(), &existing);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_redact_headers_replaces_every_value() {
        let mut headers = BTreeMap::new();
        headers.insert("authorization".to_string(), "Bearer secret".to_string());
        headers.insert("x-api-key".to_string(), "k".to_string());

        let redacted = redact_headers(&headers);
        assert_eq!(redacted.len(), 2);
        assert!(redacted.values().all(|v| v == HEADER_REDACTED_VALUE));
    }

    #[test]
    fn test_crawl_mode_roundtrip() {
        for mode in [CrawlMode::Child, CrawlMode::Website] {
            assert_eq!(mode.to_string().parse::<CrawlMode>().unwrap(), mode);
        }
        assert!("sitemap".parse::<CrawlMode>().is_err());
    }

    #[test]
    fn test_crawl_frequency_roundtrip() {
        for freq in [
            CrawlFrequency::Never,
            CrawlFrequency::Daily,
            CrawlFrequency::Weekly,
            CrawlFrequency::Monthly,
        ] {
            assert_eq!(freq.to_string().parse::<CrawlFrequency>().unwrap(), freq);
        }
        assert!("hourly".parse::<CrawlFrequency>().is_err());
    }
}
