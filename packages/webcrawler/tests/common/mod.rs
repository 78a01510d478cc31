//! Shared test harness: in-memory store plus a recording workflow double.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use webcrawler_connector::storage::MemoryStore;
use webcrawler_connector::types::{
    ConfigurationId, ConnectorId, CrawlFrequency, CrawlMode, DataSourceConfig, WebCrawlerConfig,
};
use webcrawler_connector::workflow::CrawlWorkflowClient;
use webcrawler_connector::WebcrawlerConnector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowCall {
    Launch(ConnectorId),
    Stop(ConnectorId),
}

/// Workflow engine double: records every call and can be told to refuse
/// launches or stops.
pub struct RecordingWorkflowClient {
    calls: Mutex<Vec<WorkflowCall>>,
    fail_launch: AtomicBool,
    fail_stop: AtomicBool,
}

impl RecordingWorkflowClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_launch: AtomicBool::new(false),
            fail_stop: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<WorkflowCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_launch(&self, fail: bool) {
        self.fail_launch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_stop(&self, fail: bool) {
        self.fail_stop.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CrawlWorkflowClient for RecordingWorkflowClient {
    async fn launch(&self, connector_id: ConnectorId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(WorkflowCall::Launch(connector_id));
        if self.fail_launch.load(Ordering::SeqCst) {
            anyhow::bail!("workflow engine refused launch");
        }
        Ok(())
    }

    async fn stop(&self, connector_id: ConnectorId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(WorkflowCall::Stop(connector_id));
        if self.fail_stop.load(Ordering::SeqCst) {
            anyhow::bail!("workflow engine refused stop");
        }
        Ok(())
    }
}

pub struct TestHarness {
    pub connector: WebcrawlerConnector,
    pub store: Arc<MemoryStore>,
    pub workflow: Arc<RecordingWorkflowClient>,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let workflow = Arc::new(RecordingWorkflowClient::new());
        let connector = WebcrawlerConnector::new(store.clone(), workflow.clone());
        Self {
            connector,
            store,
            workflow,
        }
    }

    /// Create a connector from the default seed configuration and return its
    /// ids.
    pub async fn create_connector(&self) -> (ConnectorId, ConfigurationId) {
        self.create_connector_with(seed_configuration()).await
    }

    pub async fn create_connector_with(
        &self,
        configuration: WebCrawlerConfig,
    ) -> (ConnectorId, ConfigurationId) {
        let connector_id = self
            .connector
            .create(
                data_source(),
                "connection-1".to_string(),
                configuration,
            )
            .await
            .expect("Failed to create connector");
        let configuration_id = self
            .connector
            .store()
            .fetch_configuration(connector_id)
            .await
            .expect("Failed to fetch configuration")
            .expect("Configuration missing after create")
            .id;
        (connector_id, configuration_id)
    }
}

pub fn data_source() -> DataSourceConfig {
    DataSourceConfig {
        workspace_id: "workspace-1".to_string(),
        data_source_name: "managed-webcrawler".to_string(),
    }
}

pub fn seed_configuration() -> WebCrawlerConfig {
    WebCrawlerConfig {
        url: "https://example.com".to_string(),
        max_page_to_crawl: 128,
        crawl_mode: CrawlMode::Website,
        depth: 3,
        crawl_frequency: CrawlFrequency::Weekly,
        headers: BTreeMap::new(),
    }
}
