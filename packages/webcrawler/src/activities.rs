//! Write path used by the external crawl engine's durable activities.
//!
//! As the engine discovers pages it calls [`record_page`], which keeps the
//! folder hierarchy consistent with the URLs seen so far: every ancestor
//! folder of the page URL is materialized with its `parent_url`
//! back-reference and stable internal id, then the page itself is upserted
//! under the nearest folder. Re-recording the same URL refreshes the
//! existing rows.

use anyhow::Result;
use chrono::Utc;

use crate::models::Page;
use crate::storage::ConnectorStore;
use crate::types::{ConfigurationId, ConnectorId};
use crate::urls::{folders_for_url, stable_id_for_url, ResourceKind};

/// Upsert a crawled page and the full ancestor folder chain for its URL.
pub async fn record_page(
    store: &dyn ConnectorStore,
    connector_id: ConnectorId,
    configuration_id: ConfigurationId,
    url: &str,
    title: Option<&str>,
) -> Result<Page> {
    let url = url.trim();
    let chain = folders_for_url(url);

    for (index, folder_url) in chain.iter().enumerate() {
        let parent_url = chain.get(index + 1).map(String::as_str);
        store
            .upsert_folder(
                connector_id,
                configuration_id,
                folder_url,
                parent_url,
                &stable_id_for_url(folder_url, ResourceKind::Folder),
            )
            .await?;
    }

    let page = store
        .upsert_page(
            connector_id,
            configuration_id,
            url,
            chain.first().map(String::as_str),
            &stable_id_for_url(url, ResourceKind::File),
            title,
        )
        .await?;

    tracing::debug!(
        connector_id = %connector_id,
        url = url,
        folders = chain.len(),
        "Recorded crawled page"
    );

    Ok(page)
}

/// Stamp the configuration with the time a crawl finished.
pub async fn mark_crawl_complete(
    store: &dyn ConnectorStore,
    connector_id: ConnectorId,
) -> Result<()> {
    store.mark_crawled(connector_id, Utc::now()).await
}
