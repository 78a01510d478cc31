//! Ancestry resolution: walk `parent_url` back-references upward from a
//! node to produce its ancestor chain, nearest-first.
//!
//! URLs do not form a tree: redirects and query variants can produce cycles
//! and diamonds in the stored graph, so the walk never assumes acyclicity.

use std::collections::HashSet;

use crate::error::ConnectorError;
use crate::storage::ConnectorStore;
use crate::types::ConnectorId;

/// Resolve the ordered ancestor internal ids of `internal_id`.
///
/// The starting node is looked up as a page (by document id) first, then as
/// a folder (by internal id); a node with no parent yields an empty list. A
/// missing parent folder ends the walk normally. A revisited URL is a cycle:
/// it is logged and the chain accumulated so far is returned, so the call
/// degrades to a partial, still-useful result instead of failing.
///
/// Pure read; repeated calls return the same chain as long as the underlying
/// hierarchy is unchanged.
pub(crate) async fn retrieve_content_node_parents(
    store: &dyn ConnectorStore,
    connector_id: ConnectorId,
    internal_id: &str,
) -> Result<Vec<String>, ConnectorError> {
    store
        .fetch_connector(connector_id)
        .await?
        .ok_or(ConnectorError::ConnectorNotFound(connector_id))?;
    let config = store
        .fetch_configuration(connector_id)
        .await?
        .ok_or(ConnectorError::ConfigurationNotFound(connector_id))?;

    let mut parent_url: Option<String> = None;
    if let Some(page) = store
        .find_page_by_document_id(connector_id, config.id, internal_id)
        .await?
    {
        parent_url = page.parent_url;
    }
    if parent_url.is_none() {
        if let Some(folder) = store
            .find_folder_by_internal_id(connector_id, config.id, internal_id)
            .await?
        {
            parent_url = folder.parent_url;
        }
    }

    let mut parents: Vec<String> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();

    while let Some(url) = parent_url.take() {
        let Some(folder) = store
            .find_folder_by_url(connector_id, config.id, &url)
            .await?
        else {
            // Concurrently vanished or never materialized: no further
            // ancestors, not an error.
            break;
        };

        if !visited.insert(folder.url.clone()) {
            tracing::error!(
                connector_id = %connector_id,
                internal_id = internal_id,
                parents = ?parents,
                "Found a cycle in the parents tree"
            );
            break;
        }

        parents.push(folder.internal_id.clone());
        parent_url = folder.parent_url;
    }

    Ok(parents)
}
