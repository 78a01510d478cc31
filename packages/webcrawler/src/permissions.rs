//! Content-tree resolution: direct children of a node as uniform
//! [`ContentNode`]s, and batch fetch of nodes by internal id.

use std::collections::HashSet;

use crate::error::ConnectorError;
use crate::models::{Folder, Page, WebCrawlerConfiguration};
use crate::storage::ConnectorStore;
use crate::types::{ConnectorId, ContentNode, ContentNodeType};
use crate::urls::{display_name_for_page, normalize_folder_url, stable_id_for_url, ResourceKind};

fn parent_id_for(parent_url: Option<&str>) -> Option<String> {
    parent_url.map(|url| stable_id_for_url(url, ResourceKind::Folder))
}

fn folder_node(folder: &Folder) -> ContentNode {
    ContentNode {
        internal_id: folder.internal_id.clone(),
        parent_internal_id: parent_id_for(folder.parent_url.as_deref()),
        title: display_name_for_page(&folder.url),
        source_url: None,
        expandable: true,
        node_type: ContentNodeType::Folder,
        last_updated_at: folder.updated_at,
    }
}

async fn resolve_configuration(
    store: &dyn ConnectorStore,
    connector_id: ConnectorId,
) -> Result<WebCrawlerConfiguration, ConnectorError> {
    store
        .fetch_connector(connector_id)
        .await?
        .ok_or(ConnectorError::ConnectorNotFound(connector_id))?;
    store
        .fetch_configuration(connector_id)
        .await?
        .ok_or(ConnectorError::ConfigurationNotFound(connector_id))
}

/// List the direct children of `parent_internal_id` (the roots when absent)
/// as content nodes, sorted by title.
///
/// A folder whose URL coincides with a page's normalized URL is not surfaced
/// as a separate node: the page absorbs it, taking the folder's internal id
/// and `expandable` so that expanding the page node lists the folder's
/// children.
pub(crate) async fn retrieve_permissions(
    store: &dyn ConnectorStore,
    connector_id: ConnectorId,
    parent_internal_id: Option<&str>,
) -> Result<Vec<ContentNode>, ConnectorError> {
    let config = resolve_configuration(store, connector_id).await?;

    let parent_url: Option<String> = match parent_internal_id {
        Some(parent_id) => {
            let parent = store
                .find_folder_by_internal_id(connector_id, config.id, parent_id)
                .await?
                .ok_or_else(|| ConnectorError::ParentNotFound {
                    connector_id,
                    parent_internal_id: parent_id.to_string(),
                })?;
            Some(parent.url)
        }
        None => None,
    };

    let folders = store
        .find_folders_by_parent(connector_id, config.id, parent_url.as_deref())
        .await?;
    let pages = store
        .find_pages_by_parent(connector_id, config.id, parent_url.as_deref())
        .await?;

    let normalized_pages: HashSet<String> = pages
        .iter()
        .map(|page| normalize_folder_url(&page.url))
        .collect();
    // Folders that are also pages: the page node stands in for them.
    let excluded_folders: HashSet<&str> = folders
        .iter()
        .map(|folder| folder.url.as_str())
        .filter(|url| normalized_pages.contains(*url))
        .collect();

    let mut nodes: Vec<ContentNode> = folders
        .iter()
        .filter(|folder| !excluded_folders.contains(folder.url.as_str()))
        .map(folder_node)
        .collect();

    nodes.extend(pages.iter().map(|page| {
        let normalized = normalize_folder_url(&page.url);
        let is_file_and_folder = excluded_folders.contains(normalized.as_str());
        ContentNode {
            internal_id: if is_file_and_folder {
                stable_id_for_url(&normalized, ResourceKind::Folder)
            } else {
                page.document_id.clone()
            },
            parent_internal_id: parent_id_for(page.parent_url.as_deref()),
            title: display_name_for_page(&page.url),
            source_url: Some(page.url.clone()),
            expandable: is_file_and_folder,
            node_type: ContentNodeType::File,
            last_updated_at: page.updated_at,
        }
    }));

    nodes.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    Ok(nodes)
}

fn page_node(page: &Page) -> ContentNode {
    ContentNode {
        internal_id: page.document_id.clone(),
        parent_internal_id: parent_id_for(page.parent_url.as_deref()),
        title: page
            .title
            .clone()
            .unwrap_or_else(|| page.url.clone()),
        source_url: Some(page.url.clone()),
        expandable: false,
        node_type: ContentNodeType::File,
        last_updated_at: page.updated_at,
    }
}

/// Batch fetch of content nodes: folders are matched by their stable
/// internal id, pages by document id. Ids that match nothing are silently
/// absent from the result.
pub(crate) async fn retrieve_content_nodes(
    store: &dyn ConnectorStore,
    connector_id: ConnectorId,
    internal_ids: &[String],
) -> Result<Vec<ContentNode>, ConnectorError> {
    let config = resolve_configuration(store, connector_id).await?;

    let folders = store
        .find_folders_by_internal_ids(connector_id, config.id, internal_ids)
        .await?;
    let pages = store
        .find_pages_by_document_ids(connector_id, config.id, internal_ids)
        .await?;

    let mut nodes: Vec<ContentNode> = folders.iter().map(folder_node).collect();
    nodes.extend(pages.iter().map(page_node));
    Ok(nodes)
}
