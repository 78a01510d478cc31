//! URL normalization and stable identifier derivation.
//!
//! Folder identity is derived from content (the URL), never from storage
//! sequences: folders must be addressable by id before the row round-trips
//! through a client, and the same URL must map to the same id from every
//! flow that touches it.

use sha2::{Digest, Sha256};
use url::Url;

/// Resource kind tag mixed into stable ids, keeping the folder and file id
/// spaces disjoint even for the same URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Folder,
    File,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Folder => "folder",
            ResourceKind::File => "file",
        }
    }
}

fn origin_of(parsed: &Url) -> String {
    let mut origin = format!("{}://", parsed.scheme());
    if let Some(host) = parsed.host_str() {
        origin.push_str(host);
    }
    if let Some(port) = parsed.port() {
        origin.push(':');
        origin.push_str(&port.to_string());
    }
    origin
}

/// Canonical folder form of a URL: scheme + host + path with no trailing
/// slash; query and fragment dropped. A page URL and the folder form of the
/// same location compare equal as plain strings after this.
///
/// Unparsable input falls back to the input with any trailing slash trimmed;
/// hierarchy rows are written from validated URLs, so this only defends
/// against corrupt rows on the read path.
pub fn normalize_folder_url(raw: &str) -> String {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(parsed) => {
            let mut normalized = origin_of(&parsed);
            normalized.push_str(parsed.path());
            normalized.trim_end_matches('/').to_string()
        }
        Err(_) => raw.trim_end_matches('/').to_string(),
    }
}

/// Deterministic identifier for a URL: the kind tag plus a hex SHA-256 over
/// the kind-tagged URL. Stable across calls and machines.
pub fn stable_id_for_url(url: &str, kind: ResourceKind) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(url.as_bytes());
    format!("{}-{}", kind.as_str(), hex::encode(hasher.finalize()))
}

/// Human-readable name for a page: the last non-empty path segment, falling
/// back to the raw URL for root pages or unparsable input.
pub fn display_name_for_page(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|parsed| {
            parsed
                .path()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .next_back()
                .map(str::to_string)
        })
        .unwrap_or_else(|| raw.to_string())
}

/// The folder URL one level above `raw`, or `None` when the URL already sits
/// at the origin.
pub fn parent_folder_url(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    let segments: Vec<&str> = parsed
        .path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        return None;
    }
    let origin = origin_of(&parsed);
    if segments.len() == 1 {
        Some(origin)
    } else {
        Some(format!(
            "{}/{}",
            origin,
            segments[..segments.len() - 1].join("/")
        ))
    }
}

/// All ancestor folder URLs for a page URL, nearest-first, ending at the
/// origin. A page at the origin itself has no ancestors.
pub fn folders_for_url(raw: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = raw.trim().to_string();
    while let Some(parent) = parent_folder_url(&current) {
        chain.push(parent.clone());
        current = parent;
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folder_url() {
        // Trailing slash is dropped
        assert_eq!(
            normalize_folder_url("https://example.com/docs/"),
            "https://example.com/docs"
        );
        // Query and fragment are dropped
        assert_eq!(
            normalize_folder_url("https://example.com/docs?page=2#top"),
            "https://example.com/docs"
        );
        // Root collapses to the origin
        assert_eq!(
            normalize_folder_url("https://example.com/"),
            "https://example.com"
        );
        // Host is lowercased by URL parsing
        assert_eq!(
            normalize_folder_url("https://EXAMPLE.COM/Docs"),
            "https://example.com/Docs"
        );
        // Non-default port is preserved
        assert_eq!(
            normalize_folder_url("http://example.com:8080/a/"),
            "http://example.com:8080/a"
        );
        // Unparsable input: trailing slash trimmed, nothing else
        assert_eq!(normalize_folder_url("not a url/"), "not a url");
    }

    #[test]
    fn test_page_and_folder_form_compare_equal() {
        let page_url = "https://example.com/docs/guides?utm=x";
        let folder_url = "https://example.com/docs/guides/";
        assert_eq!(
            normalize_folder_url(page_url),
            normalize_folder_url(folder_url)
        );
    }

    #[test]
    fn test_stable_id_is_deterministic() {
        let a = stable_id_for_url("https://example.com/docs", ResourceKind::Folder);
        let b = stable_id_for_url("https://example.com/docs", ResourceKind::Folder);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stable_id_distinct_for_distinct_urls() {
        let urls = [
            "https://example.com",
            "https://example.com/docs",
            "https://example.com/docs/guides",
            "https://example.org/docs",
        ];
        let mut ids: Vec<String> = urls
            .iter()
            .map(|u| stable_id_for_url(u, ResourceKind::Folder))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), urls.len());
    }

    #[test]
    fn test_stable_id_distinct_across_kinds() {
        let url = "https://example.com/docs";
        assert_ne!(
            stable_id_for_url(url, ResourceKind::Folder),
            stable_id_for_url(url, ResourceKind::File)
        );
    }

    #[test]
    fn test_display_name_for_page() {
        assert_eq!(
            display_name_for_page("https://example.com/docs/getting-started"),
            "getting-started"
        );
        assert_eq!(
            display_name_for_page("https://example.com/docs/guides/"),
            "guides"
        );
        // Root page falls back to the raw URL
        assert_eq!(
            display_name_for_page("https://example.com/"),
            "https://example.com/"
        );
    }

    #[test]
    fn test_parent_folder_url() {
        assert_eq!(
            parent_folder_url("https://example.com/a/b/c"),
            Some("https://example.com/a/b".to_string())
        );
        assert_eq!(
            parent_folder_url("https://example.com/a"),
            Some("https://example.com".to_string())
        );
        assert_eq!(parent_folder_url("https://example.com/"), None);
        assert_eq!(parent_folder_url("https://example.com"), None);
    }

    #[test]
    fn test_folders_for_url_chain_is_nearest_first() {
        assert_eq!(
            folders_for_url("https://example.com/docs/guides/intro"),
            vec![
                "https://example.com/docs/guides".to_string(),
                "https://example.com/docs".to_string(),
                "https://example.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_folders_for_url_root_page_has_no_ancestors() {
        assert!(folders_for_url("https://example.com/").is_empty());
    }

    #[test]
    fn test_folders_for_url_ignores_query() {
        assert_eq!(
            folders_for_url("https://example.com/a/b?page=2"),
            vec![
                "https://example.com/a".to_string(),
                "https://example.com".to_string(),
            ]
        );
    }
}
