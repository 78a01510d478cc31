use thiserror::Error;

use crate::types::ConnectorId;

/// Typed failures surfaced by the webcrawler connector API.
///
/// Cycle detection during ancestry resolution is deliberately not a variant:
/// it is logged and truncates the walk without failing the call.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Connector {0} not found")]
    ConnectorNotFound(ConnectorId),

    #[error("Webcrawler configuration not found for connector {0}")]
    ConfigurationNotFound(ConnectorId),

    #[error("Parent node {parent_internal_id} not found for connector {connector_id}")]
    ParentNotFound {
        connector_id: ConnectorId,
        parent_internal_id: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Crawl workflow call failed: {0}")]
    Workflow(#[source] anyhow::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ConnectorError {
    /// True for the family of "the thing you asked about does not exist"
    /// failures, regardless of which entity was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConnectorError::ConnectorNotFound(_)
                | ConnectorError::ConfigurationNotFound(_)
                | ConnectorError::ParentNotFound { .. }
        )
    }
}
