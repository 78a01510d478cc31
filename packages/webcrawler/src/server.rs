//! HTTP surface for the connector operations.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::connector::WebcrawlerConnector;
use crate::error::ConnectorError;
use crate::models::WebCrawlerConfiguration;
use crate::types::{ConnectorId, ContentNode, DataSourceConfig, WebCrawlerConfig};

pub struct ApiError(ConnectorError);

impl From<ConnectorError> for ApiError {
    fn from(error: ConnectorError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            error if error.is_not_found() => StatusCode::NOT_FOUND,
            ConnectorError::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
            ConnectorError::Workflow(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Connector request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

#[derive(Deserialize)]
struct CreateConnectorRequest {
    workspace_id: String,
    data_source_name: String,
    connection_id: String,
    configuration: WebCrawlerConfig,
}

#[derive(Serialize)]
struct CreateConnectorResponse {
    connector_id: ConnectorId,
}

#[derive(Deserialize)]
struct PermissionsQuery {
    parent_internal_id: Option<String>,
}

#[derive(Deserialize)]
struct ContentNodesRequest {
    internal_ids: Vec<String>,
}

#[derive(Serialize)]
struct ParentsResponse {
    parents: Vec<String>,
}

async fn health() -> &'static str {
    "ok"
}

async fn create_connector(
    State(connector): State<WebcrawlerConnector>,
    Json(request): Json<CreateConnectorRequest>,
) -> Result<Json<CreateConnectorResponse>, ApiError> {
    let connector_id = connector
        .create(
            DataSourceConfig {
                workspace_id: request.workspace_id,
                data_source_name: request.data_source_name,
            },
            request.connection_id,
            request.configuration,
        )
        .await?;
    Ok(Json(CreateConnectorResponse { connector_id }))
}

async fn retrieve_permissions(
    State(connector): State<WebcrawlerConnector>,
    Path(connector_id): Path<Uuid>,
    Query(query): Query<PermissionsQuery>,
) -> Result<Json<Vec<ContentNode>>, ApiError> {
    let nodes = connector
        .retrieve_permissions(
            ConnectorId(connector_id),
            query.parent_internal_id.as_deref(),
        )
        .await?;
    Ok(Json(nodes))
}

async fn retrieve_content_nodes(
    State(connector): State<WebcrawlerConnector>,
    Path(connector_id): Path<Uuid>,
    Json(request): Json<ContentNodesRequest>,
) -> Result<Json<Vec<ContentNode>>, ApiError> {
    let nodes = connector
        .retrieve_content_nodes(ConnectorId(connector_id), &request.internal_ids)
        .await?;
    Ok(Json(nodes))
}

async fn retrieve_parents(
    State(connector): State<WebcrawlerConnector>,
    Path((connector_id, internal_id)): Path<(Uuid, String)>,
) -> Result<Json<ParentsResponse>, ApiError> {
    let parents = connector
        .retrieve_content_node_parents(ConnectorId(connector_id), &internal_id)
        .await?;
    Ok(Json(ParentsResponse { parents }))
}

async fn get_configuration(
    State(connector): State<WebcrawlerConnector>,
    Path(connector_id): Path<Uuid>,
) -> Result<Json<WebCrawlerConfiguration>, ApiError> {
    let config = connector.configuration(ConnectorId(connector_id)).await?;
    Ok(Json(config))
}

async fn set_configuration(
    State(connector): State<WebcrawlerConnector>,
    Path(connector_id): Path<Uuid>,
    Json(configuration): Json<WebCrawlerConfig>,
) -> Result<StatusCode, ApiError> {
    connector
        .set_configuration(ConnectorId(connector_id), configuration)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn pause_connector(
    State(connector): State<WebcrawlerConnector>,
    Path(connector_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    connector.pause(ConnectorId(connector_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unpause_connector(
    State(connector): State<WebcrawlerConnector>,
    Path(connector_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    connector.unpause(ConnectorId(connector_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stop_connector(
    State(connector): State<WebcrawlerConnector>,
    Path(connector_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    connector.stop(ConnectorId(connector_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cleanup_connector(
    State(connector): State<WebcrawlerConnector>,
    Path(connector_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    connector.cleanup(ConnectorId(connector_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn build_app(connector: WebcrawlerConnector) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/connectors", post(create_connector))
        .route("/connectors/:connector_id", delete(cleanup_connector))
        .route(
            "/connectors/:connector_id/permissions",
            get(retrieve_permissions),
        )
        .route(
            "/connectors/:connector_id/content_nodes",
            post(retrieve_content_nodes),
        )
        .route(
            "/connectors/:connector_id/content_nodes/:internal_id/parents",
            get(retrieve_parents),
        )
        .route(
            "/connectors/:connector_id/configuration",
            get(get_configuration).post(set_configuration),
        )
        .route("/connectors/:connector_id/pause", post(pause_connector))
        .route("/connectors/:connector_id/unpause", post(unpause_connector))
        .route("/connectors/:connector_id/stop", post(stop_connector))
        .layer(TraceLayer::new_for_http())
        .with_state(connector)
}
