//! HTTP server for collection requests.
//!
//! Provides endpoints for:
//! - `POST /collections` - Submit a new collection request
//! - `GET /health` - Health check

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};
use uuid::Uuid;

use curator_common::Geometry;
use tile_store::TileStore;

/// Shared state for the HTTP server.
pub struct ServerState {
    pub store: TileStore,
}

/// Inbound collection request body. Field names follow the external
/// contract.
#[derive(Debug, Deserialize)]
pub struct NewCollectionRequest {
    #[serde(rename = "StartDate")]
    pub start_date: NaiveDate,

    #[serde(rename = "EndDate", default)]
    pub end_date: Option<NaiveDate>,

    /// Raw extent payload; coordinate emptiness is checked before the
    /// geometry is parsed.
    #[serde(rename = "Extent")]
    pub extent: Value,
}

/// Response body for a created collection request.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub code: u16,
    pub message: String,
    pub new_collection_id: Uuid,
    pub success: String,
}

/// Response body for a malformed request payload.
#[derive(Debug, Serialize)]
pub struct InvalidDataResponse {
    pub code: u16,
    pub message: String,
    pub error: String,
    pub success: String,
}

/// Response body for an extent without coordinates. The external contract
/// uses a boolean here, unlike the other responses.
#[derive(Debug, Serialize)]
pub struct InvalidExtentResponse {
    pub code: u16,
    pub message: String,
    pub error: String,
    pub success: bool,
}

fn invalid_data(error: String) -> Response {
    let body = InvalidDataResponse {
        code: 400,
        message: "Invalid request data.".to_string(),
        error,
        success: "false".to_string(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Whether the extent payload is missing coordinates, or carries an empty
/// outer array, or an empty first ring.
fn extent_has_empty_coordinates(extent: &Value) -> bool {
    match extent.get("coordinates").and_then(Value::as_array) {
        None => true,
        Some(outer) => match outer.first() {
            None => true,
            Some(first) => first.as_array().map_or(false, Vec::is_empty),
        },
    }
}

/// Parse the extent into a geometry. A payload without a `type` tag is
/// treated as a bare polygon coordinate array.
fn parse_extent(extent: &Value) -> Result<Geometry, serde_json::Error> {
    if extent.get("type").is_some() {
        serde_json::from_value(extent.clone())
    } else {
        let coordinates = extent.get("coordinates").cloned().unwrap_or(Value::Null);
        Ok(Geometry::Polygon {
            coordinates: serde_json::from_value(coordinates)?,
        })
    }
}

/// POST /collections - Submit a new collection request
async fn create_collection_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> Response {
    debug!(body = %body, "Received a new collection request");

    let request: NewCollectionRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => return invalid_data(e.to_string()),
    };

    if extent_has_empty_coordinates(&request.extent) {
        let body = InvalidExtentResponse {
            code: 400,
            message: "Invalid Extent.".to_string(),
            error: "Extent has empty coordinates.".to_string(),
            success: false,
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let extent = match parse_extent(&request.extent) {
        Ok(extent) => extent,
        Err(e) => return invalid_data(e.to_string()),
    };

    // End date defaults to five days after the start when absent.
    let end_date = request
        .end_date
        .unwrap_or(request.start_date + Duration::days(5));

    // Requests are auto-accepted for now.
    let created = match state
        .store
        .insert_request(request.start_date, end_date, &extent, true)
        .await
    {
        Ok(created) => created,
        Err(e) => {
            error!(error = %e, "Failed to persist collection request");
            let body = InvalidDataResponse {
                code: 500,
                message: "Failed to persist collection request.".to_string(),
                error: e.to_string(),
                success: "false".to_string(),
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
    };

    info!(new_collection_id = %created.id, "Collection request initiated");

    let body = CreatedResponse {
        code: 201,
        message: "New collection request initiated successfully.".to_string(),
        new_collection_id: created.id,
        success: "true".to_string(),
    };
    (StatusCode::CREATED, Json(body)).into_response()
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// GET /health - Health check
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "curator-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the HTTP router.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/collections", post(create_collection_handler))
        .route("/health", get(health_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(Extension(state))
}

/// Start the HTTP server.
pub async fn start_server(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port = port, "Starting curator HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
