//! HTTP API server

use super::{
    error::{invalid_body, ApiError},
    state::AppState,
};
use crate::types::{
    DefinitionEntry, DefinitionRequestBody, TransformRequestBody, TransformResult,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 3000).into(),
        }
    }
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

/// Build the router over `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/transform", post(transform_handler))
        .route("/api/definitions", post(definition_handler))
        // Health check
        .route("/health", get(health_handler))
        // State
        .with_state(state)
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

impl ApiServer {
    /// Create new API server
    pub fn new(config: ApiServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Get instance ID
    pub fn instance_id(&self) -> &str {
        &self.state.instance_id
    }

    /// Bind and serve until the process is stopped
    pub async fn serve(self) -> anyhow::Result<()> {
        if !self.state.has_credentials() {
            warn!(
                "{} is not set; transform and definition requests will fail as unauthenticated",
                crate::config::API_KEY_ENV
            );
        }

        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!(
            "API server [{}] listening on http://{}",
            self.state.instance_id, self.config.addr
        );

        axum::serve(listener, router(self.state)).await?;
        Ok(())
    }
}

/// Transform handler
async fn transform_handler(
    State(state): State<AppState>,
    payload: Result<Json<TransformRequestBody>, JsonRejection>,
) -> Result<Json<TransformResult>, ApiError> {
    let Json(body) = payload.map_err(ApiError::rejection)?;
    let request = body.validate()?;
    let result = state.transform.handle(&request).await?;
    Ok(Json(result))
}

/// Definition handler; failure bodies carry no `details`
async fn definition_handler(
    State(state): State<AppState>,
    payload: Result<Json<DefinitionRequestBody>, JsonRejection>,
) -> Result<Json<DefinitionEntry>, ApiError> {
    let Json(body) =
        payload.map_err(|rejection| ApiError::without_details(invalid_body(rejection)))?;
    let request = body.validate().map_err(ApiError::without_details)?;
    debug!("Definition requested for '{}'", request.term);
    let entry = state
        .definitions
        .handle(&request)
        .await
        .map_err(ApiError::without_details)?;
    Ok(Json(entry))
}

/// Health check handler
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    instance_id: String,
    credentials: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: state.instance_id.clone(),
        credentials: state.has_credentials(),
    })
}
