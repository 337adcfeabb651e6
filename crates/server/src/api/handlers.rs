use axum::{extract::State, http::header, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use vidfetch_core::{OrchestratorStatus, SanitizedConfig};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;
use crate::{SERVICE_NAME, VERSION};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub supabase_connected: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ServiceInfoResponse {
    pub service: String,
    pub version: String,
    pub status: String,
    pub supabase_connected: bool,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub orchestrator: OrchestratorStatus,
    pub uptime_secs: u64,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        supabase_connected: state.supabase_connected(),
        timestamp: Utc::now(),
    })
}

pub async fn root(State(state): State<Arc<AppState>>) -> Json<ServiceInfoResponse> {
    let endpoints = BTreeMap::from([
        ("/health", "GET - health check"),
        ("/download", "POST - run a download task"),
        ("/metrics", "GET - Prometheus metrics"),
    ]);

    Json(ServiceInfoResponse {
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        status: "running".to_string(),
        supabase_connected: state.supabase_connected(),
        endpoints,
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        orchestrator: state.orchestrator_status(),
        uptime_secs: state.uptime_secs(),
    })
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
