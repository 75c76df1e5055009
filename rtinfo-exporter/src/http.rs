/**
 * API HTTP - Endpoint de scrape Prometheus + administration de l'exporteur
 *
 * ROUTES :
 * - GET  /health          : liveness ("ok")
 * - GET  /metrics         : scrape, ré-expansion complète du snapshot courant
 * - GET  /system/health   : état de l'exporteur (snapshots reçus, MQTT...)
 * - GET  /hosts           : hôtes présents dans le snapshot détenu
 * - POST /snapshot        : remplacement du snapshot (document rtinfo JSON)
 *
 * SÉCURITÉ :
 * - Header x-api-key exigé sur POST /snapshot
 * - Variable de clé absente ou vide : push refusé (401), jamais ouvert
 * - Route absente (404) si le push est désactivé
 */

use crate::collector::SnapshotCollector;
use crate::config::ExporterConfig;
use crate::exposition::MetricsRegistry;
use crate::health::{ExporterHealth, HealthTracker};
use crate::models::FleetSnapshot;
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub collector: SnapshotCollector,
    pub registry: MetricsRegistry,
    pub health_tracker: HealthTracker,
    pub cfg: Arc<ExporterConfig>,
}

#[derive(Serialize)]
struct HostView {
    hostname: String,
    remoteip: String,
    uptime_seconds: f64,
    cpu_count: usize,
    interfaces: Vec<String>,
    disks: Vec<String>,
}

async fn require_api_key(
    State(app): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = app.cfg.push_api_key() else {
        error!("[http] SECURITY: clé API de push non définie - snapshot push refusé");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let ok = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);

    if !ok {
        warn!("[http] snapshot push refusé: x-api-key invalide");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}

pub fn build_router(app_state: AppState) -> Router {
    let metrics_path = app_state.cfg.metrics_route();

    let mut router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/hosts", get(get_hosts))
        .route(&metrics_path, get(get_metrics));

    if app_state.cfg.push_enabled() {
        let push = Router::new()
            .route("/snapshot", post(push_snapshot))
            .route_layer(middleware::from_fn_with_state(app_state.clone(), require_api_key));
        router = router.merge(push);
    }

    router.with_state(app_state)
}

// GET /metrics (scrape)
async fn get_metrics(State(app): State<AppState>) -> Response {
    match app.registry.render() {
        Ok(body) => ([(header::CONTENT_TYPE, app.registry.content_type())], body).into_response(),
        Err(e) => {
            error!("[http] render metrics failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// GET /system/health
async fn get_system_health(State(app): State<AppState>) -> Json<ExporterHealth> {
    Json(app.health_tracker.get_health(app.collector.store()))
}

// GET /hosts
async fn get_hosts(State(app): State<AppState>) -> Json<Vec<HostView>> {
    let Some(snapshot) = app.collector.store().load() else {
        return Json(Vec::new());
    };
    let list = snapshot
        .hosts
        .iter()
        .map(|h| HostView {
            hostname: h.hostname.clone(),
            remoteip: h.remote_ip.clone(),
            uptime_seconds: h.uptime_seconds,
            cpu_count: h.cpu_usage_percent.len(),
            interfaces: h.network_interfaces.iter().map(|n| n.name.clone()).collect(),
            disks: h.disks.iter().map(|d| d.name.clone()).collect(),
        })
        .collect();
    Json(list)
}

// POST /snapshot
async fn push_snapshot(
    State(app): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<serde_json::Value>) {
    match FleetSnapshot::from_json(&body) {
        Ok(snapshot) => {
            let hosts = snapshot.len();
            app.collector.set_snapshot(snapshot);
            app.health_tracker.record_snapshot("http");
            info!("[http] snapshot replaced ({hosts} hosts)");
            (StatusCode::OK, Json(serde_json::json!({ "ok": true, "hosts": hosts })))
        }
        Err(e) => {
            warn!("[http] snapshot JSON invalide: {e}");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "ok": false, "error": e.to_string() })),
            )
        }
    }
}
