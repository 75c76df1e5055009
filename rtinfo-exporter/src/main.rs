/**
 * RTINFO EXPORTER - Point d'entrée
 *
 * RÔLE : Bootstrap config, store, collecteur, registre Prometheus,
 * réception MQTT optionnelle et serveur HTTP.
 */

use anyhow::{Context, Result};
use rtinfo_exporter::config::load_config;
use rtinfo_exporter::health::HealthTracker;
use rtinfo_exporter::http::{build_router, AppState};
use rtinfo_exporter::{mqtt, MetricsRegistry, SnapshotCollector, SnapshotStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    let cfg = load_config().await;
    cfg.validate().context("invalid configuration")?;
    if cfg.push_enabled() && cfg.push_api_key().is_none() {
        warn!("[exporter] push activé sans clé API définie: POST /snapshot répondra 401");
    }
    let cfg = Arc::new(cfg);

    // snapshot partagé, injecté partout (pas de singleton global)
    let store = Arc::new(SnapshotStore::new());
    let collector = SnapshotCollector::new(store);
    let registry = MetricsRegistry::new(collector.clone())
        .context("failed to register metric descriptors")?;
    let health_tracker = HealthTracker::new();

    if let Some(mqtt_cfg) = cfg.mqtt.clone() {
        mqtt::spawn_mqtt_listener(mqtt_cfg, collector.clone(), health_tracker.clone());
    }

    let app_state = AppState {
        collector,
        registry,
        health_tracker,
        cfg: cfg.clone(),
    };
    let app = build_router(app_state);

    let addr: SocketAddr = cfg
        .listen
        .parse()
        .with_context(|| format!("invalid listen address {}", cfg.listen))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("[exporter] listening on http://{addr}{}", cfg.metrics_route());
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
