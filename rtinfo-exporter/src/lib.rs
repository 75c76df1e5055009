//! rtinfo-exporter - Exporteur Prometheus pour une flotte rtinfo
//!
//! Détient le dernier snapshot connu de la flotte et l'étend, à chaque
//! scrape, en échantillons étiquetés :
//! - `catalog`   : les 12 descripteurs de métriques, fixes
//! - `store`     : référence au snapshot, remplacée atomiquement
//! - `collector` : set_snapshot / describe / collect
//! - `exposition`: pont vers la lib `prometheus` + rendu texte
//!
//! Autour du cœur : config YAML, API HTTP (axum), réception MQTT, health.

pub mod catalog;
pub mod collector;
pub mod config;
pub mod error;
pub mod exposition;
pub mod health;
pub mod http;
pub mod models;
pub mod mqtt;
pub mod store;

pub use catalog::{MetricCatalog, MetricDescriptor, MetricId, MetricKind};
pub use collector::{Sample, SnapshotCollector};
pub use error::{ExporterError, Result};
pub use exposition::{MetricsRegistry, PrometheusCollector};
pub use models::{Disk, FleetSnapshot, HostRecord, Memory, NetworkInterface};
pub use store::{SharedStore, SnapshotStore};
