use crate::store::SnapshotStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Serialize, Deserialize)]
pub struct ExporterHealth {
    pub uptime_seconds: u64,
    pub hosts_tracked: u32,
    pub snapshots_received: u64,
    pub last_snapshot_at: Option<String>, // RFC3339
    pub last_snapshot_source: Option<String>,
    pub mqtt_status: String,
    pub mqtt_reconnects: u32,
}

#[derive(Debug, Clone)]
struct LastSnapshot {
    at: OffsetDateTime,
    source: &'static str,
}

#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    snapshots_received: Arc<AtomicU64>,
    last_snapshot: Arc<Mutex<Option<LastSnapshot>>>,
    mqtt_reconnects: Arc<AtomicU32>,
    mqtt_status: Arc<Mutex<String>>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            snapshots_received: Arc::new(AtomicU64::new(0)),
            last_snapshot: Arc::new(Mutex::new(None)),
            mqtt_reconnects: Arc::new(AtomicU32::new(0)),
            mqtt_status: Arc::new(Mutex::new("disabled".to_string())),
        }
    }

    /// Appelé par chaque producteur après un `set_snapshot` réussi
    pub fn record_snapshot(&self, source: &'static str) {
        self.snapshots_received.fetch_add(1, Ordering::Relaxed);
        *self.last_snapshot.lock() = Some(LastSnapshot {
            at: OffsetDateTime::now_utc(),
            source,
        });
    }

    pub fn mark_mqtt_connecting(&self) {
        *self.mqtt_status.lock() = "connecting".to_string();
    }

    pub fn mark_mqtt_connected(&self) {
        *self.mqtt_status.lock() = "connected".to_string();
    }

    pub fn increment_reconnects(&self) {
        self.mqtt_reconnects.fetch_add(1, Ordering::Relaxed);
        *self.mqtt_status.lock() = "reconnecting".to_string();
    }

    pub fn get_health(&self, store: &SnapshotStore) -> ExporterHealth {
        let last = self.last_snapshot.lock().clone();
        ExporterHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            hosts_tracked: store.host_count() as u32,
            snapshots_received: self.snapshots_received.load(Ordering::Relaxed),
            last_snapshot_at: last.as_ref().and_then(|l| l.at.format(&Rfc3339).ok()),
            last_snapshot_source: last.map(|l| l.source.to_string()),
            mqtt_status: self.mqtt_status.lock().clone(),
            mqtt_reconnects: self.mqtt_reconnects.load(Ordering::Relaxed),
        }
    }
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}
