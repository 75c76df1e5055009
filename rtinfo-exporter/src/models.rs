/**
 * MODÈLE DE DONNÉES - Snapshot de flotte rtinfo
 *
 * RÔLE : Représentation en mémoire du dernier état connu de chaque hôte.
 * Le format JSON suit le document produit par l'agrégateur rtinfo
 * (`{"rtinfo": [...]}`), les champs inconnus (débits, iops...) sont ignorés.
 *
 * UTILITÉ : Unité remplacée atomiquement dans le SnapshotStore, jamais mutée ensuite.
 */

use serde::{Deserialize, Serialize};

/// Snapshot complet de la flotte (un HostRecord par hôte surveillé)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    #[serde(rename = "rtinfo", default)]
    pub hosts: Vec<HostRecord>,
}

impl FleetSnapshot {
    pub fn new(hosts: Vec<HostRecord>) -> Self {
        Self { hosts }
    }

    /// Parse un document rtinfo. Un document invalide est une violation du
    /// contrat producteur : il est rejeté ici et n'atteint jamais le store.
    pub fn from_json(payload: &[u8]) -> crate::error::Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// Santé d'un hôte distant à un instant donné
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    pub hostname: String,
    #[serde(rename = "remoteip")]
    pub remote_ip: String,
    #[serde(rename = "uptime", default)]
    pub uptime_seconds: f64,
    #[serde(rename = "cpu_usage", default)]
    pub cpu_usage_percent: Vec<f64>,  // un élément par CPU logique
    #[serde(rename = "loadavg", default)]
    pub load_average: Vec<f64>,       // [1min, 5min, 15min]
    #[serde(default)]
    pub sensors: Sensors,
    #[serde(default)]
    pub memory: Memory,
    #[serde(rename = "network", default)]
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(default)]
    pub disks: Vec<Disk>,
}

impl HostRecord {
    pub fn cpu_temperature_average(&self) -> f64 {
        self.sensors.cpu.average
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sensors {
    #[serde(default)]
    pub cpu: CpuSensor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuSensor {
    #[serde(default)]
    pub average: f64,
}

/// Mémoire vive et swap, en octets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    #[serde(rename = "ram_total", default)]
    pub total_bytes: u64,
    #[serde(rename = "ram_used", default)]
    pub used_bytes: u64,
    #[serde(rename = "swap_total", default)]
    pub swap_total_bytes: u64,
    #[serde(rename = "swap_free", default)]
    pub swap_free_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,                 // eth0, wlan0, etc.
    #[serde(default)]
    pub ip: String,
    #[serde(rename = "rx_data", default)]
    pub rx_bytes: u64,
    #[serde(rename = "tx_data", default)]
    pub tx_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    pub name: String,
    #[serde(default)]
    pub bytes_read: u64,
    #[serde(default)]
    pub bytes_written: u64,
}
