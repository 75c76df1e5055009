/**
 * CATALOGUE DE MÉTRIQUES - Identités stables exposées au collecteur Prometheus
 *
 * RÔLE : Définit une seule fois l'ensemble complet des métriques que
 * l'exporteur peut émettre (nom, aide, tuple ordonné de labels, type).
 *
 * CONTRAT : la longueur et l'ordre des labels d'un descripteur doivent
 * correspondre exactement aux valeurs fournies à l'émission d'un échantillon.
 * Le catalogue est immuable après construction, aucune erreur possible.
 */

const HOST_LABELS: &[&str] = &["hostname", "remoteIP"];
const CPU_LABELS: &[&str] = &["hostname", "remoteIP", "cpu"];
const NIC_LABELS: &[&str] = &["hostname", "remoteIP", "nic", "ip"];
const DISK_LABELS: &[&str] = &["hostname", "remoteIP", "disk"];

/// Interprétation côté consommateur (rate() sur les compteurs).
/// La monotonie n'est pas vérifiée : on fait confiance au producteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

/// Identifiant des 12 métriques, dans l'ordre du catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricId {
    SystemUptime,
    CpuUsage,
    CpuTemperature,
    LoadAverage,
    MemoryTotal,
    MemoryUsed,
    SwapTotal,
    SwapFree,
    NetworkReceived,
    NetworkSent,
    DiskRead,
    DiskWrite,
}

impl MetricId {
    pub const ALL: [MetricId; 12] = [
        MetricId::SystemUptime,
        MetricId::CpuUsage,
        MetricId::CpuTemperature,
        MetricId::LoadAverage,
        MetricId::MemoryTotal,
        MetricId::MemoryUsed,
        MetricId::SwapTotal,
        MetricId::SwapFree,
        MetricId::NetworkReceived,
        MetricId::NetworkSent,
        MetricId::DiskRead,
        MetricId::DiskWrite,
    ];

    /// Position dans le catalogue
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            MetricId::SystemUptime => "system_uptime_second",
            MetricId::CpuUsage => "cpu_usage_percent",
            MetricId::CpuTemperature => "cpu_temperature_celcius",
            MetricId::LoadAverage => "load_average_unit",
            MetricId::MemoryTotal => "memory_total_byte",
            MetricId::MemoryUsed => "memory_used_byte",
            MetricId::SwapTotal => "swap_total_byte",
            MetricId::SwapFree => "swap_free_byte",
            MetricId::NetworkReceived => "network_received_byte",
            MetricId::NetworkSent => "network_sent_byte",
            MetricId::DiskRead => "disk_read_byte",
            MetricId::DiskWrite => "disk_write_byte",
        }
    }

    fn help(self) -> &'static str {
        match self {
            MetricId::SystemUptime => "Uptime of the system",
            MetricId::CpuUsage => "Percentage of the cpu used",
            MetricId::CpuTemperature => "Average temperature of the cpu",
            MetricId::LoadAverage => "Average load of each cpu",
            MetricId::MemoryTotal => "Total memory available of the system",
            MetricId::MemoryUsed => "Memory used of the system",
            MetricId::SwapTotal => "Total amount of swap",
            MetricId::SwapFree => "Free swap of the system",
            MetricId::NetworkReceived => "Data received on network interface",
            MetricId::NetworkSent => "Data sent on network interface",
            MetricId::DiskRead => "Data read on disk",
            MetricId::DiskWrite => "Data written on disk",
        }
    }

    fn label_names(self) -> &'static [&'static str] {
        match self {
            MetricId::SystemUptime
            | MetricId::CpuTemperature
            | MetricId::MemoryTotal
            | MetricId::MemoryUsed
            | MetricId::SwapTotal
            | MetricId::SwapFree => HOST_LABELS,
            MetricId::CpuUsage | MetricId::LoadAverage => CPU_LABELS,
            MetricId::NetworkReceived | MetricId::NetworkSent => NIC_LABELS,
            MetricId::DiskRead | MetricId::DiskWrite => DISK_LABELS,
        }
    }

    fn kind(self) -> MetricKind {
        match self {
            MetricId::SystemUptime
            | MetricId::NetworkReceived
            | MetricId::NetworkSent
            | MetricId::DiskRead
            | MetricId::DiskWrite => MetricKind::Counter,
            _ => MetricKind::Gauge,
        }
    }
}

/// Identité statique d'une métrique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub id: MetricId,
    pub name: &'static str,
    pub help: &'static str,
    pub label_names: &'static [&'static str],
    pub kind: MetricKind,
}

/// Registre immuable des descripteurs, construit une seule fois
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    descriptors: Vec<MetricDescriptor>,
}

impl MetricCatalog {
    pub fn new() -> Self {
        let descriptors = MetricId::ALL
            .iter()
            .map(|&id| MetricDescriptor {
                id,
                name: id.name(),
                help: id.help(),
                label_names: id.label_names(),
                kind: id.kind(),
            })
            .collect();
        Self { descriptors }
    }

    pub fn descriptors(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, id: MetricId) -> &MetricDescriptor {
        &self.descriptors[id.index()]
    }

    pub fn find(&self, name: &str) -> Option<&MetricDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::new()
    }
}
