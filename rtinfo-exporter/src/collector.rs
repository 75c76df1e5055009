/**
 * SNAPSHOT COLLECTOR - Traduction du snapshot de flotte en échantillons
 *
 * RÔLE : Détient le snapshot courant (via le SnapshotStore) et l'étend de
 * façon déterministe, à chaque scrape, en un échantillon par métrique et par
 * combinaison de labels.
 *
 * FONCTIONNEMENT :
 * - set_snapshot : remplacement atomique, jamais d'erreur
 * - describe     : les 12 descripteurs du catalogue, indépendants du snapshot
 * - collect      : capture UNE génération puis parcourt tous les hôtes
 *
 * Ordre d'émission par hôte : uptime, cpu[], load[], température,
 * mémoire/swap, puis pour chaque interface sent/received, pour chaque disque
 * read/write. Labels : hostname et remoteIP toujours en tête.
 */

use crate::catalog::{MetricCatalog, MetricDescriptor, MetricId};
use crate::models::{FleetSnapshot, HostRecord};
use crate::store::{SharedStore, SnapshotStore};
use std::sync::Arc;
use tracing::debug;

/// Une valeur émise pour un descripteur, avec son tuple de labels complet
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub metric: MetricId,
    pub label_values: Vec<String>,
    pub value: f64,
}

impl Sample {
    pub fn name(&self) -> &'static str {
        self.metric.name()
    }

    pub fn label(&self, catalog: &MetricCatalog, label_name: &str) -> Option<&str> {
        let descriptor = catalog.get(self.metric);
        descriptor
            .label_names
            .iter()
            .position(|l| *l == label_name)
            .and_then(|i| self.label_values.get(i))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotCollector {
    catalog: Arc<MetricCatalog>,
    store: SharedStore,
}

impl SnapshotCollector {
    pub fn new(store: SharedStore) -> Self {
        Self {
            catalog: Arc::new(MetricCatalog::new()),
            store,
        }
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn set_snapshot(&self, snapshot: FleetSnapshot) {
        self.store.set(snapshot);
    }

    pub fn describe(&self) -> &[MetricDescriptor] {
        self.catalog.descriptors()
    }

    /// Scrape complet, matérialisé
    pub fn collect(&self) -> Vec<Sample> {
        let mut samples = Vec::new();
        self.collect_with(|s| samples.push(s));
        samples
    }

    /// Forme callback : `emit` reçoit chaque échantillon exactement une fois.
    /// Retourne le nombre d'échantillons émis.
    pub fn collect_with<F>(&self, mut emit: F) -> usize
    where
        F: FnMut(Sample),
    {
        let Some(snapshot) = self.store.load() else {
            debug!("collect: no snapshot set yet");
            return 0;
        };

        let mut count = 0usize;
        for host in &snapshot.hosts {
            expand_host(&self.catalog, host, &mut |s| {
                count += 1;
                emit(s);
            });
        }
        debug!(hosts = snapshot.len(), samples = count, "collect done");
        count
    }
}

struct HostEmitter<'a, F: FnMut(Sample)> {
    catalog: &'a MetricCatalog,
    host: &'a HostRecord,
    emit: &'a mut F,
}

impl<F: FnMut(Sample)> HostEmitter<'_, F> {
    fn emit(&mut self, metric: MetricId, value: f64, extra: &[&str]) {
        let mut label_values = Vec::with_capacity(2 + extra.len());
        label_values.push(self.host.hostname.clone());
        label_values.push(self.host.remote_ip.clone());
        label_values.extend(extra.iter().map(|v| v.to_string()));

        // Désynchronisation catalogue / expansion = défaut de programmation
        debug_assert_eq!(
            label_values.len(),
            self.catalog.get(metric).label_names.len(),
            "label arity mismatch for {}",
            metric.name()
        );

        (self.emit)(Sample { metric, label_values, value });
    }
}

fn expand_host<F: FnMut(Sample)>(catalog: &MetricCatalog, host: &HostRecord, emit: &mut F) {
    let mut out = HostEmitter { catalog, host, emit };

    out.emit(MetricId::SystemUptime, host.uptime_seconds, &[]);

    for (i, usage) in host.cpu_usage_percent.iter().enumerate() {
        out.emit(MetricId::CpuUsage, *usage, &[i.to_string().as_str()]);
    }

    for (i, load) in host.load_average.iter().enumerate() {
        out.emit(MetricId::LoadAverage, *load, &[i.to_string().as_str()]);
    }

    out.emit(MetricId::CpuTemperature, host.cpu_temperature_average(), &[]);

    out.emit(MetricId::MemoryTotal, host.memory.total_bytes as f64, &[]);
    out.emit(MetricId::MemoryUsed, host.memory.used_bytes as f64, &[]);
    out.emit(MetricId::SwapTotal, host.memory.swap_total_bytes as f64, &[]);
    out.emit(MetricId::SwapFree, host.memory.swap_free_bytes as f64, &[]);

    for nic in &host.network_interfaces {
        let labels = [nic.name.as_str(), nic.ip.as_str()];
        out.emit(MetricId::NetworkSent, nic.tx_bytes as f64, &labels);
        out.emit(MetricId::NetworkReceived, nic.rx_bytes as f64, &labels);
    }

    for disk in &host.disks {
        let labels = [disk.name.as_str()];
        out.emit(MetricId::DiskRead, disk.bytes_read as f64, &labels);
        out.emit(MetricId::DiskWrite, disk.bytes_written as f64, &labels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Disk, NetworkInterface};

    fn collector() -> SnapshotCollector {
        SnapshotCollector::new(Arc::new(SnapshotStore::new()))
    }

    fn example_host() -> HostRecord {
        HostRecord {
            hostname: "h1".into(),
            remote_ip: "10.0.0.1".into(),
            uptime_seconds: 42.0,
            cpu_usage_percent: vec![12.5, 33.0],
            load_average: vec![0.5],
            network_interfaces: vec![NetworkInterface {
                name: "eth0".into(),
                ip: "10.0.0.1".into(),
                rx_bytes: 100,
                tx_bytes: 50,
            }],
            ..Default::default()
        }
    }

    fn of(samples: &[Sample], metric: MetricId) -> Vec<&Sample> {
        samples.iter().filter(|s| s.metric == metric).collect()
    }

    #[test]
    fn test_collect_without_snapshot_is_empty() {
        let c = collector();
        assert!(c.collect().is_empty());
        assert_eq!(c.collect_with(|_| {}), 0);
    }

    #[test]
    fn test_describe_is_independent_of_snapshot() {
        let c = collector();
        let before: Vec<&str> = c.describe().iter().map(|d| d.name).collect();
        c.set_snapshot(FleetSnapshot::new(vec![example_host()]));
        let after: Vec<&str> = c.describe().iter().map(|d| d.name).collect();

        assert_eq!(before.len(), 12);
        assert_eq!(before, after);
    }

    #[test]
    fn test_single_host_expansion() {
        let c = collector();
        c.set_snapshot(FleetSnapshot::new(vec![example_host()]));
        let samples = c.collect();

        // 1 uptime + 2 cpu + 1 load + 1 temp + 4 mem/swap + 2 nic
        assert_eq!(samples.len(), 11);
        assert_eq!(of(&samples, MetricId::SystemUptime).len(), 1);

        let cpu = of(&samples, MetricId::CpuUsage);
        assert_eq!(cpu.len(), 2);
        assert_eq!(cpu[0].label_values, vec!["h1", "10.0.0.1", "0"]);
        assert_eq!(cpu[0].value, 12.5);
        assert_eq!(cpu[1].label_values, vec!["h1", "10.0.0.1", "1"]);
        assert_eq!(cpu[1].value, 33.0);

        let load = of(&samples, MetricId::LoadAverage);
        assert_eq!(load.len(), 1);
        assert_eq!(load[0].label(c.catalog(), "cpu"), Some("0"));
        assert_eq!(load[0].value, 0.5);

        assert_eq!(of(&samples, MetricId::CpuTemperature).len(), 1);
        for m in [MetricId::MemoryTotal, MetricId::MemoryUsed, MetricId::SwapTotal, MetricId::SwapFree] {
            assert_eq!(of(&samples, m).len(), 1);
        }

        let rx = of(&samples, MetricId::NetworkReceived);
        assert_eq!(rx.len(), 1);
        assert_eq!(rx[0].label_values, vec!["h1", "10.0.0.1", "eth0", "10.0.0.1"]);
        assert_eq!(rx[0].value, 100.0);

        let tx = of(&samples, MetricId::NetworkSent);
        assert_eq!(tx.len(), 1);
        assert_eq!(tx[0].value, 50.0);

        assert!(of(&samples, MetricId::DiskRead).is_empty());
        assert!(of(&samples, MetricId::DiskWrite).is_empty());
    }

    #[test]
    fn test_emission_order_per_host() {
        let c = collector();
        let mut host = example_host();
        host.disks.push(Disk { name: "sda".into(), bytes_read: 1, bytes_written: 2 });
        c.set_snapshot(FleetSnapshot::new(vec![host]));

        let order: Vec<MetricId> = c.collect().iter().map(|s| s.metric).collect();
        assert_eq!(
            order,
            vec![
                MetricId::SystemUptime,
                MetricId::CpuUsage,
                MetricId::CpuUsage,
                MetricId::LoadAverage,
                MetricId::CpuTemperature,
                MetricId::MemoryTotal,
                MetricId::MemoryUsed,
                MetricId::SwapTotal,
                MetricId::SwapFree,
                MetricId::NetworkSent,
                MetricId::NetworkReceived,
                MetricId::DiskRead,
                MetricId::DiskWrite,
            ]
        );
    }

    #[test]
    fn test_labels_never_leak_across_hosts() {
        let c = collector();
        let mut h2 = example_host();
        h2.hostname = "h2".into();
        h2.remote_ip = "10.0.0.2".into();
        h2.disks.push(Disk { name: "nvme0n1".into(), bytes_read: 10, bytes_written: 20 });
        c.set_snapshot(FleetSnapshot::new(vec![example_host(), h2]));

        let samples = c.collect();
        assert_eq!(samples.len(), 11 + 13);
        for s in &samples {
            match s.label_values[0].as_str() {
                "h1" => assert_eq!(s.label_values[1], "10.0.0.1"),
                "h2" => assert_eq!(s.label_values[1], "10.0.0.2"),
                other => panic!("unexpected hostname {other}"),
            }
        }

        let disk_hosts: Vec<&str> = of(&samples, MetricId::DiskRead)
            .iter()
            .map(|s| s.label_values[0].as_str())
            .collect();
        assert_eq!(disk_hosts, vec!["h2"]);
    }

    #[test]
    fn test_collect_is_idempotent() {
        let c = collector();
        c.set_snapshot(FleetSnapshot::new(vec![example_host()]));
        assert_eq!(c.collect(), c.collect());
    }

    #[test]
    fn test_label_arity_matches_catalog() {
        let c = collector();
        let mut host = example_host();
        host.disks.push(Disk { name: "sda".into(), ..Default::default() });
        c.set_snapshot(FleetSnapshot::new(vec![host]));

        for s in c.collect() {
            assert_eq!(s.label_values.len(), c.catalog().get(s.metric).label_names.len());
        }
    }
}
