/**
 * EXPOSITION PROMETHEUS - Pont entre le SnapshotCollector et la lib prometheus
 *
 * RÔLE : Implémente `prometheus::core::Collector` au-dessus du collecteur de
 * snapshot : desc() expose les 12 descripteurs, collect() regroupe les
 * échantillons d'UN scrape en une MetricFamily par métrique.
 *
 * Le registre est propre à l'exporteur (pas de registre global) : il est
 * injecté dans le routeur HTTP comme le reste de l'état.
 */

use crate::catalog::MetricKind;
use crate::collector::{Sample, SnapshotCollector};
use crate::error::Result;
use prometheus::core::{Collector, Desc};
use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, Registry, TextEncoder};
use std::collections::HashMap;

pub struct PrometheusCollector {
    inner: SnapshotCollector,
    descs: Vec<Desc>,
}

impl PrometheusCollector {
    pub fn new(inner: SnapshotCollector) -> Result<Self> {
        let descs = inner
            .describe()
            .iter()
            .map(|d| {
                Desc::new(
                    d.name.to_string(),
                    d.help.to_string(),
                    d.label_names.iter().map(|l| l.to_string()).collect(),
                    HashMap::new(),
                )
            })
            .collect::<prometheus::Result<Vec<_>>>()?;

        Ok(Self { inner, descs })
    }

    fn empty_families(&self) -> Vec<MetricFamily> {
        self.inner
            .describe()
            .iter()
            .map(|d| {
                let mut mf = MetricFamily::default();
                mf.set_name(d.name.to_string());
                mf.set_help(d.help.to_string());
                mf.set_field_type(match d.kind {
                    MetricKind::Counter => MetricType::COUNTER,
                    MetricKind::Gauge => MetricType::GAUGE,
                });
                mf
            })
            .collect()
    }
}

fn to_metric(sample: Sample, label_names: &[&str], kind: MetricKind) -> Metric {
    let mut m = Metric::default();
    for (name, value) in label_names.iter().zip(sample.label_values) {
        let mut lp = LabelPair::default();
        lp.set_name(name.to_string());
        lp.set_value(value);
        m.mut_label().push(lp);
    }
    match kind {
        MetricKind::Counter => {
            let mut c = Counter::default();
            c.set_value(sample.value);
            m.set_counter(c);
        }
        MetricKind::Gauge => {
            let mut g = Gauge::default();
            g.set_value(sample.value);
            m.set_gauge(g);
        }
    }
    m
}

impl Collector for PrometheusCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let catalog = self.inner.catalog();
        let mut families = self.empty_families();

        self.inner.collect_with(|sample| {
            let descriptor = catalog.get(sample.metric);
            let metric = to_metric(sample, descriptor.label_names, descriptor.kind);
            families[descriptor.id.index()].mut_metric().push(metric);
        });

        families.retain(|mf| !mf.get_metric().is_empty());
        families
    }
}

/// Registre dédié + rendu au format texte Prometheus
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
}

impl MetricsRegistry {
    pub fn new(collector: SnapshotCollector) -> Result<Self> {
        let registry = Registry::new();
        registry.register(Box::new(PrometheusCollector::new(collector)?))?;
        Ok(Self { registry })
    }

    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Un scrape : ré-étend le snapshot courant depuis zéro
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Disk, FleetSnapshot, HostRecord, NetworkInterface};
    use crate::store::SnapshotStore;
    use std::sync::Arc;

    fn snapshot() -> FleetSnapshot {
        FleetSnapshot::new(vec![HostRecord {
            hostname: "h1".into(),
            remote_ip: "10.0.0.1".into(),
            uptime_seconds: 3600.0,
            cpu_usage_percent: vec![12.5, 33.0],
            load_average: vec![0.5],
            network_interfaces: vec![NetworkInterface {
                name: "eth0".into(),
                ip: "10.0.0.1".into(),
                rx_bytes: 100,
                tx_bytes: 50,
            }],
            disks: vec![Disk { name: "sda".into(), bytes_read: 7, bytes_written: 9 }],
            ..Default::default()
        }])
    }

    fn collector() -> SnapshotCollector {
        SnapshotCollector::new(Arc::new(SnapshotStore::new()))
    }

    #[test]
    fn test_desc_covers_whole_catalog() {
        let pc = PrometheusCollector::new(collector()).unwrap();
        let names: Vec<&str> = pc.desc().iter().map(|d| d.fq_name.as_str()).collect();
        assert_eq!(names.len(), 12);
        assert!(names.contains(&"network_sent_byte"));
        assert!(names.contains(&"disk_write_byte"));
    }

    #[test]
    fn test_families_without_snapshot_are_dropped() {
        let pc = PrometheusCollector::new(collector()).unwrap();
        assert!(pc.collect().is_empty());
    }

    #[test]
    fn test_families_group_samples_by_metric() {
        let c = collector();
        c.set_snapshot(snapshot());
        let pc = PrometheusCollector::new(c).unwrap();
        let families = pc.collect();

        assert_eq!(families.len(), 12);
        let cpu = families.iter().find(|mf| mf.get_name() == "cpu_usage_percent").unwrap();
        assert_eq!(cpu.get_field_type(), MetricType::GAUGE);
        assert_eq!(cpu.get_metric().len(), 2);

        let rx = families.iter().find(|mf| mf.get_name() == "network_received_byte").unwrap();
        assert_eq!(rx.get_field_type(), MetricType::COUNTER);
        let m = &rx.get_metric()[0];
        assert_eq!(m.get_counter().get_value(), 100.0);
        let labels: Vec<(&str, &str)> = m
            .get_label()
            .iter()
            .map(|lp| (lp.get_name(), lp.get_value()))
            .collect();
        assert_eq!(
            labels,
            vec![("hostname", "h1"), ("remoteIP", "10.0.0.1"), ("nic", "eth0"), ("ip", "10.0.0.1")]
        );
    }

    #[test]
    fn test_render_text_format() {
        let c = collector();
        let registry = MetricsRegistry::new(c.clone()).unwrap();
        assert_eq!(registry.render().unwrap(), "");

        c.set_snapshot(snapshot());
        let text = registry.render().unwrap();
        assert!(text.contains("# TYPE system_uptime_second counter"));
        assert!(text.contains("# HELP cpu_usage_percent Percentage of the cpu used"));
        assert!(text.contains(r#"cpu_usage_percent{hostname="h1",remoteIP="10.0.0.1",cpu="1"} 33"#));
        assert!(text.contains(r#"disk_read_byte{hostname="h1",remoteIP="10.0.0.1",disk="sda"} 7"#));
        assert!(text.contains("system_uptime_second{hostname=\"h1\",remoteIP=\"10.0.0.1\"} 3600"));
    }
}
