use crate::collector::SnapshotCollector;
use crate::config::MqttConf;
use crate::health::HealthTracker;
use crate::models::FleetSnapshot;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use std::time::Duration;
use tokio::task;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Applique un payload MQTT au collecteur. Retourne le nombre d'hôtes, ou
/// None si le document est invalide (il est alors ignoré, le snapshot courant reste).
pub fn apply_payload(collector: &SnapshotCollector, payload: &[u8]) -> Option<usize> {
    match FleetSnapshot::from_json(payload) {
        Ok(snapshot) => {
            let hosts = snapshot.len();
            collector.set_snapshot(snapshot);
            Some(hosts)
        }
        Err(e) => {
            warn!("[mqtt] snapshot JSON invalide: {e}");
            None
        }
    }
}

fn client_id(cfg: &MqttConf) -> String {
    cfg.client_id
        .clone()
        .unwrap_or_else(|| format!("rtinfo-exporter-{}", Uuid::new_v4().simple()))
}

pub fn spawn_mqtt_listener(cfg: MqttConf, collector: SnapshotCollector, health: HealthTracker) {
    task::spawn(async move {
        let mut opts = MqttOptions::new(client_id(&cfg), &cfg.host, cfg.port);
        opts.set_keep_alive(Duration::from_secs(15));
        // un document rtinfo pour une grosse flotte dépasse la limite par défaut
        opts.set_max_packet_size(4 * 1024 * 1024, 4 * 1024 * 1024);

        let (client, mut eventloop) = AsyncClient::new(opts, 10);
        health.mark_mqtt_connecting();
        info!("[mqtt] listening on {}:{} topic {}", cfg.host, cfg.port, cfg.topic);

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    health.mark_mqtt_connected();
                    // clean session : abonnement à refaire à chaque connexion
                    if let Err(e) = client.try_subscribe(cfg.topic.as_str(), QoS::AtLeastOnce) {
                        error!("[mqtt] subscribe failed: {e:?}");
                    }
                }
                Ok(Event::Incoming(Incoming::Publish(p))) if p.topic == cfg.topic => {
                    if let Some(hosts) = apply_payload(&collector, &p.payload) {
                        health.record_snapshot("mqtt");
                        info!("[mqtt] snapshot replaced ({hosts} hosts)");
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("[mqtt] erreur: {e:?}");
                    health.increment_reconnects();
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    });
}
