/**
 * SNAPSHOT STORE - Référence unique vers le snapshot de flotte courant
 *
 * RÔLE : Remplacement atomique (copy-on-write) du snapshot par le producteur,
 * lecture sans verrou par les scrapes. Chaque lecteur capture une génération
 * immuable et l'itère entièrement, sans contention avec les écrivains suivants.
 *
 * Dernier écrivain gagnant entre deux `set` concurrents. Aucun historique.
 */

use crate::models::FleetSnapshot;
use arc_swap::ArcSwapOption;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: ArcSwapOption<FleetSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self { current: ArcSwapOption::from(None) }
    }

    /// Remplace le snapshot détenu, l'ancien devient inatteignable
    pub fn set(&self, snapshot: FleetSnapshot) {
        self.current.store(Some(Arc::new(snapshot)));
    }

    /// Capture la génération courante (None tant qu'aucun snapshot n'a été posé)
    pub fn load(&self) -> Option<Arc<FleetSnapshot>> {
        self.current.load_full()
    }

    pub fn host_count(&self) -> usize {
        match &*self.current.load() {
            Some(snapshot) => snapshot.len(),
            None => 0,
        }
    }
}

pub type SharedStore = Arc<SnapshotStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HostRecord;

    fn host(name: &str) -> HostRecord {
        HostRecord {
            hostname: name.to_string(),
            remote_ip: "10.0.0.1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_store() {
        let store = SnapshotStore::new();
        assert!(store.load().is_none());
        assert_eq!(store.host_count(), 0);
    }

    #[test]
    fn test_set_replaces_previous_snapshot() {
        let store = SnapshotStore::new();
        store.set(FleetSnapshot::new(vec![host("a"), host("b")]));
        assert_eq!(store.host_count(), 2);

        store.set(FleetSnapshot::new(vec![host("c")]));
        let current = store.load().unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current.hosts[0].hostname, "c");
    }

    #[test]
    fn test_captured_generation_survives_replacement() {
        let store = SnapshotStore::new();
        store.set(FleetSnapshot::new(vec![host("old")]));
        let captured = store.load().unwrap();

        store.set(FleetSnapshot::new(vec![host("new")]));
        assert_eq!(captured.hosts[0].hostname, "old");
        assert_eq!(store.load().unwrap().hosts[0].hostname, "new");
    }
}
