use crate::snapshot::weather_snapshot::WeatherSnapshot;
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;

/// Holds the snapshot that queries currently run against.
///
/// Readers take an `Arc` and release the lock immediately. A replacement only swaps
/// the pointer, so a reader that obtained the previous snapshot keeps using it until
/// it drops its `Arc`.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<WeatherSnapshot>>,
}

impl SnapshotStore {
    pub fn new(snapshot: WeatherSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn current(&self) -> Arc<WeatherSnapshot> {
        self.current.read().clone()
    }

    /// Installs `snapshot` and returns the one it replaced.
    pub fn replace(&self, snapshot: WeatherSnapshot) -> Arc<WeatherSnapshot> {
        let observations = snapshot.observations().len();
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(snapshot));
        info!(
            "Replaced weather snapshot ({} observations, previously {})",
            observations,
            previous.observations().len()
        );
        previous
    }
}
