use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;

use registrar::Camera;

/// In-memory camera cache.
///
/// Every accepted registration refreshes the entry for its served host,
/// so the signalling side (INVITE, catalog, alarm) always finds the
/// current address of a device. Cheap to clone; clones share the map.
#[derive(Default, Clone)]
pub struct Devices {
    cameras: Arc<RwLock<AHashMap<String, Camera>>>,
}

impl Devices {
    pub fn place_in(&self, host: &str, camera: Camera) {
        self.cameras.write().insert(host.to_string(), camera);
    }

    pub fn get(&self, host: &str) -> Option<Camera> {
        self.cameras.read().get(host).cloned()
    }

    pub fn remove(&self, host: &str) -> Option<Camera> {
        self.cameras.write().remove(host)
    }

    pub fn len(&self) -> usize {
        self.cameras.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.read().is_empty()
    }
}
