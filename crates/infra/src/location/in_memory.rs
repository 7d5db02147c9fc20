use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use equipstock_core::LocationId;
use equipstock_stock::LocationRef;

use super::{LocationError, LocationResolver};

/// In-memory location directory for tests/dev.
///
/// Can be switched into an outage to exercise the dependency-failure paths,
/// and counts lookups so callers can check that nothing is cached.
#[derive(Debug, Default)]
pub struct InMemoryLocationDirectory {
    locations: RwLock<HashMap<LocationId, LocationRef>>,
    unavailable: AtomicBool,
    lookups: AtomicUsize,
}

impl InMemoryLocationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locations(locations: impl IntoIterator<Item = LocationRef>) -> Self {
        let directory = Self::new();
        for location in locations {
            directory.insert(location);
        }
        directory
    }

    pub fn insert(&self, location: LocationRef) {
        if let Ok(mut map) = self.locations.write() {
            map.insert(location.id, location);
        }
    }

    pub fn remove(&self, id: LocationId) {
        if let Ok(mut map) = self.locations.write() {
            map.remove(&id);
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationResolver for InMemoryLocationDirectory {
    async fn resolve(&self, id: LocationId) -> Result<LocationRef, LocationError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LocationError::Unavailable(
                "location directory is offline".to_string(),
            ));
        }

        let map = self
            .locations
            .read()
            .map_err(|_| LocationError::Unavailable("lock poisoned".to_string()))?;
        map.get(&id).cloned().ok_or(LocationError::NotFound(id))
    }
}
