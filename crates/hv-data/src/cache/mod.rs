//! Marker cache keyed by host-collection version

use std::sync::Arc;

use hv_core::{Host, Marker};
use parking_lot::RwLock;

use crate::geo::CoordinateSource;

#[derive(Debug, Clone)]
struct CacheEntry {
    version: u64,
    markers: Arc<[Marker]>,
}

/// Synthetic map markers for the full host collection.
///
/// The cache is only rebuilt when the collection itself is replaced, so a
/// host keeps its coordinates across re-filtering. Readers always see one
/// complete generation: replacement swaps the whole snapshot under the
/// write lock.
pub struct MarkerCache {
    entry: RwLock<CacheEntry>,
}

impl MarkerCache {
    /// Create an empty cache at version 0
    pub fn new() -> Self {
        Self {
            entry: RwLock::new(CacheEntry {
                version: 0,
                markers: Arc::from(Vec::new()),
            }),
        }
    }

    /// Current markers
    pub fn snapshot(&self) -> Arc<[Marker]> {
        self.entry.read().markers.clone()
    }

    /// Collection version the current markers were built from
    pub fn version(&self) -> u64 {
        self.entry.read().version
    }

    pub fn len(&self) -> usize {
        self.entry.read().markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuild the cache from `hosts`, one fresh coordinate per host, and
    /// return the new snapshot
    pub fn regenerate(&self, version: u64, hosts: &[Host], source: &dyn CoordinateSource) -> Arc<[Marker]> {
        let markers: Arc<[Marker]> = hosts
            .iter()
            .enumerate()
            .map(|(id, host)| {
                let coordinate = source.next_coordinate();
                Marker {
                    id,
                    title: host.name.clone(),
                    latitude: coordinate.latitude,
                    longitude: coordinate.longitude,
                }
            })
            .collect();

        *self.entry.write() = CacheEntry {
            version,
            markers: markers.clone(),
        };

        tracing::debug!(version, markers = markers.len(), "regenerated marker cache");
        markers
    }

    /// First marker whose title equals `name`, ignoring case
    pub fn find(&self, name: &str) -> Option<Marker> {
        find_marker(&self.entry.read().markers, name).cloned()
    }
}

impl Default for MarkerCache {
    fn default() -> Self {
        Self::new()
    }
}

/// First marker in `markers` whose title case-insensitively equals `name`
pub fn find_marker<'a>(markers: &'a [Marker], name: &str) -> Option<&'a Marker> {
    let needle = name.to_lowercase();
    markers.iter().find(|m| m.title.to_lowercase() == needle)
}
