//! Keeps the table, graph and map projections in step
//!
//! All three are derived from the same filtered/sorted host list: table rows
//! are the list itself, graph node `i` is row `i - 1`, and markers follow row
//! order. Markers come from a cache built over the full collection, so a
//! host's coordinates only change when the collection is replaced.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use hv_core::{Host, HostGraph, Marker};
use hv_data::{CoordinateSource, GraphStyle, MarkerCache};

use crate::plots::{build_graph, select_markers};

/// The three synchronized views of one filtered host list
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Projections {
    pub rows: Vec<Host>,
    pub graph: HostGraph,
    pub markers: Vec<Marker>,
}

/// Derive graph and markers for `filtered` against a marker cache snapshot
pub fn project(filtered: Vec<Host>, markers: &[Marker], style: &GraphStyle) -> Projections {
    let graph = build_graph(&filtered, style);
    let markers = select_markers(&filtered, markers);

    Projections {
        rows: filtered,
        graph,
        markers,
    }
}

/// Owns the marker cache and the identity of the collection it was built for
pub struct ProjectionSynchronizer {
    cache: MarkerCache,
    coordinates: Box<dyn CoordinateSource>,
    style: GraphStyle,
    collection: Mutex<Option<Arc<[Host]>>>,
}

impl ProjectionSynchronizer {
    pub fn new(style: GraphStyle, coordinates: Box<dyn CoordinateSource>) -> Self {
        Self {
            cache: MarkerCache::new(),
            coordinates,
            style,
            collection: Mutex::new(None),
        }
    }

    pub fn style(&self) -> &GraphStyle {
        &self.style
    }

    /// Version of the collection the current markers belong to
    pub fn collection_version(&self) -> u64 {
        self.cache.version()
    }

    pub fn markers(&self) -> Arc<[Marker]> {
        self.cache.snapshot()
    }

    /// Rebuild the marker cache if `full` is not the collection it was last
    /// built for. Returns the new snapshot when a rebuild happened.
    pub fn sync_collection(&self, full: &Arc<[Host]>) -> Option<Arc<[Marker]>> {
        let mut collection = self.collection.lock();

        if collection.as_ref().is_some_and(|current| Arc::ptr_eq(current, full)) {
            return None;
        }

        let version = self.cache.version() + 1;
        let markers = self.cache.regenerate(version, full, self.coordinates.as_ref());
        *collection = Some(full.clone());

        tracing::info!(version, hosts = full.len(), "host collection replaced");
        Some(markers)
    }

    /// Bring the cache up to date with `full`, then derive all projections
    /// for `filtered`
    pub fn project(&self, filtered: Vec<Host>, full: &Arc<[Host]>) -> Projections {
        self.sync_collection(full);
        project(filtered, &self.cache.snapshot(), &self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hv_data::{filter_and_sort, GeoGenerator, LatLng, SeededCoordinates};
    use hv_core::{SortDirection, SortKey};

    fn synchronizer() -> ProjectionSynchronizer {
        let generator = GeoGenerator::new(LatLng::new(39.446376, -101.777344), 100_000.0);
        ProjectionSynchronizer::new(GraphStyle::default(), Box::new(SeededCoordinates::new(generator, 9)))
    }

    fn collection() -> Arc<[Host]> {
        Arc::from(vec![
            Host::new("alpha").with_cpu(3.0),
            Host::new("beta").with_cpu(1.0),
            Host::new("gamma").with_cpu(2.0),
        ])
    }

    #[test]
    fn test_projections_are_index_aligned() {
        let sync = synchronizer();
        let full = collection();
        let filtered = filter_and_sort(&full, "", Some(SortKey::Cpu), Some(SortDirection::Asc));

        let projections = sync.project(filtered, &full);

        assert_eq!(projections.graph.nodes.len(), projections.rows.len() + 1);
        assert_eq!(projections.graph.edges.len(), projections.rows.len());
        for (i, row) in projections.rows.iter().enumerate() {
            assert_eq!(projections.graph.nodes[i + 1].label, row.name);
            assert_eq!(projections.markers[i].title, row.name);
        }
    }

    #[test]
    fn test_markers_stable_across_filters() {
        let sync = synchronizer();
        let full = collection();

        let everything = sync.project(filter_and_sort(&full, "", None, None), &full);
        let only_gamma = sync.project(filter_and_sort(&full, "gam", None, None), &full);

        let gamma_before = everything.markers.iter().find(|m| m.title == "gamma").unwrap();
        assert_eq!(only_gamma.markers.len(), 1);
        assert_eq!(&only_gamma.markers[0], gamma_before);
        assert_eq!(sync.collection_version(), 1);
    }

    #[test]
    fn test_new_collection_regenerates() {
        let sync = synchronizer();
        let first = collection();
        assert!(sync.sync_collection(&first).is_some());
        assert!(sync.sync_collection(&first).is_none());

        let before = sync.markers();
        let second = collection();
        let after = sync.sync_collection(&second).expect("new collection rebuilds");

        assert_eq!(sync.collection_version(), 2);
        assert_eq!(after.len(), 3);
        assert_ne!(before, after);
    }

    #[test]
    fn test_stale_cache_shrinks_map_only() {
        let full = collection();
        let cache = vec![Marker { id: 0, title: "alpha".into(), latitude: 1.0, longitude: 2.0 }];

        let projections = project(full.to_vec(), &cache, &GraphStyle::default());

        assert_eq!(projections.rows.len(), 3);
        assert_eq!(projections.graph.host_count(), 3);
        assert_eq!(projections.markers.len(), 1);
    }
}
