//! Map projection: cached markers for the visible hosts

use hv_core::{Host, Marker};
use hv_data::cache::find_marker;

/// Pick the cached marker for each host, in host order.
///
/// A host with no marker is left off the map without error. This happens
/// when the cache lags behind the host collection.
pub fn select_markers(hosts: &[Host], cache: &[Marker]) -> Vec<Marker> {
    let selected: Vec<Marker> = hosts
        .iter()
        .filter_map(|host| find_marker(cache, &host.name).cloned())
        .collect();

    let missing = hosts.len() - selected.len();
    if missing > 0 {
        tracing::debug!(missing, "hosts without a cached marker left off the map");
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: usize, title: &str) -> Marker {
        Marker {
            id,
            title: title.to_string(),
            latitude: 39.0 + id as f64,
            longitude: -101.0,
        }
    }

    #[test]
    fn test_follows_host_order() {
        let cache = vec![marker(0, "a"), marker(1, "b"), marker(2, "c")];
        let hosts = vec![Host::new("c"), Host::new("A")];

        let selected = select_markers(&hosts, &cache);
        let ids: Vec<_> = selected.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 0]);
    }

    #[test]
    fn test_missing_marker_is_skipped() {
        let cache = vec![marker(0, "a")];
        let hosts = vec![Host::new("new-host"), Host::new("a")];

        let selected = select_markers(&hosts, &cache);
        assert_eq!(selected, vec![marker(0, "a")]);
    }

    #[test]
    fn test_empty_cache_yields_no_markers() {
        assert!(select_markers(&[Host::new("a")], &[]).is_empty());
    }
}
