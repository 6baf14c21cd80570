//! Search filtering and column sorting for the host list
//!
//! Descending order is produced by sorting ascending (stable) and reversing
//! the whole sequence, not by a reversed comparator. Hosts with equal keys
//! therefore keep their original relative order under `asc` and come out in
//! swapped relative order under `desc`. Table layouts depend on that tie-break.

use std::cmp::Ordering;

use hv_core::{Host, SortDirection, SortKey, SortValue};

/// Case-insensitive substring matcher over name, apps and tag values
#[derive(Debug, Clone)]
pub struct SearchMatcher {
    needle: String,
}

impl SearchMatcher {
    pub fn new(term: &str) -> Self {
        Self {
            needle: term.to_lowercase(),
        }
    }

    /// An empty term matches every host
    pub fn matches(&self, host: &Host) -> bool {
        if host.name.to_lowercase().contains(&self.needle) {
            return true;
        }

        if host.apps_joined().to_lowercase().contains(&self.needle) {
            return true;
        }

        host.tags
            .as_ref()
            .map(|tags| tags.values().any(|value| value.to_lowercase().contains(&self.needle)))
            .unwrap_or(false)
    }
}

/// Keep the hosts matching `term`, in their original order
pub fn filter_hosts(hosts: &[Host], term: &str) -> Vec<Host> {
    let matcher = SearchMatcher::new(term);
    hosts.iter().filter(|h| matcher.matches(h)).cloned().collect()
}

/// Sort by `key` in `direction`. Without both a key and a direction the
/// input order is returned untouched.
pub fn sort_hosts(mut hosts: Vec<Host>, key: Option<SortKey>, direction: Option<SortDirection>) -> Vec<Host> {
    let (Some(key), Some(direction)) = (key, direction) else {
        return hosts;
    };

    // `sort_by` is stable
    hosts.sort_by(|a, b| compare_values(key.value(a), key.value(b)));

    if direction == SortDirection::Desc {
        hosts.reverse();
    }

    hosts
}

/// Filter then sort, the order every projection is derived from
pub fn filter_and_sort(
    hosts: &[Host],
    search_term: &str,
    sort_key: Option<SortKey>,
    sort_direction: Option<SortDirection>,
) -> Vec<Host> {
    let sorted = sort_hosts(filter_hosts(hosts, search_term), sort_key, sort_direction);

    tracing::debug!(
        total = hosts.len(),
        visible = sorted.len(),
        search_term,
        sort_key = sort_key.map(|k| k.as_str()),
        sort_direction = sort_direction.map(|d| d.as_str()),
        "filtered host list"
    );

    sorted
}

/// Ascending comparison. Present values come first, then missing, then NaN.
pub fn compare_values(a: SortValue<'_>, b: SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
        (SortValue::Number(a), SortValue::Number(b)) if !a.is_nan() && !b.is_nan() => {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: SortValue<'_>) -> u8 {
    match value {
        SortValue::Number(n) if n.is_nan() => 3,
        SortValue::Number(_) => 0,
        SortValue::Text(_) => 1,
        SortValue::Missing => 2,
    }
}
