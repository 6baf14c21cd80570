//! Table projection of the host list

use serde::Serialize;

use hv_core::{Host, SortDirection, SortKey, ViewState};

/// Static description of a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub title: &'static str,
    pub sort_key: Option<SortKey>,
    /// CSS width; `None` lets the column take the remaining space
    pub width: Option<&'static str>,
}

/// Columns of the hosts table, left to right
pub const HOST_COLUMNS: [ColumnSpec; 5] = [
    ColumnSpec { title: "Host", sort_key: Some(SortKey::Name), width: Some("40%") },
    ColumnSpec { title: "Status", sort_key: Some(SortKey::DeltaUptime), width: Some("74px") },
    ColumnSpec { title: "CPU", sort_key: Some(SortKey::Cpu), width: Some("70px") },
    ColumnSpec { title: "Load", sort_key: Some(SortKey::Load), width: Some("70px") },
    ColumnSpec { title: "Apps", sort_key: None, width: None },
];

/// Sort indicator shown on a header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderSort {
    Unsorted,
    Ascending,
    Descending,
}

impl HeaderSort {
    /// Indicator for `key` under `state`. An active key without a direction
    /// shows as descending.
    pub fn for_key(state: &ViewState, key: SortKey) -> Self {
        if state.sort_key() != Some(key) {
            return HeaderSort::Unsorted;
        }

        match state.sort_direction() {
            Some(SortDirection::Asc) => HeaderSort::Ascending,
            _ => HeaderSort::Descending,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            HeaderSort::Unsorted => "sortable-header",
            HeaderSort::Ascending => "sortable-header sorting-ascending",
            HeaderSort::Descending => "sortable-header sorting-descending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableHeader {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<SortKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<&'static str>,
    /// `None` for columns that cannot be sorted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<HeaderSort>,
}

/// Headers plus the visible rows, in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostsTable {
    pub headers: Vec<TableHeader>,
    pub rows: Vec<Host>,
}

impl HostsTable {
    pub fn build(rows: Vec<Host>, state: &ViewState) -> Self {
        let headers = HOST_COLUMNS
            .iter()
            .map(|column| TableHeader {
                title: column.title,
                sort_key: column.sort_key,
                width: column.width,
                sort: column.sort_key.map(|key| HeaderSort::for_key(state, key)),
            })
            .collect();

        Self { headers, rows }
    }
}

/// Panel heading for the hosts list
pub fn hosts_title(loading: bool, error: Option<&str>, visible_hosts: usize) -> String {
    if loading {
        "Loading Hosts...".to_string()
    } else if error.is_some() {
        "There was a problem loading hosts".to_string()
    } else if visible_hosts == 1 {
        "1 Host".to_string()
    } else {
        format!("{visible_hosts} Hosts")
    }
}
