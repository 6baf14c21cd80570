//! View state shared by the three host projections

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::Host;

/// Errors from parsing view-state values supplied as text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateParseError {
    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),

    #[error("unknown view: {0}")]
    UnknownView(String),

    #[error("unknown sort direction: {0}")]
    UnknownDirection(String),
}

/// Sortable host columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "name")]
    Name,
    /// Backs the Status column
    #[serde(rename = "deltaUptime")]
    DeltaUptime,
    #[serde(rename = "cpu")]
    Cpu,
    #[serde(rename = "load")]
    Load,
}

/// A host field read through a [`SortKey`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
    Missing,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Name, SortKey::DeltaUptime, SortKey::Cpu, SortKey::Load];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::DeltaUptime => "deltaUptime",
            SortKey::Cpu => "cpu",
            SortKey::Load => "load",
        }
    }

    /// Read the keyed field off a host
    pub fn value<'a>(&self, host: &'a Host) -> SortValue<'a> {
        let number = |v: Option<f64>| v.map(SortValue::Number).unwrap_or(SortValue::Missing);

        match self {
            SortKey::Name => SortValue::Text(&host.name),
            SortKey::DeltaUptime => number(host.delta_uptime),
            SortKey::Cpu => number(host.cpu),
            SortKey::Load => number(host.load),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .or_else(|| s.eq_ignore_ascii_case("status").then_some(SortKey::DeltaUptime))
            .ok_or_else(|| StateParseError::UnknownSortKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(StateParseError::UnknownDirection(s.to_string())),
        }
    }
}

/// Which projection the dashboard is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveView {
    #[default]
    Table,
    Graph,
    Map,
}

impl ActiveView {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveView::Table => "table",
            ActiveView::Graph => "graph",
            ActiveView::Map => "map",
        }
    }
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActiveView {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(ActiveView::Table),
            // The dashboard labels the graph view "Network"
            "graph" | "network" => Ok(ActiveView::Graph),
            "map" => Ok(ActiveView::Map),
            _ => Err(StateParseError::UnknownView(s.to_string())),
        }
    }
}

/// Search, sort and view selection, independent of host data.
///
/// Fields are only changed through the update operations below.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    search_term: String,
    sort_key: Option<SortKey>,
    sort_direction: Option<SortDirection>,
    active_view: ActiveView,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    pub fn sort_direction(&self) -> Option<SortDirection> {
        self.sort_direction
    }

    pub fn active_view(&self) -> ActiveView {
        self.active_view
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Flip the direction when `key` is already active, otherwise sort
    /// ascending by `key`. An active key with no direction flips to `asc`.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == Some(key) {
            self.sort_direction = match self.sort_direction {
                Some(SortDirection::Asc) => Some(SortDirection::Desc),
                _ => Some(SortDirection::Asc),
            };
        } else {
            self.sort_key = Some(key);
            self.sort_direction = Some(SortDirection::Asc);
        }
    }

    pub fn set_active_view(&mut self, view: ActiveView) {
        self.active_view = view;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_sort_sets_then_flips() {
        let mut state = ViewState::new();
        assert_eq!(state.sort_key(), None);
        assert_eq!(state.sort_direction(), None);

        state.toggle_sort(SortKey::Cpu);
        assert_eq!(state.sort_key(), Some(SortKey::Cpu));
        assert_eq!(state.sort_direction(), Some(SortDirection::Asc));

        state.toggle_sort(SortKey::Cpu);
        assert_eq!(state.sort_direction(), Some(SortDirection::Desc));

        state.toggle_sort(SortKey::Cpu);
        assert_eq!(state.sort_direction(), Some(SortDirection::Asc));
    }

    #[test]
    fn test_toggle_other_key_resets_to_ascending() {
        let mut state = ViewState::new();
        state.toggle_sort(SortKey::Name);
        state.toggle_sort(SortKey::Name);
        assert_eq!(state.sort_direction(), Some(SortDirection::Desc));

        state.toggle_sort(SortKey::Load);
        assert_eq!(state.sort_key(), Some(SortKey::Load));
        assert_eq!(state.sort_direction(), Some(SortDirection::Asc));
    }

    #[test]
    fn test_defaults() {
        let state = ViewState::default();
        assert_eq!(state.search_term(), "");
        assert_eq!(state.active_view(), ActiveView::Table);
    }

    #[test]
    fn test_parse_keys_and_views() {
        assert_eq!("cpu".parse::<SortKey>(), Ok(SortKey::Cpu));
        assert_eq!("deltaUptime".parse::<SortKey>(), Ok(SortKey::DeltaUptime));
        assert_eq!("Status".parse::<SortKey>(), Ok(SortKey::DeltaUptime));
        assert_eq!(
            "memory".parse::<SortKey>(),
            Err(StateParseError::UnknownSortKey("memory".to_string()))
        );

        assert_eq!("Network".parse::<ActiveView>(), Ok(ActiveView::Graph));
        assert_eq!("map".parse::<ActiveView>(), Ok(ActiveView::Map));
        assert!("globe".parse::<ActiveView>().is_err());
    }

    #[test]
    fn test_sort_value_reads_typed_fields() {
        let host = Host::new("db-1").with_cpu(42.0);
        assert_eq!(SortKey::Name.value(&host), SortValue::Text("db-1"));
        assert_eq!(SortKey::Cpu.value(&host), SortValue::Number(42.0));
        assert_eq!(SortKey::Load.value(&host), SortValue::Missing);
    }
}
