//! Container holding host data, view state and the current projections

use std::sync::Arc;

use serde::Serialize;

use hv_core::events::events::{HostsReplaced, MarkersRegenerated, ViewStateChanged};
use hv_core::{ActiveView, EventBus, Host, HostGraph, Marker, SortKey, ViewState};
use hv_data::{filter_and_sort, CoordinateSource, EngineConfig, GraphStyle};

use crate::sync::{project, ProjectionSynchronizer, Projections};
use crate::tables::{hosts_title, HostsTable};

/// Shown when there is nothing to render
pub const EMPTY_MESSAGE: &str = "No Hosts found";

/// What the selected view should display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ActiveContent {
    Table(HostsTable),
    Graph(HostGraph),
    Map { markers: Vec<Marker> },
    Empty { message: String },
}

/// The hosts dashboard view-model.
///
/// Every update operation re-derives all three projections, so switching
/// the active view never needs a recomputation.
pub struct HostsView {
    hosts: Arc<[Host]>,
    state: ViewState,
    loading: bool,
    error: Option<String>,
    synchronizer: ProjectionSynchronizer,
    projections: Projections,
    event_bus: Option<Arc<EventBus>>,
}

impl HostsView {
    /// Create a view whose map scatters hosts per `config.map`
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_coordinate_source(config.graph.clone(), Box::new(config.map.generator()))
    }

    pub fn with_coordinate_source(style: GraphStyle, coordinates: Box<dyn CoordinateSource>) -> Self {
        // Nothing loaded yet: the graph holds only the root and the cache
        // stays empty until the first collection arrives
        let projections = project(Vec::new(), &[], &style);

        Self {
            hosts: Arc::from(Vec::new()),
            state: ViewState::default(),
            loading: false,
            error: None,
            synchronizer: ProjectionSynchronizer::new(style, coordinates),
            projections,
            event_bus: None,
        }
    }

    /// Publish state changes on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Replace the full host collection.
    ///
    /// Handing back the collection already held (the same `Arc`) is a no-op.
    /// Any other collection rebuilds the marker cache before projections are
    /// re-derived.
    pub fn set_hosts(&mut self, hosts: impl Into<Arc<[Host]>>) {
        let hosts = hosts.into();
        if Arc::ptr_eq(&self.hosts, &hosts) {
            tracing::debug!("same host collection handed back, nothing to do");
            return;
        }

        self.hosts = hosts;
        let regenerated = self.synchronizer.sync_collection(&self.hosts);
        self.recompute();

        let collection_version = self.synchronizer.collection_version();
        if let Some(bus) = &self.event_bus {
            bus.publish(HostsReplaced {
                host_count: self.hosts.len(),
                collection_version,
            });
            if let Some(markers) = regenerated {
                bus.publish(MarkersRegenerated {
                    marker_count: markers.len(),
                    collection_version,
                });
            }
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.set_search_term(term);
        self.recompute();
        self.publish_state();
    }

    /// Flip direction on the active key, otherwise sort ascending by `key`
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.state.toggle_sort(key);
        self.recompute();
        self.publish_state();
    }

    pub fn set_active_view(&mut self, view: ActiveView) {
        self.state.set_active_view(view);
        self.publish_state();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Record a load error; an empty message clears it
    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error.filter(|e| !e.is_empty());
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Full, unfiltered collection
    pub fn hosts(&self) -> &Arc<[Host]> {
        &self.hosts
    }

    pub fn projections(&self) -> &Projections {
        &self.projections
    }

    /// Filtered and sorted hosts
    pub fn rows(&self) -> &[Host] {
        &self.projections.rows
    }

    pub fn graph(&self) -> &HostGraph {
        &self.projections.graph
    }

    /// Markers of the visible hosts, in row order
    pub fn markers(&self) -> &[Marker] {
        &self.projections.markers
    }

    pub fn collection_version(&self) -> u64 {
        self.synchronizer.collection_version()
    }

    pub fn table(&self) -> HostsTable {
        HostsTable::build(self.projections.rows.clone(), &self.state)
    }

    pub fn title(&self) -> String {
        hosts_title(self.loading, self.error.as_deref(), self.projections.rows.len())
    }

    /// Content for the active view, or the empty state when no host is
    /// visible or loading failed
    pub fn active_content(&self) -> ActiveContent {
        if self.projections.rows.is_empty() || self.error.is_some() {
            return ActiveContent::Empty {
                message: EMPTY_MESSAGE.to_string(),
            };
        }

        match self.state.active_view() {
            ActiveView::Table => ActiveContent::Table(self.table()),
            ActiveView::Graph => ActiveContent::Graph(self.projections.graph.clone()),
            ActiveView::Map => ActiveContent::Map {
                markers: self.projections.markers.clone(),
            },
        }
    }

    /// Re-derive projections against the current marker snapshot. Only
    /// `set_hosts` registers a collection with the synchronizer.
    fn recompute(&mut self) {
        let filtered = filter_and_sort(
            &self.hosts,
            self.state.search_term(),
            self.state.sort_key(),
            self.state.sort_direction(),
        );
        self.projections = project(filtered, &self.synchronizer.markers(), self.synchronizer.style());
    }

    fn publish_state(&self) {
        if let Some(bus) = &self.event_bus {
            bus.publish(ViewStateChanged {
                state: self.state.clone(),
                visible_hosts: self.projections.rows.len(),
            });
        }
    }
}
