//! Table, network graph and map views over a host collection

pub mod plots;
pub mod sync;
pub mod tables;
mod hosts_view;

pub use hosts_view::{ActiveContent, HostsView, EMPTY_MESSAGE};
pub use plots::{build_graph, select_markers};
pub use sync::{project, ProjectionSynchronizer, Projections};
pub use tables::{hosts_title, ColumnSpec, HeaderSort, HostsTable, TableHeader, HOST_COLUMNS};
