pub mod json_source;

pub use json_source::{JsonHostSource, load_query_results, parse_hosts, parse_query_results};

use hv_core::Host;
use crate::DataError;

/// Anything that can hand over the current host collection
pub trait HostSource: Send + Sync {
    /// Load the full collection; each call yields a fresh collection
    fn load_hosts(&self) -> Result<Vec<Host>, DataError>;

    /// Get the source name/path
    fn source_name(&self) -> &str;
}

/// Hosts held in memory, mainly for embedding and tests
pub struct StaticHostSource {
    name: String,
    hosts: Vec<Host>,
}

impl StaticHostSource {
    pub fn new(name: impl Into<String>, hosts: Vec<Host>) -> Self {
        Self {
            name: name.into(),
            hosts,
        }
    }
}

impl HostSource for StaticHostSource {
    fn load_hosts(&self) -> Result<Vec<Host>, DataError> {
        Ok(self.hosts.clone())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
