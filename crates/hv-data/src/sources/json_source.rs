use std::path::{Path, PathBuf};

use hv_core::Host;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::HostSource;
use crate::export::QueryResult;
use crate::DataError;

/// Accepted layouts of a hosts document
#[derive(Deserialize)]
#[serde(untagged)]
enum HostsDocument {
    List(Vec<Host>),
    Wrapped { hosts: HostsBody },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HostsBody {
    List(Vec<Host>),
    /// Hosts keyed by name, the layout the hosts API responds with
    Keyed(IndexMap<String, Value>),
}

/// Accepted layouts of a query-results document
#[derive(Deserialize)]
#[serde(untagged)]
enum ResultsDocument {
    Response { results: Vec<QueryResult> },
    List(Vec<QueryResult>),
}

/// Hosts read from a JSON file on every load
pub struct JsonHostSource {
    path: PathBuf,
    name: String,
}

impl JsonHostSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HostSource for JsonHostSource {
    fn load_hosts(&self) -> Result<Vec<Host>, DataError> {
        let text = std::fs::read_to_string(&self.path)?;
        let hosts = parse_hosts(&text)?;

        tracing::info!(source = %self.name, hosts = hosts.len(), "loaded hosts");
        Ok(hosts)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Parse a hosts document: a bare array, `{"hosts": [...]}`, or
/// `{"hosts": {"<name>": {...}}}` where a missing `name` is taken from the key
pub fn parse_hosts(text: &str) -> Result<Vec<Host>, DataError> {
    let document: HostsDocument = serde_json::from_str(text)?;

    match document {
        HostsDocument::List(hosts) | HostsDocument::Wrapped { hosts: HostsBody::List(hosts) } => Ok(hosts),
        HostsDocument::Wrapped { hosts: HostsBody::Keyed(keyed) } => keyed
            .into_iter()
            .map(|(key, mut value)| -> Result<Host, DataError> {
                if let Value::Object(fields) = &mut value {
                    fields.entry("name").or_insert(Value::String(key));
                }
                Ok(serde_json::from_value(value)?)
            })
            .collect(),
    }
}

/// Parse `{"results": [...]}` or a bare array of results
pub fn parse_query_results(text: &str) -> Result<Vec<QueryResult>, DataError> {
    let document: ResultsDocument = serde_json::from_str(text)?;

    Ok(match document {
        ResultsDocument::Response { results } => results,
        ResultsDocument::List(results) => results,
    })
}

/// Read a query-results document from disk
pub fn load_query_results(path: impl AsRef<Path>) -> Result<Vec<QueryResult>, DataError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let results = parse_query_results(&text)?;

    tracing::debug!(path = %path.display(), results = results.len(), "loaded query results");
    Ok(results)
}
