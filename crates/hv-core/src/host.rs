//! Host records as reported by the monitoring backend

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// One monitored machine and its latest metrics.
///
/// Records are replaced wholesale on every update; nothing in the engine
/// mutates a host after it has been handed over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    /// Unique key within a collection
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<f64>,

    /// Applications detected on the host, in reporting order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub apps: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<IndexMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_uptime: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_delta_uptime: Option<f64>,
}

/// Whether a host reported uptime progress since the previous poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    Up,
    Down,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Host {
    /// Create a host with only a name set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cpu: None,
            load: None,
            apps: Vec::new(),
            tags: None,
            delta_uptime: None,
            win_delta_uptime: None,
        }
    }

    pub fn with_cpu(mut self, cpu: f64) -> Self {
        self.cpu = Some(cpu);
        self
    }

    pub fn with_load(mut self, load: f64) -> Self {
        self.load = Some(load);
        self
    }

    pub fn with_apps<I, S>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apps = apps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_delta_uptime(mut self, delta: f64) -> Self {
        self.delta_uptime = Some(delta);
        self
    }

    pub fn with_win_delta_uptime(mut self, delta: f64) -> Self {
        self.win_delta_uptime = Some(delta);
        self
    }

    /// Apps as a single `", "`-separated string, the form search runs against
    pub fn apps_joined(&self) -> String {
        self.apps.join(", ")
    }

    /// Up when either uptime delta is positive. Absent and NaN deltas count
    /// as zero.
    pub fn liveness(&self) -> Liveness {
        let or_zero = |v: Option<f64>| v.filter(|x| !x.is_nan()).unwrap_or(0.0);

        if or_zero(self.delta_uptime).max(or_zero(self.win_delta_uptime)) > 0.0 {
            Liveness::Up
        } else {
            Liveness::Down
        }
    }

    pub fn is_up(&self) -> bool {
        self.liveness() == Liveness::Up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness_from_either_delta() {
        assert_eq!(Host::new("a").with_delta_uptime(1.0).liveness(), Liveness::Up);
        assert_eq!(Host::new("b").with_win_delta_uptime(3.5).liveness(), Liveness::Up);
        assert_eq!(
            Host::new("c").with_delta_uptime(-1.0).with_win_delta_uptime(2.0).liveness(),
            Liveness::Up
        );
        assert_eq!(Host::new("d").with_delta_uptime(0.0).liveness(), Liveness::Down);
        assert_eq!(Host::new("e").liveness(), Liveness::Down);
        assert_eq!(
            Host::new("f").with_delta_uptime(f64::NAN).with_win_delta_uptime(5.0).liveness(),
            Liveness::Up
        );
    }

    #[test]
    fn test_nan_delta_counts_as_zero() {
        assert_eq!(Host::new("g").with_delta_uptime(f64::NAN).liveness(), Liveness::Down);
        assert_eq!(
            Host::new("h").with_delta_uptime(3.0).with_win_delta_uptime(f64::NAN).liveness(),
            Liveness::Up
        );
        assert_eq!(
            Host::new("i").with_delta_uptime(-2.0).with_win_delta_uptime(f64::NAN).liveness(),
            Liveness::Down
        );
    }

    #[test]
    fn test_deserialize_backend_shape() {
        let json = r#"{
            "name": "web-01",
            "cpu": 12.5,
            "load": 0.7,
            "apps": ["system", "nginx"],
            "tags": {"dc": "us-east", "role": "frontend"},
            "deltaUptime": 10,
            "winDeltaUptime": null
        }"#;

        let host: Host = serde_json::from_str(json).unwrap();
        assert_eq!(host.name, "web-01");
        assert_eq!(host.cpu, Some(12.5));
        assert_eq!(host.apps_joined(), "system, nginx");
        assert_eq!(host.tags.as_ref().unwrap().get("role").map(String::as_str), Some("frontend"));
        assert_eq!(host.delta_uptime, Some(10.0));
        assert_eq!(host.win_delta_uptime, None);
        assert!(host.is_up());
    }

    #[test]
    fn test_deserialize_sparse_host() {
        let host: Host = serde_json::from_str(r#"{"name": "bare", "apps": null}"#).unwrap();
        assert!(host.apps.is_empty());
        assert!(host.tags.is_none());
        assert!(host.cpu.is_none());
    }

    #[test]
    fn test_tag_order_is_preserved() {
        let host = Host::new("h").with_tag("z", "1").with_tag("a", "2");
        let keys: Vec<_> = host.tags.unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
