use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A rankable place record (locality, restaurant, hotel, ...).
///
/// `data` holds raw metric values keyed by metric id. Values that are `null`,
/// absent or not numbers count as missing. Any other top-level fields of the
/// source record are kept in `extra` so they survive ranking untouched.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Entity {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub data: BTreeMap<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            data: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// Builder used by loaders and tests.
    pub fn with_metric(mut self, metric_id: &str, value: f64) -> Self {
        self.set_metric(metric_id, value);
        self
    }

    /// Raw numeric value for a metric, `None` when absent, null or non-numeric.
    pub fn metric(&self, metric_id: &str) -> Option<f64> {
        self.data.get(metric_id).and_then(Value::as_f64)
    }

    pub fn set_metric(&mut self, metric_id: &str, value: f64) {
        // Non-finite values have no JSON representation; store them as null (missing).
        let value = serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.data.insert(metric_id.to_string(), value);
    }
}
