use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A student record, passed through exactly as the backend returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Student(Map<String, Value>);

impl Student {
    /// The backend's identifier, under either `_id` or `id`.
    pub fn id(&self) -> Option<&str> {
        self.0
            .get("_id")
            .or_else(|| self.0.get("id"))
            .and_then(Value::as_str)
    }

    /// Look up an arbitrary attribute.
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.0.get(attribute)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.0
    }
}

/// The `{"data": ...}` wrapper some backend endpoints answer with.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}
