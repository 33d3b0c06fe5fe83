//! Chat record: the unit the relay stores and fans out.
//!
//! A record is an arbitrary JSON object. `platform`, `role` and `content` are
//! the fields viewers render; everything else rides along untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ParleyError, Result};

/// One chat event. Wire form is the bare JSON object, no envelope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Build a record from any JSON value. Only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ParleyError::InvalidRecord(format!(
                "expected a JSON object, got {}",
                kind(&other)
            ))),
        }
    }

    /// Parse a record from raw JSON bytes (webhook body).
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ParleyError::InvalidRecord(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Originating AI/agent name, or "user".
    pub fn platform(&self) -> Option<&str> {
        self.str_field("platform")
    }

    /// Display category such as "user" or "assistant".
    pub fn role(&self) -> Option<&str> {
        self.str_field("role")
    }

    pub fn content(&self) -> Option<&str> {
        self.str_field("content")
    }

    /// Raw access to any field, canonical or not.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Serialized JSON text, as pushed to viewers.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = ParleyError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
