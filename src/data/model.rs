use crate::ast::{Value, ValueType};
use crate::condition::SourceType;
use crate::error::FlowError;
use crate::resolver::{Catalog, TypedEnvironment};
use serde::{Deserialize, Serialize};
use std::fs;

/// One tag or field of a data source, as the editor lists it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: ValueType,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Entry {
    pub fn new(name: &str, declared_type: ValueType, value: serde_json::Value) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            declared_type,
            value,
        }
    }

    /// The entry's value read through its declared type.
    pub fn typed_value(&self) -> Value {
        typed_value(&self.value, self.declared_type)
    }
}

/// Reads a stored JSON value through a declared type.
///
/// The editor stores user input as text, so `"42"` under a number type becomes `42`
/// and JSON text under a list or map type is parsed. Anything else is kept as is and
/// left for the evaluator's conformance check.
pub fn typed_value(json: &serde_json::Value, declared: ValueType) -> Value {
    let serde_json::Value::String(text) = json else {
        return Value::from(json.clone());
    };
    match declared {
        ValueType::Number => text
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(text.clone())),
        ValueType::Boolean => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text.clone()),
        },
        ValueType::List | ValueType::Map | ValueType::Object => {
            serde_json::from_str::<serde_json::Value>(text)
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(text.clone()))
        }
        ValueType::String => Value::String(text.clone()),
    }
}

/// A point-in-time view of a data source's tags and fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DataSourceSnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<Entry>,
    #[serde(default)]
    pub fields: Vec<Entry>,
}

impl DataSourceSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, FlowError> {
        let content = fs::read_to_string(path).map_err(|source| FlowError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// A built-in mock source, used when no snapshot file is given.
    pub fn sample() -> Self {
        Self {
            id: "ds-line-1".to_string(),
            name: "Line 1 sensors".to_string(),
            description: Some("Mock data source".to_string()),
            tags: vec![
                Entry::new("temperature", ValueType::Number, serde_json::json!(25)),
                Entry::new("pressure", ValueType::Number, serde_json::json!(1.2)),
                Entry::new("status", ValueType::String, serde_json::json!("running")),
                Entry::new("alarm", ValueType::Boolean, serde_json::json!(false)),
            ],
            fields: vec![
                Entry::new(
                    "operators",
                    ValueType::List,
                    serde_json::json!(["alice", "bob"]),
                ),
                Entry::new("batch", ValueType::Map, serde_json::json!({"id": "B-17"})),
                Entry::new("notes", ValueType::String, serde_json::json!("")),
            ],
        }
    }

    /// A resolver over this snapshot. Entries resolve by name and by id.
    pub fn to_environment(&self) -> TypedEnvironment {
        let mut env = TypedEnvironment::new();
        for (source_type, entries) in [(SourceType::Tag, &self.tags), (SourceType::Field, &self.fields)]
        {
            for entry in entries {
                env.insert_with_id(
                    source_type,
                    &entry.id,
                    &entry.name,
                    entry.typed_value(),
                    entry.declared_type,
                );
            }
        }
        env
    }

    pub fn into_environment(self) -> TypedEnvironment {
        self.to_environment()
    }

    /// Declared types of every tag and field, for save-time checks.
    pub fn catalog(&self) -> Catalog {
        Catalog::from(&self.to_environment())
    }
}
