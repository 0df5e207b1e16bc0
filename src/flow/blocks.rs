use crate::ast::Value;
use crate::condition::{IfBlockConfig, SourceType};
use crate::error::ConditionError;
use crate::resolver::{Resolver, ValueSource};
use serde::{Deserialize, Serialize};

/// A node's configuration, parsed according to its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Start,
    If(IfBlockConfig),
    JavaScript(JavaScriptBlockConfig),
    Cache(CacheBlockConfig),
    PushToIoT(PushToIoTBlockConfig),
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentMapping {
    pub argument_name: String,
    pub source: String,
    pub source_type: SourceType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnMapping {
    pub return_key: String,
    pub target_variable: String,
}

/// Binds a stored JavaScript function's arguments and return keys to flow references.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaScriptBlockConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(default)]
    pub argument_mappings: Vec<ArgumentMapping>,
    #[serde(default)]
    pub return_mappings: Vec<ReturnMapping>,
}

impl JavaScriptBlockConfig {
    /// Resolves every argument against a snapshot, in mapping order.
    pub fn arguments(&self, resolver: &dyn Resolver) -> Result<Vec<(String, Value)>, ConditionError> {
        self.argument_mappings
            .iter()
            .map(|mapping| {
                ValueSource::reference(mapping.source_type, &mapping.source)
                    .resolve(resolver)
                    .map(|resolved| (mapping.argument_name.clone(), resolved.value))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheOperation {
    #[default]
    Get,
    Add,
    Update,
    Delete,
}

impl CacheOperation {
    /// Whether the operation writes the configured value.
    pub fn writes_value(&self) -> bool {
        matches!(self, CacheOperation::Add | CacheOperation::Update)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheBlockConfig {
    #[serde(default)]
    pub operation: CacheOperation,
    pub key: ValueSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_variable: Option<String>,
}

impl CacheBlockConfig {
    /// The cache key for this snapshot, rendered as text.
    pub fn resolve_key(&self, resolver: &dyn Resolver) -> Result<String, ConditionError> {
        let resolved = self.key.resolve(resolver)?;
        Ok(match resolved.value {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    /// The value an `add`/`update` writes. `None` for reads and deletes.
    pub fn resolve_value(&self, resolver: &dyn Resolver) -> Result<Option<Value>, ConditionError> {
        if !self.operation.writes_value() {
            return Ok(None);
        }
        let source = self.value.as_ref().ok_or_else(|| {
            ConditionError::Config("cache add/update has no value configured".to_string())
        })?;
        source.resolve(resolver).map(|resolved| Some(resolved.value))
    }
}

/// One `keyName <- source` entry of an IoT payload. `sourceId` is an entry id or name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMapping {
    #[serde(default)]
    pub id: String,
    pub source_type: SourceType,
    pub source_id: String,
    pub key_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PushToIoTBlockConfig {
    #[serde(default)]
    pub mappings: Vec<PushMapping>,
}

impl PushToIoTBlockConfig {
    /// Builds the JSON payload for one snapshot. Mappings with an empty key are skipped.
    pub fn payload(
        &self,
        resolver: &dyn Resolver,
    ) -> Result<serde_json::Map<String, serde_json::Value>, ConditionError> {
        let mut payload = serde_json::Map::new();
        for mapping in self.mappings.iter().filter(|m| !m.key_name.trim().is_empty()) {
            let source = ValueSource::reference(mapping.source_type, &mapping.source_id);
            let resolved = source.resolve(resolver)?;
            payload.insert(mapping.key_name.trim().to_string(), resolved.value.to_json());
        }
        Ok(payload)
    }
}
