//! Typed reference resolution.
//!
//! The evaluator never reads tags, fields or variables itself. It asks a [`Resolver`]
//! for `(source_type, source) -> (value, declared_type)` and treats the answer as a
//! fixed snapshot for the whole evaluation pass.

use crate::ast::{Value, ValueType};
use crate::condition::SourceType;
use crate::error::ConditionError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A resolved reference: the current value and the type the source declares for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: Value,
    pub declared_type: ValueType,
}

impl Resolved {
    pub fn new(value: impl Into<Value>, declared_type: ValueType) -> Self {
        Self {
            value: value.into(),
            declared_type,
        }
    }
}

/// Pure lookup contract consumed by the evaluator.
///
/// Implementations must not have side effects during an evaluation pass, so that every
/// atomic condition in one call observes the same snapshot.
pub trait Resolver: Send + Sync {
    fn resolve(&self, source_type: SourceType, source: &str) -> Option<Resolved>;
}

impl<F> Resolver for F
where
    F: Fn(SourceType, &str) -> Option<Resolved> + Send + Sync,
{
    fn resolve(&self, source_type: SourceType, source: &str) -> Option<Resolved> {
        self(source_type, source)
    }
}

/// An immutable-per-call snapshot of tags, fields and global variables.
#[derive(Debug, Clone, Default)]
pub struct TypedEnvironment {
    entries: AHashMap<(SourceType, String), Resolved>,
}

impl TypedEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        source_type: SourceType,
        name: &str,
        value: impl Into<Value>,
        declared_type: ValueType,
    ) {
        self.entries.insert(
            (source_type, name.to_string()),
            Resolved::new(value, declared_type),
        );
    }

    /// Registers an entry under both its name and its id, so either spelling resolves.
    ///
    /// Names take precedence over ids. An id never replaces an existing key, while a
    /// name replaces whatever is stored under it, so when one entry's id equals another
    /// entry's name the named entry resolves regardless of insertion order. Between two
    /// equal ids the first registration is kept.
    pub fn insert_with_id(
        &mut self,
        source_type: SourceType,
        id: &str,
        name: &str,
        value: impl Into<Value>,
        declared_type: ValueType,
    ) {
        let resolved = Resolved::new(value, declared_type);
        if !id.is_empty() && id != name {
            self.entries
                .entry((source_type, id.to_string()))
                .or_insert_with(|| resolved.clone());
        }
        self.entries.insert((source_type, name.to_string()), resolved);
    }

    pub fn with_tag(mut self, name: &str, value: impl Into<Value>, declared: ValueType) -> Self {
        self.insert(SourceType::Tag, name, value, declared);
        self
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>, declared: ValueType) -> Self {
        self.insert(SourceType::Field, name, value, declared);
        self
    }

    pub fn with_variable(
        mut self,
        name: &str,
        value: impl Into<Value>,
        declared: ValueType,
    ) -> Self {
        self.insert(SourceType::Variable, name, value, declared);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn merge(&mut self, other: TypedEnvironment) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceType, &str, &Resolved)> {
        self.entries
            .iter()
            .map(|((source_type, name), resolved)| (*source_type, name.as_str(), resolved))
    }
}

impl Resolver for TypedEnvironment {
    fn resolve(&self, source_type: SourceType, source: &str) -> Option<Resolved> {
        self.entries
            .get(&(source_type, source.to_string()))
            .cloned()
    }
}

/// Declared types known at configuration-save time, used for early validation.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    types: AHashMap<(SourceType, String), ValueType>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source_type: SourceType, name: &str, declared: ValueType) {
        self.types.insert((source_type, name.to_string()), declared);
    }

    pub fn with(mut self, source_type: SourceType, name: &str, declared: ValueType) -> Self {
        self.insert(source_type, name, declared);
        self
    }

    pub fn declared_type(&self, source_type: SourceType, source: &str) -> Option<ValueType> {
        self.types.get(&(source_type, source.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl From<&TypedEnvironment> for Catalog {
    fn from(env: &TypedEnvironment) -> Self {
        let types = env
            .iter()
            .map(|(source_type, name, resolved)| {
                ((source_type, name.to_string()), resolved.declared_type)
            })
            .collect();
        Self { types }
    }
}

/// Where a block reads a value from: a reference, or a custom literal typed in by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSourceType {
    Field,
    Tag,
    Variable,
    Custom,
}

impl ValueSourceType {
    pub fn reference(&self) -> Option<SourceType> {
        match self {
            ValueSourceType::Field => Some(SourceType::Field),
            ValueSourceType::Tag => Some(SourceType::Tag),
            ValueSourceType::Variable => Some(SourceType::Variable),
            ValueSourceType::Custom => None,
        }
    }
}

/// A configured value used by Cache, PushToIoT and JavaScript blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSource {
    pub source_type: ValueSourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_value: Option<String>,
}

impl ValueSource {
    pub fn reference(source_type: SourceType, source: &str) -> Self {
        let source_type = match source_type {
            SourceType::Field => ValueSourceType::Field,
            SourceType::Tag => ValueSourceType::Tag,
            SourceType::Variable => ValueSourceType::Variable,
        };
        Self {
            source_type,
            source: Some(source.to_string()),
            custom_value: None,
        }
    }

    pub fn custom(value: &str) -> Self {
        Self {
            source_type: ValueSourceType::Custom,
            source: None,
            custom_value: Some(value.to_string()),
        }
    }

    /// Resolves the configured value. Custom literals are strings.
    pub fn resolve(&self, resolver: &dyn Resolver) -> Result<Resolved, ConditionError> {
        match self.source_type.reference() {
            None => self
                .custom_value
                .as_ref()
                .map(|v| Resolved::new(v.as_str(), ValueType::String))
                .ok_or_else(|| {
                    ConditionError::Config("custom value source has no customValue".to_string())
                }),
            Some(source_type) => {
                let source = self
                    .source
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        ConditionError::Config(format!("{} value source has no source", source_type))
                    })?;
                resolver.resolve(source_type, source).ok_or_else(|| {
                    ConditionError::UnresolvedReference {
                        source_type: source_type.to_string(),
                        source_ref: source.to_string(),
                    }
                })
            }
        }
    }
}
