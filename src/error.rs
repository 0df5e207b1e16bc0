use crate::ast::ValueType;
use crate::condition::Operator;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while compiling or evaluating an If-block condition set.
///
/// Every variant is returned as data; nothing in this crate panics or logs-and-swallows
/// one of these. [`ConditionError::kind`] maps a variant onto the wire taxonomy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    #[error("Syntax error in grouping expression at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },

    #[error("Grouping expression references condition {index}, but the set only defines {available:?}")]
    UnknownIndex { index: u32, available: Vec<u32> },

    #[error("Reference '{source_ref}' of type '{source_type}' could not be resolved")]
    UnresolvedReference {
        source_type: String,
        source_ref: String,
    },

    #[error("Operator '{operator}' is not valid for a value declared as '{declared}': {detail}")]
    TypeMismatch {
        operator: Operator,
        declared: ValueType,
        detail: String,
    },

    #[error("Literal '{literal}' cannot be used with operator '{operator}': expected {expected}")]
    InvalidLiteral {
        operator: Operator,
        literal: String,
        expected: String,
    },

    #[error("Invalid condition configuration: {0}")]
    Config(String),
}

/// The error taxonomy surfaced across the evaluation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    SyntaxError,
    UnknownIndexError,
    UnresolvedReference,
    TypeMismatchError,
    InvalidLiteralError,
    ConfigError,
}

impl ConditionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConditionError::Syntax { .. } => ErrorKind::SyntaxError,
            ConditionError::UnknownIndex { .. } => ErrorKind::UnknownIndexError,
            ConditionError::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            ConditionError::TypeMismatch { .. } => ErrorKind::TypeMismatchError,
            ConditionError::InvalidLiteral { .. } => ErrorKind::InvalidLiteralError,
            ConditionError::Config(_) => ErrorKind::ConfigError,
        }
    }

    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        ConditionError::Syntax {
            message: message.into(),
            offset,
        }
    }
}

/// Errors raised while loading, validating or persisting a flow document.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Failed to parse flow JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Flow store I/O failed for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Node '{0}' not found in flow")]
    NodeNotFound(String),

    #[error("Node '{node_id}' has an invalid '{kind}' configuration: {message}")]
    InvalidBlockConfig {
        node_id: String,
        kind: String,
        message: String,
    },

    #[error("Node '{node_id}' is a '{kind}' block, expected an If block")]
    NotAnIfBlock { node_id: String, kind: String },

    #[error("Condition error in node '{node_id}': {source}")]
    Condition {
        node_id: String,
        #[source]
        source: ConditionError,
    },
}

/// Errors raised while persisting compiled condition artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Serialization failed: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Deserialization failed: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Artifact I/O failed for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
