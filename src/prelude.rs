//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the bunki crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use bunki::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let config = IfBlockConfig::from_json(&std::fs::read_to_string("path/to/if_block.json")?)?;
//! let snapshot = DataSourceSnapshot::from_file("path/to/snapshot.json")?;
//!
//! let outcome = evaluate(&config, &snapshot.into_environment());
//! println!("{}", serde_json::to_string(&outcome)?);
//! # Ok(())
//! # }
//! ```

// Core compilation and evaluation
pub use crate::compiler::{Compiler, parse_grouping};
pub use crate::evaluator::{
    EvaluationOutcome, EvaluationResult, EvaluationStrategy, Evaluator, evaluate,
};

// Configuration model
pub use crate::condition::{
    AtomicCondition, CompiledIf, IfBlockConfig, LogicOperator, Operator, SourceType,
};

// AST and expression types
pub use crate::ast::{EvaluationTrace, Expression, Value, ValueType};

// Resolution
pub use crate::resolver::{Catalog, Resolved, Resolver, TypedEnvironment, ValueSource};

// Data structures
pub use crate::data::DataSourceSnapshot;
pub use crate::flow::{Block, Flow, FlowStore, JsonFileStore, MemoryStore};

// Error types
pub use crate::error::{ArtifactError, ConditionError, ErrorKind, FlowError};

// Trace formatting
pub use crate::trace::TraceFormatter;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
