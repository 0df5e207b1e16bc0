//! # Bunki - Typed Condition Engine for Pipeline Blocks
//!
//! **Bunki** is the logical core behind a visual pipeline editor's If block. An If block
//! holds a numbered list of atomic comparisons (`tag temperature > 20`) and an optional
//! grouping expression such as `(1 AND 2) OR 3`. Bunki compiles that configuration into a
//! validated boolean tree and evaluates it against typed snapshots of tags, fields and
//! global variables.
//!
//! ## Core Workflow
//!
//! 1.  **Load a configuration**: Deserialize an [`condition::IfBlockConfig`] from the
//!     editor's JSON, or pull it out of a [`flow::Flow`] document.
//! 2.  **Compile**: Use [`compiler::Compiler::builder`] to parse the grouping, check every
//!     referenced index and normalise each condition. Supplying a [`resolver::Catalog`]
//!     enables save-time type checks.
//! 3.  **Evaluate**: Wrap the result in an [`evaluator::Evaluator`] and run it against any
//!     [`resolver::Resolver`], usually a [`resolver::TypedEnvironment`] snapshot.
//!
//! Every failure is returned as a [`error::ConditionError`]; evaluation never panics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bunki::prelude::*;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let config = IfBlockConfig::from_json(
//!         r#"{
//!             "conditions": [
//!                 { "sourceType": "tag", "source": "temperature", "operator": ">", "value": 20 },
//!                 { "sourceType": "tag", "source": "status", "operator": "=", "value": "running" },
//!                 { "sourceType": "variable", "source": "override", "operator": "is", "value": true }
//!             ],
//!             "grouping": "(1 AND 2) OR 3"
//!         }"#,
//!     )?;
//!
//!     let compiled = Compiler::builder(config).build().compile()?;
//!     let evaluator = Evaluator::new(compiled);
//!
//!     let snapshot = TypedEnvironment::new()
//!         .with_tag("temperature", 25.0, ValueType::Number)
//!         .with_tag("status", "running", ValueType::String)
//!         .with_variable("override", false, ValueType::Boolean);
//!
//!     let result = evaluator.eval(&snapshot)?;
//!     println!("-> {} because {}", result.value, result.reason);
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod compiler;
pub mod condition;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod flow;
pub mod prelude;
pub mod resolver;
pub mod trace;
