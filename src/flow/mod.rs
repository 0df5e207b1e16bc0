//! The pipeline document an If block lives in.
//!
//! A [`Flow`] is the editor's persisted graph: typed blocks connected by edges. This
//! module parses block configurations, validates a document before it is saved and
//! picks the branch an If block takes for a given snapshot.

pub mod blocks;
pub mod document;
pub mod store;
pub mod validate;

pub use blocks::*;
pub use document::*;
pub use store::{FlowStore, JsonFileStore, MemoryStore};
pub use validate::FlowIssue;
