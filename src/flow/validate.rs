use super::blocks::Block;
use super::document::{BlockKind, Flow};
use crate::compiler::Compiler;
use crate::data::DataSourceSnapshot;
use crate::error::{ErrorKind, FlowError};
use crate::evaluator::{EvaluationResult, Evaluator};
use crate::resolver::{Catalog, Resolver};
use std::collections::HashSet;
use thiserror::Error;

/// Source handle an If block's true branch leaves through.
pub const TRUE_HANDLE: &str = "true";
/// Source handle an If block's false branch leaves through.
pub const FALSE_HANDLE: &str = "false";

/// A problem found while validating a flow before it is saved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowIssue {
    #[error("Flow has no start node")]
    MissingStart,

    #[error("Flow has more than one start node: {0:?}")]
    MultipleStarts(Vec<String>),

    #[error("Node id '{0}' is used more than once")]
    DuplicateNode(String),

    #[error("Edge '{edge_id}' points at missing node '{node_id}'")]
    DanglingEdge { edge_id: String, node_id: String },

    #[error("Node '{node_id}': {message}")]
    InvalidBlock { node_id: String, message: String },

    #[error("If block '{node_id}' does not compile ({kind:?}): {detail}")]
    Condition {
        node_id: String,
        kind: ErrorKind,
        detail: String,
    },

    #[error("Edge '{edge_id}' leaves If block '{node_id}' without a true/false handle")]
    UnknownBranchHandle { edge_id: String, node_id: String },
}

impl Flow {
    /// Save-time validation using only the flow's own variables as the catalog.
    pub fn validate(&self) -> Vec<FlowIssue> {
        self.validate_with(&self.catalog(None))
    }

    /// Save-time validation with a data source's declared types available.
    pub fn validate_against(&self, snapshot: &DataSourceSnapshot) -> Vec<FlowIssue> {
        self.validate_with(&self.catalog(Some(snapshot)))
    }

    fn validate_with(&self, catalog: &Catalog) -> Vec<FlowIssue> {
        let mut issues = Vec::new();

        let starts: Vec<String> = self
            .nodes
            .iter()
            .filter(|node| node.kind == BlockKind::Start)
            .map(|node| node.id.clone())
            .collect();
        match starts.len() {
            0 => issues.push(FlowIssue::MissingStart),
            1 => {}
            _ => issues.push(FlowIssue::MultipleStarts(starts)),
        }

        let mut ids = HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                issues.push(FlowIssue::DuplicateNode(node.id.clone()));
            }
        }

        for edge in &self.edges {
            for end in [&edge.source, &edge.target] {
                if !ids.contains(end.as_str()) {
                    issues.push(FlowIssue::DanglingEdge {
                        edge_id: edge.id.clone(),
                        node_id: end.clone(),
                    });
                }
            }
        }

        for node in &self.nodes {
            let block = match node.block() {
                Ok(block) => block,
                Err(e) => {
                    issues.push(FlowIssue::InvalidBlock {
                        node_id: node.id.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            let Block::If(config) = block else {
                continue;
            };

            if let Err(e) = Compiler::builder(config)
                .with_catalog(catalog.clone())
                .build()
                .compile()
            {
                issues.push(FlowIssue::Condition {
                    node_id: node.id.clone(),
                    kind: e.kind(),
                    detail: e.to_string(),
                });
            }

            for edge in self.outgoing(&node.id) {
                let handle = edge.source_handle.as_deref();
                if handle != Some(TRUE_HANDLE) && handle != Some(FALSE_HANDLE) {
                    issues.push(FlowIssue::UnknownBranchHandle {
                        edge_id: edge.id.clone(),
                        node_id: node.id.clone(),
                    });
                }
            }
        }

        if !issues.is_empty() {
            log::debug!("Flow '{}' has {} validation issue(s)", self.id, issues.len());
        }
        issues
    }

    /// Evaluates the If block `node_id` against one snapshot.
    pub fn evaluate_if(
        &self,
        node_id: &str,
        resolver: &dyn Resolver,
    ) -> Result<EvaluationResult, FlowError> {
        let node = self
            .node(node_id)
            .ok_or_else(|| FlowError::NodeNotFound(node_id.to_string()))?;
        let Block::If(config) = node.block()? else {
            return Err(FlowError::NotAnIfBlock {
                node_id: node_id.to_string(),
                kind: node.kind.to_string(),
            });
        };

        let condition_error = |source| FlowError::Condition {
            node_id: node_id.to_string(),
            source,
        };
        let evaluator = Evaluator::from_config(&config).map_err(condition_error)?;
        evaluator.eval(resolver).map_err(condition_error)
    }

    /// The node an If block hands control to, or `None` when that branch is unconnected.
    pub fn next_node(
        &self,
        if_node_id: &str,
        resolver: &dyn Resolver,
    ) -> Result<Option<&str>, FlowError> {
        let result = self.evaluate_if(if_node_id, resolver)?;
        let handle = if result.value { TRUE_HANDLE } else { FALSE_HANDLE };
        let target = self
            .edges
            .iter()
            .find(|edge| edge.source == if_node_id && edge.source_handle.as_deref() == Some(handle))
            .map(|edge| edge.target.as_str());

        log::debug!(
            "If block '{}' took the '{}' branch -> {:?} ({})",
            if_node_id,
            handle,
            target,
            result.reason
        );
        Ok(target)
    }
}
