use crate::ast::EvaluationTrace;
use crate::compiler::Compiler;
use crate::condition::{CompiledIf, IfBlockConfig};
use crate::error::{ConditionError, ErrorKind};
use crate::resolver::Resolver;
use crate::trace::TraceFormatter;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub mod atomic;
mod engine;

use engine::TreeEngine;

/// How the grouping tree combines leaf results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationStrategy {
    /// Evaluate every leaf left to right; the first failure aborts.
    #[default]
    Eager,
    /// Stop at the first operand that decides an `AND`/`OR`.
    ShortCircuit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub value: bool,
    pub reason: String,
    pub trace: Option<EvaluationTrace>,
}

/// The wire form of an evaluation: `{ ok, value }` or `{ ok, error, detail }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl EvaluationOutcome {
    pub fn success(value: bool) -> Self {
        Self {
            ok: true,
            value: Some(value),
            error: None,
            detail: None,
        }
    }

    pub fn failure(error: &ConditionError) -> Self {
        Self {
            ok: false,
            value: None,
            error: Some(error.kind()),
            detail: Some(error.to_string()),
        }
    }
}

impl From<Result<EvaluationResult, ConditionError>> for EvaluationOutcome {
    fn from(result: Result<EvaluationResult, ConditionError>) -> Self {
        match result {
            Ok(result) => EvaluationOutcome::success(result.value),
            Err(e) => EvaluationOutcome::failure(&e),
        }
    }
}

/// Evaluates a compiled If block against resolver snapshots.
///
/// An `Evaluator` holds no mutable state, so one instance can serve any number of
/// concurrent evaluations.
#[derive(Debug, Clone)]
pub struct Evaluator {
    compiled: CompiledIf,
    strategy: EvaluationStrategy,
}

impl Evaluator {
    pub fn new(compiled: CompiledIf) -> Self {
        Self {
            compiled,
            strategy: EvaluationStrategy::default(),
        }
    }

    /// Compiles `config` with default options and wraps the result.
    pub fn from_config(config: &IfBlockConfig) -> Result<Self, ConditionError> {
        Compiler::builder(config.clone())
            .build()
            .compile()
            .map(Self::new)
    }

    pub fn with_strategy(mut self, strategy: EvaluationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn compiled(&self) -> &CompiledIf {
        &self.compiled
    }

    pub fn eval(&self, resolver: &dyn Resolver) -> Result<EvaluationResult, ConditionError> {
        let Some(expression) = &self.compiled.expression else {
            return Ok(EvaluationResult {
                value: true,
                reason: "No conditions configured".to_string(),
                trace: None,
            });
        };

        let engine = TreeEngine::new(&self.compiled, resolver, self.strategy);
        let trace = engine.evaluate(expression)?;
        let value = trace.outcome().unwrap_or(false);
        let reason = TraceFormatter::format_trace(&trace);
        log::debug!("Evaluated '{}' -> {}", expression, value);

        Ok(EvaluationResult {
            value,
            reason,
            trace: Some(trace),
        })
    }

    /// Evaluates and converts the result into its wire form.
    pub fn outcome(&self, resolver: &dyn Resolver) -> EvaluationOutcome {
        self.eval(resolver).into()
    }

    /// Evaluates independent snapshots in parallel. Results keep the input order.
    pub fn eval_many<R: Resolver>(
        &self,
        snapshots: &[R],
    ) -> Vec<Result<EvaluationResult, ConditionError>> {
        snapshots
            .par_iter()
            .map(|snapshot| self.eval(snapshot))
            .collect()
    }
}

/// One-shot compile and evaluate. Compile failures are returned as data as well.
pub fn evaluate(config: &IfBlockConfig, resolver: &dyn Resolver) -> EvaluationOutcome {
    match Evaluator::from_config(config) {
        Ok(evaluator) => evaluator.outcome(resolver),
        Err(e) => EvaluationOutcome::failure(&e),
    }
}
