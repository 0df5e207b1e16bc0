use crate::ast::Expression;
use crate::condition::{
    AtomicCondition, CompiledCondition, CompiledIf, IfBlockConfig, Literal, LogicOperator,
    Operand, OperandKind, Operator,
};
use crate::error::ConditionError;
use crate::evaluator::atomic;
use crate::resolver::Catalog;
use ahash::AHashMap;
use std::collections::BTreeMap;

#[cfg(feature = "debug-tools")]
use crate::ast::DisplayExpression;

pub mod lexer;
mod parser;

pub use parser::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_TERMS};

/// Parses a grouping expression on its own, without checking indices against a set.
pub fn parse_grouping(raw: &str) -> Result<Expression, ConditionError> {
    parse_with_limits(raw, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TERMS)
}

fn parse_with_limits(
    raw: &str,
    max_depth: usize,
    max_terms: usize,
) -> Result<Expression, ConditionError> {
    let tokens = lexer::tokenize(raw)?;
    parser::Parser::new(&tokens, raw.len(), max_depth)
        .with_max_terms(max_terms)
        .parse()
}

/// Compiles an [`IfBlockConfig`] into a validated [`CompiledIf`].
pub struct Compiler {
    config: IfBlockConfig,
    catalog: Option<Catalog>,
    aliases: AHashMap<String, Operator>,
    max_depth: usize,
    max_terms: usize,
}

pub struct CompilerBuilder {
    config: IfBlockConfig,
    catalog: Option<Catalog>,
    aliases: AHashMap<String, Operator>,
    max_depth: usize,
    max_terms: usize,
}

impl CompilerBuilder {
    pub fn new(config: IfBlockConfig) -> Self {
        Self {
            config,
            catalog: None,
            aliases: AHashMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_terms: DEFAULT_MAX_TERMS,
        }
    }

    /// Enables save-time type checks against the declared types in `catalog`.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Maps a custom operator spelling onto one of the built-in operators.
    ///
    /// An alias whose target is not a built-in operator is skipped with a warning.
    pub fn with_operator_alias(mut self, user_spelling: &str, operator: &str) -> Self {
        match Operator::parse(operator) {
            Some(op) => {
                self.aliases
                    .insert(user_spelling.trim().to_ascii_lowercase(), op);
            }
            None => log::warn!(
                "Ignoring operator alias '{}': '{}' is not a known operator",
                user_spelling,
                operator
            ),
        }
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Caps the number of conditions one expression may combine, including the
    /// implicit chain used when no grouping is configured.
    pub fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = max_terms;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            config: self.config,
            catalog: self.catalog,
            aliases: self.aliases,
            max_depth: self.max_depth,
            max_terms: self.max_terms,
        }
    }
}

impl Compiler {
    pub fn builder(config: IfBlockConfig) -> CompilerBuilder {
        CompilerBuilder::new(config)
    }

    pub fn compile(self) -> Result<CompiledIf, ConditionError> {
        // Offsets are reported against the grouping text as stored.
        let parsed = match (self.config.grouping_text(), self.config.grouping.as_deref()) {
            (Some(_), Some(raw)) => Some(parse_with_limits(raw, self.max_depth, self.max_terms)?),
            _ => None,
        };

        let indices = self.collect_indices()?;

        let expression = match parsed {
            Some(expr) => {
                Self::check_references(&expr, &indices)?;
                Some(expr)
            }
            None => {
                if indices.len() > self.max_terms {
                    return Err(ConditionError::Config(format!(
                        "{} conditions exceed the limit of {} per If block",
                        indices.len(),
                        self.max_terms
                    )));
                }
                let logic = self.config.logic_operator.unwrap_or_default();
                Expression::chain(&indices, logic == LogicOperator::Or)
            }
        };

        let mut conditions = BTreeMap::new();
        for (index, condition) in self.config.indexed() {
            let compiled = self.compile_condition(index, condition)?;
            if let Some(catalog) = &self.catalog {
                if let Some(declared) = catalog.declared_type(compiled.source_type, &compiled.source)
                {
                    atomic::check_static(&compiled, declared, catalog)?;
                }
            }
            conditions.insert(index, compiled);
        }

        if let Some(expr) = &expression {
            log::debug!(
                "Compiled {} condition(s) with grouping '{}'",
                conditions.len(),
                expr
            );
            #[cfg(feature = "debug-tools")]
            log::debug!("Grouping tree:\n{}", DisplayExpression { expr });
        } else {
            log::debug!("Compiled empty condition set; evaluation is vacuously true");
        }

        Ok(CompiledIf {
            expression,
            conditions,
        })
    }

    /// Effective indices in ascending order. Zero and duplicates are rejected.
    fn collect_indices(&self) -> Result<Vec<u32>, ConditionError> {
        let mut indices: Vec<u32> = self.config.indexed().map(|(index, _)| index).collect();
        if indices.contains(&0) {
            return Err(ConditionError::Config(
                "condition indices are 1-based; found index 0".to_string(),
            ));
        }
        indices.sort_unstable();
        if let Some(pair) = indices.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ConditionError::Config(format!(
                "duplicate condition index {}",
                pair[0]
            )));
        }
        Ok(indices)
    }

    fn check_references(expr: &Expression, indices: &[u32]) -> Result<(), ConditionError> {
        match expr
            .indices()
            .into_iter()
            .find(|index| indices.binary_search(index).is_err())
        {
            Some(index) => Err(ConditionError::UnknownIndex {
                index,
                available: indices.to_vec(),
            }),
            None => Ok(()),
        }
    }

    fn resolve_operator(&self, raw: &str) -> Option<Operator> {
        self.aliases
            .get(&raw.trim().to_ascii_lowercase())
            .copied()
            .or_else(|| Operator::parse(raw))
    }

    fn compile_condition(
        &self,
        index: u32,
        condition: &AtomicCondition,
    ) -> Result<CompiledCondition, ConditionError> {
        let source = condition.source.trim();
        if source.is_empty() {
            return Err(ConditionError::Config(format!(
                "condition {} has no source",
                index
            )));
        }

        let operator = self.resolve_operator(&condition.operator).ok_or_else(|| {
            ConditionError::Config(format!(
                "condition {} uses unknown operator '{}'",
                index, condition.operator
            ))
        })?;

        let operand = if !operator.takes_operand() {
            Operand::None
        } else {
            match condition.operand_kind() {
                OperandKind::Literal => Operand::Literal(Literal::from(&condition.value)),
                OperandKind::Reference => {
                    let value_ref = condition
                        .value_ref
                        .as_deref()
                        .map(str::trim)
                        .filter(|r| !r.is_empty())
                        .ok_or_else(|| {
                            ConditionError::Config(format!(
                                "condition {} compares against a reference but has no valueRef",
                                index
                            ))
                        })?;
                    Operand::Reference {
                        source_type: condition.value_ref_type.unwrap_or(condition.source_type),
                        source: value_ref.to_string(),
                    }
                }
            }
        };

        Ok(CompiledCondition {
            index,
            source_type: condition.source_type,
            source: source.to_string(),
            operator,
            operand,
        })
    }
}
