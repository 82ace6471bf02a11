//! Module: config
//! Responsibility: immutable register mapping and mode selection for sorted collect.
//! Does not own: aggregator construction or executor state transitions.
//! Boundary: validated once, then shared read-only by the executor and its group.

mod error;

#[cfg(test)]
mod tests;

use crate::{context::ExecutionContext, value::TextMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use error::ConfigError;

///
/// RegisterId
///
/// Zero-based column slot inside an input or output row.
///

pub type RegisterId = usize;

///
/// RegisterPair
///
/// One grouping-key mapping from an input register to an output register.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterPair {
    pub output: RegisterId,
    pub input: RegisterId,
}

///
/// AggregateRegister
///
/// One aggregate terminal: kind name plus input and output registers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateRegister {
    pub kind: String,
    pub output: RegisterId,
    pub input: RegisterId,
}

///
/// CapturedVariable
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CapturedVariable {
    pub name: String,
    pub input: RegisterId,
}

///
/// CollectMode
///
/// Per-row work performed for the collect target.
/// Count and capture modes are mutually exclusive by construction.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectMode {
    /// Emit the number of rows in the group.
    Count,
    /// Collect one expression value per row into a list.
    Expression { input: RegisterId },
    /// Collect one `{ name: value, .. }` record per row into a list.
    Variables {
        #[serde(default)]
        variables: Vec<CapturedVariable>,
    },
}

impl CollectMode {
    #[must_use]
    pub const fn is_count(&self) -> bool {
        matches!(self, Self::Count)
    }
}

///
/// CollectTarget
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CollectTarget {
    pub output: RegisterId,
    pub mode: CollectMode,
}

///
/// SortedCollectConfig
///
/// Register layout and collect options for one sorted collect executor.
/// Immutable once handed to an executor.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SortedCollectConfig {
    input_registers: usize,
    output_registers: usize,
    #[serde(default)]
    registers_to_keep: Vec<RegisterId>,
    #[serde(default)]
    group_registers: Vec<RegisterPair>,
    #[serde(default)]
    aggregates: Vec<AggregateRegister>,
    #[serde(default)]
    collect: Option<CollectTarget>,
    #[serde(default)]
    text_mode: TextMode,
    #[serde(default)]
    debug: bool,
}

impl SortedCollectConfig {
    /// Build an empty config for the given row widths.
    #[must_use]
    pub const fn new(input_registers: usize, output_registers: usize) -> Self {
        Self {
            input_registers,
            output_registers,
            registers_to_keep: Vec::new(),
            group_registers: Vec::new(),
            aggregates: Vec::new(),
            collect: None,
            text_mode: TextMode::Cs,
            debug: false,
        }
    }

    /// Parse and validate a TOML config document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    #[must_use]
    pub fn with_group(mut self, output: RegisterId, input: RegisterId) -> Self {
        self.group_registers.push(RegisterPair { output, input });
        self
    }

    #[must_use]
    pub fn with_aggregate(
        mut self,
        kind: impl Into<String>,
        output: RegisterId,
        input: RegisterId,
    ) -> Self {
        self.aggregates.push(AggregateRegister {
            kind: kind.into(),
            output,
            input,
        });
        self
    }

    #[must_use]
    pub fn with_collect(mut self, output: RegisterId, mode: CollectMode) -> Self {
        self.collect = Some(CollectTarget { output, mode });
        self
    }

    #[must_use]
    pub fn with_count(self, output: RegisterId) -> Self {
        self.with_collect(output, CollectMode::Count)
    }

    #[must_use]
    pub fn with_registers_to_keep(mut self, registers: impl IntoIterator<Item = RegisterId>) -> Self {
        self.registers_to_keep = registers.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn with_text_mode(mut self, text_mode: TextMode) -> Self {
        self.text_mode = text_mode;
        self
    }

    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub const fn input_registers(&self) -> usize {
        self.input_registers
    }

    #[must_use]
    pub const fn output_registers(&self) -> usize {
        self.output_registers
    }

    #[must_use]
    pub fn registers_to_keep(&self) -> &[RegisterId] {
        &self.registers_to_keep
    }

    #[must_use]
    pub fn group_registers(&self) -> &[RegisterPair] {
        &self.group_registers
    }

    #[must_use]
    pub fn aggregates(&self) -> &[AggregateRegister] {
        &self.aggregates
    }

    /// Aggregate kind names in configured order.
    pub fn aggregate_types(&self) -> impl Iterator<Item = &str> {
        self.aggregates.iter().map(|aggregate| aggregate.kind.as_str())
    }

    #[must_use]
    pub const fn collect(&self) -> Option<&CollectTarget> {
        self.collect.as_ref()
    }

    /// Return true when the collect target emits a group row count.
    #[must_use]
    pub fn is_count(&self) -> bool {
        self.collect.as_ref().is_some_and(|target| target.mode.is_count())
    }

    #[must_use]
    pub const fn context(&self) -> ExecutionContext {
        ExecutionContext::new(self.text_mode, self.debug)
    }

    /// Output registers this executor writes for every produced row, in write order.
    pub fn writable_registers(&self) -> impl Iterator<Item = RegisterId> + '_ {
        self.group_registers
            .iter()
            .map(|pair| pair.output)
            .chain(self.aggregates.iter().map(|aggregate| aggregate.output))
            .chain(self.collect.iter().map(|target| target.output))
    }

    /// Input registers read for every row folded into a group.
    fn readable_registers(&self) -> impl Iterator<Item = (&'static str, RegisterId)> + '_ {
        let capture = self.collect.iter().flat_map(|target| match &target.mode {
            CollectMode::Count => Vec::new(),
            CollectMode::Expression { input } => vec![("expression", *input)],
            CollectMode::Variables { variables } => variables
                .iter()
                .map(|variable| ("variable", variable.input))
                .collect(),
        });

        self.group_registers
            .iter()
            .map(|pair| ("group", pair.input))
            .chain(
                self.aggregates
                    .iter()
                    .map(|aggregate| ("aggregate", aggregate.input)),
            )
            .chain(capture)
    }

    /// Validate register arity and uniqueness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen_outputs = BTreeSet::new();

        for register in self.writable_registers() {
            if register >= self.output_registers {
                return Err(ConfigError::RegisterOutOfRange {
                    role: "output",
                    register,
                    limit: self.output_registers,
                });
            }
            if !seen_outputs.insert(register) {
                return Err(ConfigError::DuplicateOutputRegister { register });
            }
        }
        if seen_outputs.is_empty() {
            return Err(ConfigError::NoOutputRegisters);
        }

        for (role, register) in self.readable_registers() {
            if register >= self.input_registers {
                return Err(ConfigError::RegisterOutOfRange {
                    role,
                    register,
                    limit: self.input_registers,
                });
            }
        }

        for &register in &self.registers_to_keep {
            let limit = self.input_registers.min(self.output_registers);
            if register >= limit {
                return Err(ConfigError::RegisterOutOfRange {
                    role: "keep",
                    register,
                    limit,
                });
            }
            if seen_outputs.contains(&register) {
                return Err(ConfigError::KeptRegisterOverwritten { register });
            }
        }

        for (index, aggregate) in self.aggregates.iter().enumerate() {
            if aggregate.kind.trim().is_empty() {
                return Err(ConfigError::EmptyAggregateKind { index });
            }
        }

        if let Some(CollectTarget {
            mode: CollectMode::Variables { variables },
            ..
        }) = &self.collect
        {
            let mut seen_names = BTreeSet::new();
            for variable in variables {
                if !seen_names.insert(variable.name.as_str()) {
                    return Err(ConfigError::DuplicateVariable {
                        name: variable.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
