use crate::{config::RegisterId, error::InternalError};
use thiserror::Error as ThisError;

///
/// ConfigError
///
/// Canonical rejection taxonomy for sorted collect configs.
/// Keeps register layout failures explicit before execution starts.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("{role} register {register} out of range (limit={limit})")]
    RegisterOutOfRange {
        role: &'static str,
        register: RegisterId,
        limit: usize,
    },

    #[error("output register {register} is written more than once")]
    DuplicateOutputRegister { register: RegisterId },

    #[error("kept register {register} is also written by the executor")]
    KeptRegisterOverwritten { register: RegisterId },

    #[error("sorted collect config writes no output registers")]
    NoOutputRegisters,

    #[error("aggregate at index={index} has an empty kind")]
    EmptyAggregateKind { index: usize },

    #[error("unknown aggregate kind at index={index}: {kind}")]
    UnknownAggregate { index: usize, kind: String },

    #[error("captured variable '{name}' is listed more than once")]
    DuplicateVariable { name: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::config_unsupported(err.to_string())
    }
}
