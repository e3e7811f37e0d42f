//! Unified Error Model
use brasp_expr::EvalError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BraspError {
    /// Bad operation definition; raised at construction time only.
    #[error("VALIDATION/{0}")]
    ValidationError(String),

    /// Input is not a sequence of single-character symbols.
    #[error("INPUT/{0}")]
    InputError(String),

    #[error("EVAL/{operation}[{position}]: {source}")]
    EvaluationError {
        operation: String,
        position: usize,
        #[source]
        source: EvalError,
    },
}

impl BraspError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub(crate) fn evaluation(operation: &str, position: usize, source: EvalError) -> Self {
        Self::EvaluationError {
            operation: operation.to_string(),
            position,
            source,
        }
    }
}
