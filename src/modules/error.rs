use thiserror::Error;

use crate::environment::ExecutionError;
use crate::value::EvalError;

/// Errors that can occur during module operations
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("{message}")]
    Parameter { message: String },

    #[error("Invalid argument {arg}: {reason}")]
    Cast { arg: String, reason: String },

    #[error("Module not found: {name}")]
    ModuleNotFound { name: String },

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

impl ModuleError {
    pub fn missing(arg: &str) -> Self {
        ModuleError::Parameter {
            message: format!("missing '{arg}' parameter"),
        }
    }
}
