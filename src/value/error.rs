use thiserror::Error;

use crate::environment::ExecutionError;

/// Errors that can occur while evaluating a value
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("function {name} not defined")]
    Lookup { name: String },

    #[error("{message}")]
    Cast { message: String },

    #[error("function {name} failed: {message}")]
    Function { name: String, message: String },

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl EvalError {
    pub fn function(name: &str, message: impl Into<String>) -> Self {
        EvalError::Function {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
