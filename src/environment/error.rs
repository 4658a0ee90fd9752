use std::time::Duration;
use thiserror::Error;

/// Failure to run a command, either a backtick substitution or a module command
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("error running command '{command}' {error}")]
    Launch { command: String, error: String },

    #[error("error running command '{command}' {status}")]
    Failed { command: String, status: String },

    #[error("error running command '{command}' timed out after {limit:?}")]
    TimedOut { command: String, limit: Duration },
}

impl ExecutionError {
    /// The original command text that failed
    pub fn command(&self) -> &str {
        match self {
            ExecutionError::Launch { command, .. }
            | ExecutionError::Failed { command, .. }
            | ExecutionError::TimedOut { command, .. } => command,
        }
    }

    pub(crate) fn launch(command: &str, err: std::io::Error) -> Self {
        ExecutionError::Launch {
            command: command.to_string(),
            error: err.to_string(),
        }
    }
}
