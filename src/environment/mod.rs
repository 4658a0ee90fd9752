//! Variable bindings and command execution that values evaluate against

pub mod error;
pub mod launcher;
pub mod variables;

pub use error::*;
pub use launcher::*;
pub use variables::*;

use async_trait::async_trait;

/// Context every value evaluates against.
///
/// Implementations must be safe for concurrent reads once initialised.
#[async_trait]
pub trait Environment: Send + Sync {
    /// Resolve variable references inside `raw`. Never fails.
    fn expand(&self, raw: &str) -> String;

    /// Run `command` through the host command interpreter and return its
    /// stdout with trailing line breaks removed.
    async fn execute_command(&self, command: &str) -> Result<String, ExecutionError>;
}
