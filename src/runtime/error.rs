use thiserror::Error;

use crate::modules::ModuleError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Rule '{rule}' failed: {source}")]
    RuleFailed {
        rule: String,
        #[source]
        source: ModuleError,
    },

    #[error("Failed to read plan {path}: {error}")]
    Read { path: String, error: String },

    #[error("Invalid plan {path}: {error}")]
    Parse { path: String, error: String },
}
