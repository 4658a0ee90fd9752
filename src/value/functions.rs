//! Registry of functions callable from rule expressions

use std::collections::HashMap;
use std::sync::Arc;

use crate::environment::Environment;
use crate::value::{builtins, error::EvalError, node::FunctionValue};

/// A callable taking the evaluated string arguments of a function call
pub type Function =
    Arc<dyn Fn(&dyn Environment, &[String]) -> Result<FunctionValue, EvalError> + Send + Sync>;

/// Table of named functions, built once at startup and read-only afterwards
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Function>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Create a registry with all built-in functions pre-registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&dyn Environment, &[String]) -> Result<FunctionValue, EvalError>
            + Send
            + Sync
            + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
