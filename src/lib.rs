//! Rustle Apply - declarative host automation
//!
//! This crate provides the value model rule files evaluate to, the registry of
//! functions those values may call, and the module framework that applies rules
//! to the local host.

pub mod config;
pub mod environment;
pub mod modules;
pub mod runtime;
pub mod value;

pub use config::Config;
pub use environment::{Environment, VariableEnvironment};
pub use modules::{Module, ModuleArgs, ModuleError, ModuleRegistry};
pub use value::{EvalError, FunctionRegistry, Node};
