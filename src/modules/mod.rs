//! Pluggable automation modules and the registry that builds them

pub mod core;
pub mod error;
pub mod interface;
pub mod registry;

// Re-export commonly used types
pub use error::*;
pub use interface::*;
pub use registry::{ModuleFactory, ModuleRegistry};
