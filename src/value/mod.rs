//! Expression values and function-call dispatch

mod builtins;
pub mod error;
pub mod functions;
pub mod node;

pub use error::*;
pub use functions::*;
pub use node::*;
