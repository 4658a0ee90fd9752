//! Sequential application of rule plans

pub mod error;
pub mod executor;
pub mod plan;

pub use error::*;
pub use executor::*;
pub use plan::*;
