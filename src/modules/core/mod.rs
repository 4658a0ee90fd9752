//! Core execution modules

pub mod shell;

pub use shell::ShellModule;
