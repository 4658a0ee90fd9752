//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use rustle_apply::environment::{CommandLauncher, Environment, ExecutionError, OutputMode};

/// Records every launch instead of starting processes.
///
/// Commands whose program name is in `failing` report a non-zero exit.
#[derive(Default)]
pub struct RecordingLauncher {
    pub launched: Mutex<Vec<(Vec<String>, OutputMode)>>,
    failing: HashSet<String>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(programs: &[&str]) -> Self {
        Self {
            launched: Mutex::new(Vec::new()),
            failing: programs.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.launched
            .lock()
            .unwrap()
            .iter()
            .map(|(argv, _)| argv.clone())
            .collect()
    }

    pub fn modes(&self) -> Vec<OutputMode> {
        self.launched
            .lock()
            .unwrap()
            .iter()
            .map(|(_, mode)| *mode)
            .collect()
    }

    fn record(&self, command: &str, argv: &[String], mode: OutputMode) -> Result<(), ExecutionError> {
        self.launched.lock().unwrap().push((argv.to_vec(), mode));

        match argv.first() {
            Some(program) if self.failing.contains(program) => Err(ExecutionError::Failed {
                command: command.to_string(),
                status: "exit status: 1".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CommandLauncher for RecordingLauncher {
    fn shell_argv(&self, command: &str) -> Vec<String> {
        vec!["/bin/test-shell".to_string(), "-c".to_string(), command.to_string()]
    }

    async fn run(
        &self,
        command: &str,
        argv: &[String],
        output: OutputMode,
    ) -> Result<(), ExecutionError> {
        self.record(command, argv, output)
    }

    async fn capture(&self, command: &str, argv: &[String]) -> Result<String, ExecutionError> {
        self.record(command, argv, OutputMode::Discard)?;
        Ok(format!("output of {command}"))
    }
}

/// Environment with fixed bindings that records backtick commands.
///
/// Commands starting with "fail" are reported as failures.
#[derive(Default)]
pub struct RecordingEnvironment {
    pub bindings: HashMap<String, String>,
    pub executed: Mutex<Vec<String>>,
}

impl RecordingEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Environment for RecordingEnvironment {
    fn expand(&self, raw: &str) -> String {
        let mut expanded = raw.to_string();
        for (name, value) in &self.bindings {
            expanded = expanded.replace(&format!("${{{name}}}"), value);
        }
        expanded
    }

    async fn execute_command(&self, command: &str) -> Result<String, ExecutionError> {
        self.executed.lock().unwrap().push(command.to_string());

        if command.starts_with("fail") {
            return Err(ExecutionError::Failed {
                command: command.to_string(),
                status: "exit status: 1".to_string(),
            });
        }
        Ok(format!("<{command}>"))
    }
}
