//! Process launching behind an injectable capability

use async_trait::async_trait;
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::config::Config;
use crate::environment::error::ExecutionError;

/// Where a launched child's stdout/stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Connected to the controlling process's console
    Inherit,
    /// Captured and thrown away
    Discard,
}

impl OutputMode {
    pub fn for_config(config: &Config) -> Self {
        if config.debug {
            OutputMode::Inherit
        } else {
            OutputMode::Discard
        }
    }
}

/// Runs argument vectors on behalf of modules and environments.
///
/// `command` is the original command text and is only used for error reporting;
/// `argv` is what actually gets executed.
#[async_trait]
pub trait CommandLauncher: Send + Sync {
    /// Argument vector that runs `command` through the command interpreter
    fn shell_argv(&self, command: &str) -> Vec<String>;

    /// Run to completion, succeeding only on a zero exit status
    async fn run(
        &self,
        command: &str,
        argv: &[String],
        output: OutputMode,
    ) -> Result<(), ExecutionError>;

    /// Run to completion and return stdout with trailing line breaks removed
    async fn capture(&self, command: &str, argv: &[String]) -> Result<String, ExecutionError>;
}

/// Launches real host processes through tokio
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    shell: String,
    timeout: Option<Duration>,
}

impl ProcessLauncher {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            shell: config.shell.clone(),
            timeout: config.command_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    fn build(&self, command: &str, argv: &[String]) -> Result<Command, ExecutionError> {
        let (program, rest) = argv.split_first().ok_or_else(|| ExecutionError::Launch {
            command: command.to_string(),
            error: "empty command".to_string(),
        })?;

        let mut cmd = Command::new(program);
        cmd.args(rest).kill_on_drop(true);
        Ok(cmd)
    }

    async fn bounded<T, F>(&self, command: &str, fut: F) -> Result<T, ExecutionError>
    where
        F: Future<Output = std::io::Result<T>>,
    {
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                ExecutionError::TimedOut {
                    command: command.to_string(),
                    limit,
                }
            })?,
            None => fut.await,
        };

        result.map_err(|e| ExecutionError::launch(command, e))
    }
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[async_trait]
impl CommandLauncher for ProcessLauncher {
    fn shell_argv(&self, command: &str) -> Vec<String> {
        vec![self.shell.clone(), "-c".to_string(), command.to_string()]
    }

    async fn run(
        &self,
        command: &str,
        argv: &[String],
        output: OutputMode,
    ) -> Result<(), ExecutionError> {
        let mut cmd = self.build(command, argv)?;

        tracing::debug!("CMD: {}", shell_words::join(argv));

        let status = match output {
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
                self.bounded(command, cmd.status()).await?
            }
            OutputMode::Discard => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
                self.bounded(command, cmd.output()).await?.status
            }
        };

        if !status.success() {
            return Err(ExecutionError::Failed {
                command: command.to_string(),
                status: status.to_string(),
            });
        }

        Ok(())
    }

    async fn capture(&self, command: &str, argv: &[String]) -> Result<String, ExecutionError> {
        let mut cmd = self.build(command, argv)?;
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        tracing::debug!("CMD: {}", shell_words::join(argv));

        let output = self.bounded(command, cmd.output()).await?;
        if !output.status.success() {
            return Err(ExecutionError::Failed {
                command: command.to_string(),
                status: output.status.to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim_end_matches(['\n', '\r']).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_trims_trailing_newlines() {
        let launcher = ProcessLauncher::new("sh");
        let argv = launcher.shell_argv("printf 'hello\\n\\n'");
        let out = launcher.capture("printf", &argv).await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_run_reports_exit_status() {
        let launcher = ProcessLauncher::new("sh");
        let argv = vec!["false".to_string()];
        let err = launcher
            .run("false", &argv, OutputMode::Discard)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Failed { .. }));
        assert_eq!(err.command(), "false");
    }

    #[tokio::test]
    async fn test_run_missing_binary_is_launch_error() {
        let launcher = ProcessLauncher::new("sh");
        let argv = vec!["definitely-not-a-real-binary-xyz".to_string()];
        let err = launcher
            .run("definitely-not-a-real-binary-xyz", &argv, OutputMode::Discard)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Launch { .. }));
    }

    #[tokio::test]
    async fn test_empty_argv_is_launch_error() {
        let launcher = ProcessLauncher::new("sh");
        let err = launcher
            .run("", &[], OutputMode::Discard)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty command"));
    }

    #[tokio::test]
    async fn test_timeout_kills_long_command() {
        let launcher = ProcessLauncher::new("sh").with_timeout(Duration::from_millis(200));
        let argv = launcher.shell_argv("sleep 5");
        let err = launcher
            .run("sleep 5", &argv, OutputMode::Discard)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::TimedOut { .. }));
        let message = err.to_string();
        assert!(message.contains("timed out after 200ms"));
        assert!(!message.contains("0s"));
    }

    #[tokio::test]
    async fn test_discarded_output_stays_out_of_errors() {
        let launcher = ProcessLauncher::new("sh");
        let command = "echo SECRET_OUT; echo SECRET_ERR >&2; exit 4";
        let argv = launcher.shell_argv(command);
        let err = launcher
            .run(command, &argv, OutputMode::Discard)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, ExecutionError::Failed { .. }));
        assert!(message.contains(command));
        assert!(!message.contains("SECRET_OUT"));
        assert!(!message.contains("SECRET_ERR"));
    }
}
