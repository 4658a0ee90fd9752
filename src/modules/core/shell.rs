//! Shell module - executes shell commands

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::environment::{CommandLauncher, Environment, OutputMode, ProcessLauncher};
use crate::modules::{
    error::ModuleError,
    interface::{ArgValue, ArgumentSpec, Module, ModuleArgs, ModuleDocumentation},
};

/// Characters that cannot survive naive whitespace splitting
const SHELL_METACHARACTERS: [char; 4] = ['>', '&', '|', '<'];

/// Shell module - executes one or more command lines
pub struct ShellModule {
    config: Config,
    launcher: Arc<dyn CommandLauncher>,
}

impl ShellModule {
    pub fn new(config: &Config) -> Self {
        Self::with_launcher(config, Arc::new(ProcessLauncher::from_config(config)))
    }

    pub fn with_launcher(config: &Config, launcher: Arc<dyn CommandLauncher>) -> Self {
        Self {
            config: config.clone(),
            launcher,
        }
    }

    fn extract_commands(args: &ModuleArgs) -> Result<Vec<String>, ModuleError> {
        match args.get("command") {
            None => Err(ModuleError::missing("command")),
            Some(ArgValue::String(command)) => Ok(vec![command.clone()]),
            Some(ArgValue::List(commands)) => Ok(commands.clone()),
            Some(other) => Err(ModuleError::Cast {
                arg: "command".to_string(),
                reason: format!(
                    "expected a string or a list of strings, got {}",
                    other.type_name()
                ),
            }),
        }
    }

    /// Argument vector for one command line.
    ///
    /// The shell is used when the `shell` argument is "true" (any case) or the
    /// command contains redirection, backgrounding or piping. Otherwise the
    /// command is split on whitespace and run directly; quoted arguments
    /// containing spaces are not supported in that mode.
    fn build_argv(&self, command: &str, args: &ModuleArgs) -> Vec<String> {
        let requested = args
            .string_param("shell")
            .is_some_and(|shell| shell.eq_ignore_ascii_case("true"));

        if requested || command.contains(SHELL_METACHARACTERS) {
            self.launcher.shell_argv(command)
        } else {
            command.split_whitespace().map(String::from).collect()
        }
    }

    async fn execute_single(&self, command: &str, args: &ModuleArgs) -> Result<(), ModuleError> {
        let argv = self.build_argv(command, args);
        let output = OutputMode::for_config(&self.config);

        self.launcher.run(command, &argv, output).await?;
        Ok(())
    }
}

#[async_trait]
impl Module for ShellModule {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn check(&self, args: &ModuleArgs) -> Result<(), ModuleError> {
        if !args.contains_key("command") {
            return Err(ModuleError::missing("command"));
        }
        Ok(())
    }

    async fn execute(
        &self,
        _env: &dyn Environment,
        args: &ModuleArgs,
    ) -> Result<bool, ModuleError> {
        let commands = Self::extract_commands(args)?;

        for command in &commands {
            if let Err(e) = self.execute_single(command, args).await {
                tracing::warn!("Shell command failed: {}", e);
                return Err(e);
            }
        }

        // Shell commands always count as a change
        Ok(true)
    }

    fn documentation(&self) -> ModuleDocumentation {
        ModuleDocumentation {
            description: "Execute commands on the local host".to_string(),
            arguments: vec![
                ArgumentSpec {
                    name: "command".to_string(),
                    description: "A command line, or a list of command lines run in order until one fails.".to_string(),
                    required: true,
                    argument_type: "str or list".to_string(),
                    default: None,
                },
                ArgumentSpec {
                    name: "shell".to_string(),
                    description: "Run through the shell interpreter even without redirection or pipes.".to_string(),
                    required: false,
                    argument_type: "str".to_string(),
                    default: Some("false".to_string()),
                },
            ],
            examples: vec![
                r#"module: shell
args:
  command: "uptime""#.to_string(),
                r#"module: shell
args:
  command:
    - "apt-get update"
    - "apt-get install -y nginx > /tmp/install.log""#.to_string(),
            ],
        }
    }
}
