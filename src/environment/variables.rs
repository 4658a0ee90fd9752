use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::environment::{
    error::ExecutionError,
    launcher::{CommandLauncher, ProcessLauncher},
    Environment,
};

static VARIABLE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("variable reference pattern is valid")
});

/// Variable bindings backed by a map, running backticks through a launcher.
///
/// References are written `${name}` or `$name`. Lookup order is the bound
/// variables, then the process environment; anything unresolved becomes an
/// empty string.
pub struct VariableEnvironment {
    variables: HashMap<String, String>,
    launcher: Arc<dyn CommandLauncher>,
}

impl VariableEnvironment {
    pub fn new() -> Self {
        Self::with_launcher(Arc::new(ProcessLauncher::default()))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_launcher(Arc::new(ProcessLauncher::from_config(config)))
    }

    pub fn with_launcher(launcher: Arc<dyn CommandLauncher>) -> Self {
        Self {
            variables: HashMap::new(),
            launcher,
        }
    }

    /// Pre-bind facts about the local host
    pub fn with_host_defaults(mut self) -> Self {
        self.set("ARCH", std::env::consts::ARCH);
        self.set("OS", std::env::consts::OS);

        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());
        self.set("HOSTNAME", hostname);

        if let Some(home) = dirs::home_dir() {
            self.set("HOMEDIR", home.to_string_lossy());
        }
        if let Ok(user) = std::env::var("USER") {
            self.set("USERNAME", user);
        }

        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(|v| v.as_str())
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    fn lookup(&self, name: &str) -> String {
        self.variables
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
            .unwrap_or_default()
    }
}

impl Default for VariableEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Environment for VariableEnvironment {
    fn expand(&self, raw: &str) -> String {
        VARIABLE_REFERENCE
            .replace_all(raw, |caps: &Captures| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                self.lookup(name)
            })
            .into_owned()
    }

    async fn execute_command(&self, command: &str) -> Result<String, ExecutionError> {
        let expanded = self.expand(command);
        let argv = self.launcher.shell_argv(&expanded);
        self.launcher.capture(command, &argv).await
    }
}
