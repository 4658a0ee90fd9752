//! Central registry for all execution modules

use std::collections::HashMap;

use crate::config::Config;
use crate::environment::Environment;
use crate::modules::{
    error::ModuleError,
    interface::{Module, ModuleArgs},
};

/// Builds a module instance for the active configuration
pub type ModuleFactory = Box<dyn Fn(&Config) -> Box<dyn Module> + Send + Sync>;

/// Central registry for all execution modules
pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with all core modules pre-registered
    pub fn with_core_modules() -> Self {
        let mut registry = Self::new();

        registry.register("shell", |config: &Config| {
            Box::new(crate::modules::core::ShellModule::new(config)) as Box<dyn Module>
        });

        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Config) -> Box<dyn Module> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Construct the named module with the given configuration
    pub fn create(&self, name: &str, config: &Config) -> Result<Box<dyn Module>, ModuleError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ModuleError::ModuleNotFound {
                name: name.to_string(),
            })?;

        Ok(factory(config))
    }

    /// Look up, construct, check and execute a module in one step
    pub async fn run(
        &self,
        name: &str,
        config: &Config,
        env: &dyn Environment,
        args: &ModuleArgs,
    ) -> Result<bool, ModuleError> {
        let module = self.create(name, config)?;

        module.check(args)?;
        module.execute(env, args).await
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
