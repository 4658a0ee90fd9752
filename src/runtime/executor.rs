use std::time::{Duration, Instant};

use crate::config::Config;
use crate::environment::Environment;
use crate::modules::{ModuleError, ModuleRegistry};
use crate::runtime::{
    error::RunError,
    plan::{Rule, RulePlan},
};
use crate::value::FunctionRegistry;

/// Outcome of one applied rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleResult {
    pub name: String,
    pub module: String,
    pub changed: bool,
    pub duration: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<RuleResult>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn changed(&self) -> usize {
        self.results.iter().filter(|r| r.changed).count()
    }
}

/// Applies rules one after another, stopping at the first failure.
///
/// Ordering across rules is whatever the plan says; there is no dependency
/// resolution here.
pub struct RuleRunner {
    config: Config,
    modules: ModuleRegistry,
    functions: FunctionRegistry,
}

impl RuleRunner {
    pub fn new(config: Config) -> Self {
        Self::with_registries(
            config,
            ModuleRegistry::with_core_modules(),
            FunctionRegistry::with_builtins(),
        )
    }

    pub fn with_registries(
        config: Config,
        modules: ModuleRegistry,
        functions: FunctionRegistry,
    ) -> Self {
        Self {
            config,
            modules,
            functions,
        }
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub async fn run_plan(
        &self,
        plan: &RulePlan,
        env: &dyn Environment,
    ) -> Result<RunSummary, RunError> {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();

        tracing::info!("Applying {} rules", plan.rules.len());

        for rule in &plan.rules {
            let result = self.run_rule(rule, env).await.map_err(|source| {
                tracing::error!("Rule '{}' failed: {}", rule.label(), source);
                RunError::RuleFailed {
                    rule: rule.label().to_string(),
                    source,
                }
            })?;
            summary.results.push(result);
        }

        summary.duration = start_time.elapsed();

        tracing::info!(
            "Run completed in {:?}: {} rules, {} changed",
            summary.duration,
            summary.total(),
            summary.changed()
        );

        Ok(summary)
    }

    /// Resolve a rule's arguments, then check and execute its module
    pub async fn run_rule(
        &self,
        rule: &Rule,
        env: &dyn Environment,
    ) -> Result<RuleResult, ModuleError> {
        let start_time = Instant::now();

        tracing::debug!("Applying rule: {} ({})", rule.label(), rule.module);

        let module = self.modules.create(&rule.module, &self.config)?;
        let args = rule.args.resolve(env, &self.functions).await?;

        module.check(&args)?;
        let changed = module.execute(env, &args).await?;

        let result = RuleResult {
            name: rule.label().to_string(),
            module: rule.module.clone(),
            changed,
            duration: start_time.elapsed(),
        };

        tracing::debug!(
            "Rule completed: {} - {} in {:?}",
            result.name,
            if changed { "CHANGED" } else { "OK" },
            result.duration
        );

        Ok(result)
    }
}
