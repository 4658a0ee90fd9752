use anyhow::{Context, Result};
use clap::Parser;
use rustle_apply::config::Config;
use rustle_apply::environment::VariableEnvironment;
use rustle_apply::runtime::{RulePlan, RuleRunner};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "rustle-apply")]
#[command(about = "Apply declarative rules to the local host")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct RustleApplyCli {
    /// Rule plan file (YAML or JSON)
    plan: Option<PathBuf>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show output of executed commands
    #[arg(short, long)]
    debug: bool,

    /// Shell interpreter for shell-mode commands and backticks
    #[arg(long)]
    shell: Option<String>,

    /// Kill commands running longer than this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// List registered modules and exit
    #[arg(long)]
    list_modules: bool,

    /// List registered functions and exit
    #[arg(long)]
    list_functions: bool,
}

impl RustleApplyCli {
    fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        Ok(config.with_overrides(self.debug, self.shell.clone(), self.timeout))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = RustleApplyCli::parse();

    let level = match cli.verbose {
        0 if !cli.debug => tracing::Level::INFO,
        0 | 1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    let config = cli.load_config()?;
    let runner = RuleRunner::new(config.clone());

    if cli.list_modules {
        for name in runner.modules().names() {
            let module = runner.modules().create(name, &config)?;
            println!("== {name} ==\n{}", module.documentation());
        }
        return Ok(());
    }

    if cli.list_functions {
        for name in runner.functions().names() {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(plan_path) = cli.plan.as_ref() else {
        eprintln!("No rule plan given. Run with --help for usage.");
        std::process::exit(2);
    };

    info!("Starting rustle-apply v{}", env!("CARGO_PKG_VERSION"));

    let plan = RulePlan::from_file(plan_path)
        .with_context(|| format!("loading {}", plan_path.display()))?;

    let mut env = VariableEnvironment::from_config(&config).with_host_defaults();
    plan.bind_variables(&mut env);

    match runner.run_plan(&plan, &env).await {
        Ok(summary) => {
            println!(
                "{} rules applied, {} changed",
                summary.total(),
                summary.changed()
            );
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}
