use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use gridhand::{
    Capabilities, Config, Endpoint, RemoteBrowser, RunOutcome, Scenario, ScenarioRunner,
    SessionManager, StepRegistry,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    FirefoxWindows,
    ChromeWindows,
    SafariMac,
}

impl Variant {
    fn capabilities(self) -> Capabilities {
        match self {
            Variant::FirefoxWindows => Capabilities::firefox_windows(),
            Variant::ChromeWindows => Capabilities::chrome_windows(),
            Variant::SafariMac => Capabilities::safari_mac(),
        }
    }
}

/// Run a plain-text browser scenario against a remote WebDriver hub.
#[derive(Parser)]
#[command(name = "gridhand", version)]
struct Cli {
    /// Scenario file, one step per line.
    steps: PathBuf,

    /// Which remote browser to provision.
    #[arg(long, value_enum, default_value_t = Variant::FirefoxWindows)]
    variant: Variant,

    /// Remote hub host, with optional port.
    #[arg(long, env = "GRIDHAND_HUB", default_value = "hub.crossbrowsertesting.com:80")]
    hub: String,

    #[arg(long, env = "GRIDHAND_USERNAME")]
    username: String,

    #[arg(long, env = "GRIDHAND_ACCESS_KEY", hide_env_values = true)]
    access_key: String,

    /// Session name reported to the hub; defaults to the scenario file stem.
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let scenario_name = cli.name.clone().unwrap_or_else(|| {
        cli.steps
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scenario".to_string())
    });

    let text = std::fs::read_to_string(&cli.steps)
        .with_context(|| format!("reading steps file {}", cli.steps.display()))?;
    let scenario = Scenario::from_text(scenario_name.clone(), &text);

    let capabilities = cli.variant.capabilities().with_name(scenario_name);
    let endpoint = Endpoint::new(cli.hub, cli.username, cli.access_key);
    let config = Config::new(endpoint, capabilities);

    let session = Arc::new(SessionManager::new(RemoteBrowser::new()));
    let registry = StepRegistry::builtin()?;
    let runner = ScenarioRunner::new(config, registry, session);

    let report = runner.run(&scenario).await?;

    for step in &report.executed {
        info!(step = %step.line, elapsed_ms = step.execution_time_ms, "{}", step.message);
    }
    match &report.outcome {
        RunOutcome::Passed => {
            info!(run = %report.run_id, "scenario passed");
            Ok(())
        }
        RunOutcome::Failed { step, error } => {
            info!(run = %report.run_id, skipped = report.skipped, "scenario failed");
            anyhow::bail!("step {step:?} failed: {error}");
        }
    }
}
