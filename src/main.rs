use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use banking::{AccountRegistry, OutputFormat, ReplayConfig, Scenario};

fn main() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    if args.len() == 3 && args[1] == "replay" {
        run_replay(Path::new(&args[2]))
    } else {
        print_usage();
        Ok(ExitCode::from(2))
    }
}

fn run_replay(scenario_path: &Path) -> Result<ExitCode> {
    let config = ReplayConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.log_filter)?;

    tracing::info!(
        version = banking::VERSION,
        scenario = %scenario_path.display(),
        "starting replay"
    );

    let scenario = Scenario::load(scenario_path)
        .with_context(|| format!("Failed to load scenario {}", scenario_path.display()))?;

    let registry = AccountRegistry::new();
    let report = scenario.replay(&registry, config.stop_on_error);

    match config.output {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => {
            let json = report
                .render_json()
                .context("Failed to serialize replay report")?;
            println!("{json}");
        }
    }

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn init_tracing(filter: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(filter)
        .with_context(|| format!("Invalid tracing filter `{filter}`"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

fn print_usage() {
    eprintln!("banking {}", banking::VERSION);
    eprintln!();
    eprintln!("Usage: banking replay <scenario.json>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  BANKING_LOG            tracing filter (default: info)");
    eprintln!("  BANKING_OUTPUT         text | json (default: text)");
    eprintln!("  BANKING_STOP_ON_ERROR  stop at the first rejected operation (default: false)");
}
