//! `polaris` command-line front end

mod cli;
mod commands;
mod config;

use clap::Parser;
use cli::{Cli, Command};
use config::PolarisConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = PolarisConfig::load(cli.config.as_deref())?;
    if let Some(memory) = cli.memory {
        config.memory_dir = memory;
    }

    let output = match &cli.command {
        Command::Compose(args) => commands::run_compose(&config, args)?,
        Command::Interpret(args) => commands::run_interpret(&config, args)?,
        Command::Diagnose(args) => commands::run_diagnose(&config, args)?,
        Command::Simulate(args) => commands::run_simulate(&config, args)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
