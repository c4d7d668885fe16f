mod aws;
mod azure;
mod cli;

use ci_cleaner_config::load_settings;
use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let orchestrator = match cli.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Aws(args) => {
            let settings = load_settings(&cli.config).await?;
            aws::create_orchestrator(args, settings.aws).await?
        }
        Commands::Azure(args) => {
            let settings = load_settings(&cli.config).await?;
            azure::create_orchestrator(args, settings.azure)?
        }
    };

    let provider = orchestrator.provider();

    tokio::select! {
        result = orchestrator.clean() => {
            if let Err(errors) = result {
                tracing::error!(
                    "{} CI cleanup finished with {} error(s):\n{}",
                    provider,
                    errors.flatten().len(),
                    errors.dump()
                );
                anyhow::bail!("{provider} CI cleanup failed");
            }
            tracing::info!("{} CI cleanup finished without errors", provider);
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, abandoning {} CI cleanup", provider);
            anyhow::bail!("{provider} CI cleanup interrupted");
        }
    }
}
