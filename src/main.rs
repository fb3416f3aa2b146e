use clap::Parser;
use funder::config::{ReadinessPolicy, RetryPolicy};
use funder::interfaces::cli::{Cli, Command};
use funder::interfaces::progress::Spinner;
use miette::Result;
use std::io;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    // A .env file is optional
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("funder=info")),
        )
        .init();

    let cli = Cli::parse();

    let snapshot = match cli.command {
        Command::Fund(args) => {
            let config = args.to_config()?;
            let mut engine = args.target.engine(&config).await?;
            if args.progress {
                engine = engine.with_progress(Box::new(Spinner::start()));
            }
            engine.converge(&config).await?;
            engine.snapshot(&config).await?
        }
        Command::Status(args) => {
            let config = args.to_config(RetryPolicy::default(), ReadinessPolicy::default())?;
            let engine = args.engine(&config).await?;
            engine.snapshot(&config).await?
        }
    };

    snapshot.write_json(io::stdout().lock())?;
    Ok(())
}
