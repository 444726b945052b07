mod config;
mod publish;

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, Utc};
use clap::Parser;
use config::Config;
use edt_provider_celcat::CelcatService;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edt-ics")]
#[command(about = "Fetch a CELCAT timetable and publish it as an .ics calendar file")]
#[command(
    after_help = "Credentials are read from the CELCAT_USERNAME and CELCAT_PASSWORD environment variables."
)]
struct Cli {
    /// Config file (defaults to ./edt-ics.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output .ics file (overrides the config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Portal id whose timetable is fetched (overrides the config)
    #[arg(long)]
    entity_id: Option<String>,

    /// Try every entity type of a base URL and keep the largest result
    #[arg(long)]
    exhaustive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(entity_id) = cli.entity_id {
        config.entity_id = entity_id;
    }
    if cli.exhaustive {
        config.exhaustive_entity_types = true;
    }
    config.validate()?;

    let service = CelcatService::new(config.request_timeout());
    publish::run(
        &service,
        &config,
        |var| std::env::var(var).ok(),
        Utc::now(),
        Local::now().date_naive(),
    )
    .await?;

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
