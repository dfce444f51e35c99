//! KnightCycle rewards engine - job runner
//!
//! Reads one JSON job from stdin, runs it against the configured reward
//! policy and rate table, and writes the JSON result to stdout.

use std::io::{self, Read, Write};

use engine::{jobs::Engine, jobs::Job, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Initialize tracing
    init_tracing(&config);

    tracing::info!("Starting KnightCycle rewards engine");
    tracing::info!("Environment: {}", config.environment);
    tracing::debug!(materials = config.rates.len(), "Loaded rate table");

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let job: Job = serde_json::from_str(&input)?;

    let engine = Engine::new(&config);
    let name = job.name();
    let mut stdout = io::stdout().lock();

    match engine.run(job) {
        Ok(result) => {
            tracing::info!(job = name, "Job completed");
            serde_json::to_writer_pretty(&mut stdout, &result)?;
            writeln!(stdout)?;
            Ok(())
        }
        Err(err) => {
            tracing::error!(job = name, "Error: {:?}", err);
            serde_json::to_writer_pretty(&mut stdout, &err.to_response())?;
            writeln!(stdout)?;
            Err(err.into())
        }
    }
}

/// Logs go to stderr so stdout carries only the job result
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.as_str().into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}
