use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cardio_sdk::{RandomSource, SeededRandom, ThreadRandom};
use cardio_sim::{Args, Simulator, SimulatorConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = SimulatorConfig::load(&args)?;
    info!(
        patients = config.patient_count,
        interval = ?config.interval,
        output = %config.output,
        seed = ?config.seed,
        "Starting simulator"
    );

    let dispatcher = config.output.clone().into_dispatcher().await?;
    let random: Arc<dyn RandomSource> = match config.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom::new()),
    };

    let simulator = Simulator::builder()
        .patient_count(config.patient_count)
        .interval(config.interval)
        .random(random)
        .dispatcher(dispatcher)
        .build();

    let handle = simulator.start();

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    info!("Shutting down");
    handle.shutdown().await;

    Ok(())
}

/// Log to stderr so console output on stdout stays clean.
fn init_tracing() {
    // RUST_LOG wins; info otherwise
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
