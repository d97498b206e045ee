use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tokio::runtime::Builder;
use tracing::debug;

use phishscan::cli::Cli;
use phishscan::config::ScanConfig;
use phishscan::core::PhishChecker;
use phishscan::display::Screen;
use phishscan::repl;

fn main() -> Result<()> {
    let _cli = Cli::parse();

    // Log to stderr so scan output on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Scans are strictly sequential; one thread is enough
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    let result = runtime.block_on(async_main());

    // A stdin read abandoned at the prompt blocks until the next line;
    // don't wait on it.
    runtime.shutdown_background();
    result
}

async fn async_main() -> Result<()> {
    let checker = PhishChecker::new(ScanConfig::default())?;
    let screen = Screen::detect();

    let reason = repl::run(
        &checker,
        &screen,
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        tokio::signal::ctrl_c(),
    )
    .await?;

    debug!("Exiting after {:?}", reason);
    Ok(())
}
