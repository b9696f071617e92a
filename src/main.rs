use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use garnet_uci::UciEngine;

fn main() -> Result<()> {
    // Stdout is the UCI channel; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    info!("garnet starting");
    UciEngine::new().run()?;
    Ok(())
}
