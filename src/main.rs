use anyhow::Result;
use tracing::info;

use quoin_uci::UciEngine;

fn main() -> Result<()> {
    // UCI talks over stdout; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    info!("quoin starting");
    UciEngine::new().run()?;
    Ok(())
}
