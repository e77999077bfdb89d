//! Binary entry point: parse flags, open the log file, then hand an empty
//! inventory to the Ratatui event loop.
use clap::Parser;
use tracing::info;

use clinic_inventory::config::AppConfig;
use clinic_inventory::{logging, run_app, App, Inventory};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    let log_dir = config.log_dir()?;
    // Dropping the guard flushes buffered log lines, so it lives until exit.
    let _guard = logging::init(&log_dir, &config.log_level)?;

    let settings = config.settings();
    info!(?settings, log_dir = %log_dir.display(), "starting clinic inventory");

    let mut app = App::new(Inventory::started(settings));
    run_app(&mut app)
}
