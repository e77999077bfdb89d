//! Command-line and environment configuration. Every flag has an environment
//! fallback so the TUI can be tuned without retyping arguments.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use directories::BaseDirs;

use crate::inventory::{
    InventorySettings, DEFAULT_EXPIRY_DAYS, DEFAULT_LOW_STOCK_EQUIPMENT, DEFAULT_LOW_STOCK_MEDICINE,
};

/// Folder name used beneath the user's home directory for the diagnostic log.
const DATA_DIR_NAME: &str = ".clinic-inventory";

#[derive(Debug, Clone, Parser)]
#[command(name = "clinic-inventory", version, about = "Terminal clinic inventory manager")]
pub struct AppConfig {
    /// Total quantity at or below which a medicine counts as low stock.
    #[arg(long, env = "CLINIC_LOW_STOCK_MEDICINE", default_value_t = DEFAULT_LOW_STOCK_MEDICINE)]
    pub low_stock_medicine: u32,

    /// Stock at or below which equipment counts as low stock.
    #[arg(long, env = "CLINIC_LOW_STOCK_EQUIPMENT", default_value_t = DEFAULT_LOW_STOCK_EQUIPMENT)]
    pub low_stock_equipment: u32,

    /// Days ahead that count as "expiring soon".
    #[arg(long, env = "CLINIC_EXPIRY_DAYS", default_value_t = DEFAULT_EXPIRY_DAYS)]
    pub expiry_days: u32,

    /// Directory for the diagnostic log file. Defaults to ~/.clinic-inventory.
    #[arg(long, env = "CLINIC_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log filter in `tracing` env-filter syntax, e.g. `debug` or
    /// `clinic_inventory::store=debug`.
    #[arg(long, env = "CLINIC_LOG", default_value = "info")]
    pub log_level: String,
}

impl AppConfig {
    pub fn settings(&self) -> InventorySettings {
        InventorySettings {
            low_stock_medicine: self.low_stock_medicine,
            low_stock_equipment: self.low_stock_equipment,
            expiry_days: self.expiry_days,
        }
    }

    /// Resolve the log directory, falling back to the home directory.
    pub fn log_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.log_dir {
            return Ok(dir.clone());
        }
        let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
    }
}
