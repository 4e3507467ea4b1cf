// Shared pieces for CLI commands: global options and service construction

use anyhow::{Context, Result};
use clap::{Args, ValueHint};
use rbi_ifsc::constants;
use rbi_ifsc::format::parse_duration;
use rbi_ifsc::{QueryService, ServiceConfig};
use std::path::PathBuf;
use std::time::Duration;

fn parse_max_age(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Persisted index file
    #[arg(long = "index-file", env = "RBI_IFSC_INDEX", global = true,
          default_value = constants::DEFAULT_INDEX_FILE, value_hint = ValueHint::FilePath)]
    pub index_file: PathBuf,

    /// RBI page listing the per-bank spreadsheets
    #[arg(long = "listing-url", env = "RBI_IFSC_LISTING_URL", global = true,
          default_value = constants::DEFAULT_LISTING_URL, value_hint = ValueHint::Url)]
    pub listing_url: String,

    /// Maximum size of any single download, in bytes
    #[arg(long = "max-bytes", global = true, default_value_t = constants::MAX_DOWNLOAD_BYTES)]
    pub max_bytes: u64,

    /// Rebuild the persisted index once it is older than this (60s, 5m, 1h, 7d; 0 = never)
    #[arg(long = "index-max-age", global = true, default_value = "0", value_parser = parse_max_age)]
    pub index_max_age: Duration,

    /// Suppress everything but errors
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            listing_url: self.listing_url.clone(),
            index_path: self.index_file.clone(),
            max_download_bytes: self.max_bytes,
            index_max_age: (!self.index_max_age.is_zero()).then_some(self.index_max_age),
            ..ServiceConfig::default()
        }
    }

    pub fn service(&self) -> Result<QueryService> {
        QueryService::new(self.service_config()).context("Failed to create query service")
    }
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create tokio runtime")
}
