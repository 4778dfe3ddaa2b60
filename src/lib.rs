use std::{fs, path::PathBuf};

use once_cell::sync::Lazy;

pub mod cli;
pub mod client;
pub mod config;
pub mod epoch;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod sc;
pub mod users;

#[cfg(test)]
mod testing;

pub use client::{AnalysisQuery, Filter, QueryClient, Tool};
pub use config::Config;
pub use error::{Result, ScError};
pub use reconcile::{reconcile, ReconciliationRecord, ReportOptions};
pub use sc::SecurityCenter;

pub static REPORT_PATH: Lazy<PathBuf> = Lazy::new(|| {
    let report_path = PathBuf::from("./reports/");
    fs::create_dir_all(&report_path).unwrap_or_default();
    report_path
});

/// Logs in with the configured credentials.
pub fn connect(config: &Config) -> Result<SecurityCenter> {
    let sc = &config.security_center;
    SecurityCenter::login(&sc.host, &sc.username, &sc.password, sc.verify_tls)
}
