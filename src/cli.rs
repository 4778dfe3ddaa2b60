use std::path::PathBuf;

use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::report::OutputFormat;

pub const DEFAULT_CONFIG: &str = "config.toml";

/// Flags every report binary takes.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    #[arg(long, default_value = DEFAULT_CONFIG, help = "SecurityCenter config file (TOML)")]
    pub config: PathBuf,
    #[arg(short, long, conflicts_with = "json", help = "Write CSV instead of XML")]
    pub csv: bool,
    #[arg(long, help = "Write a pretty JSON dump instead of XML")]
    pub json: bool,
    #[arg(short, long, help = "Output file name, without extension")]
    pub filename: Option<String>,
    #[arg(short, long, help = "Log at debug level")]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn format(&self) -> OutputFormat {
        if self.csv {
            OutputFormat::Csv
        } else if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Xml
        }
    }

    pub fn stem<'a>(&'a self, default: &'a str) -> &'a str {
        self.filename.as_deref().unwrap_or(default)
    }

    /// `RUST_LOG` wins over `--verbose`.
    pub fn init_logging(&self) {
        let level = if self.verbose { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_line_number(true)
            .with_env_filter(filter)
            .init();
    }
}
