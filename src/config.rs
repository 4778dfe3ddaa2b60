use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ScError};
use crate::REPORT_PATH;

pub const TEMPLATE: &str = r#"[security_center]
host = "10.0.0.1"
username = "auditor"
password = "password"
report_dir = "./reports/"
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub security_center: SecurityCenterConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityCenterConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
    /// SecurityCenter ships with a self-signed certificate.
    #[serde(default)]
    pub verify_tls: bool,
}

impl Config {
    pub fn parse(text: &str) -> Result<Config> {
        toml::from_str(text).map_err(|e| ScError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(ScError::Config(format!(
                "{} not found, create it with:\n{TEMPLATE}",
                path.display()
            )));
        }
        let mut config = Config::parse(&fs::read_to_string(path)?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `SC_HOST`, `SC_USERNAME` and `SC_PASSWORD` win over the file.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let sc = &mut self.security_center;
        if let Some(host) = lookup("SC_HOST") {
            sc.host = host;
        }
        if let Some(username) = lookup("SC_USERNAME") {
            sc.username = username;
        }
        if let Some(password) = lookup("SC_PASSWORD") {
            sc.password = password;
        }
    }

    pub fn report_dir(&self) -> Result<PathBuf> {
        match &self.security_center.report_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                Ok(dir.clone())
            }
            None => Ok(REPORT_PATH.clone()),
        }
    }
}
