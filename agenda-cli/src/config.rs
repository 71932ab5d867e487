use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_agenda_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA timezone used to interpret date/time input (e.g. "Europe/Rome").
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub watch: WatchSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSection {
    /// Seconds between deadline scans.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Alert when a deadline is at most this many seconds away.
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_interval_secs() -> u64 {
    60
}

fn default_window_secs() -> i64 {
    60
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            watch: WatchSection::default(),
        }
    }
}

impl Config {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone in config: {}", self.timezone))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_agenda_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    let s = toml::to_string_pretty(&cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    println!("Wrote {}", p.display());
    Ok(())
}
