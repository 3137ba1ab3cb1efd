//! Configuration for the thermoboxd daemon.
//!
//! Everything here has a working default; a YAML file only overrides the
//! pieces a deployment cares about (bind address, tick cadence, device
//! nodes). The TCP port is deliberately not configuration: it is the one
//! required CLI argument.

use std::{
    env, fs,
    net::IpAddr,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

/// Main configuration structure for the thermoboxd daemon.
///
/// # Example
///
/// ```yaml
/// version: 1
/// listen_addr: "0.0.0.0"
/// tick_seconds: 1
/// heater_device: /dev/microwave
/// fan_device: /dev/eprofan
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Configuration version for compatibility checking.
    pub version: u8,

    /// Address the listener binds on; the port comes from the CLI.
    #[serde(default = "defaults::listen_addr")]
    pub listen_addr: IpAddr,

    /// Control loop interval in seconds.
    #[serde(default = "defaults::tick_seconds")]
    pub tick_seconds: u16,

    /// Heater bank device node.
    #[serde(default = "defaults::heater_device")]
    pub heater_device: PathBuf,

    /// Fan device node.
    #[serde(default = "defaults::fan_device")]
    pub fan_device: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            listen_addr: defaults::listen_addr(),
            tick_seconds: defaults::tick_seconds(),
            heater_device: defaults::heater_device(),
            fan_device: defaults::fan_device(),
        }
    }
}

mod defaults {
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;

    pub fn listen_addr() -> IpAddr {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    }

    pub fn tick_seconds() -> u16 {
        1
    }

    pub fn heater_device() -> PathBuf {
        PathBuf::from("/dev/microwave")
    }

    pub fn fan_device() -> PathBuf {
        PathBuf::from("/dev/eprofan")
    }
}

impl Config {
    /// Loads configuration from the given path or the standard locations.
    ///
    /// Lookup order:
    /// 1. The explicit path parameter (errors if unreadable)
    /// 2. `THERMOBOXD_CONFIG` environment variable
    /// 3. `$XDG_CONFIG_HOME/thermoboxd/config.yml` or
    ///    `~/.config/thermoboxd/config.yml`
    /// 4. `/etc/thermoboxd/config.yml`
    ///
    /// With no file in any location, built-in defaults apply.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let Some(config_path) = locate_config(path) else {
            info!("no configuration file found, using defaults");
            return Ok(Self::default());
        };

        info!("loading config from: {}", config_path.display());
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML in: {}", config_path.display()))?;

        if config.version != 1 {
            anyhow::bail!(
                "unsupported config version {} in file: {}",
                config.version,
                config_path.display()
            );
        }

        Ok(config)
    }
}

fn locate_config(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }

    if let Ok(env_path) = env::var("THERMOBOXD_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    if let Some(mut cfg_dir) = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|h| Path::new(&h).join(".config")))
    {
        cfg_dir.push("thermoboxd/config.yml");
        if cfg_dir.exists() {
            return Some(cfg_dir);
        }
    }

    let etc = Path::new("/etc/thermoboxd/config.yml");
    if etc.exists() {
        return Some(etc.to_path_buf());
    }

    None
}
