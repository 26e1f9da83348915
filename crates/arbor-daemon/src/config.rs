//! Configuration loading

use anyhow::Result;
use arbor_core::{DeviceType, RegisterDeviceRequest, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub topology: TopologyConfig,
    #[serde(default, rename = "seed_device")]
    pub seed_devices: Vec<SeedDeviceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON snapshot file; devices are kept in memory only when unset
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Deepest downlink level returned in a topology tree
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Device registered at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDeviceConfig {
    pub device_type: DeviceType,
    pub mac_address: String,
    #[serde(default)]
    pub uplink_mac_address: Option<String>,
}

impl SeedDeviceConfig {
    pub fn to_request(&self) -> RegisterDeviceRequest {
        RegisterDeviceRequest {
            device_type: self.device_type,
            mac_address: self.mac_address.clone(),
            uplink_mac_address: self.uplink_mac_address.clone(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Sample configuration printed by `--print-default-config`
pub fn sample_config() -> Result<String> {
    let config = Config {
        daemon: DaemonConfig::default(),
        storage: StorageConfig {
            snapshot_path: Some("./arbor-devices.json".to_string()),
        },
        topology: TopologyConfig::default(),
        seed_devices: vec![
            SeedDeviceConfig {
                device_type: DeviceType::Gateway,
                mac_address: "70:1A:2B:3C:4D:5E".to_string(),
                uplink_mac_address: None,
            },
            SeedDeviceConfig {
                device_type: DeviceType::AccessPoint,
                mac_address: "AA:BB:CC:DD:EE:FF".to_string(),
                uplink_mac_address: Some("70:1A:2B:3C:4D:5E".to_string()),
            },
        ],
    };

    Ok(toml::to_string_pretty(&config)?)
}
