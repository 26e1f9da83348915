//! Application state management

use anyhow::{Context, Result};
use arbor_core::{DeviceRegistry, DeviceStore, Error, MemoryStore, TopologyAssembler};
use std::sync::Arc;
use tracing::info;

use crate::config::{Config, SeedDeviceConfig};
use crate::validate::validate_registration;

/// Shared application state
pub struct AppState {
    /// Device registration and flat lookups
    pub registry: DeviceRegistry,
    /// Topology tree assembly
    pub topology: TopologyAssembler,
    /// Configuration
    pub config: Config,
}

impl AppState {
    /// Create new application state, opening storage and registering seed devices
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let store: Arc<dyn DeviceStore> = match &config.storage.snapshot_path {
            Some(path) => Arc::new(
                MemoryStore::open(path)
                    .with_context(|| format!("Failed to open device snapshot {}", path))?,
            ),
            None => {
                info!("No snapshot path configured, devices are kept in memory only");
                Arc::new(MemoryStore::new())
            }
        };

        let state = Self::with_store(store, config);
        state.seed(&state.config.seed_devices)?;
        Ok(Arc::new(state))
    }

    /// Build state around an existing store
    pub fn with_store(store: Arc<dyn DeviceStore>, config: Config) -> Self {
        Self {
            registry: DeviceRegistry::new(Arc::clone(&store)),
            topology: TopologyAssembler::with_max_depth(store, config.topology.max_depth),
            config,
        }
    }

    /// Register configured devices, skipping ones already present
    fn seed(&self, seeds: &[SeedDeviceConfig]) -> Result<()> {
        for seed in seeds {
            let request = seed.to_request();
            validate_registration(&request)
                .with_context(|| format!("Invalid seed device {}", seed.mac_address))?;

            match self.registry.register(request) {
                Ok(_) => {}
                Err(Error::Conflict(_)) => {
                    info!(mac = %seed.mac_address, "Seed device already registered, skipping");
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to register seed device {}", seed.mac_address)
                    });
                }
            }
        }
        Ok(())
    }
}
