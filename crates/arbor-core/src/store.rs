//! Device storage
//!
//! The registry and topology assembler only talk to storage through the
//! [`DeviceStore`] trait. [`MemoryStore`] is the bundled implementation: an
//! insertion-ordered table with a MAC index and a derived downlink index
//! keyed by parent identifier. It can optionally write through to a JSON
//! snapshot file so the registry survives restarts.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::device::{Device, DeviceId, NewDevice};
use crate::error::{Error, Result};

/// Storage capabilities required by the core
pub trait DeviceStore: Send + Sync {
    /// Look up a single device by hardware address
    fn find_by_mac(&self, mac_address: &str) -> Result<Option<Device>>;

    /// All devices, in insertion order
    fn find_all(&self) -> Result<Vec<Device>>;

    /// Devices without an uplink, in insertion order
    fn find_roots(&self) -> Result<Vec<Device>>;

    /// Devices whose uplink is `id`, in insertion order
    fn find_downlinks(&self, id: &DeviceId) -> Result<Vec<Device>>;

    /// Persist a new device, assigning its identifier
    fn save(&self, device: NewDevice) -> Result<Device>;
}

/// On-disk snapshot format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub devices: Vec<Device>,
}

fn default_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Default)]
struct Tables {
    devices: Vec<Device>,
    by_id: HashMap<DeviceId, usize>,
    by_mac: HashMap<String, usize>,
    downlinks: HashMap<DeviceId, Vec<usize>>,
}

impl Tables {
    /// Insert a fully formed device, enforcing MAC uniqueness and uplink existence
    fn insert(&mut self, device: Device) -> Result<()> {
        if self.by_mac.contains_key(&device.mac_address) {
            return Err(Error::Conflict(format!(
                "Device with MAC {} already exists",
                device.mac_address
            )));
        }
        if self.by_id.contains_key(&device.id) {
            return Err(Error::Conflict(format!(
                "Device with id {} already exists",
                device.id
            )));
        }
        if let Some(uplink) = device.uplink_id {
            if !self.by_id.contains_key(&uplink) {
                return Err(Error::NotFound(format!("Uplink device {} not found", uplink)));
            }
        }

        let idx = self.devices.len();
        self.by_id.insert(device.id, idx);
        self.by_mac.insert(device.mac_address.clone(), idx);
        if let Some(uplink) = device.uplink_id {
            self.downlinks.entry(uplink).or_default().push(idx);
        }
        self.devices.push(device);
        Ok(())
    }

    /// Undo the most recent insert
    fn pop(&mut self) {
        let Some(device) = self.devices.pop() else {
            return;
        };
        self.by_id.remove(&device.id);
        self.by_mac.remove(&device.mac_address);
        if let Some(uplink) = device.uplink_id {
            if let Some(children) = self.downlinks.get_mut(&uplink) {
                children.pop();
                if children.is_empty() {
                    self.downlinks.remove(&uplink);
                }
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: default_version(),
            devices: self.devices.clone(),
        }
    }
}

/// In-memory device store with optional JSON write-through
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty, volatile store
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by a snapshot file
    ///
    /// Existing records are replayed in order through the same checks
    /// `save` applies, so a snapshot with duplicate MACs or dangling
    /// uplinks is rejected.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut tables = Tables::default();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let snapshot: Snapshot = serde_json::from_str(&content)?;
            for device in snapshot.devices {
                tables.insert(device)?;
            }
            info!(
                path = %path.display(),
                devices = tables.devices.len(),
                "Loaded device snapshot"
            );
        } else {
            info!(path = %path.display(), "Snapshot not found, starting empty");
        }

        Ok(Self {
            tables: RwLock::new(tables),
            snapshot_path: Some(path),
        })
    }

    /// Number of stored devices
    pub fn len(&self) -> usize {
        self.read().devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, tables: &Tables) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(&tables.snapshot())?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent)?;
                parent
            }
            _ => Path::new("."),
        };

        // Write beside the target and rename over it so readers never see a partial file
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        debug!(path = %path.display(), "Snapshot written");
        Ok(())
    }
}

impl DeviceStore for MemoryStore {
    fn find_by_mac(&self, mac_address: &str) -> Result<Option<Device>> {
        let tables = self.read();
        Ok(tables
            .by_mac
            .get(mac_address)
            .map(|&idx| tables.devices[idx].clone()))
    }

    fn find_all(&self) -> Result<Vec<Device>> {
        Ok(self.read().devices.clone())
    }

    fn find_roots(&self) -> Result<Vec<Device>> {
        Ok(self
            .read()
            .devices
            .iter()
            .filter(|d| d.is_root())
            .cloned()
            .collect())
    }

    fn find_downlinks(&self, id: &DeviceId) -> Result<Vec<Device>> {
        let tables = self.read();
        Ok(tables
            .downlinks
            .get(id)
            .map(|children| {
                children
                    .iter()
                    .map(|&idx| tables.devices[idx].clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn save(&self, device: NewDevice) -> Result<Device> {
        let device = Device {
            id: DeviceId::generate(),
            device_type: device.device_type,
            mac_address: device.mac_address,
            uplink_id: device.uplink_id,
            registered_at: Utc::now(),
        };

        let mut tables = self.write();
        tables.insert(device.clone())?;
        if let Err(e) = self.persist(&tables) {
            tables.pop();
            return Err(e);
        }
        Ok(device)
    }
}
