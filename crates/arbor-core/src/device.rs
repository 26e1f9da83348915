//! Device types for the network registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a device, assigned by storage on save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub Uuid);

impl DeviceId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of network device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    Gateway,
    Switch,
    AccessPoint,
}

impl DeviceType {
    /// Listing precedence: gateways first, access points last
    pub fn precedence(self) -> u8 {
        match self {
            Self::Gateway => 1,
            Self::Switch => 2,
            Self::AccessPoint => 3,
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Gateway => "GATEWAY",
            Self::Switch => "SWITCH",
            Self::AccessPoint => "ACCESS_POINT",
        };
        f.write_str(name)
    }
}

/// A registered device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Storage-assigned identifier
    pub id: DeviceId,
    pub device_type: DeviceType,
    /// Hardware address, unique across the registry
    pub mac_address: String,
    /// Parent device in the physical topology; `None` for roots
    pub uplink_id: Option<DeviceId>,
    /// When the device was persisted
    pub registered_at: DateTime<Utc>,
}

impl Device {
    pub fn is_root(&self) -> bool {
        self.uplink_id.is_none()
    }
}

/// A device that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewDevice {
    pub device_type: DeviceType,
    pub mac_address: String,
    pub uplink_id: Option<DeviceId>,
}

impl NewDevice {
    pub fn new(device_type: DeviceType, mac_address: impl Into<String>) -> Self {
        Self {
            device_type,
            mac_address: mac_address.into(),
            uplink_id: None,
        }
    }

    /// Attach an uplink reference
    pub fn with_uplink(mut self, uplink_id: DeviceId) -> Self {
        self.uplink_id = Some(uplink_id);
        self
    }
}
