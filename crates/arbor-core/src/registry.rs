//! Device registration and flat lookups

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::device::{DeviceId, DeviceType, NewDevice};
use crate::error::{Error, Result};
use crate::listing::{sort_by_type, DeviceSummary};
use crate::store::DeviceStore;

/// Registration input, already checked for field format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    pub device_type: DeviceType,
    pub mac_address: String,
    /// Uplink MAC; absent, empty and blank all mean "no uplink"
    #[serde(default)]
    pub uplink_mac_address: Option<String>,
}

impl RegisterDeviceRequest {
    /// The uplink MAC if one was actually requested
    pub fn requested_uplink(&self) -> Option<&str> {
        self.uplink_mac_address
            .as_deref()
            .filter(|mac| !mac.trim().is_empty())
    }
}

/// Projection of a freshly registered device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredDevice {
    pub id: DeviceId,
    pub device_type: DeviceType,
    pub mac_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uplink_mac_address: Option<String>,
}

/// Registers devices and serves flat device queries
#[derive(Clone)]
pub struct DeviceRegistry {
    store: Arc<dyn DeviceStore>,
}

impl DeviceRegistry {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self { store }
    }

    /// Underlying store, shared with the topology assembler
    pub fn store(&self) -> Arc<dyn DeviceStore> {
        Arc::clone(&self.store)
    }

    /// Register a device, attaching its uplink when one is requested
    ///
    /// The uplink is resolved before anything is written; an unknown uplink
    /// MAC fails the call without persisting the device.
    pub fn register(&self, request: RegisterDeviceRequest) -> Result<RegisteredDevice> {
        let mut device = NewDevice::new(request.device_type, request.mac_address.clone());

        let uplink = match request.requested_uplink() {
            Some(uplink_mac) => {
                let parent = self.store.find_by_mac(uplink_mac)?.ok_or_else(|| {
                    Error::NotFound(format!("Parent device with MAC {} not found", uplink_mac))
                })?;
                device = device.with_uplink(parent.id);
                Some(parent)
            }
            None => None,
        };

        let saved = self.store.save(device)?;
        info!(
            id = %saved.id,
            mac = %saved.mac_address,
            device_type = %saved.device_type,
            uplink = uplink.as_ref().map(|u| u.mac_address.as_str()).unwrap_or("-"),
            "Device registered"
        );

        Ok(RegisteredDevice {
            id: saved.id,
            device_type: saved.device_type,
            mac_address: saved.mac_address,
            uplink_mac_address: uplink.map(|u| u.mac_address),
        })
    }

    /// All devices, gateways first, then switches, then access points
    pub fn list_all(&self) -> Result<Vec<DeviceSummary>> {
        let devices = self.store.find_all()?;
        if devices.is_empty() {
            return Err(Error::NotFound("No device(s) found".to_string()));
        }

        debug!(count = devices.len(), "Listing devices");
        Ok(sort_by_type(devices).iter().map(DeviceSummary::from).collect())
    }

    /// Single device by MAC address
    pub fn get_by_mac(&self, mac_address: &str) -> Result<DeviceSummary> {
        self.store
            .find_by_mac(mac_address)?
            .map(|device| DeviceSummary::from(&device))
            .ok_or_else(|| {
                Error::NotFound(format!("Device with MAC {} not found", mac_address))
            })
    }
}
