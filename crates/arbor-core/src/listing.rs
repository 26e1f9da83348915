//! Flat device listing ordered by device type

use serde::{Deserialize, Serialize};

use crate::device::{Device, DeviceType};

/// Flat projection of a device used by listing and lookup responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    pub device_type: DeviceType,
    pub mac_address: String,
}

impl From<&Device> for DeviceSummary {
    fn from(device: &Device) -> Self {
        Self {
            device_type: device.device_type,
            mac_address: device.mac_address.clone(),
        }
    }
}

/// Sort devices gateway → switch → access point
///
/// The sort is stable: devices of the same type keep the order they came in.
pub fn sort_by_type(mut devices: Vec<Device>) -> Vec<Device> {
    devices.sort_by_key(|d| d.device_type.precedence());
    devices
}
