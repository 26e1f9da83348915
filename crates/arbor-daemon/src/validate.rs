//! Request field validation

use arbor_core::{Error, RegisterDeviceRequest};
use regex::Regex;
use std::sync::LazyLock;

static MAC_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").expect("valid MAC address pattern")
});

const MAC_FORMAT_MESSAGE: &str = "must be a MAC address like 00:1A:2B:3C:4D:5E";

pub fn is_mac_address(value: &str) -> bool {
    MAC_ADDRESS.is_match(value)
}

/// Check field formats of a registration request
///
/// A blank uplink is accepted as-is; the registry treats it as "no uplink".
pub fn validate_registration(request: &RegisterDeviceRequest) -> Result<(), Error> {
    if request.mac_address.trim().is_empty() {
        return Err(field_error("macAddress", "must not be blank"));
    }
    if !is_mac_address(&request.mac_address) {
        return Err(field_error("macAddress", MAC_FORMAT_MESSAGE));
    }
    if let Some(uplink) = request.requested_uplink() {
        if !is_mac_address(uplink) {
            return Err(field_error("uplinkMacAddress", MAC_FORMAT_MESSAGE));
        }
    }
    Ok(())
}

fn field_error(field: &str, reason: &str) -> Error {
    Error::Validation(format!("{}: {}", field, reason))
}
