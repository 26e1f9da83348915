//! Arbor Core - Device registry and network topology assembly
//!
//! This crate provides the foundational pieces of the Arbor system:
//! - Device types (gateways, switches, access points) and their uplink links
//! - A storage seam with an in-memory, snapshot-backed implementation
//! - Registration with uplink resolution and MAC uniqueness
//! - Type-ordered flat listings and recursive topology trees

pub mod device;
pub mod error;
pub mod listing;
pub mod registry;
pub mod store;
pub mod topology;

pub use device::{Device, DeviceId, DeviceType, NewDevice};
pub use error::{Error, ErrorKind, Result};
pub use listing::{sort_by_type, DeviceSummary};
pub use registry::{DeviceRegistry, RegisterDeviceRequest, RegisteredDevice};
pub use store::{DeviceStore, MemoryStore, Snapshot};
pub use topology::{TopologyAssembler, TopologyNode, DEFAULT_MAX_DEPTH};
