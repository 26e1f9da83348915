//! Topology trees built from uplink/downlink relationships

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::device::{Device, DeviceId};
use crate::error::{Error, Result};
use crate::store::DeviceStore;

/// A device and its downlink subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyNode {
    /// MAC address of the device at this node
    pub mac_address: String,
    /// Downlink subtrees, in storage order (always present, empty for leaves)
    #[serde(default)]
    pub children: Vec<TopologyNode>,
}

impl TopologyNode {
    /// Leaf node for a device
    pub fn leaf(device: &Device) -> Self {
        Self {
            mac_address: device.mac_address.clone(),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of nodes in this subtree, including itself
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TopologyNode::size).sum::<usize>()
    }
}

/// Deepest downlink level assembled by default (the root is level 0)
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Builds topology trees by walking downlinks through storage
///
/// Assembly recurses once per level, and so do serializing and dropping the
/// resulting tree, so chains deeper than `max_depth` are rejected with
/// [`Error::DepthExceeded`] instead of being walked.
#[derive(Clone)]
pub struct TopologyAssembler {
    store: Arc<dyn DeviceStore>,
    max_depth: usize,
}

impl TopologyAssembler {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self::with_max_depth(store, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(store: Arc<dyn DeviceStore>, max_depth: usize) -> Self {
        Self { store, max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Tree rooted at the device with the given MAC address
    pub fn assemble_from(&self, mac_address: &str) -> Result<TopologyNode> {
        let device = self.store.find_by_mac(mac_address)?.ok_or_else(|| {
            Error::NotFound(format!(
                "Topology with device MAC {} not found",
                mac_address
            ))
        })?;

        debug!(mac = %mac_address, "Assembling topology");
        self.build(&device, 0, &mut HashSet::new())
    }

    /// One tree per root device, in the order storage returns the roots
    pub fn assemble_all(&self) -> Result<Vec<TopologyNode>> {
        let roots = self.store.find_roots()?;
        if roots.is_empty() {
            return Err(Error::NotFound(
                "No device(s) found in network topology".to_string(),
            ));
        }

        debug!(roots = roots.len(), "Assembling network topology");
        let mut visited = HashSet::new();
        roots
            .iter()
            .map(|root| self.build(root, 0, &mut visited))
            .collect()
    }

    fn build(
        &self,
        device: &Device,
        depth: usize,
        visited: &mut HashSet<DeviceId>,
    ) -> Result<TopologyNode> {
        if depth > self.max_depth {
            return Err(Error::DepthExceeded(format!(
                "Network topology deeper than {} levels at device MAC {}",
                self.max_depth, device.mac_address
            )));
        }
        if !visited.insert(device.id) {
            return Err(Error::CycleDetected(format!(
                "Cycle detected in network topology at device MAC {}",
                device.mac_address
            )));
        }

        let mut node = TopologyNode::leaf(device);
        for child in self.store.find_downlinks(&device.id)? {
            node.children.push(self.build(&child, depth + 1, visited)?);
        }
        Ok(node)
    }
}
