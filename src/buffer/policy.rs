//! Buffering Policy Selector

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::network::NetworkTier;

const MEGABYTE: u64 = 1000 * 1000;

/// Device class used to size buffers and controls timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    /// Viewports narrower than `breakpoint_px` are mobile
    pub fn from_viewport_width(width_px: u32, breakpoint_px: u32) -> Self {
        if width_px < breakpoint_px {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Buffer targets handed to the adaptive session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferingPolicy {
    pub target_buffer_seconds: u32,
    pub max_buffer_seconds: u32,
    pub max_buffer_bytes: u64,
}

/// Map a tier and device class to buffer targets
///
/// Pure and total. The maximum buffer length is always twice the target.
pub fn select_policy(tier: NetworkTier, device: DeviceClass) -> BufferingPolicy {
    use DeviceClass::{Desktop, Mobile};

    let (target_buffer_seconds, max_buffer_megabytes) = match (tier, device) {
        (NetworkTier::Slow2g | NetworkTier::TwoG, _) => (10, 30),
        (NetworkTier::ThreeG, Mobile) => (15, 60),
        (NetworkTier::ThreeG, Desktop) => (20, 60),
        (NetworkTier::FourGOrBetter, Mobile) => (25, 100),
        (NetworkTier::FourGOrBetter, Desktop) => (35, 150),
        (NetworkTier::Unknown, Mobile) => (20, 60),
        (NetworkTier::Unknown, Desktop) => (30, 120),
    };

    BufferingPolicy {
        target_buffer_seconds,
        max_buffer_seconds: target_buffer_seconds * 2,
        max_buffer_bytes: max_buffer_megabytes * MEGABYTE,
    }
}

/// Caches the policy for the current (tier, device class) pair
///
/// The policy only changes when one of its inputs changes; repeated updates
/// with the same inputs are free.
#[derive(Debug, Clone)]
pub struct BufferingPolicySelector {
    tier: NetworkTier,
    device: DeviceClass,
    current: BufferingPolicy,
    cache: HashMap<(NetworkTier, DeviceClass), BufferingPolicy>,
}

impl BufferingPolicySelector {
    pub fn new(tier: NetworkTier, device: DeviceClass) -> Self {
        let current = select_policy(tier, device);
        let mut cache = HashMap::with_capacity(NetworkTier::ALL.len() * 2);
        cache.insert((tier, device), current);

        Self {
            tier,
            device,
            current,
            cache,
        }
    }

    pub fn current(&self) -> BufferingPolicy {
        self.current
    }

    pub fn tier(&self) -> NetworkTier {
        self.tier
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    /// Update the inputs; returns the new policy if it changed
    pub fn update(&mut self, tier: NetworkTier, device: DeviceClass) -> Option<BufferingPolicy> {
        if tier == self.tier && device == self.device {
            return None;
        }

        self.tier = tier;
        self.device = device;

        let policy = *self
            .cache
            .entry((tier, device))
            .or_insert_with(|| select_policy(tier, device));

        if policy == self.current {
            return None;
        }

        debug!("Buffering policy for {:?}/{:?}: {:?}", tier, device, policy);
        self.current = policy;
        Some(policy)
    }

    pub fn set_tier(&mut self, tier: NetworkTier) -> Option<BufferingPolicy> {
        self.update(tier, self.device)
    }

    pub fn set_device(&mut self, device: DeviceClass) -> Option<BufferingPolicy> {
        self.update(self.tier, device)
    }
}
