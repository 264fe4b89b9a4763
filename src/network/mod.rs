//! Network condition monitoring
//!
//! The platform's connection descriptor is coarse and advisory. It only
//! parameterizes buffering policy and never gates playback.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::platform::{ConnectionProbe, Subscription};

/// Effective bandwidth tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkTier {
    Unknown,
    Slow2g,
    TwoG,
    ThreeG,
    FourGOrBetter,
}

impl NetworkTier {
    /// All tiers, slowest first after `Unknown`
    pub const ALL: [NetworkTier; 5] = [
        NetworkTier::Unknown,
        NetworkTier::Slow2g,
        NetworkTier::TwoG,
        NetworkTier::ThreeG,
        NetworkTier::FourGOrBetter,
    ];

    /// Map a platform effective-type label ("slow-2g", "2g", "3g", "4g")
    pub fn from_effective_type(effective_type: &str) -> Self {
        match effective_type.trim().to_ascii_lowercase().as_str() {
            "slow-2g" => NetworkTier::Slow2g,
            "2g" => NetworkTier::TwoG,
            "3g" => NetworkTier::ThreeG,
            "4g" | "5g" => NetworkTier::FourGOrBetter,
            _ => NetworkTier::Unknown,
        }
    }

    /// Short label for host display
    pub fn label(self) -> &'static str {
        match self {
            NetworkTier::Unknown => "UNKNOWN",
            NetworkTier::Slow2g => "SLOW-2G",
            NetworkTier::TwoG => "2G",
            NetworkTier::ThreeG => "3G",
            NetworkTier::FourGOrBetter => "4G",
        }
    }

    /// Indicator strength for host display
    pub fn signal_strength(self) -> SignalStrength {
        match self {
            NetworkTier::Slow2g | NetworkTier::TwoG => SignalStrength::Poor,
            NetworkTier::ThreeG => SignalStrength::Fair,
            NetworkTier::FourGOrBetter | NetworkTier::Unknown => SignalStrength::Good,
        }
    }
}

/// Coarse connection quality indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalStrength {
    Poor,
    Fair,
    Good,
}

/// Platform connection descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Effective connection type label
    pub effective_type: String,

    /// Estimated downlink in megabits per second
    pub downlink_mbps: f64,

    /// Estimated round-trip time in milliseconds
    pub rtt_ms: u32,
}

impl ConnectionInfo {
    pub fn new(effective_type: impl Into<String>, downlink_mbps: f64, rtt_ms: u32) -> Self {
        Self {
            effective_type: effective_type.into(),
            downlink_mbps,
            rtt_ms,
        }
    }

    pub fn tier(&self) -> NetworkTier {
        NetworkTier::from_effective_type(&self.effective_type)
    }
}

/// Network Condition Monitor
///
/// Reads the descriptor once on construction and, when the platform can
/// notify, keeps a change subscription until [`detach`](Self::detach) or drop.
#[derive(Debug)]
pub struct NetworkConditionMonitor {
    tier: NetworkTier,
    connection: Option<ConnectionInfo>,
    subscription: Option<Subscription>,
}

impl NetworkConditionMonitor {
    /// Sample the probe and subscribe to changes if supported
    pub fn new(probe: &mut dyn ConnectionProbe) -> Self {
        let connection = probe.current();
        let tier = connection
            .as_ref()
            .map(ConnectionInfo::tier)
            .unwrap_or(NetworkTier::Unknown);

        // No descriptor means no connection API: report `Unknown` once.
        let subscription = if connection.is_some() {
            probe.subscribe_changes()
        } else {
            None
        };

        info!(
            "Network tier {:?} (change notifications: {})",
            tier,
            subscription.is_some()
        );

        Self {
            tier,
            connection,
            subscription,
        }
    }

    /// Monitor for a platform without a connection API
    pub fn unsupported() -> Self {
        Self {
            tier: NetworkTier::Unknown,
            connection: None,
            subscription: None,
        }
    }

    pub fn tier(&self) -> NetworkTier {
        self.tier
    }

    pub fn connection(&self) -> Option<&ConnectionInfo> {
        self.connection.as_ref()
    }

    /// Whether change notifications are still being accepted
    pub fn is_watching(&self) -> bool {
        self.subscription.is_some()
    }

    /// Record a change notification
    ///
    /// Returns the new tier when it differs from the previous one. Ignored
    /// once detached or when the platform never offered notifications.
    pub fn on_change(&mut self, info: ConnectionInfo) -> Option<NetworkTier> {
        if !self.is_watching() {
            debug!("Ignoring connection change while not watching");
            return None;
        }

        let tier = info.tier();
        self.connection = Some(info);

        if tier == self.tier {
            return None;
        }

        info!("Network tier changed: {:?} -> {:?}", self.tier, tier);
        self.tier = tier;
        Some(tier)
    }

    /// Release the change subscription
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }
    }
}
