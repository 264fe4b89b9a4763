//! Fault classification and the single-retry recovery policy

use log::{error, warn};
use serde::Serialize;

use crate::utils::error::FaultKind;

/// Where a fault originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FaultDomain {
    Network,
    Decode,
    Other,
}

/// Fault reported by the adaptive session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultEvent {
    pub domain: FaultDomain,

    /// The session cannot continue without intervention
    pub fatal: bool,

    /// Raw cause as reported by the session
    pub details: String,
}

impl FaultEvent {
    pub fn new(domain: FaultDomain, fatal: bool, details: impl Into<String>) -> Self {
        Self {
            domain,
            fatal,
            details: details.into(),
        }
    }

    pub fn fatal(domain: FaultDomain, details: impl Into<String>) -> Self {
        Self::new(domain, true, details)
    }

    pub fn informational(domain: FaultDomain, details: impl Into<String>) -> Self {
        Self::new(domain, false, details)
    }
}

/// What the engine should do about a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Non-fatal: log it, change nothing
    Observe,

    /// Restart the load pump without touching playhead or buffer
    RestartLoad,

    /// Re-attach the decode pipeline, keeping manifest and session
    RecoverDecoder,

    /// Tear the engine down and surface the fault
    Escalate(FaultKind),
}

/// Per-session retry budget: one retry per recoverable domain
///
/// Only fatal faults consume the budget. It is never refilled; a new session
/// starts with a fresh policy.
#[derive(Debug, Clone, Default)]
pub struct FaultRecoveryPolicy {
    network_retry_used: bool,
    decode_retry_used: bool,
}

impl FaultRecoveryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide how to handle `fault`
    ///
    /// `manifest_loaded` is false while the manifest is still being fetched;
    /// faults in that phase are not retried.
    pub fn decide(&mut self, fault: &FaultEvent, manifest_loaded: bool) -> RecoveryAction {
        if !fault.fatal {
            return RecoveryAction::Observe;
        }

        if !manifest_loaded {
            let kind = match fault.domain {
                FaultDomain::Network => FaultKind::ManifestLoadFailure,
                FaultDomain::Decode | FaultDomain::Other => FaultKind::UnrecoverableEngineFault,
            };
            error!("Fatal {:?} fault before manifest was parsed: {}", fault.domain, fault.details);
            return RecoveryAction::Escalate(kind);
        }

        match fault.domain {
            FaultDomain::Network if !self.network_retry_used => {
                self.network_retry_used = true;
                warn!("Fatal network fault, restarting load: {}", fault.details);
                RecoveryAction::RestartLoad
            }
            FaultDomain::Decode if !self.decode_retry_used => {
                self.decode_retry_used = true;
                warn!("Fatal decode fault, recovering decoder: {}", fault.details);
                RecoveryAction::RecoverDecoder
            }
            domain => {
                error!("Unrecoverable {:?} fault: {}", domain, fault.details);
                RecoveryAction::Escalate(FaultKind::UnrecoverableEngineFault)
            }
        }
    }
}
