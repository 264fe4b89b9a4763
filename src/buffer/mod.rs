//! Buffer policy and health
//!
//! The policy side decides how much media the adaptive session may hold;
//! the health side measures how much of it sits ahead of the playhead.

mod health;
mod policy;
mod time_ranges;

pub use health::{compute_health, BufferHealth, BufferHealthMonitor, HEALTH_WINDOW_SECONDS};
pub use policy::{select_policy, BufferingPolicy, BufferingPolicySelector, DeviceClass};
pub use time_ranges::{TimeRange, TimeRanges};
