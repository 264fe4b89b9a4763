//! Utility module for vodplayer
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with custom error types
//! - Configuration management
//! - Logging setup
//! - Monotonic clocks
//! - Time formatting for host display

pub mod clock;
pub mod config;
pub mod error;

// Re-export commonly used items
pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use config::{Config, ControlsConfig, EngineConfig, GeneralConfig};
pub use error::{FaultKind, PlayerError, Result};

/// Initialize logging for a host application
///
/// `RUST_LOG` wins over `level`. Calling this more than once is harmless.
pub fn init_logging(level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .try_init();
}

/// Format a playback position for display
///
/// Returns `"m:ss"`, or `"h:mm:ss"` from one hour up. Negative and
/// non-finite inputs render as `"0:00"`.
pub fn format_time(seconds: f64) -> String {
    let total_secs = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
