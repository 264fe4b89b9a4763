//! Error types for vodplayer
//!
//! Call-level failures are reported through [`PlayerError`]. Playback faults
//! that change what the host renders are not errors: they are carried as
//! [`FaultKind`] inside the playback state.

use serde::Serialize;
use thiserror::Error;

/// Main error type for vodplayer
#[derive(Error, Debug)]
pub enum PlayerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host platform rejected or failed an operation
    #[error("Platform error: {0}")]
    Platform(String),

    /// Adaptive streaming engine errors
    #[error("Engine error: {0}")]
    Engine(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation requires a bound media source
    #[error("No media bound")]
    NoMedia,

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Optional platform feature (fullscreen, picture-in-picture) is missing
    #[error("Feature unavailable: {0}")]
    FeatureUnavailable(String),

    /// Generic error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<toml::de::Error> for PlayerError {
    fn from(err: toml::de::Error) -> Self {
        PlayerError::Config(format!("Failed to parse config: {}", err))
    }
}

impl PlayerError {
    /// Create an engine error from string
    pub fn engine_error<S: Into<String>>(msg: S) -> Self {
        PlayerError::Engine(msg.into())
    }
}

/// Convenience type alias for Results in vodplayer
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Extension trait for converting other errors to PlayerError
pub trait IntoPlayerError<T> {
    /// Convert this error into a PlayerError with the given context
    fn config_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoPlayerError<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerError::Config(format!("{}: {}", context, e)))
    }
}

/// Playback fault taxonomy
///
/// `NetworkTransient` and `DecodeTransient` are retried once inside the
/// engine and only ever observed in logs. `PlatformFeatureUnavailable`
/// never reaches the playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FaultKind {
    /// The manifest could not be fetched or parsed
    ManifestLoadFailure,

    /// Fatal network fault, retried once
    NetworkTransient,

    /// Fatal decode fault, retried once
    DecodeTransient,

    /// The engine gave up: retry budget spent or a fault outside the
    /// recoverable domains
    UnrecoverableEngineFault,

    /// Neither the adaptive engine nor direct binding can play the locator
    UnsupportedFormat,

    /// Fullscreen or picture-in-picture refused by the platform
    PlatformFeatureUnavailable,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FaultKind::ManifestLoadFailure => "manifest load failure",
            FaultKind::NetworkTransient => "transient network fault",
            FaultKind::DecodeTransient => "transient decode fault",
            FaultKind::UnrecoverableEngineFault => "unrecoverable engine fault",
            FaultKind::UnsupportedFormat => "unsupported format",
            FaultKind::PlatformFeatureUnavailable => "platform feature unavailable",
        };
        f.write_str(name)
    }
}
