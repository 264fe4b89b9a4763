//! Configuration management for vodplayer
//!
//! Configuration is layered: built-in defaults, then an optional user TOML
//! file, then `VODPLAYER_*` environment variables. Nothing here is ever
//! written back.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::player::{PlayerConfig, PLAYBACK_RATES};
use crate::utils::error::{IntoPlayerError, PlayerError, Result};

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transport defaults
    pub player: PlayerConfig,

    /// Adaptive streaming engine tuning
    pub engine: EngineConfig,

    /// On-screen controls behaviour
    pub controls: ControlsConfig,

    /// General settings
    pub general: GeneralConfig,
}

/// Adaptive streaming engine configuration
///
/// Buffer lengths are not configured here: they come from the buffering
/// policy selected for the current network tier and device class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Offload manifest and segment parsing to a worker
    pub enable_worker: bool,

    /// Fast EWMA half-life for live content, in seconds
    pub abr_ewma_fast_live: f64,

    /// Slow EWMA half-life for live content, in seconds
    pub abr_ewma_slow_live: f64,

    /// Fast EWMA half-life for on-demand content, in seconds
    pub abr_ewma_fast_vod: f64,

    /// Slow EWMA half-life for on-demand content, in seconds
    pub abr_ewma_slow_vod: f64,

    /// Bandwidth estimate used before any sample, in bits per second
    pub abr_ewma_default_estimate: u64,

    /// Fraction of the estimate a level may use to be kept
    pub abr_bandwidth_factor: f64,

    /// Fraction of the estimate a level may use to be switched up to
    pub abr_bandwidth_up_factor: f64,

    /// Manifest request timeout in milliseconds
    pub manifest_loading_timeout_ms: u64,

    /// Level playlist request timeout in milliseconds
    pub level_loading_timeout_ms: u64,

    /// Fragment request timeout in milliseconds
    pub fragment_loading_timeout_ms: u64,
}

/// On-screen controls configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Auto-hide delay on touch-primary devices
    pub touch_timeout_ms: u64,

    /// Auto-hide delay on pointer-primary devices
    pub pointer_timeout_ms: u64,

    /// Viewports narrower than this are treated as mobile
    pub mobile_breakpoint_px: u32,
}

/// General configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_worker: true,
            abr_ewma_fast_live: 3.0,
            abr_ewma_slow_live: 9.0,
            abr_ewma_fast_vod: 3.0,
            abr_ewma_slow_vod: 9.0,
            abr_ewma_default_estimate: 500_000,
            abr_bandwidth_factor: 0.95,
            abr_bandwidth_up_factor: 0.7,
            manifest_loading_timeout_ms: 10_000,
            level_loading_timeout_ms: 10_000,
            fragment_loading_timeout_ms: 20_000,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            touch_timeout_ms: 5000,
            pointer_timeout_ms: 3000,
            mobile_breakpoint_px: 768,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the user config file and the environment
    ///
    /// Later sources override earlier ones:
    /// 1. Default values
    /// 2. User config file (`<config dir>/vodplayer/config.toml`)
    /// 3. Environment variables (`VODPLAYER_*` prefix)
    pub fn load() -> Result<Self> {
        let mut config = match Self::user_config_path() {
            Some(path) if path.exists() => Self::read_file(&path)?,
            _ => Self::default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load and validate configuration from a specific TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .config_err(&format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&contents).config_err("Failed to parse config file")
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(log_level) = std::env::var("VODPLAYER_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        if let Ok(volume) = std::env::var("VODPLAYER_DEFAULT_VOLUME") {
            self.player.default_volume = volume
                .parse()
                .map_err(|_| PlayerError::Config("Invalid VODPLAYER_DEFAULT_VOLUME".to_string()))?;
        }

        if let Ok(step) = std::env::var("VODPLAYER_SEEK_STEP") {
            self.player.seek_step = step
                .parse()
                .map_err(|_| PlayerError::Config("Invalid VODPLAYER_SEEK_STEP".to_string()))?;
        }

        if let Ok(auto_play) = std::env::var("VODPLAYER_AUTO_PLAY") {
            self.player.auto_play = auto_play
                .parse()
                .map_err(|_| PlayerError::Config("Invalid VODPLAYER_AUTO_PLAY".to_string()))?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.default_volume) {
            return Err(PlayerError::Config(
                "Default volume must be between 0.0 and 1.0".to_string(),
            ));
        }

        if !PLAYBACK_RATES.contains(&self.player.default_playback_rate) {
            return Err(PlayerError::Config(format!(
                "Default playback rate {} must be one of {:?}",
                self.player.default_playback_rate, PLAYBACK_RATES
            )));
        }

        let engine = &self.engine;
        if engine.manifest_loading_timeout_ms == 0
            || engine.level_loading_timeout_ms == 0
            || engine.fragment_loading_timeout_ms == 0
        {
            return Err(PlayerError::Config("Loader timeouts must be non-zero".to_string()));
        }

        for (name, factor) in [
            ("abr_bandwidth_factor", engine.abr_bandwidth_factor),
            ("abr_bandwidth_up_factor", engine.abr_bandwidth_up_factor),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(PlayerError::Config(format!("{} must be in (0, 1]", name)));
            }
        }

        if self.controls.touch_timeout_ms == 0 || self.controls.pointer_timeout_ms == 0 {
            return Err(PlayerError::Config("Controls timeouts must be non-zero".to_string()));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(PlayerError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vodplayer").join("config.toml"))
    }
}
