//! Player controller module for vodplayer
//!
//! This module ties a bound transport, the playback state machine, buffer
//! health, network adaptation and the control visibility timer into one
//! controller, and publishes what happens through [`PlayerEvent`]s.

mod controller;
mod controls;
mod events;
mod state;

pub use controller::{PlayerController, PlayerControllerBuilder, PlayerSnapshot};
pub use controls::{ControlVisibilityTimer, InputEvent, InteractionChannel};
pub use events::{EventDispatcher, EventSubscription};
pub use state::{PlaybackState, PlaybackStateMachine, Transition};

use serde::{Deserialize, Serialize};

use crate::buffer::BufferHealth;
use crate::engine::QualityLevel;
use crate::network::NetworkTier;
use crate::utils::error::FaultKind;

/// Playback rates the transport accepts
pub const PLAYBACK_RATES: [f32; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Start playback as soon as the first frame is ready
    pub auto_play: bool,

    /// Default volume (0.0 to 1.0)
    pub default_volume: f32,

    /// Skip step in seconds
    pub seek_step: f64,

    /// Initial playback rate, one of [`PLAYBACK_RATES`]
    pub default_playback_rate: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            auto_play: true,
            default_volume: 1.0,
            seek_step: 10.0,
            default_playback_rate: 1.0,
        }
    }
}

/// Player event for external event handling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlayerEvent {
    /// Playback state changed
    StateChanged { state: PlaybackState },

    /// A new quality ladder is available (empty on rebind)
    QualityLevelsChanged { levels: Vec<QualityLevel> },

    /// The engine switched to a ladder index
    QualityChanged { index: usize, auto: bool },

    /// Buffer health moved
    BufferHealthChanged { health: BufferHealth },

    /// A segment fetch started or finished
    SegmentLoading { loading: bool },

    /// Duration became known or changed
    DurationChanged { duration: Option<f64> },

    /// Volume changed
    VolumeChanged { volume: f32, muted: bool },

    /// Playback rate changed
    RateChanged { rate: f32 },

    /// Fullscreen toggled
    FullscreenChanged { fullscreen: bool },

    /// Picture-in-picture toggled
    PictureInPictureChanged { active: bool },

    /// Controls shown or hidden
    ControlsVisibilityChanged { visible: bool },

    /// Network tier changed
    NetworkChanged { tier: NetworkTier },

    /// Optional platform feature refused; playback is unaffected
    Notice { kind: FaultKind, message: String },

    /// Playback failed; a rebind is required
    Error { kind: FaultKind, message: String },
}
