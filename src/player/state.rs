//! Playback State Machine
//!
//! One unified state regardless of which binding is active. Transitions
//! that do not apply to the current state are ignored, never errors: the
//! platform may legitimately report `pause` twice or `playing` while paused.

use log::{debug, info};
use serde::Serialize;

use crate::buffer::BufferHealth;
use crate::utils::error::FaultKind;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PlaybackState {
    /// No media bound
    Idle,

    /// Bound, waiting for the first frame
    Loading,

    /// First frame available, not yet playing
    Ready,

    /// Currently playing
    Playing,

    /// Playback paused
    Paused,

    /// Playing, but the buffer ran dry
    Stalled(BufferHealth),

    /// Unrecoverable fault; a new bind resets to `Idle`
    Error(FaultKind),
}

impl PlaybackState {
    /// Playback is wanted right now, whether or not frames are flowing
    pub fn wants_playback(&self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Stalled(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlaybackState::Error(_))
    }

    /// Something is bound and usable for transport commands
    pub fn is_bound(&self) -> bool {
        !matches!(self, PlaybackState::Idle | PlaybackState::Error(_))
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// A media source was bound
    Bind,

    /// Manifest parsed or first frame decodable
    FirstFrameReady,

    /// Play command, autoplay, or platform play
    Play,

    /// Pause command or platform pause
    Pause,

    /// Platform reported buffer exhaustion
    Stall(BufferHealth),

    /// Platform reported playback resumed
    Resume,

    /// New buffer health while stalled
    HealthUpdate(BufferHealth),

    /// Unrecoverable fault
    Fail(FaultKind),

    /// Back to `Idle` ahead of a rebind or on teardown
    Reset,
}

/// Playback State Machine
#[derive(Debug, Clone)]
pub struct PlaybackStateMachine {
    state: PlaybackState,
}

impl Default for PlaybackStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackStateMachine {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Apply a transition; returns the new state if it changed
    pub fn apply(&mut self, transition: Transition) -> Option<PlaybackState> {
        use PlaybackState::*;

        let next = match (self.state, transition) {
            (_, Transition::Reset) => Idle,
            (_, Transition::Fail(kind)) => Error(kind),
            (Idle, Transition::Bind) => Loading,
            (Loading, Transition::FirstFrameReady) => Ready,
            (Ready | Paused, Transition::Play) => Playing,
            (Playing | Stalled(_), Transition::Pause) => Paused,
            (Playing, Transition::Stall(health)) => Stalled(health),
            (Stalled(_), Transition::Resume) => Playing,
            (Stalled(_), Transition::HealthUpdate(health)) => Stalled(health),
            (state, transition) => {
                debug!("Ignoring {:?} in {:?}", transition, state);
                return None;
            }
        };

        if next == self.state {
            return None;
        }

        match (self.state, next) {
            (Stalled(_), Stalled(_)) => {}
            (from, to) => info!("Playback state changed: {:?} -> {:?}", from, to),
        }
        self.state = next;
        Some(next)
    }
}
