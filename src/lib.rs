//! vodplayer - adaptive streaming playback controller
//!
//! Drives one media pipeline on behalf of a video-on-demand front end:
//! binds progressive or manifest-based sources, adapts buffering to the
//! network and device, recovers from transient engine faults and keeps
//! on-screen controls out of the way while content plays.
//!
//! The platform (media element, adaptive backend, connection API) is
//! reached only through the traits in [`platform`].

pub mod binding;
pub mod buffer;
pub mod engine;
pub mod network;
pub mod platform;
pub mod player;
pub mod runtime;
pub mod utils;

pub use binding::{BindingKind, MediaSource};
pub use buffer::{BufferHealth, BufferingPolicy, DeviceClass, TimeRanges};
pub use engine::{EngineGeneration, QualityLevel, QualitySelection, SessionEvent};
pub use network::{ConnectionInfo, NetworkTier, SignalStrength};
pub use platform::{MediaElement, MediaEvent, PlatformCapabilities};
pub use player::{
    InputEvent, PlaybackState, PlayerController, PlayerControllerBuilder, PlayerEvent,
    PlayerSnapshot,
};
pub use runtime::{PlayerCommand, PlayerHandle, PlayerRuntime};
pub use utils::{format_time, Config, FaultKind, PlayerError, Result};
