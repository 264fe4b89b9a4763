//! Host platform seams
//!
//! Everything the controller needs from the host is expressed as a trait
//! here: the native media pipeline, the adaptive streaming backend, the
//! connection descriptor and the capability probe. Listener registration is
//! modelled as a [`Subscription`] guard released on drop.

use serde::Serialize;

use crate::buffer::{BufferingPolicy, TimeRanges};
use crate::engine::{EngineGeneration, SessionConfig};
use crate::network::ConnectionInfo;
use crate::utils::error::Result;

/// Scoped listener registration
///
/// The release hook runs exactly once, either on [`Subscription::release`]
/// or on drop. Nothing registered through a subscription may fire after it
/// is released.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a release hook
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Subscription with nothing to release
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Release now instead of waiting for drop
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Capability questions asked once when a controller is constructed
pub trait CapabilityProbe {
    /// The native pipeline plays manifest locators by itself
    fn plays_manifests_natively(&self) -> bool;

    /// An adaptive streaming backend can be instantiated
    fn adaptive_engine_supported(&self) -> bool;

    /// Fullscreen requests may succeed
    fn fullscreen_enabled(&self) -> bool;

    /// Picture-in-picture requests may succeed
    fn picture_in_picture_enabled(&self) -> bool;
}

/// Resolved platform capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformCapabilities {
    pub native_manifest_playback: bool,
    pub adaptive_engine: bool,
    pub fullscreen: bool,
    pub picture_in_picture: bool,
}

impl PlatformCapabilities {
    /// Ask every question once and freeze the answers
    pub fn probe(probe: &dyn CapabilityProbe) -> Self {
        let capabilities = Self {
            native_manifest_playback: probe.plays_manifests_natively(),
            adaptive_engine: probe.adaptive_engine_supported(),
            fullscreen: probe.fullscreen_enabled(),
            picture_in_picture: probe.picture_in_picture_enabled(),
        };
        log::debug!("Platform capabilities: {:?}", capabilities);
        capabilities
    }

    /// Everything available except native manifest playback
    pub fn full() -> Self {
        Self {
            native_manifest_playback: false,
            adaptive_engine: true,
            fullscreen: true,
            picture_in_picture: true,
        }
    }
}

/// The platform's native media pipeline handle
///
/// Exactly one binding drives it at a time. Adaptive sessions attach to it
/// through the backend, direct bindings through [`MediaElement::set_source`].
pub trait MediaElement: Send {
    /// Point the pipeline at a progressive locator
    fn set_source(&mut self, locator: &str) -> Result<()>;

    /// Detach whatever source is loaded
    fn clear_source(&mut self);

    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self);

    /// Move the playhead, in seconds
    fn set_current_time(&mut self, seconds: f64);

    /// Playhead position in seconds
    fn current_time(&self) -> f64;

    /// Media duration in seconds, if known
    fn duration(&self) -> Option<f64>;

    /// Buffered ranges in seconds
    fn buffered(&self) -> TimeRanges;

    /// Output volume (0.0 to 1.0)
    fn set_volume(&mut self, volume: f32);

    /// Output mute
    fn set_muted(&mut self, muted: bool);

    /// Playback rate multiplier
    fn set_playback_rate(&mut self, rate: f32);

    fn request_fullscreen(&mut self) -> Result<()>;

    fn exit_fullscreen(&mut self) -> Result<()>;

    fn request_picture_in_picture(&mut self) -> Result<()>;

    fn exit_picture_in_picture(&mut self) -> Result<()>;
}

/// Factory for adaptive streaming sessions
pub trait AdaptiveBackend: Send {
    /// Construct a session; failure means the platform cannot run one
    ///
    /// Events produced by the session must be delivered tagged with
    /// `generation`.
    fn create_session(
        &mut self,
        generation: EngineGeneration,
        config: &SessionConfig,
    ) -> Result<Box<dyn AdaptiveSession>>;
}

/// One manifest-driven adaptive bitrate session bound to the media element
pub trait AdaptiveSession: Send {
    /// Begin fetching the manifest
    fn load_source(&mut self, locator: &str) -> Result<()>;

    /// Attach the session to the media pipeline
    fn attach_media(&mut self) -> Result<()>;

    /// Restart the load pump from the last known position
    fn start_load(&mut self);

    /// Re-attach the decode pipeline, keeping manifest and session
    fn recover_media_error(&mut self);

    /// Pin a level by session index, or `None` for automatic selection
    fn set_current_level(&mut self, level: Option<usize>);

    /// Apply new buffer targets to fetches not yet started
    fn apply_buffer_policy(&mut self, policy: &BufferingPolicy);

    /// Abort pending fetches and release the media pipeline
    fn destroy(&mut self);
}

/// Connection descriptor source
pub trait ConnectionProbe: Send {
    /// Current descriptor, or `None` when the platform has no connection API
    fn current(&self) -> Option<ConnectionInfo>;

    /// Register for change notifications
    ///
    /// `None` when the platform cannot notify. Notifications are forwarded
    /// to the controller by the host until the subscription is released.
    fn subscribe_changes(&mut self) -> Option<Subscription>;
}

/// Media element error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaErrorCode {
    Aborted,
    Network,
    Decode,
    SourceNotSupported,
}

/// Events raised by the native media pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// A new load began
    LoadStart,

    /// Metadata is available
    LoadedMetadata { duration: Option<f64> },

    DurationChange { duration: Option<f64> },

    /// The first frame can be rendered
    CanPlay,

    /// Playback was requested (by the host or autoplay)
    Play,

    Pause,

    /// Buffer exhausted, playback stalled
    Waiting,

    /// Playback resumed after a stall or start
    Playing,

    /// Playhead advanced
    TimeUpdate { current_time: f64 },

    /// Buffered ranges grew
    Progress,

    Error(MediaErrorCode),

    EnterPictureInPicture,

    LeavePictureInPicture,

    FullscreenChange { fullscreen: bool },
}
