//! Player controller implementation for vodplayer
//!
//! The controller is the only thing the host talks to. It owns the media
//! pipeline handle, the transport binding and every piece of derived state,
//! and is driven entirely by calls: transport commands from the user, and
//! platform, engine, input and network notifications forwarded by the host.
//! Nothing here blocks or spawns.

use log::{debug, error, info, trace, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::binding::{BindingKind, BindingStrategy, MediaSource, TransportBinding};
use crate::buffer::{
    BufferHealth, BufferHealthMonitor, BufferingPolicy, BufferingPolicySelector, DeviceClass,
};
use crate::engine::{EngineGeneration, EngineOutput, QualityLevel, QualitySelection, SessionEvent};
use crate::network::{ConnectionInfo, NetworkConditionMonitor, NetworkTier, SignalStrength};
use crate::platform::{
    AdaptiveBackend, CapabilityProbe, ConnectionProbe, MediaElement, MediaErrorCode, MediaEvent,
    PlatformCapabilities,
};
use crate::player::{
    ControlVisibilityTimer, EventDispatcher, EventSubscription, InputEvent, PlaybackState,
    PlaybackStateMachine, PlayerEvent, Transition, PLAYBACK_RATES,
};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::config::Config;
use crate::utils::error::{FaultKind, PlayerError, Result};

/// Builder for [`PlayerController`]
pub struct PlayerControllerBuilder {
    config: Config,
    capabilities: PlatformCapabilities,
    clock: Option<Arc<dyn Clock>>,
    viewport_width: Option<u32>,
}

impl Default for PlayerControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerControllerBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            capabilities: PlatformCapabilities::full(),
            clock: None,
            viewport_width: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use already-resolved capabilities
    pub fn with_capabilities(mut self, capabilities: PlatformCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Resolve capabilities by asking the platform
    pub fn probe_capabilities(mut self, probe: &dyn CapabilityProbe) -> Self {
        self.capabilities = PlatformCapabilities::probe(probe);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Initial viewport width in CSS pixels; desktop is assumed otherwise
    pub fn with_viewport_width(mut self, width_px: u32) -> Self {
        self.viewport_width = Some(width_px);
        self
    }

    /// Mount the controller on a media pipeline
    pub fn build(
        self,
        mut media: Box<dyn MediaElement>,
        backend: Box<dyn AdaptiveBackend>,
        connection: &mut dyn ConnectionProbe,
    ) -> Result<PlayerController> {
        self.config.validate()?;

        let device = self
            .viewport_width
            .map(|w| DeviceClass::from_viewport_width(w, self.config.controls.mobile_breakpoint_px))
            .unwrap_or(DeviceClass::Desktop);
        let network = NetworkConditionMonitor::new(connection);
        let policy = BufferingPolicySelector::new(network.tier(), device);
        let controls = ControlVisibilityTimer::new(&self.config.controls, device);

        let transport = TransportSettings::from_config(&self.config);
        media.set_volume(transport.volume);
        media.set_muted(transport.muted);
        media.set_playback_rate(transport.rate);

        info!(
            "Player mounted ({:?}, {:?}, network {:?})",
            device,
            self.capabilities,
            network.tier()
        );

        Ok(PlayerController {
            binding: TransportBinding::new(BindingStrategy::resolve(&self.capabilities)),
            capabilities: self.capabilities,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock::new()) as Arc<dyn Clock>),
            config: self.config,
            media,
            backend,
            state: PlaybackStateMachine::new(),
            health: BufferHealthMonitor::new(),
            network,
            policy,
            controls,
            dispatcher: EventDispatcher::new(),
            source: None,
            transport,
            timeline: Timeline::default(),
            autoplay_pending: false,
            mounted: true,
        })
    }
}

/// User-facing transport settings; these survive rebinds
#[derive(Debug, Clone, Copy)]
struct TransportSettings {
    volume: f32,
    last_audible_volume: f32,
    muted: bool,
    rate: f32,
    fullscreen: bool,
    picture_in_picture: bool,
}

impl TransportSettings {
    fn from_config(config: &Config) -> Self {
        let volume = config.player.default_volume;
        Self {
            volume,
            last_audible_volume: if volume > 0.0 { volume } else { 1.0 },
            muted: volume == 0.0,
            rate: config.player.default_playback_rate,
            fullscreen: false,
            picture_in_picture: false,
        }
    }
}

/// Per-binding timeline state; cleared on rebind
#[derive(Debug, Clone, Copy, Default)]
struct Timeline {
    position: f64,
    duration: Option<f64>,
    segment_loading: bool,
}

/// Point-in-time view of everything the host renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub binding: Option<BindingKind>,
    pub title: Option<String>,
    pub poster_image: Option<String>,
    pub position: f64,
    pub duration: Option<f64>,
    pub buffer_health: BufferHealth,
    pub segment_loading: bool,
    pub quality_levels: Vec<QualityLevel>,
    pub current_quality: Option<usize>,
    pub quality_auto: bool,
    pub playback_rate: f32,
    pub volume: f32,
    pub muted: bool,
    pub fullscreen: bool,
    pub picture_in_picture: bool,
    pub controls_visible: bool,
    pub network_tier: NetworkTier,
    pub signal_strength: SignalStrength,
}

impl PlayerSnapshot {
    /// Serialize for hosts that render from JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| PlayerError::Internal(format!("Failed to serialize snapshot: {}", e)))
    }
}

/// Main player controller
pub struct PlayerController {
    config: Config,
    capabilities: PlatformCapabilities,
    clock: Arc<dyn Clock>,
    media: Box<dyn MediaElement>,
    backend: Box<dyn AdaptiveBackend>,
    binding: TransportBinding,
    state: PlaybackStateMachine,
    health: BufferHealthMonitor,
    network: NetworkConditionMonitor,
    policy: BufferingPolicySelector,
    controls: ControlVisibilityTimer,
    dispatcher: EventDispatcher,
    source: Option<MediaSource>,
    transport: TransportSettings,
    timeline: Timeline,
    autoplay_pending: bool,
    mounted: bool,
}

impl PlayerController {
    pub fn builder() -> PlayerControllerBuilder {
        PlayerControllerBuilder::new()
    }

    /// Subscribe to player events
    pub fn subscribe<F>(&self, callback: F) -> EventSubscription
    where
        F: Fn(PlayerEvent) + Send + Sync + 'static,
    {
        self.dispatcher.subscribe(callback)
    }

    /// Bind a media source, tearing down whatever was bound before
    pub fn bind(&mut self, source: MediaSource) -> Result<BindingKind> {
        if !self.mounted {
            return Err(PlayerError::Internal("controller is unmounted".to_string()));
        }

        info!("Binding '{}' ({})", source.display_title, source.locator);

        let had_levels = self
            .binding
            .engine()
            .map(|engine| !engine.ladder().is_empty())
            .unwrap_or(false);

        self.transition(Transition::Reset);
        self.health.reset();
        self.timeline = Timeline::default();
        self.autoplay_pending = self.config.player.auto_play;

        let policy = self.policy.current();
        let result = self.binding.bind(
            &source,
            self.media.as_mut(),
            self.backend.as_mut(),
            &self.config.engine,
            policy,
        );
        self.source = Some(source);

        if had_levels {
            self.emit(PlayerEvent::QualityLevelsChanged { levels: Vec::new() });
        }
        self.transition(Transition::Bind);

        match result {
            Ok(kind) => {
                // The pipeline may reset its rate on a new source.
                self.media.set_playback_rate(self.transport.rate);
                Ok(kind)
            }
            Err(e) => {
                self.fail(FaultKind::UnsupportedFormat, e.to_string());
                Err(e)
            }
        }
    }

    /// Rebind the current source, typically after an error
    pub fn retry(&mut self) -> Result<BindingKind> {
        let source = self.source.clone().ok_or(PlayerError::NoMedia)?;
        info!("Retrying '{}'", source.display_title);
        self.bind(source)
    }

    /// Release every platform resource; the controller is inert afterwards
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }

        info!("Player unmounting");
        self.binding.unbind(self.media.as_mut());
        self.network.detach();
        self.controls.cancel();
        self.state.apply(Transition::Reset);
        self.dispatcher.clear();
        self.autoplay_pending = false;
        self.mounted = false;
    }

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        match self.state.state() {
            PlaybackState::Idle => Err(PlayerError::NoMedia),
            PlaybackState::Error(kind) => {
                debug!("Ignoring play in error state ({})", kind);
                Ok(())
            }
            PlaybackState::Loading => {
                self.autoplay_pending = true;
                Ok(())
            }
            PlaybackState::Playing | PlaybackState::Stalled(_) => Ok(()),
            PlaybackState::Ready | PlaybackState::Paused => {
                self.media.play()?;
                self.transition(Transition::Play);
                Ok(())
            }
        }
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        match self.state.state() {
            PlaybackState::Idle => Err(PlayerError::NoMedia),
            PlaybackState::Loading => {
                self.autoplay_pending = false;
                Ok(())
            }
            PlaybackState::Playing | PlaybackState::Stalled(_) => {
                self.media.pause();
                self.transition(Transition::Pause);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Toggle play/pause
    pub fn toggle_play(&mut self) -> Result<()> {
        if self.state.state().wants_playback() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Seek to an absolute position in seconds
    ///
    /// Clamped to the media duration when it is known.
    pub fn seek(&mut self, position: f64) -> Result<()> {
        if !position.is_finite() {
            return Err(PlayerError::InvalidInput(format!("seek target {}", position)));
        }
        if !self.state.state().is_bound() {
            return Err(PlayerError::NoMedia);
        }

        let mut target = position.max(0.0);
        if let Some(duration) = self.timeline.duration.filter(|d| d.is_finite()) {
            target = target.min(duration);
        }

        debug!("Seeking to {:.3}s", target);
        self.media.set_current_time(target);
        self.timeline.position = target;
        self.refresh_health();
        Ok(())
    }

    /// Seek relative to the current position
    pub fn skip(&mut self, delta_seconds: f64) -> Result<()> {
        if !delta_seconds.is_finite() {
            return Err(PlayerError::InvalidInput(format!("skip delta {}", delta_seconds)));
        }
        let position = self.media.current_time();
        self.seek(position + delta_seconds)
    }

    pub fn skip_forward(&mut self) -> Result<()> {
        self.skip(self.config.player.seek_step)
    }

    pub fn skip_backward(&mut self) -> Result<()> {
        self.skip(-self.config.player.seek_step)
    }

    /// Set volume (clamped to 0.0..=1.0); zero mutes
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !volume.is_finite() {
            return Err(PlayerError::InvalidInput(format!("volume {}", volume)));
        }

        let volume = volume.clamp(0.0, 1.0);
        self.transport.volume = volume;
        self.transport.muted = volume == 0.0;
        if volume > 0.0 {
            self.transport.last_audible_volume = volume;
        }

        self.media.set_volume(volume);
        self.media.set_muted(self.transport.muted);
        self.emit_volume();
        Ok(())
    }

    /// Mute or unmute; unmuting at zero volume restores the last audible level
    pub fn toggle_mute(&mut self) {
        if self.transport.muted {
            self.transport.muted = false;
            if self.transport.volume == 0.0 {
                self.transport.volume = self.transport.last_audible_volume;
                self.media.set_volume(self.transport.volume);
            }
        } else {
            self.transport.muted = true;
        }

        self.media.set_muted(self.transport.muted);
        self.emit_volume();
    }

    /// Set the playback rate; only [`PLAYBACK_RATES`] are accepted
    pub fn set_playback_rate(&mut self, rate: f32) -> Result<()> {
        if !PLAYBACK_RATES.contains(&rate) {
            return Err(PlayerError::InvalidInput(format!(
                "playback rate {} is not one of {:?}",
                rate, PLAYBACK_RATES
            )));
        }
        if rate == self.transport.rate {
            return Ok(());
        }

        self.transport.rate = rate;
        self.media.set_playback_rate(rate);
        self.emit(PlayerEvent::RateChanged { rate });
        Ok(())
    }

    /// Pin a quality level or return to automatic selection
    pub fn set_quality(&mut self, selection: QualitySelection) -> Result<()> {
        match (self.binding.engine_mut(), selection) {
            (Some(engine), _) => engine.set_quality(selection),
            (None, QualitySelection::Auto) => Ok(()),
            (None, QualitySelection::Level(index)) => Err(PlayerError::InvalidInput(format!(
                "quality level {} unavailable without an adaptive engine",
                index
            ))),
        }
    }

    /// Host convention: `-1` is automatic, anything else a ladder index
    pub fn set_quality_index(&mut self, index: i32) -> Result<()> {
        let selection = QualitySelection::from_index(index)
            .ok_or_else(|| PlayerError::InvalidInput(format!("quality index {}", index)))?;
        self.set_quality(selection)
    }

    /// Enter or leave fullscreen
    ///
    /// A refusal is reported as a notice and leaves the flag unchanged.
    pub fn toggle_fullscreen(&mut self) {
        if !self.capabilities.fullscreen {
            self.feature_unavailable(PlayerError::FeatureUnavailable("fullscreen".to_string()));
            return;
        }

        let entering = !self.transport.fullscreen;
        let result = if entering {
            self.media.request_fullscreen()
        } else {
            self.media.exit_fullscreen()
        };

        match result {
            Ok(()) => self.set_fullscreen_flag(entering),
            Err(e) => self.feature_unavailable(e),
        }
    }

    /// Enter or leave picture-in-picture
    ///
    /// A refusal is reported as a notice and leaves the flag unchanged.
    pub fn toggle_picture_in_picture(&mut self) {
        if !self.capabilities.picture_in_picture {
            self.feature_unavailable(PlayerError::FeatureUnavailable(
                "picture-in-picture".to_string(),
            ));
            return;
        }

        let entering = !self.transport.picture_in_picture;
        let result = if entering {
            self.media.request_picture_in_picture()
        } else {
            self.media.exit_picture_in_picture()
        };

        match result {
            Ok(()) => self.set_picture_in_picture_flag(entering),
            Err(e) => self.feature_unavailable(e),
        }
    }

    /// Handle a notification from the native media pipeline
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if !self.mounted {
            return;
        }
        trace!("Media event {:?}", event);

        let direct = self.binding.kind() == Some(BindingKind::Direct);
        match event {
            MediaEvent::LoadStart => {}
            MediaEvent::LoadedMetadata { duration } => {
                self.set_duration(duration);
                if direct {
                    self.on_first_frame();
                }
            }
            MediaEvent::DurationChange { duration } => self.set_duration(duration),
            MediaEvent::CanPlay => {
                if direct {
                    self.on_first_frame();
                }
            }
            MediaEvent::Play => {
                self.transition(Transition::Play);
            }
            MediaEvent::Pause => {
                self.transition(Transition::Pause);
            }
            MediaEvent::Waiting => {
                self.refresh_health();
                let health = self.health.current();
                self.transition(Transition::Stall(health));
            }
            MediaEvent::Playing => {
                if matches!(self.state.state(), PlaybackState::Stalled(_)) {
                    self.transition(Transition::Resume);
                } else {
                    self.transition(Transition::Play);
                }
            }
            MediaEvent::TimeUpdate { current_time } => {
                self.timeline.position = current_time;
                self.refresh_health();
            }
            MediaEvent::Progress => self.refresh_health(),
            MediaEvent::Error(code) => self.on_media_error(code, direct),
            MediaEvent::EnterPictureInPicture => self.set_picture_in_picture_flag(true),
            MediaEvent::LeavePictureInPicture => self.set_picture_in_picture_flag(false),
            MediaEvent::FullscreenChange { fullscreen } => self.set_fullscreen_flag(fullscreen),
        }
    }

    /// Handle an event from the adaptive session tagged with its generation
    ///
    /// Events from any engine but the live one are dropped.
    pub fn handle_engine_event(&mut self, generation: EngineGeneration, event: SessionEvent) {
        if !self.mounted {
            return;
        }
        if !self.binding.is_current(generation) {
            debug!("Dropping {:?} from stale engine {}", event, generation);
            return;
        }

        let outputs = match self.binding.engine_mut() {
            Some(engine) => engine.handle_event(event),
            None => return,
        };
        for output in outputs {
            self.apply_engine_output(output);
        }
    }

    /// Handle user interaction on the player container
    pub fn handle_input(&mut self, input: InputEvent) {
        if !self.mounted {
            return;
        }
        let now = self.clock.now();
        if self.controls.on_input(input, now) {
            self.emit_controls();
        }
    }

    /// Handle a connection change notification
    pub fn handle_connection_change(&mut self, info: ConnectionInfo) {
        if !self.mounted {
            return;
        }
        if let Some(tier) = self.network.on_change(info) {
            self.emit(PlayerEvent::NetworkChanged { tier });
            if let Some(policy) = self.policy.set_tier(tier) {
                self.apply_policy(policy);
            }
        }
    }

    /// Handle a viewport resize
    pub fn handle_viewport(&mut self, width_px: u32) {
        if !self.mounted {
            return;
        }
        let device =
            DeviceClass::from_viewport_width(width_px, self.config.controls.mobile_breakpoint_px);
        self.controls.set_device(device);
        if let Some(policy) = self.policy.set_device(device) {
            self.apply_policy(policy);
        }
    }

    /// Fire the controls deadline if it has passed
    pub fn tick(&mut self) {
        if !self.mounted {
            return;
        }
        let now = self.clock.now();
        if self.controls.poll(now) {
            self.emit_controls();
        }
    }

    /// Clock timestamp at which [`tick`](Self::tick) next has work to do
    pub fn next_deadline(&self) -> Option<Duration> {
        self.controls.deadline()
    }

    /// How long until the next deadline on the controller's own clock
    ///
    /// Zero once the deadline has passed.
    pub fn time_until_deadline(&self) -> Option<Duration> {
        self.next_deadline().map(|at| at.saturating_sub(self.clock.now()))
    }

    pub fn state(&self) -> PlaybackState {
        self.state.state()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    /// Generation of the most recent bind
    pub fn generation(&self) -> EngineGeneration {
        self.binding.generation()
    }

    pub fn buffering_policy(&self) -> BufferingPolicy {
        self.policy.current()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let engine = self.binding.engine();
        let tier = self.network.tier();

        PlayerSnapshot {
            state: self.state.state(),
            binding: self.binding.kind(),
            title: self.source.as_ref().map(|s| s.display_title.clone()),
            poster_image: self.source.as_ref().and_then(|s| s.poster_image.clone()),
            position: self.timeline.position,
            duration: self.timeline.duration,
            buffer_health: self.health.current(),
            segment_loading: self.timeline.segment_loading,
            quality_levels: engine
                .map(|e| e.ladder().levels().to_vec())
                .unwrap_or_default(),
            current_quality: engine.and_then(|e| e.current_level()),
            quality_auto: engine
                .map(|e| e.selection() == QualitySelection::Auto)
                .unwrap_or(true),
            playback_rate: self.transport.rate,
            volume: self.transport.volume,
            muted: self.transport.muted,
            fullscreen: self.transport.fullscreen,
            picture_in_picture: self.transport.picture_in_picture,
            controls_visible: self.controls.is_visible(),
            network_tier: tier,
            signal_strength: tier.signal_strength(),
        }
    }

    fn emit(&self, event: PlayerEvent) {
        self.dispatcher.dispatch(event);
    }

    fn emit_volume(&self) {
        self.emit(PlayerEvent::VolumeChanged {
            volume: self.transport.volume,
            muted: self.transport.muted,
        });
    }

    fn emit_controls(&self) {
        self.emit(PlayerEvent::ControlsVisibilityChanged {
            visible: self.controls.is_visible(),
        });
    }

    /// Apply a state transition and publish it; returns true if the state changed
    fn transition(&mut self, transition: Transition) -> bool {
        let Some(state) = self.state.apply(transition) else {
            return false;
        };

        self.emit(PlayerEvent::StateChanged { state });

        let now = self.clock.now();
        if self.controls.set_playing(state.wants_playback(), now) {
            self.emit_controls();
        }
        true
    }

    fn fail(&mut self, kind: FaultKind, message: String) {
        error!("Playback failed ({}): {}", kind, message);
        self.autoplay_pending = false;
        self.timeline.segment_loading = false;
        if self.transition(Transition::Fail(kind)) {
            self.emit(PlayerEvent::Error { kind, message });
        }
    }

    fn feature_unavailable(&self, err: PlayerError) {
        warn!("{}", err);
        self.emit(PlayerEvent::Notice {
            kind: FaultKind::PlatformFeatureUnavailable,
            message: err.to_string(),
        });
    }

    fn on_first_frame(&mut self) {
        if !self.transition(Transition::FirstFrameReady) || !self.autoplay_pending {
            return;
        }

        self.autoplay_pending = false;
        if let Err(e) = self.play() {
            warn!("Autoplay refused: {}", e);
        }
    }

    fn on_media_error(&mut self, code: MediaErrorCode, direct: bool) {
        if code == MediaErrorCode::Aborted {
            debug!("Media load aborted");
            return;
        }
        if !direct {
            // The adaptive session reports its own faults.
            debug!("Media error {:?} left to the engine", code);
            return;
        }

        let kind = if code == MediaErrorCode::SourceNotSupported
            || self.state.state() == PlaybackState::Loading
        {
            FaultKind::UnsupportedFormat
        } else {
            FaultKind::UnrecoverableEngineFault
        };
        self.fail(kind, format!("media element error {:?}", code));
    }

    fn apply_engine_output(&mut self, output: EngineOutput) {
        match output {
            EngineOutput::ManifestReady { ladder } => {
                self.emit(PlayerEvent::QualityLevelsChanged {
                    levels: ladder.levels().to_vec(),
                });
                self.on_first_frame();
            }
            EngineOutput::LevelSwitched { index } => {
                let auto = self
                    .binding
                    .engine()
                    .map(|e| e.selection() == QualitySelection::Auto)
                    .unwrap_or(true);
                self.emit(PlayerEvent::QualityChanged { index, auto });
            }
            EngineOutput::BufferExtended => self.refresh_health(),
            EngineOutput::SegmentLoading(loading) => {
                if self.timeline.segment_loading != loading {
                    self.timeline.segment_loading = loading;
                    self.emit(PlayerEvent::SegmentLoading { loading });
                }
            }
            EngineOutput::Recovering(kind) => warn!("Recovering from {}, retrying", kind),
            EngineOutput::Recovered => debug!("Engine recovered"),
            EngineOutput::FaultObserved(fault) => debug!("Non-fatal fault: {:?}", fault),
            EngineOutput::Failed(kind) => {
                let locator = self
                    .source
                    .as_ref()
                    .map(|s| s.locator.clone())
                    .unwrap_or_default();
                self.fail(kind, format!("{} while playing {}", kind, locator));
            }
        }
    }

    fn refresh_health(&mut self) {
        if self.binding.kind().is_none() {
            return;
        }

        let playhead = self.media.current_time();
        let buffered = self.media.buffered();
        let (health, changed) = self.health.observe(playhead, &buffered);
        if changed {
            trace!("Buffer health {:.3}", health.value());
            self.emit(PlayerEvent::BufferHealthChanged { health });
            self.transition(Transition::HealthUpdate(health));
        }
    }

    fn set_duration(&mut self, duration: Option<f64>) {
        let duration = duration.filter(|d| !d.is_nan() && *d >= 0.0);
        if duration != self.timeline.duration {
            self.timeline.duration = duration;
            self.emit(PlayerEvent::DurationChanged { duration });
        }
    }

    fn set_fullscreen_flag(&mut self, fullscreen: bool) {
        if self.transport.fullscreen != fullscreen {
            self.transport.fullscreen = fullscreen;
            self.emit(PlayerEvent::FullscreenChanged { fullscreen });
        }
    }

    fn set_picture_in_picture_flag(&mut self, active: bool) {
        if self.transport.picture_in_picture == active {
            return;
        }

        self.transport.picture_in_picture = active;
        self.emit(PlayerEvent::PictureInPictureChanged { active });

        let now = self.clock.now();
        if self.controls.set_picture_in_picture(active, now) {
            self.emit_controls();
        }
    }

    fn apply_policy(&mut self, policy: BufferingPolicy) {
        info!("Buffering policy now {:?}", policy);
        if let Some(engine) = self.binding.engine_mut() {
            engine.apply_policy(policy);
        }
    }
}

impl Drop for PlayerController {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("state", &self.state.state())
            .field("binding", &self.binding)
            .field("source", &self.source)
            .field("mounted", &self.mounted)
            .finish()
    }
}
