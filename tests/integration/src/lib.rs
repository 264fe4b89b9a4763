//! Integration test utilities for vodplayer
//!
//! In-memory stand-ins for the platform:
//! - a media element that records every call and can be told to refuse
//! - an adaptive backend whose sessions log what the engine asked of them
//! - a connection probe with an observable change subscription
//! - a harness wiring them to a controller on a manual clock

use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vodplayer::buffer::{BufferingPolicy, TimeRanges};
use vodplayer::engine::{EngineGeneration, LevelInfo, SessionConfig};
use vodplayer::network::ConnectionInfo;
use vodplayer::platform::{
    AdaptiveBackend, AdaptiveSession, ConnectionProbe, MediaElement, PlatformCapabilities,
    Subscription,
};
use vodplayer::player::{EventSubscription, PlayerController, PlayerEvent};
use vodplayer::utils::clock::ManualClock;
use vodplayer::{Config, PlayerError, Result};

/// Everything the fake media element was told
#[derive(Debug, Default)]
pub struct MediaState {
    pub source: Option<String>,
    pub sources_set: Vec<String>,
    pub clears: usize,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub buffered: Vec<(f64, f64)>,
    pub volume: f32,
    pub muted: bool,
    pub rate: f32,
    pub plays: usize,
    pub pauses: usize,
    pub fullscreen: bool,
    pub picture_in_picture: bool,
    pub refuse_source: bool,
    pub refuse_play: bool,
    pub refuse_fullscreen: bool,
    pub refuse_picture_in_picture: bool,
}

/// Shared-state media element; clones observe the same pipeline
#[derive(Debug, Clone, Default)]
pub struct FakeMediaElement {
    state: Arc<Mutex<MediaState>>,
}

impl FakeMediaElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MediaState> {
        self.state.lock()
    }

    pub fn boxed(&self) -> Box<dyn MediaElement> {
        Box::new(self.clone())
    }
}

impl MediaElement for FakeMediaElement {
    fn set_source(&mut self, locator: &str) -> Result<()> {
        let mut state = self.state.lock();
        if state.refuse_source {
            return Err(PlayerError::Platform(format!("cannot load {}", locator)));
        }
        state.source = Some(locator.to_string());
        state.sources_set.push(locator.to_string());
        Ok(())
    }

    fn clear_source(&mut self) {
        let mut state = self.state.lock();
        state.source = None;
        state.clears += 1;
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.refuse_play {
            return Err(PlayerError::Platform("play() was rejected".to_string()));
        }
        state.plays += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().pauses += 1;
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.state.lock().current_time = seconds;
    }

    fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().duration
    }

    fn buffered(&self) -> TimeRanges {
        TimeRanges::from_pairs(self.state.lock().buffered.iter().copied())
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.state.lock().rate = rate;
    }

    fn request_fullscreen(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.refuse_fullscreen {
            return Err(PlayerError::FeatureUnavailable("fullscreen denied".to_string()));
        }
        state.fullscreen = true;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        self.state.lock().fullscreen = false;
        Ok(())
    }

    fn request_picture_in_picture(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.refuse_picture_in_picture {
            return Err(PlayerError::FeatureUnavailable(
                "picture-in-picture denied".to_string(),
            ));
        }
        state.picture_in_picture = true;
        Ok(())
    }

    fn exit_picture_in_picture(&mut self) -> Result<()> {
        self.state.lock().picture_in_picture = false;
        Ok(())
    }
}

/// What one adaptive session was asked to do
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    pub generation: EngineGeneration,
    pub locator: Option<String>,
    pub attached: bool,
    pub start_loads: usize,
    pub media_recoveries: usize,
    pub level_requests: Vec<Option<usize>>,
    pub policies: Vec<BufferingPolicy>,
    pub destroyed: bool,
}

#[derive(Debug, Default)]
pub struct BackendLog {
    pub configs: Vec<SessionConfig>,
    pub sessions: Vec<SessionLog>,
}

/// Adaptive backend recording every session it builds
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    log: Arc<Mutex<BackendLog>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MutexGuard<'_, BackendLog> {
        self.log.lock()
    }

    /// Snapshot of the most recently created session
    pub fn last_session(&self) -> Option<SessionLog> {
        self.log.lock().sessions.last().cloned()
    }

    pub fn boxed(&self) -> Box<dyn AdaptiveBackend> {
        Box::new(self.clone())
    }
}

impl AdaptiveBackend for FakeBackend {
    fn create_session(
        &mut self,
        generation: EngineGeneration,
        config: &SessionConfig,
    ) -> Result<Box<dyn AdaptiveSession>> {
        let mut log = self.log.lock();
        log.configs.push(config.clone());
        log.sessions.push(SessionLog {
            generation,
            ..SessionLog::default()
        });

        Ok(Box::new(FakeSession {
            index: log.sessions.len() - 1,
            log: Arc::clone(&self.log),
        }))
    }
}

pub struct FakeSession {
    index: usize,
    log: Arc<Mutex<BackendLog>>,
}

impl FakeSession {
    fn with<F: FnOnce(&mut SessionLog)>(&self, f: F) {
        if let Some(session) = self.log.lock().sessions.get_mut(self.index) {
            f(session);
        }
    }
}

impl AdaptiveSession for FakeSession {
    fn load_source(&mut self, locator: &str) -> Result<()> {
        self.with(|s| s.locator = Some(locator.to_string()));
        Ok(())
    }

    fn attach_media(&mut self) -> Result<()> {
        self.with(|s| s.attached = true);
        Ok(())
    }

    fn start_load(&mut self) {
        self.with(|s| s.start_loads += 1);
    }

    fn recover_media_error(&mut self) {
        self.with(|s| s.media_recoveries += 1);
    }

    fn set_current_level(&mut self, level: Option<usize>) {
        self.with(|s| s.level_requests.push(level));
    }

    fn apply_buffer_policy(&mut self, policy: &BufferingPolicy) {
        let policy = *policy;
        self.with(|s| s.policies.push(policy));
    }

    fn destroy(&mut self) {
        self.with(|s| s.destroyed = true);
    }
}

/// Connection probe with an observable subscription
#[derive(Debug, Clone, Default)]
pub struct FakeConnection {
    pub info: Option<ConnectionInfo>,
    pub notifies: bool,
    subscribed: Arc<AtomicBool>,
}

impl FakeConnection {
    /// Platform with a connection API that notifies on change
    pub fn reporting(effective_type: &str) -> Self {
        Self {
            info: Some(ConnectionInfo::new(effective_type, 10.0, 50)),
            notifies: true,
            subscribed: Arc::default(),
        }
    }

    /// Platform without a connection API
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::SeqCst)
    }
}

impl ConnectionProbe for FakeConnection {
    fn current(&self) -> Option<ConnectionInfo> {
        self.info.clone()
    }

    fn subscribe_changes(&mut self) -> Option<Subscription> {
        if !self.notifies {
            return None;
        }
        self.subscribed.store(true, Ordering::SeqCst);
        let flag = Arc::clone(&self.subscribed);
        Some(Subscription::new(move || flag.store(false, Ordering::SeqCst)))
    }
}

/// A two-rung ladder listed highest first, as sessions often do
pub fn two_level_ladder() -> Vec<LevelInfo> {
    vec![
        LevelInfo {
            height: 1080,
            bitrate: 5_000_000,
        },
        LevelInfo {
            height: 480,
            bitrate: 1_200_000,
        },
    ]
}

/// Controller wired to fakes, with every emitted event recorded
pub struct TestPlayer {
    pub controller: PlayerController,
    pub media: FakeMediaElement,
    pub backend: FakeBackend,
    pub connection: FakeConnection,
    pub clock: ManualClock,
    events: Arc<Mutex<Vec<PlayerEvent>>>,
    _subscription: EventSubscription,
}

impl TestPlayer {
    pub fn new() -> anyhow::Result<Self> {
        Self::build(Config::default(), PlatformCapabilities::full(), FakeConnection::absent(), 1280)
    }

    pub fn with_config(config: Config) -> anyhow::Result<Self> {
        Self::build(config, PlatformCapabilities::full(), FakeConnection::absent(), 1280)
    }

    pub fn build(
        config: Config,
        capabilities: PlatformCapabilities,
        mut connection: FakeConnection,
        viewport_width: u32,
    ) -> anyhow::Result<Self> {
        let media = FakeMediaElement::new();
        let backend = FakeBackend::new();
        let clock = ManualClock::new();

        let controller = PlayerController::builder()
            .with_config(config)
            .with_capabilities(capabilities)
            .with_clock(Arc::new(clock.clone()))
            .with_viewport_width(viewport_width)
            .build(media.boxed(), backend.boxed(), &mut connection)?;

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let subscription = controller.subscribe(move |event| sink.lock().push(event));

        Ok(Self {
            controller,
            media,
            backend,
            connection,
            clock,
            events,
            _subscription: subscription,
        })
    }

    pub fn events(&self) -> Vec<PlayerEvent> {
        self.events.lock().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    pub fn advance(&self, millis: u64) {
        self.clock.advance(Duration::from_millis(millis));
    }
}

/// Config with autoplay off, so tests drive play explicitly
pub fn manual_play_config() -> Config {
    let mut config = Config::default();
    config.player.auto_play = false;
    config
}
