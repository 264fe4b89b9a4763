//! Segmented Stream Engine
//!
//! Wraps one adaptive bitrate session from the platform backend and drives
//! it through `Unbound -> Loading -> Ready <-> LevelSwitching`, with a
//! `Recovering` detour for retried faults and a terminal `Destroyed`.
//!
//! The engine never talks to the host. It returns [`EngineOutput`]s which the
//! controller folds into playback state.

mod fault;
mod quality;

pub use fault::{FaultDomain, FaultEvent, FaultRecoveryPolicy, RecoveryAction};
pub use quality::{LevelInfo, QualityLadder, QualityLevel, QualityName, QualitySelection};

use log::{debug, info, trace, warn};
use serde::Serialize;

use crate::buffer::BufferingPolicy;
use crate::platform::{AdaptiveBackend, AdaptiveSession};
use crate::utils::config::EngineConfig;
use crate::utils::error::{FaultKind, PlayerError, Result};

/// Identity of one engine instance within a controller
///
/// Strictly increasing per rebind; events tagged with an older generation
/// belong to a torn-down engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct EngineGeneration(u64);

impl EngineGeneration {
    pub fn next(self) -> Self {
        EngineGeneration(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EngineGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    Unbound,
    Loading,
    Ready,
    LevelSwitching,
    Recovering,
    Destroyed,
}

/// Everything the backend needs to build a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub buffer_policy: BufferingPolicy,
    pub enable_worker: bool,
    /// Always on for sessions built by this engine
    pub low_latency_mode: bool,
    pub abr_ewma_fast_live: f64,
    pub abr_ewma_slow_live: f64,
    pub abr_ewma_fast_vod: f64,
    pub abr_ewma_slow_vod: f64,
    pub abr_ewma_default_estimate: u64,
    pub abr_bandwidth_factor: f64,
    pub abr_bandwidth_up_factor: f64,
    pub manifest_loading_timeout_ms: u64,
    pub level_loading_timeout_ms: u64,
    pub fragment_loading_timeout_ms: u64,
}

impl SessionConfig {
    pub fn new(engine: &EngineConfig, buffer_policy: BufferingPolicy) -> Self {
        Self {
            buffer_policy,
            enable_worker: engine.enable_worker,
            low_latency_mode: true,
            abr_ewma_fast_live: engine.abr_ewma_fast_live,
            abr_ewma_slow_live: engine.abr_ewma_slow_live,
            abr_ewma_fast_vod: engine.abr_ewma_fast_vod,
            abr_ewma_slow_vod: engine.abr_ewma_slow_vod,
            abr_ewma_default_estimate: engine.abr_ewma_default_estimate,
            abr_bandwidth_factor: engine.abr_bandwidth_factor,
            abr_bandwidth_up_factor: engine.abr_bandwidth_up_factor,
            manifest_loading_timeout_ms: engine.manifest_loading_timeout_ms,
            level_loading_timeout_ms: engine.level_loading_timeout_ms,
            fragment_loading_timeout_ms: engine.fragment_loading_timeout_ms,
        }
    }
}

/// Raw events raised by an adaptive session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Manifest fetched and parsed; levels in session order
    ManifestParsed { levels: Vec<LevelInfo> },

    /// The session now renders this session level
    LevelSwitched { level: usize },

    /// New media appended to the buffer
    BufferAppended,

    FragmentLoading,

    FragmentLoaded,

    Fault(FaultEvent),
}

/// What the controller needs to know after an engine event
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    /// Ladder published, loading finished
    ManifestReady { ladder: QualityLadder },

    /// Concrete ladder index now rendering
    LevelSwitched { index: usize },

    /// Buffered ranges grew
    BufferExtended,

    /// A segment fetch started (`true`) or finished (`false`)
    SegmentLoading(bool),

    /// A retry is in progress for this transient fault
    Recovering(FaultKind),

    /// The retry produced media again
    Recovered,

    /// Non-fatal fault, informational only
    FaultObserved(FaultEvent),

    /// The engine destroyed itself
    Failed(FaultKind),
}

/// Segmented Stream Engine
pub struct SegmentedStreamEngine {
    generation: EngineGeneration,
    state: EngineState,
    session: Option<Box<dyn AdaptiveSession>>,
    locator: String,
    ladder: QualityLadder,
    selection: QualitySelection,
    current_level: Option<usize>,
    recovery: FaultRecoveryPolicy,
    policy: Option<BufferingPolicy>,
}

impl SegmentedStreamEngine {
    pub fn new(generation: EngineGeneration) -> Self {
        Self {
            generation,
            state: EngineState::Unbound,
            session: None,
            locator: String::new(),
            ladder: QualityLadder::default(),
            selection: QualitySelection::Auto,
            current_level: None,
            recovery: FaultRecoveryPolicy::new(),
            policy: None,
        }
    }

    /// Build a session and start fetching the manifest
    ///
    /// On error the engine holds no session and stays `Unbound`, so the
    /// caller can fall back to direct binding.
    pub fn bind(
        &mut self,
        backend: &mut dyn AdaptiveBackend,
        locator: &str,
        config: &EngineConfig,
        policy: BufferingPolicy,
    ) -> Result<()> {
        if self.state != EngineState::Unbound {
            return Err(PlayerError::engine_error(format!(
                "engine {} cannot bind from {:?}",
                self.generation, self.state
            )));
        }

        let session_config = SessionConfig::new(config, policy);
        let mut session = backend.create_session(self.generation, &session_config)?;

        let started = session
            .load_source(locator)
            .and_then(|_| session.attach_media());
        if let Err(e) = started {
            session.destroy();
            return Err(e);
        }

        info!("Engine {} loading {}", self.generation, locator);
        self.session = Some(session);
        self.locator = locator.to_string();
        self.policy = Some(policy);
        self.state = EngineState::Loading;
        Ok(())
    }

    /// Fold one session event into engine state
    pub fn handle_event(&mut self, event: SessionEvent) -> Vec<EngineOutput> {
        if !self.is_alive() {
            debug!("Engine {} ignoring {:?} in {:?}", self.generation, event, self.state);
            return Vec::new();
        }

        match event {
            SessionEvent::ManifestParsed { levels } => self.on_manifest_parsed(&levels),
            SessionEvent::LevelSwitched { level } => self.on_level_switched(level),
            SessionEvent::BufferAppended => {
                let mut outputs = self.finish_recovery();
                outputs.push(EngineOutput::BufferExtended);
                outputs
            }
            SessionEvent::FragmentLoading => vec![EngineOutput::SegmentLoading(true)],
            SessionEvent::FragmentLoaded => {
                let mut outputs = self.finish_recovery();
                outputs.push(EngineOutput::SegmentLoading(false));
                outputs
            }
            SessionEvent::Fault(fault) => self.on_fault(fault),
        }
    }

    fn on_manifest_parsed(&mut self, levels: &[LevelInfo]) -> Vec<EngineOutput> {
        if self.state != EngineState::Loading {
            debug!("Engine {} ignoring repeated manifest", self.generation);
            return Vec::new();
        }

        self.ladder = QualityLadder::from_session_levels(levels);
        self.state = EngineState::Ready;
        info!(
            "Engine {} ready with {} quality levels",
            self.generation,
            self.ladder.len()
        );

        // Pin deferred from Loading; dropped if the ladder is too short.
        if let QualitySelection::Level(index) = self.selection {
            match self.ladder.to_session(index) {
                Some(session_level) => {
                    self.request_level(Some(session_level));
                    self.state = EngineState::LevelSwitching;
                }
                None => {
                    warn!(
                        "Engine {} dropping quality level {} (ladder has {})",
                        self.generation,
                        index,
                        self.ladder.len()
                    );
                    self.selection = QualitySelection::Auto;
                }
            }
        }

        vec![EngineOutput::ManifestReady {
            ladder: self.ladder.clone(),
        }]
    }

    fn on_level_switched(&mut self, session_level: usize) -> Vec<EngineOutput> {
        let Some(index) = self.ladder.from_session(session_level) else {
            warn!(
                "Engine {} switched to unknown level {}",
                self.generation, session_level
            );
            return Vec::new();
        };

        let mut outputs = self.finish_recovery();
        if self.state == EngineState::LevelSwitching {
            self.state = EngineState::Ready;
        }

        debug!("Engine {} now rendering level {}", self.generation, index);
        self.current_level = Some(index);
        outputs.push(EngineOutput::LevelSwitched { index });
        outputs
    }

    fn finish_recovery(&mut self) -> Vec<EngineOutput> {
        if self.state == EngineState::Recovering {
            info!("Engine {} recovered", self.generation);
            self.state = EngineState::Ready;
            vec![EngineOutput::Recovered]
        } else {
            Vec::new()
        }
    }

    fn on_fault(&mut self, fault: FaultEvent) -> Vec<EngineOutput> {
        let manifest_loaded = self.state != EngineState::Loading;

        match self.recovery.decide(&fault, manifest_loaded) {
            RecoveryAction::Observe => {
                trace!("Engine {} observed {:?}", self.generation, fault);
                vec![EngineOutput::FaultObserved(fault)]
            }
            RecoveryAction::RestartLoad => {
                self.state = EngineState::Recovering;
                if let Some(session) = self.session.as_mut() {
                    session.start_load();
                }
                vec![EngineOutput::Recovering(FaultKind::NetworkTransient)]
            }
            RecoveryAction::RecoverDecoder => {
                self.state = EngineState::Recovering;
                if let Some(session) = self.session.as_mut() {
                    session.recover_media_error();
                }
                vec![EngineOutput::Recovering(FaultKind::DecodeTransient)]
            }
            RecoveryAction::Escalate(kind) => {
                self.destroy();
                vec![EngineOutput::Failed(kind)]
            }
        }
    }

    /// Request a quality mode
    ///
    /// `Auto` is accepted in any live state. While the manifest is loading a
    /// pin is stored as-is and checked against the ladder once it arrives;
    /// afterwards a pinned index must exist in the ladder.
    pub fn set_quality(&mut self, selection: QualitySelection) -> Result<()> {
        if !self.is_alive() {
            return Err(PlayerError::engine_error("engine is not bound"));
        }

        if self.state == EngineState::Loading {
            debug!(
                "Engine {} deferring quality request {:?}",
                self.generation, selection
            );
            self.selection = selection;
            return Ok(());
        }

        let session_level = match selection {
            QualitySelection::Auto => None,
            QualitySelection::Level(index) => match self.ladder.to_session(index) {
                Some(level) => Some(level),
                None => {
                    return Err(PlayerError::InvalidInput(format!(
                        "quality level {} out of range (ladder has {})",
                        index,
                        self.ladder.len()
                    )))
                }
            },
        };

        self.selection = selection;
        info!("Engine {} quality request {:?}", self.generation, selection);
        self.request_level(session_level);
        if self.state == EngineState::Ready {
            self.state = EngineState::LevelSwitching;
        }
        Ok(())
    }

    fn request_level(&mut self, session_level: Option<usize>) {
        if let Some(session) = self.session.as_mut() {
            session.set_current_level(session_level);
        }
    }

    /// Apply new buffer targets to future fetches
    ///
    /// Segment fetches already in flight are left alone.
    pub fn apply_policy(&mut self, policy: BufferingPolicy) {
        if !self.is_alive() || self.policy == Some(policy) {
            return;
        }

        debug!("Engine {} buffer policy {:?}", self.generation, policy);
        self.policy = Some(policy);
        if let Some(session) = self.session.as_mut() {
            session.apply_buffer_policy(&policy);
        }
    }

    /// Release the session; idempotent
    pub fn destroy(&mut self) {
        if let Some(mut session) = self.session.take() {
            info!("Engine {} destroyed", self.generation);
            session.destroy();
        }
        self.state = EngineState::Destroyed;
    }

    pub fn is_alive(&self) -> bool {
        !matches!(self.state, EngineState::Unbound | EngineState::Destroyed)
    }

    pub fn generation(&self) -> EngineGeneration {
        self.generation
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn ladder(&self) -> &QualityLadder {
        &self.ladder
    }

    pub fn selection(&self) -> QualitySelection {
        self.selection
    }

    /// Concrete ladder index being rendered, never the automatic marker
    pub fn current_level(&self) -> Option<usize> {
        self.current_level
    }

    pub fn buffer_policy(&self) -> Option<BufferingPolicy> {
        self.policy
    }
}

impl Drop for SegmentedStreamEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for SegmentedStreamEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentedStreamEngine")
            .field("generation", &self.generation)
            .field("state", &self.state)
            .field("locator", &self.locator)
            .field("levels", &self.ladder.len())
            .field("selection", &self.selection)
            .field("current_level", &self.current_level)
            .finish()
    }
}
