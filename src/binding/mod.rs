//! Transport Binding
//!
//! Decides, per media source, whether the native pipeline plays the locator
//! directly or a Segmented Stream Engine is built for it, and owns whichever
//! was chosen. At most one engine is alive at a time.

mod locator;

pub use locator::{is_segmented_locator, MediaSource, MANIFEST_EXTENSION};

use log::{info, warn};
use serde::Serialize;

use crate::buffer::BufferingPolicy;
use crate::engine::{EngineGeneration, SegmentedStreamEngine};
use crate::platform::{AdaptiveBackend, MediaElement, PlatformCapabilities};
use crate::utils::config::EngineConfig;
use crate::utils::error::{PlayerError, Result};

/// How a source ended up bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BindingKind {
    /// Native pipeline plays the locator
    Direct,

    /// Segmented Stream Engine drives the pipeline
    Adaptive,
}

/// Binding decision rule, fixed from platform capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingStrategy {
    native_manifest_playback: bool,
    adaptive_engine: bool,
}

impl BindingStrategy {
    pub fn resolve(capabilities: &PlatformCapabilities) -> Self {
        Self {
            native_manifest_playback: capabilities.native_manifest_playback,
            adaptive_engine: capabilities.adaptive_engine,
        }
    }

    /// Preferred binding for a locator
    pub fn choose(&self, locator: &str) -> BindingKind {
        if !is_segmented_locator(locator) || self.native_manifest_playback {
            BindingKind::Direct
        } else if self.adaptive_engine {
            BindingKind::Adaptive
        } else {
            // Last resort; the pipeline reports the failure at metadata load.
            BindingKind::Direct
        }
    }
}

enum ActiveBinding {
    Unbound,
    Direct,
    Adaptive(SegmentedStreamEngine),
}

/// Owner of the currently bound transport
pub struct TransportBinding {
    strategy: BindingStrategy,
    generation: EngineGeneration,
    active: ActiveBinding,
}

impl TransportBinding {
    pub fn new(strategy: BindingStrategy) -> Self {
        Self {
            strategy,
            generation: EngineGeneration::default(),
            active: ActiveBinding::Unbound,
        }
    }

    /// Tear down whatever is bound, then bind `source`
    ///
    /// A new generation is issued on every call, before anything is built,
    /// so events from the previous engine are recognisably stale.
    pub fn bind(
        &mut self,
        source: &MediaSource,
        media: &mut dyn MediaElement,
        backend: &mut dyn AdaptiveBackend,
        config: &EngineConfig,
        policy: BufferingPolicy,
    ) -> Result<BindingKind> {
        self.unbind(media);
        self.generation = self.generation.next();

        if self.strategy.choose(&source.locator) == BindingKind::Adaptive {
            let mut engine = SegmentedStreamEngine::new(self.generation);
            match engine.bind(backend, &source.locator, config, policy) {
                Ok(()) => {
                    self.active = ActiveBinding::Adaptive(engine);
                    return Ok(BindingKind::Adaptive);
                }
                Err(e) => {
                    warn!(
                        "Adaptive engine unavailable ({}), binding {} directly",
                        e, source.locator
                    );
                }
            }
        }

        self.bind_direct(source, media)?;
        Ok(BindingKind::Direct)
    }

    fn bind_direct(&mut self, source: &MediaSource, media: &mut dyn MediaElement) -> Result<()> {
        media.set_source(&source.locator).map_err(|e| {
            PlayerError::UnsupportedFormat(format!("{}: {}", source.locator, e))
        })?;

        info!("Bound {} directly ({})", source.locator, self.generation);
        self.active = ActiveBinding::Direct;
        Ok(())
    }

    /// Destroy the engine (if any) and detach the pipeline
    pub fn unbind(&mut self, media: &mut dyn MediaElement) {
        match std::mem::replace(&mut self.active, ActiveBinding::Unbound) {
            ActiveBinding::Unbound => {}
            ActiveBinding::Direct => media.clear_source(),
            ActiveBinding::Adaptive(mut engine) => {
                engine.destroy();
                media.clear_source();
            }
        }
    }

    /// Generation of the most recent bind
    pub fn generation(&self) -> EngineGeneration {
        self.generation
    }

    /// Whether an event tagged `generation` belongs to the live engine
    pub fn is_current(&self, generation: EngineGeneration) -> bool {
        matches!(&self.active, ActiveBinding::Adaptive(engine)
            if engine.generation() == generation && engine.is_alive())
    }

    pub fn kind(&self) -> Option<BindingKind> {
        match self.active {
            ActiveBinding::Unbound => None,
            ActiveBinding::Direct => Some(BindingKind::Direct),
            ActiveBinding::Adaptive(_) => Some(BindingKind::Adaptive),
        }
    }

    pub fn engine(&self) -> Option<&SegmentedStreamEngine> {
        match &self.active {
            ActiveBinding::Adaptive(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn engine_mut(&mut self) -> Option<&mut SegmentedStreamEngine> {
        match &mut self.active {
            ActiveBinding::Adaptive(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn strategy(&self) -> BindingStrategy {
        self.strategy
    }
}

impl std::fmt::Debug for TransportBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportBinding")
            .field("strategy", &self.strategy)
            .field("generation", &self.generation)
            .field("kind", &self.kind())
            .field("engine", &self.engine())
            .finish()
    }
}
