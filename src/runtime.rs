//! Async driver for a [`PlayerController`]
//!
//! Moves the controller onto a single tokio task. Commands and platform
//! notifications arrive over an unbounded channel and are applied in order;
//! the controls deadline is awaited with `sleep_until` in the same `select!`,
//! so the controller is never touched from two places at once.
//!
//! Deadlines are measured on the controller's own clock each time round the
//! loop, so any [`Clock`](crate::utils::clock::Clock) the controller was
//! built with works here.

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::binding::MediaSource;
use crate::engine::{EngineGeneration, QualitySelection, SessionEvent};
use crate::network::ConnectionInfo;
use crate::platform::MediaEvent;
use crate::player::{InputEvent, PlayerController, PlayerSnapshot};
use crate::utils::error::{PlayerError, Result};

/// Everything the player task accepts
#[derive(Debug)]
pub enum PlayerCommand {
    Bind(MediaSource),
    Retry,
    Play,
    Pause,
    TogglePlay,
    Seek(f64),
    Skip(f64),
    SetVolume(f32),
    ToggleMute,
    SetPlaybackRate(f32),
    SetQuality(QualitySelection),
    ToggleFullscreen,
    TogglePictureInPicture,
    Media(MediaEvent),
    Engine(EngineGeneration, SessionEvent),
    Input(InputEvent),
    Connection(ConnectionInfo),
    Viewport(u32),
    Snapshot(oneshot::Sender<PlayerSnapshot>),
    Shutdown,
}

/// Cloneable sender side of a running player task
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<PlayerCommand>,
}

impl PlayerHandle {
    /// Queue a command; fails once the task has stopped
    pub fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PlayerError::Internal("player task has stopped".to_string()))
    }

    /// Snapshot taken after every previously queued command was applied
    pub async fn snapshot(&self) -> Result<PlayerSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(PlayerCommand::Snapshot(tx))?;
        rx.await.map_err(|_| {
            PlayerError::Internal("player task dropped the snapshot request".to_string())
        })
    }

    /// Ask the task to unmount the controller and exit
    pub fn shutdown(&self) -> Result<()> {
        self.send(PlayerCommand::Shutdown)
    }
}

/// Runs a controller on its own tokio task
pub struct PlayerRuntime;

impl PlayerRuntime {
    /// Spawn the player task
    pub fn spawn(controller: PlayerController) -> (PlayerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(controller, rx));
        (PlayerHandle { commands: tx }, task)
    }
}

async fn run(
    mut controller: PlayerController,
    mut commands: mpsc::UnboundedReceiver<PlayerCommand>,
) {
    info!("Player task started");

    loop {
        let deadline = controller
            .time_until_deadline()
            .map(|remaining| Instant::now() + remaining);

        tokio::select! {
            command = commands.recv() => match command {
                Some(PlayerCommand::Shutdown) | None => break,
                Some(command) => apply(&mut controller, command),
            },
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                if deadline.is_some() =>
            {
                controller.tick();
            }
        }
    }

    controller.unmount();
    info!("Player task stopped");
}

fn apply(controller: &mut PlayerController, command: PlayerCommand) {
    debug!("Player command {:?}", command);

    let result = match command {
        PlayerCommand::Bind(source) => controller.bind(source).map(|_| ()),
        PlayerCommand::Retry => controller.retry().map(|_| ()),
        PlayerCommand::Play => controller.play(),
        PlayerCommand::Pause => controller.pause(),
        PlayerCommand::TogglePlay => controller.toggle_play(),
        PlayerCommand::Seek(position) => controller.seek(position),
        PlayerCommand::Skip(delta) => controller.skip(delta),
        PlayerCommand::SetVolume(volume) => controller.set_volume(volume),
        PlayerCommand::ToggleMute => {
            controller.toggle_mute();
            Ok(())
        }
        PlayerCommand::SetPlaybackRate(rate) => controller.set_playback_rate(rate),
        PlayerCommand::SetQuality(selection) => controller.set_quality(selection),
        PlayerCommand::ToggleFullscreen => {
            controller.toggle_fullscreen();
            Ok(())
        }
        PlayerCommand::TogglePictureInPicture => {
            controller.toggle_picture_in_picture();
            Ok(())
        }
        PlayerCommand::Media(event) => {
            controller.handle_media_event(event);
            Ok(())
        }
        PlayerCommand::Engine(generation, event) => {
            controller.handle_engine_event(generation, event);
            Ok(())
        }
        PlayerCommand::Input(input) => {
            controller.handle_input(input);
            Ok(())
        }
        PlayerCommand::Connection(info) => {
            controller.handle_connection_change(info);
            Ok(())
        }
        PlayerCommand::Viewport(width) => {
            controller.handle_viewport(width);
            Ok(())
        }
        PlayerCommand::Snapshot(reply) => {
            // The requester may have given up waiting.
            let _ = reply.send(controller.snapshot());
            Ok(())
        }
        PlayerCommand::Shutdown => Ok(()),
    };

    if let Err(e) = result {
        warn!("Player command failed: {}", e);
    }
}
