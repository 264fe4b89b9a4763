//! Integration tests for the tokio player task
//!
//! Time is paused, so the controls deadline fires exactly when tokio's
//! clock is advanced past it. The controller keeps its own clock; the task
//! only ever sleeps for what that clock says is left.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use vodplayer::utils::clock::{Clock, ManualClock, TokioClock};
use vodplayer::{
    MediaEvent, MediaSource, PlaybackState, PlayerCommand, PlayerController, PlayerHandle,
    PlayerRuntime,
};
use vodplayer_integration_tests::{FakeBackend, FakeConnection, FakeMediaElement};

fn spawn_with_clock(
    media: &FakeMediaElement,
    backend: &FakeBackend,
    clock: Arc<dyn Clock>,
) -> Result<(PlayerHandle, JoinHandle<()>)> {
    let controller = PlayerController::builder()
        .with_clock(clock)
        .build(media.boxed(), backend.boxed(), &mut FakeConnection::absent())?;
    Ok(PlayerRuntime::spawn(controller))
}

fn spawn_player(
    media: &FakeMediaElement,
    backend: &FakeBackend,
) -> Result<(PlayerHandle, JoinHandle<()>)> {
    spawn_with_clock(media, backend, Arc::new(TokioClock::new()))
}

#[tokio::test(start_paused = true)]
async fn test_controls_hide_on_deadline() -> Result<()> {
    let media = FakeMediaElement::new();
    let backend = FakeBackend::new();
    let (handle, task) = spawn_player(&media, &backend)?;

    handle.send(PlayerCommand::Bind(MediaSource::new("https://cdn.test/a.mp4", "A")))?;
    handle.send(PlayerCommand::Media(MediaEvent::CanPlay))?;

    let snapshot = handle.snapshot().await?;
    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert!(snapshot.controls_visible);

    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert!(handle.snapshot().await?.controls_visible);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!handle.snapshot().await?.controls_visible);

    handle.shutdown()?;
    task.await?;
    assert!(media.state().source.is_none());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_deadline_follows_controller_clock() -> Result<()> {
    let media = FakeMediaElement::new();
    let backend = FakeBackend::new();
    let clock = ManualClock::new();
    let (handle, task) = spawn_with_clock(&media, &backend, Arc::new(clock.clone()))?;

    handle.send(PlayerCommand::Bind(MediaSource::new("https://cdn.test/a.mp4", "A")))?;
    handle.send(PlayerCommand::Media(MediaEvent::CanPlay))?;
    assert_eq!(handle.snapshot().await?.state, PlaybackState::Playing);

    // tokio time moves on, the controller's clock does not
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(handle.snapshot().await?.controls_visible);

    clock.advance(Duration::from_millis(3000));
    tokio::time::sleep(Duration::from_millis(3001)).await;
    assert!(!handle.snapshot().await?.controls_visible);

    handle.shutdown()?;
    task.await?;

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_commands_apply_in_order() -> Result<()> {
    let media = FakeMediaElement::new();
    let backend = FakeBackend::new();
    let (handle, task) = spawn_player(&media, &backend)?;

    handle.send(PlayerCommand::Bind(MediaSource::new("https://cdn.test/a.m3u8", "A")))?;
    handle.send(PlayerCommand::SetPlaybackRate(4.0))?;
    handle.send(PlayerCommand::SetPlaybackRate(1.25))?;
    handle.send(PlayerCommand::Bind(MediaSource::new("https://cdn.test/b.m3u8", "B")))?;

    let snapshot = handle.snapshot().await?;
    assert_eq!(snapshot.playback_rate, 1.25);
    assert_eq!(snapshot.title.as_deref(), Some("B"));
    assert_eq!(snapshot.state, PlaybackState::Loading);
    {
        let log = backend.log();
        assert_eq!(log.sessions.len(), 2);
        assert!(log.sessions[0].destroyed);
    }

    drop(handle);
    task.await?;
    assert!(backend.last_session().map(|s| s.destroyed).unwrap_or(false));

    Ok(())
}

#[tokio::test]
async fn test_handle_fails_after_shutdown() -> Result<()> {
    let media = FakeMediaElement::new();
    let backend = FakeBackend::new();
    let (handle, task) = spawn_player(&media, &backend)?;

    handle.shutdown()?;
    task.await?;

    assert!(handle.send(PlayerCommand::Play).is_err());
    assert!(handle.snapshot().await.is_err());

    Ok(())
}
