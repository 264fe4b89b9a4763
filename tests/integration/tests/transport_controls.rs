//! Integration tests for the transport control surface
//!
//! These tests verify:
//! - Play/pause/seek semantics across playback states
//! - Volume, mute and playback rate handling
//! - Fullscreen and picture-in-picture refusals
//! - Control visibility timing
//! - Configuration reaching the controller

use anyhow::Result;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;

use vodplayer::platform::PlatformCapabilities;
use vodplayer::player::PLAYBACK_RATES;
use vodplayer::{
    format_time, Config, FaultKind, InputEvent, MediaEvent, MediaSource, PlaybackState,
    PlayerError, PlayerEvent,
};
use vodplayer_integration_tests::{manual_play_config, FakeConnection, TestPlayer};

fn trailer() -> MediaSource {
    MediaSource::new("https://cdn.test/trailer.mp4", "Trailer")
        .with_poster("https://cdn.test/trailer.jpg")
}

/// Direct binding that has reached `Playing`
fn playing(player: &mut TestPlayer) -> Result<()> {
    player.controller.bind(trailer())?;
    player
        .controller
        .handle_media_event(MediaEvent::LoadedMetadata { duration: Some(600.0) });
    player.controller.play()?;
    assert_eq!(player.controller.state(), PlaybackState::Playing);
    Ok(())
}

fn notices(player: &TestPlayer) -> usize {
    player
        .events()
        .iter()
        .filter(|e| {
            matches!(
                e,
                PlayerEvent::Notice {
                    kind: FaultKind::PlatformFeatureUnavailable,
                    ..
                }
            )
        })
        .count()
}

#[test]
fn test_play_requires_media() -> Result<()> {
    let mut player = TestPlayer::new()?;

    assert!(matches!(player.controller.play(), Err(PlayerError::NoMedia)));
    assert!(matches!(player.controller.pause(), Err(PlayerError::NoMedia)));
    assert_eq!(player.controller.state(), PlaybackState::Idle);

    Ok(())
}

#[test]
fn test_play_during_loading_waits_for_first_frame() -> Result<()> {
    let mut player = TestPlayer::with_config(manual_play_config())?;
    player.controller.bind(trailer())?;

    player.controller.play()?;
    assert_eq!(player.controller.state(), PlaybackState::Loading);
    assert_eq!(player.media.state().plays, 0);

    player.controller.handle_media_event(MediaEvent::CanPlay);
    assert_eq!(player.controller.state(), PlaybackState::Playing);
    assert_eq!(player.media.state().plays, 1);

    Ok(())
}

#[test]
fn test_refused_autoplay_stays_ready() -> Result<()> {
    let mut player = TestPlayer::new()?;
    player.media.state().refuse_play = true;
    player.controller.bind(trailer())?;

    player.controller.handle_media_event(MediaEvent::CanPlay);

    assert_eq!(player.controller.state(), PlaybackState::Ready);
    assert!(player.controller.play().is_err());
    assert_eq!(player.controller.state(), PlaybackState::Ready);

    Ok(())
}

#[test]
fn test_play_pause_idempotent() -> Result<()> {
    let mut player = TestPlayer::with_config(manual_play_config())?;
    playing(&mut player)?;

    player.controller.play()?;
    assert_eq!(player.media.state().plays, 1);

    player.controller.pause()?;
    player.controller.pause()?;
    assert_eq!(player.controller.state(), PlaybackState::Paused);
    assert_eq!(player.media.state().pauses, 1);

    player.controller.toggle_play()?;
    assert_eq!(player.controller.state(), PlaybackState::Playing);

    // The platform pausing by itself is reflected too.
    player.controller.handle_media_event(MediaEvent::Pause);
    assert_eq!(player.controller.state(), PlaybackState::Paused);

    Ok(())
}

#[test]
fn test_seek_clamps_to_timeline() -> Result<()> {
    let mut player = TestPlayer::with_config(manual_play_config())?;
    player.controller.bind(trailer())?;

    // Duration unknown: only the lower bound applies.
    player.controller.seek(-5.0)?;
    assert_eq!(player.media.state().current_time, 0.0);
    player.controller.seek(4000.0)?;
    assert_eq!(player.media.state().current_time, 4000.0);

    player
        .controller
        .handle_media_event(MediaEvent::DurationChange { duration: Some(600.0) });
    player.controller.seek(4000.0)?;
    assert_eq!(player.media.state().current_time, 600.0);
    assert_eq!(player.controller.snapshot().position, 600.0);

    assert!(player.controller.seek(f64::INFINITY).is_err());
    assert!(player.controller.skip(f64::NAN).is_err());

    Ok(())
}

#[test]
fn test_skip_steps() -> Result<()> {
    let mut player = TestPlayer::with_config(manual_play_config())?;
    playing(&mut player)?;
    player.media.state().current_time = 100.0;

    player.controller.skip_forward()?;
    assert_eq!(player.media.state().current_time, 110.0);
    player.controller.skip_backward()?;
    player.controller.skip_backward()?;
    assert_eq!(player.media.state().current_time, 90.0);

    Ok(())
}

#[test]
fn test_playback_rate_rejection() -> Result<()> {
    let mut player = TestPlayer::new()?;

    assert!(matches!(
        player.controller.set_playback_rate(3.0),
        Err(PlayerError::InvalidInput(_))
    ));
    assert!(player.controller.set_playback_rate(0.0).is_err());
    assert_eq!(player.controller.snapshot().playback_rate, 1.0);
    assert_eq!(player.media.state().rate, 1.0);

    for rate in PLAYBACK_RATES {
        player.controller.set_playback_rate(rate)?;
        assert_eq!(player.media.state().rate, rate);
    }

    Ok(())
}

#[test]
fn test_playback_rate_survives_rebind() -> Result<()> {
    let mut player = TestPlayer::new()?;
    player.controller.set_playback_rate(1.5)?;

    player.controller.bind(trailer())?;
    player.media.state().rate = 1.0;
    player
        .controller
        .bind(MediaSource::new("https://cdn.test/feature.mp4", "Feature"))?;

    assert_eq!(player.media.state().rate, 1.5);
    assert_eq!(player.controller.snapshot().playback_rate, 1.5);

    Ok(())
}

#[test]
fn test_mute_restores_last_audible_volume() -> Result<()> {
    let mut player = TestPlayer::new()?;

    player.controller.set_volume(0.6)?;
    player.controller.toggle_mute();
    assert!(player.media.state().muted);
    assert_eq!(player.controller.snapshot().volume, 0.6);

    player.controller.toggle_mute();
    assert!(!player.media.state().muted);

    player.controller.set_volume(0.0)?;
    assert!(player.controller.snapshot().muted);
    player.controller.toggle_mute();

    let snapshot = player.controller.snapshot();
    assert!(!snapshot.muted);
    assert_eq!(snapshot.volume, 0.6);
    assert_eq!(player.media.state().volume, 0.6);

    player.controller.set_volume(-1.0)?;
    assert_eq!(player.controller.snapshot().volume, 0.0);
    assert!(player.controller.set_volume(f32::NAN).is_err());

    Ok(())
}

#[test]
fn test_fullscreen_toggle_and_refusal() -> Result<()> {
    let mut player = TestPlayer::new()?;

    player.controller.toggle_fullscreen();
    assert!(player.controller.snapshot().fullscreen);
    player.controller.toggle_fullscreen();
    assert!(!player.controller.snapshot().fullscreen);

    player.media.state().refuse_fullscreen = true;
    player.controller.toggle_fullscreen();
    assert!(!player.controller.snapshot().fullscreen);
    assert_eq!(notices(&player), 1);
    assert_eq!(player.controller.state(), PlaybackState::Idle);

    // Leaving fullscreen through the platform is mirrored.
    player.media.state().refuse_fullscreen = false;
    player.controller.toggle_fullscreen();
    player
        .controller
        .handle_media_event(MediaEvent::FullscreenChange { fullscreen: false });
    assert!(!player.controller.snapshot().fullscreen);

    Ok(())
}

#[test]
fn test_missing_capabilities_are_notices() -> Result<()> {
    let capabilities = PlatformCapabilities {
        fullscreen: false,
        picture_in_picture: false,
        ..PlatformCapabilities::full()
    };
    let mut player = TestPlayer::build(
        manual_play_config(),
        capabilities,
        FakeConnection::absent(),
        1280,
    )?;
    playing(&mut player)?;

    player.controller.toggle_fullscreen();
    player.controller.toggle_picture_in_picture();

    assert_eq!(notices(&player), 2);
    assert!(player.events().contains(&PlayerEvent::Notice {
        kind: FaultKind::PlatformFeatureUnavailable,
        message: "Feature unavailable: picture-in-picture".to_string(),
    }));
    assert!(!player.media.state().fullscreen);
    assert!(!player.media.state().picture_in_picture);
    assert_eq!(player.controller.state(), PlaybackState::Playing);

    Ok(())
}

#[test]
fn test_picture_in_picture_keeps_controls_visible() -> Result<()> {
    let mut player = TestPlayer::with_config(manual_play_config())?;
    playing(&mut player)?;

    player.controller.toggle_picture_in_picture();
    assert!(player.controller.snapshot().picture_in_picture);
    assert_eq!(player.controller.next_deadline(), None);

    player.advance(10_000);
    player.controller.tick();
    assert!(player.controller.snapshot().controls_visible);

    player
        .controller
        .handle_media_event(MediaEvent::LeavePictureInPicture);
    assert!(!player.controller.snapshot().picture_in_picture);
    assert_eq!(
        player.controller.next_deadline(),
        Some(Duration::from_millis(13_000))
    );

    Ok(())
}

#[test]
fn test_refused_picture_in_picture() -> Result<()> {
    let mut player = TestPlayer::new()?;
    player.media.state().refuse_picture_in_picture = true;

    player.controller.toggle_picture_in_picture();

    assert!(!player.controller.snapshot().picture_in_picture);
    assert_eq!(notices(&player), 1);

    Ok(())
}

#[test]
fn test_touch_device_hides_after_five_seconds() -> Result<()> {
    let mut player = TestPlayer::build(
        manual_play_config(),
        PlatformCapabilities::full(),
        FakeConnection::absent(),
        390,
    )?;
    playing(&mut player)?;

    player.advance(4999);
    player.controller.tick();
    assert!(player.controller.snapshot().controls_visible);

    player.advance(1);
    player.controller.tick();
    assert!(!player.controller.snapshot().controls_visible);
    assert!(player
        .events()
        .contains(&PlayerEvent::ControlsVisibilityChanged { visible: false }));

    Ok(())
}

#[test]
fn test_touch_rearms_deadline() -> Result<()> {
    let mut player = TestPlayer::build(
        manual_play_config(),
        PlatformCapabilities::full(),
        FakeConnection::absent(),
        390,
    )?;
    playing(&mut player)?;

    player.advance(4000);
    player.controller.handle_input(InputEvent::TouchStart);
    assert_eq!(
        player.controller.next_deadline(),
        Some(Duration::from_millis(9000))
    );

    player.advance(1000);
    player.controller.tick();
    assert!(player.controller.snapshot().controls_visible);

    player.advance(4000);
    player.controller.tick();
    assert!(!player.controller.snapshot().controls_visible);

    Ok(())
}

#[test]
fn test_pointer_leave_hides_immediately() -> Result<()> {
    let mut player = TestPlayer::with_config(manual_play_config())?;
    playing(&mut player)?;

    player.controller.handle_input(InputEvent::PointerLeave);
    assert!(!player.controller.snapshot().controls_visible);

    player.controller.handle_input(InputEvent::PointerMove);
    assert!(player.controller.snapshot().controls_visible);
    assert_eq!(
        player.controller.next_deadline(),
        Some(Duration::from_millis(3000))
    );

    Ok(())
}

#[test]
fn test_controls_stay_while_paused() -> Result<()> {
    let mut player = TestPlayer::with_config(manual_play_config())?;
    playing(&mut player)?;
    player.controller.pause()?;

    player.advance(60_000);
    player.controller.tick();
    player.controller.handle_input(InputEvent::PointerLeave);

    assert!(player.controller.snapshot().controls_visible);

    Ok(())
}

#[test]
fn test_snapshot_serializes() -> Result<()> {
    let mut player = TestPlayer::with_config(manual_play_config())?;
    playing(&mut player)?;

    let snapshot = player.controller.snapshot();
    assert_eq!(snapshot.title.as_deref(), Some("Trailer"));
    assert_eq!(snapshot.poster_image.as_deref(), Some("https://cdn.test/trailer.jpg"));
    assert_eq!(snapshot.duration, Some(600.0));

    let json: serde_json::Value = serde_json::from_str(&snapshot.to_json()?)?;
    assert_eq!(json["state"], "Playing");
    assert_eq!(json["binding"], "Direct");
    assert_eq!(json["network_tier"], "Unknown");

    Ok(())
}

#[test]
fn test_config_file_reaches_controller() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "[player]\nseek_step = 5.0\nauto_play = false\ndefault_volume = 0.5")?;

    let config = Config::from_file(file.path())?;
    let mut player = TestPlayer::with_config(config)?;
    assert_eq!(player.media.state().volume, 0.5);

    playing(&mut player)?;
    player.controller.skip_forward()?;
    assert_eq!(player.media.state().current_time, 5.0);

    Ok(())
}

#[test]
#[serial]
fn test_env_override_reaches_controller() -> Result<()> {
    std::env::set_var("VODPLAYER_AUTO_PLAY", "false");
    let config = Config::load();
    std::env::remove_var("VODPLAYER_AUTO_PLAY");

    let mut player = TestPlayer::with_config(config?)?;
    player.controller.bind(trailer())?;
    player.controller.handle_media_event(MediaEvent::CanPlay);
    assert_eq!(player.controller.state(), PlaybackState::Ready);

    Ok(())
}

#[test]
fn test_invalid_config_rejected_at_build() {
    let mut config = Config::default();
    config.player.default_playback_rate = 3.0;
    assert!(TestPlayer::with_config(config).is_err());
}

#[test]
fn test_format_time() {
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(65.9), "1:05");
    assert_eq!(format_time(3723.0), "1:02:03");
}
