//! Control Visibility Timer
//!
//! Single pending deadline per controller. Rearming replaces the deadline;
//! it never stacks. The timer does not sleep: the owner polls it with the
//! current time, or awaits [`ControlVisibilityTimer::deadline`].

use log::trace;
use serde::Serialize;
use std::time::Duration;

use crate::buffer::DeviceClass;
use crate::utils::config::ControlsConfig;

/// User interaction on the player container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputEvent {
    PointerMove,
    TouchStart,
    Focus,
    PointerLeave,
}

/// Channel of the most recent interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InteractionChannel {
    Pointer,
    Touch,
}

/// Auto-hide timer for on-screen transport controls
#[derive(Debug, Clone)]
pub struct ControlVisibilityTimer {
    touch_timeout: Duration,
    pointer_timeout: Duration,
    device: DeviceClass,
    channel: InteractionChannel,
    playing: bool,
    picture_in_picture: bool,
    visible: bool,
    deadline: Option<Duration>,
}

impl ControlVisibilityTimer {
    pub fn new(config: &ControlsConfig, device: DeviceClass) -> Self {
        Self {
            touch_timeout: Duration::from_millis(config.touch_timeout_ms),
            pointer_timeout: Duration::from_millis(config.pointer_timeout_ms),
            device,
            channel: match device {
                DeviceClass::Mobile => InteractionChannel::Touch,
                DeviceClass::Desktop => InteractionChannel::Pointer,
            },
            playing: false,
            picture_in_picture: false,
            visible: true,
            deadline: None,
        }
    }

    /// Delay before hiding for the current device and channel
    pub fn timeout(&self) -> Duration {
        if self.device == DeviceClass::Mobile || self.channel == InteractionChannel::Touch {
            self.touch_timeout
        } else {
            self.pointer_timeout
        }
    }

    fn suppressed(&self) -> bool {
        !self.playing || self.picture_in_picture
    }

    /// Show controls and rearm unless suppressed; returns true if visibility changed
    fn reset(&mut self, now: Duration) -> bool {
        let changed = !self.visible;
        self.visible = true;
        self.deadline = if self.suppressed() {
            None
        } else {
            Some(now + self.timeout())
        };
        trace!("Controls deadline {:?}", self.deadline);
        changed
    }

    /// Track whether playback is wanted
    pub fn set_playing(&mut self, playing: bool, now: Duration) -> bool {
        if playing == self.playing {
            return false;
        }
        self.playing = playing;
        self.reset(now)
    }

    /// Track picture-in-picture; controls stay visible while it is active
    pub fn set_picture_in_picture(&mut self, active: bool, now: Duration) -> bool {
        if active == self.picture_in_picture {
            return false;
        }
        self.picture_in_picture = active;
        self.reset(now)
    }

    /// Takes effect at the next rearm
    pub fn set_device(&mut self, device: DeviceClass) {
        self.device = device;
    }

    /// Handle user input; returns true if visibility changed
    pub fn on_input(&mut self, input: InputEvent, now: Duration) -> bool {
        match input {
            InputEvent::PointerMove => {
                self.channel = InteractionChannel::Pointer;
                self.reset(now)
            }
            InputEvent::TouchStart => {
                self.channel = InteractionChannel::Touch;
                self.reset(now)
            }
            InputEvent::Focus => self.reset(now),
            InputEvent::PointerLeave => {
                self.deadline = None;
                if self.suppressed() || !self.visible {
                    return false;
                }
                self.visible = false;
                true
            }
        }
    }

    /// Hide controls if the deadline passed; returns true if they were hidden
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                if self.suppressed() {
                    return false;
                }
                let changed = self.visible;
                self.visible = false;
                changed
            }
            _ => false,
        }
    }

    /// Drop the pending deadline and force controls visible
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.visible = true;
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn channel(&self) -> InteractionChannel {
        self.channel
    }
}
