//! What the wrapper tells the host controller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code reported when an empty stream URL is assigned.
pub const NO_STREAM_ERROR_CODE: i32 = 0;
/// Error code reported when the element fails without a `MediaError`.
pub const UNKNOWN_ERROR_CODE: i32 = -1;

/// Seekable window in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeekRange {
    pub start: f64,
    pub end: f64,
}

impl SeekRange {
    /// `{0, 0}` means nothing is seekable yet.
    pub fn is_unknown(&self) -> bool {
        self.start == 0.0 && self.end == 0.0
    }

    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Shared payload of the position-carrying notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayheadState {
    pub current_time: f64,
    pub duration: f64,
    pub buffer: f64,
    pub seek_range: SeekRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Notification names understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerEvent {
    Progress,
    Error,
    Stalled,
    Buffered,
    Playing,
    Waiting,
    Seeking,
    Seeked,
    Ended,
    DurationChange,
    TimeUpdate,
    Play,
    Paused,
    RateChange,
    VolumeChange,
    FullscreenChanged,
}

impl ControllerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerEvent::Progress => "PROGRESS",
            ControllerEvent::Error => "ERROR",
            ControllerEvent::Stalled => "STALLED",
            ControllerEvent::Buffered => "BUFFERED",
            ControllerEvent::Playing => "PLAYING",
            ControllerEvent::Waiting => "WAITING",
            ControllerEvent::Seeking => "SEEKING",
            ControllerEvent::Seeked => "SEEKED",
            ControllerEvent::Ended => "ENDED",
            ControllerEvent::DurationChange => "DURATION_CHANGE",
            ControllerEvent::TimeUpdate => "TIME_UPDATE",
            ControllerEvent::Play => "PLAY",
            ControllerEvent::Paused => "PAUSED",
            ControllerEvent::RateChange => "RATE_CHANGE",
            ControllerEvent::VolumeChange => "VOLUME_CHANGE",
            ControllerEvent::FullscreenChanged => "FULLSCREEN_CHANGED",
        }
    }
}

impl fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    Progress(PlayheadState),
    Error {
        #[serde(rename = "errorcode")]
        code: i32,
    },
    Stalled {
        url: String,
    },
    Buffered {
        url: String,
    },
    Playing,
    Waiting {
        url: String,
    },
    Seeking,
    Seeked,
    Ended,
    DurationChange(PlayheadState),
    TimeUpdate(PlayheadState),
    Play {
        url: String,
    },
    Paused,
    RateChange,
    VolumeChange {
        volume: f64,
    },
    FullscreenChanged {
        #[serde(rename = "isFullScreen")]
        is_fullscreen: bool,
    },
}

impl Notification {
    pub fn event(&self) -> ControllerEvent {
        match self {
            Notification::Progress(_) => ControllerEvent::Progress,
            Notification::Error { .. } => ControllerEvent::Error,
            Notification::Stalled { .. } => ControllerEvent::Stalled,
            Notification::Buffered { .. } => ControllerEvent::Buffered,
            Notification::Playing => ControllerEvent::Playing,
            Notification::Waiting { .. } => ControllerEvent::Waiting,
            Notification::Seeking => ControllerEvent::Seeking,
            Notification::Seeked => ControllerEvent::Seeked,
            Notification::Ended => ControllerEvent::Ended,
            Notification::DurationChange(_) => ControllerEvent::DurationChange,
            Notification::TimeUpdate(_) => ControllerEvent::TimeUpdate,
            Notification::Play { .. } => ControllerEvent::Play,
            Notification::Paused => ControllerEvent::Paused,
            Notification::RateChange => ControllerEvent::RateChange,
            Notification::VolumeChange { .. } => ControllerEvent::VolumeChange,
            Notification::FullscreenChanged { .. } => ControllerEvent::FullscreenChanged,
        }
    }

    pub fn playhead(&self) -> Option<&PlayheadState> {
        match self {
            Notification::Progress(state)
            | Notification::DurationChange(state)
            | Notification::TimeUpdate(state) => Some(state),
            _ => None,
        }
    }
}

/// The host controller's notification sink. Fire-and-forget; the controller
/// may call back into the wrapper from `notify`.
pub trait Controller {
    fn notify(&self, notification: Notification);
}

impl<F: Fn(Notification)> Controller for F {
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}

/// Runs work on a later turn of the event loop (`setTimeout(f, 0)`).
/// Implementations must never run `task` before `defer` returns.
pub trait Scheduler {
    fn defer(&self, task: Box<dyn FnOnce()>);
}
