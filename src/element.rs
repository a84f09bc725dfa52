//! The native media element, as far as the wrapper is concerned.
//!
//! A browser binding implements these traits on top of `HTMLVideoElement`;
//! tests implement them on a scripted mock. All methods take `&self` because
//! the native element is a shared handle whose state lives outside Rust.

use crate::Error;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// MIME type probed to decide whether the element plays HLS natively.
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// A listener attached to a native event. Identity (`Rc::ptr_eq`) is what
/// removal matches on.
pub type Listener = Rc<dyn Fn(NativeEvent)>;

/// Native `HTMLMediaElement` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NativeEvent {
    LoadStart,
    Progress,
    Suspend,
    Abort,
    Error,
    Emptied,
    Stalled,
    LoadedMetadata,
    LoadedData,
    CanPlay,
    CanPlayThrough,
    Playing,
    Waiting,
    Seeking,
    Seeked,
    Ended,
    DurationChange,
    TimeUpdate,
    Play,
    Pause,
    RateChange,
    Resize,
    VolumeChange,
    WebkitBeginFullscreen,
    WebkitEndFullscreen,
}

impl NativeEvent {
    pub const ALL: [NativeEvent; 25] = [
        NativeEvent::LoadStart,
        NativeEvent::Progress,
        NativeEvent::Suspend,
        NativeEvent::Abort,
        NativeEvent::Error,
        NativeEvent::Emptied,
        NativeEvent::Stalled,
        NativeEvent::LoadedMetadata,
        NativeEvent::LoadedData,
        NativeEvent::CanPlay,
        NativeEvent::CanPlayThrough,
        NativeEvent::Playing,
        NativeEvent::Waiting,
        NativeEvent::Seeking,
        NativeEvent::Seeked,
        NativeEvent::Ended,
        NativeEvent::DurationChange,
        NativeEvent::TimeUpdate,
        NativeEvent::Play,
        NativeEvent::Pause,
        NativeEvent::RateChange,
        NativeEvent::Resize,
        NativeEvent::VolumeChange,
        NativeEvent::WebkitBeginFullscreen,
        NativeEvent::WebkitEndFullscreen,
    ];

    /// The DOM event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            NativeEvent::LoadStart => "loadstart",
            NativeEvent::Progress => "progress",
            NativeEvent::Suspend => "suspend",
            NativeEvent::Abort => "abort",
            NativeEvent::Error => "error",
            NativeEvent::Emptied => "emptied",
            NativeEvent::Stalled => "stalled",
            NativeEvent::LoadedMetadata => "loadedmetadata",
            NativeEvent::LoadedData => "loadeddata",
            NativeEvent::CanPlay => "canplay",
            NativeEvent::CanPlayThrough => "canplaythrough",
            NativeEvent::Playing => "playing",
            NativeEvent::Waiting => "waiting",
            NativeEvent::Seeking => "seeking",
            NativeEvent::Seeked => "seeked",
            NativeEvent::Ended => "ended",
            NativeEvent::DurationChange => "durationchange",
            NativeEvent::TimeUpdate => "timeupdate",
            NativeEvent::Play => "play",
            NativeEvent::Pause => "pause",
            NativeEvent::RateChange => "ratechange",
            NativeEvent::Resize => "resize",
            NativeEvent::VolumeChange => "volumechange",
            NativeEvent::WebkitBeginFullscreen => "webkitbeginfullscreen",
            NativeEvent::WebkitEndFullscreen => "webkitendfullscreen",
        }
    }
}

impl fmt::Display for NativeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NativeEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NativeEvent::ALL
            .iter()
            .copied()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| Error::UnknownEvent(s.to_owned()))
    }
}

/// Normalized `TimeRanges` snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeRanges {
    ranges: SmallVec<[(f64, f64); 2]>,
}

impl TimeRanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, start: f64, end: f64) {
        self.ranges.push((start, end));
    }

    pub fn length(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn start(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(s, _)| *s)
    }

    pub fn end(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(_, e)| *e)
    }
}

impl FromIterator<(f64, f64)> for TimeRanges {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

/// Answer of `canPlayType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanPlayType {
    Empty,
    Maybe,
    Probably,
}

impl CanPlayType {
    pub fn is_supported(&self) -> bool {
        !matches!(self, CanPlayType::Empty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CanPlayType::Empty => "",
            CanPlayType::Maybe => "maybe",
            CanPlayType::Probably => "probably",
        }
    }
}

/// Inline CSS declarations, applied in property order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style(BTreeMap<String, String>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.0.insert(property.into(), value.into());
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Anything exposing add/remove-listener for native media events.
pub trait EventSource {
    fn add_listener(&self, event: NativeEvent, listener: &Listener);
    fn remove_listener(&self, event: NativeEvent, listener: &Listener);
}

/// A native `<video>` element.
pub trait MediaElement: EventSource {
    fn src(&self) -> String;
    fn set_src(&self, src: &str);
    /// The resolved source actually being played.
    fn current_src(&self) -> String;

    fn current_time(&self) -> f64;
    /// Writing the position can throw before the stream exposes a timeline.
    fn set_current_time(&self, time: f64) -> Result<(), Error>;
    fn duration(&self) -> f64;

    fn volume(&self) -> f64;
    /// Some mobile browsers refuse programmatic volume changes.
    fn set_volume(&self, volume: f64) -> Result<(), Error>;
    fn paused(&self) -> bool;

    /// `None` when the element exposes no usable `seekable` object.
    fn seekable(&self) -> Option<TimeRanges>;
    fn buffered(&self) -> Option<TimeRanges>;
    /// `MediaError.code`, when the element exposes a structured error.
    fn error_code(&self) -> Option<u16>;

    fn play(&self);
    fn pause(&self);
    fn load(&self);

    fn can_play_type(&self, mime_type: &str) -> CanPlayType;
    fn set_attribute(&self, name: &str, value: &str) -> Result<(), Error>;
    fn apply_css(&self, style: &Style);
    /// Detach the element from the DOM.
    fn remove(&self);
}

/// Creates native elements.
pub trait Document {
    type Element: MediaElement + 'static;

    fn create_video_element(&self) -> Result<Self::Element, Error>;
}

/// A DOM node a media element can be appended to.
pub trait Container<E> {
    fn append_child(&self, element: &E) -> Result<(), Error>;
}
