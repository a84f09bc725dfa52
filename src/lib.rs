//! # HTML5 Video Wrapper
//!
//! An HTML5 `<video>` playback backend for a host player controller.
//!
//! ## Features
//!
//! - Stream capability detection (`mp4`, and `m3u8` where the element plays HLS)
//! - Play, pause, seek and volume commands on one native element
//! - Seek safety: seeks before the stream is seekable are kept and retried
//! - Native media events normalized into controller notifications
//! - Workarounds for known platform defects (iOS airplay, iPad zero seeks,
//!   Chrome URL caching, m3u8 streams that never end)
//!
//! The native element, the DOM and the event loop are reached through the
//! traits in [`element`] and [`notify`], so a browser binding and a test mock
//! plug in the same way.
//!
//! ## Example
//!
//! ```rust,ignore
//! use html5_video_wrapper::{Platform, Style, VideoFactory};
//! use std::rc::Rc;
//!
//! let factory = VideoFactory::new(document, Platform::detect(ua, nav_platform), scheduler)?;
//! let controller = Rc::new(|n: html5_video_wrapper::Notification| log::info!("{}", n.event()));
//! let video = factory
//!     .create(&container, "https://cdn.example/movie.m3u8", "main", controller, &Style::new())?
//!     .expect("factory is ready");
//! video.load(false);
//! video.play();
//! ```

mod config;
pub mod element;
mod error;
mod factory;
mod listeners;
pub mod notify;
mod platform;
mod seek;
mod source;
mod video;

pub use config::WrapperConfig;
pub use element::{
    CanPlayType, Container, Document, EventSource, Listener, MediaElement, NativeEvent, Style,
    TimeRanges,
};
pub use error::Error;
pub use factory::{PLUGIN_NAME, VideoFactory};
pub use notify::{
    Controller, ControllerEvent, Notification, PlayheadState, Scheduler, SeekRange,
};
pub use platform::{Platform, Quirks};
pub use seek::{normalize_duration, safe_seek_time};
pub use source::{MediaSource, StreamFormat, strip_cache_buster};
pub use video::{PlaybackState, VideoWrapper};
