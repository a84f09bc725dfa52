use crate::config::WrapperConfig;
use crate::element::{Listener, MediaElement, NativeEvent, Style};
use crate::listeners::dispatch;
use crate::notify::{
    Controller, NO_STREAM_ERROR_CODE, Notification, PlayheadState, Scheduler, UNKNOWN_ERROR_CODE,
};
use crate::platform::{Platform, Quirks};
use crate::seek::{buffered_end, normalize_duration, resolve_seek, safe_seek_range};
use crate::source::{MediaSource, StreamFormat, strip_cache_buster};
use smallvec::SmallVec;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

/// Coarse playback state of a wrapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Unloaded,
    SourceSet,
    Loading,
    Playing,
    Paused,
    Ended,
}

pub(crate) struct Internal<E> {
    pub(crate) this: Weak<RefCell<Internal<E>>>,
    pub(crate) id: String,
    pub(crate) element: E,
    pub(crate) quirks: Quirks,
    pub(crate) config: WrapperConfig,
    pub(crate) scheduler: Rc<dyn Scheduler>,
    pub(crate) controller: Option<Rc<dyn Controller>>,
    pub(crate) streams: SmallVec<[StreamFormat; 2]>,

    pub(crate) source: MediaSource,
    pub(crate) state: PlaybackState,
    pub(crate) loaded: bool,
    pub(crate) ready_to_play: bool,
    pub(crate) video_ended: bool,
    pub(crate) end_scheduled: bool,
    /// Bumped whenever a scheduled synthetic end goes stale.
    pub(crate) end_generation: u64,
    pub(crate) pending_seek: Option<f64>,

    pub(crate) listeners: Vec<(NativeEvent, Listener)>,
    pub(crate) pending_rewind: Option<Listener>,
    pub(crate) destroyed: bool,
}

impl<E: MediaElement + 'static> Internal<E> {
    pub(crate) fn set_video_url(&mut self, url: &str) -> (bool, Option<Notification>) {
        let param = self.config.cache_buster_param.as_str();
        let changed = strip_cache_buster(url, param) != self.source.base_url();

        if changed {
            self.source = MediaSource::new(url, param, self.quirks.cache_busting);
            self.ready_to_play = false;
            self.loaded = false;
            self.video_ended = false;
            self.end_scheduled = false;
            self.end_generation += 1;
            self.pending_seek = None;
            self.state = if self.source.is_empty() {
                PlaybackState::Unloaded
            } else {
                PlaybackState::SourceSet
            };
            self.element.set_src(self.source.url());
            log::debug!(
                "video {}: source set to {} ({})",
                self.id,
                self.source.url(),
                self.source.format()
            );
        }

        let notification = url.is_empty().then(|| {
            log::debug!("video {}: empty stream url", self.id);
            Notification::Error {
                code: NO_STREAM_ERROR_CODE,
            }
        });
        (changed, notification)
    }

    pub(crate) fn load(&mut self, rewind: bool) {
        if self.loaded && !rewind {
            return;
        }

        if rewind {
            if self.quirks.deferred_rewind {
                self.schedule_rewind();
            } else {
                self.rewind_now();
            }
            self.element.pause();
        }

        self.element.load();
        self.loaded = true;
        if self.state != PlaybackState::Unloaded {
            self.state = PlaybackState::Loading;
        }
    }

    pub(crate) fn rewind_now(&mut self) {
        if let Err(err) = self.element.set_current_time(0.0) {
            log::debug!("video {}: failed to rewind, probably ok: {err}", self.id);
        }
    }

    pub(crate) fn play(&mut self) {
        self.element.play();
        self.loaded = true;
        if self.state == PlaybackState::SourceSet {
            self.state = PlaybackState::Loading;
        }
    }

    pub(crate) fn seek(&mut self, time: f64) -> bool {
        if !time.is_finite() {
            log::warn!("video {}: ignoring seek to {time}", self.id);
            return false;
        }

        let range = safe_seek_range(self.element.seekable().as_ref());
        let duration = self.element.duration();
        let Some(safe) = resolve_seek(time, duration, range, &self.quirks, &self.config) else {
            log::debug!(
                "video {}: seek to {time} deferred, seekable {:?}",
                self.id,
                range
            );
            self.pending_seek = Some(time);
            return false;
        };

        match self.element.set_current_time(safe) {
            Ok(()) => {
                self.pending_seek = None;
                true
            }
            Err(err) => {
                log::debug!("video {}: seek to {safe} deferred: {err}", self.id);
                self.pending_seek = Some(time);
                false
            }
        }
    }

    pub(crate) fn set_volume(&mut self, volume: f64) {
        if let Err(err) = self.element.set_volume(volume) {
            log::debug!("video {}: volume {volume} rejected: {err}", self.id);
        }
    }

    pub(crate) fn destroy(&mut self) {
        if self.destroyed {
            return;
        }

        self.element.pause();
        self.element.set_src("");
        self.unsubscribe_all();
        self.element.remove();

        self.destroyed = true;
        self.source = MediaSource::new("", &self.config.cache_buster_param, false);
        self.pending_seek = None;
        self.loaded = false;
        self.state = PlaybackState::Unloaded;
        log::info!("video {}: destroyed", self.id);
    }

    fn playhead(&self, with_url: bool) -> PlayheadState {
        PlayheadState {
            current_time: self.element.current_time(),
            duration: normalize_duration(self.element.duration()),
            buffer: buffered_end(self.element.buffered().as_ref()),
            seek_range: safe_seek_range(self.element.seekable().as_ref()),
            url: with_url.then(|| self.element.current_src()),
        }
    }

    /// m3u8 streams whose last segment runs past the whole-second duration
    /// never fire `ended`; raise it ourselves on the next tick.
    fn check_hls_end(&mut self) {
        if self.video_ended || self.end_scheduled {
            return;
        }
        let duration = self.element.duration();
        if !duration.is_finite() || duration <= duration.floor() {
            return;
        }
        if self.element.current_time() < duration {
            return;
        }

        self.end_scheduled = true;
        log::debug!("video {}: reached {duration} without ended, raising it", self.id);
        let this = self.this.clone();
        let generation = self.end_generation;
        self.scheduler.defer(Box::new(move || {
            dispatch(&this, "synthetic ended", |inner| {
                inner.raise_scheduled_end(generation)
            })
        }));
    }

    fn raise_scheduled_end(&mut self, generation: u64) -> Option<Notification> {
        if generation != self.end_generation {
            log::debug!("video {}: stale synthetic ended dropped", self.id);
            return None;
        }
        self.raise_ended()
    }

    fn raise_ended(&mut self) -> Option<Notification> {
        if self.video_ended {
            log::debug!("video {}: duplicate ended suppressed", self.id);
            return None;
        }
        self.video_ended = true;
        self.state = PlaybackState::Ended;
        Some(Notification::Ended)
    }

    pub(crate) fn on_progress(&mut self) -> Option<Notification> {
        Some(Notification::Progress(self.playhead(true)))
    }

    pub(crate) fn on_error(&mut self) -> Option<Notification> {
        let code = self
            .element
            .error_code()
            .map_or(UNKNOWN_ERROR_CODE, i32::from);
        log::error!("video {}: native playback error {code}", self.id);
        Some(Notification::Error { code })
    }

    pub(crate) fn on_stalled(&mut self) -> Option<Notification> {
        if self.quirks.pause_on_initial_stall && self.element.current_time() == 0.0 {
            self.element.pause();
        }
        Some(Notification::Stalled {
            url: self.element.current_src(),
        })
    }

    pub(crate) fn on_can_play_through(&mut self) -> Option<Notification> {
        self.ready_to_play = true;
        Some(Notification::Buffered {
            url: self.element.current_src(),
        })
    }

    pub(crate) fn on_playing(&mut self) -> Option<Notification> {
        self.ready_to_play = true;
        self.state = PlaybackState::Playing;
        Some(Notification::Playing)
    }

    pub(crate) fn on_waiting(&mut self) -> Option<Notification> {
        self.video_ended = false;
        self.end_scheduled = false;
        self.end_generation += 1;
        if self.state == PlaybackState::Ended {
            self.state = PlaybackState::SourceSet;
        }
        Some(Notification::Waiting {
            url: self.element.current_src(),
        })
    }

    pub(crate) fn on_seeking(&mut self) -> Option<Notification> {
        Some(Notification::Seeking)
    }

    pub(crate) fn on_seeked(&mut self) -> Option<Notification> {
        Some(Notification::Seeked)
    }

    pub(crate) fn on_ended(&mut self) -> Option<Notification> {
        self.raise_ended()
    }

    pub(crate) fn on_duration_change(&mut self) -> Option<Notification> {
        Some(Notification::DurationChange(self.playhead(false)))
    }

    pub(crate) fn on_time_update(&mut self) -> Option<Notification> {
        if let Some(time) = self.pending_seek {
            self.seek(time);
        }
        let playhead = self.playhead(false);
        if self.source.is_hls() {
            self.check_hls_end();
        }
        Some(Notification::TimeUpdate(playhead))
    }

    pub(crate) fn on_play(&mut self) -> Option<Notification> {
        Some(Notification::Play {
            url: self.element.current_src(),
        })
    }

    pub(crate) fn on_pause(&mut self) -> Option<Notification> {
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Loading) {
            self.state = PlaybackState::Paused;
        }
        Some(Notification::Paused)
    }

    pub(crate) fn on_rate_change(&mut self) -> Option<Notification> {
        Some(Notification::RateChange)
    }

    pub(crate) fn on_volume_change(&mut self) -> Option<Notification> {
        Some(Notification::VolumeChange {
            volume: self.element.volume(),
        })
    }

    pub(crate) fn on_begin_fullscreen(&mut self) -> Option<Notification> {
        Some(Notification::FullscreenChanged {
            is_fullscreen: true,
        })
    }

    pub(crate) fn on_end_fullscreen(&mut self) -> Option<Notification> {
        Some(Notification::FullscreenChanged {
            is_fullscreen: false,
        })
    }
}

/// Drives one native `<video>` element on behalf of a controller.
///
/// Cloning yields another handle to the same element. The element is
/// released by [`VideoWrapper::destroy`], or when the last handle is dropped.
pub struct VideoWrapper<E: MediaElement + 'static>(pub(crate) Rc<RefCell<Internal<E>>>);

impl<E: MediaElement + 'static> Clone for VideoWrapper<E> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<E: MediaElement + 'static> Drop for VideoWrapper<E> {
    fn drop(&mut self) {
        // Only cleanup if this is the last reference
        if Rc::strong_count(&self.0) == 1 {
            match self.0.try_borrow_mut() {
                Ok(mut inner) => inner.destroy(),
                Err(_) => log::error!("video wrapper dropped while in use"),
            }
        }
    }
}

impl<E: MediaElement + 'static> VideoWrapper<E> {
    /// Wrap `element`. No events are subscribed and no source is set yet.
    pub fn new(
        id: impl Into<String>,
        element: E,
        platform: &Platform,
        scheduler: Rc<dyn Scheduler>,
        config: WrapperConfig,
    ) -> Self {
        let source = MediaSource::new("", &config.cache_buster_param, false);
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(Internal {
                this: this.clone(),
                id: id.into(),
                element,
                quirks: platform.quirks(),
                config,
                scheduler,
                controller: None,
                streams: SmallVec::new(),
                source,
                state: PlaybackState::Unloaded,
                loaded: false,
                ready_to_play: false,
                video_ended: false,
                end_scheduled: false,
                end_generation: 0,
                pending_seek: None,
                listeners: Vec::new(),
                pending_rewind: None,
                destroyed: false,
            })
        });
        Self(inner)
    }

    pub(crate) fn read(&self) -> Ref<'_, Internal<E>> {
        self.0.borrow()
    }

    pub(crate) fn write(&self) -> RefMut<'_, Internal<E>> {
        self.0.borrow_mut()
    }

    /// Run a command, then deliver its notification with the state released.
    fn command<R>(
        &self,
        name: &str,
        ignored: R,
        f: impl FnOnce(&mut Internal<E>) -> (R, Option<Notification>),
    ) -> R {
        let (result, controller, notification) = {
            let mut inner = self.write();
            if inner.destroyed {
                log::debug!("video {}: {name} ignored after destroy", inner.id);
                return ignored;
            }
            let (result, notification) = f(&mut *inner);
            (result, inner.controller.clone(), notification)
        };

        if let (Some(controller), Some(notification)) = (controller, notification) {
            controller.notify(notification);
        }
        result
    }

    pub fn set_controller(&self, controller: Rc<dyn Controller>) {
        self.write().controller = Some(controller);
    }

    pub fn set_streams(&self, streams: &[StreamFormat]) {
        self.write().streams = streams.iter().copied().collect();
    }

    /// Assign a new stream URL. Returns whether the source actually changed;
    /// URLs differing only by a cache-buster count as the same.
    pub fn set_video_url(&self, url: &str) -> bool {
        self.command("set_video_url", false, |inner| inner.set_video_url(url))
    }

    /// Load the current source. Without `rewind` this is a no-op once loaded.
    pub fn load(&self, rewind: bool) {
        self.command("load", (), |inner| (inner.load(rewind), None))
    }

    pub fn play(&self) {
        self.command("play", (), |inner| (inner.play(), None))
    }

    pub fn pause(&self) {
        self.command("pause", (), |inner| (inner.element.pause(), None))
    }

    /// Seek to `time` seconds. Returns `true` when applied now; otherwise the
    /// request is kept and retried on every `timeupdate`.
    pub fn seek(&self, time: f64) -> bool {
        self.command("seek", false, |inner| (inner.seek(time), None))
    }

    pub fn set_volume(&self, volume: f64) {
        self.command("set_volume", (), |inner| (inner.set_volume(volume), None))
    }

    pub fn apply_css(&self, style: &Style) {
        self.command("apply_css", (), |inner| (inner.element.apply_css(style), None))
    }

    pub fn subscribe_all_events(&self) {
        self.command("subscribe_all_events", (), |inner| {
            (inner.subscribe_all(), None)
        })
    }

    pub fn unsubscribe_all_events(&self) {
        self.command("unsubscribe_all_events", (), |inner| {
            (inner.unsubscribe_all(), None)
        })
    }

    /// Pause, clear the source, drop every listener and detach the element.
    /// Calling it again does nothing.
    pub fn destroy(&self) {
        self.write().destroy()
    }

    pub fn id(&self) -> String {
        self.read().id.clone()
    }

    /// The URL assigned to the element, cache-buster included.
    pub fn url(&self) -> String {
        self.read().source.url().to_owned()
    }

    pub fn is_hls(&self) -> bool {
        self.read().source.is_hls()
    }

    pub fn is_loaded(&self) -> bool {
        self.read().loaded
    }

    pub fn is_ready_to_play(&self) -> bool {
        self.read().ready_to_play
    }

    pub fn is_ended(&self) -> bool {
        self.read().video_ended
    }

    pub fn is_destroyed(&self) -> bool {
        self.read().destroyed
    }

    pub fn pending_seek(&self) -> Option<f64> {
        self.read().pending_seek
    }

    pub fn state(&self) -> PlaybackState {
        self.read().state
    }

    pub fn streams(&self) -> SmallVec<[StreamFormat; 2]> {
        self.read().streams.clone()
    }

    /// Listeners currently attached by this wrapper, one-shot ones included.
    pub fn subscription_count(&self) -> usize {
        let inner = self.read();
        inner.listeners.len() + usize::from(inner.pending_rewind.is_some())
    }

    pub fn element(&self) -> Ref<'_, E> {
        Ref::map(self.read(), |inner| &inner.element)
    }
}
