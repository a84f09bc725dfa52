//! Native event subscriptions.
//!
//! Every subscribed native event maps to exactly one handler on [`Internal`].
//! Listeners only hold a weak reference to the wrapper state; the
//! notification a handler produces is delivered after the state is released.

use crate::element::{Listener, MediaElement, NativeEvent};
use crate::notify::Notification;
use crate::video::Internal;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub(crate) type Handler<E> = fn(&mut Internal<E>) -> Option<Notification>;

/// `suspend`, `abort`, `emptied`, `loadstart`, `loadedmetadata`,
/// `loadeddata`, `canplay` and `resize` are not forwarded.
pub(crate) fn handler_table<E: MediaElement + 'static>() -> [(NativeEvent, Handler<E>); 17] {
    [
        (NativeEvent::Progress, Internal::on_progress),
        (NativeEvent::Error, Internal::on_error),
        (NativeEvent::Stalled, Internal::on_stalled),
        (NativeEvent::CanPlayThrough, Internal::on_can_play_through),
        (NativeEvent::Playing, Internal::on_playing),
        (NativeEvent::Waiting, Internal::on_waiting),
        (NativeEvent::Seeking, Internal::on_seeking),
        (NativeEvent::Seeked, Internal::on_seeked),
        (NativeEvent::Ended, Internal::on_ended),
        (NativeEvent::DurationChange, Internal::on_duration_change),
        (NativeEvent::TimeUpdate, Internal::on_time_update),
        (NativeEvent::Play, Internal::on_play),
        (NativeEvent::Pause, Internal::on_pause),
        (NativeEvent::RateChange, Internal::on_rate_change),
        (NativeEvent::VolumeChange, Internal::on_volume_change),
        (NativeEvent::WebkitBeginFullscreen, Internal::on_begin_fullscreen),
        (NativeEvent::WebkitEndFullscreen, Internal::on_end_fullscreen),
    ]
}

/// Run `f` against the live wrapper state and forward its notification.
pub(crate) fn dispatch<E, F>(this: &Weak<RefCell<Internal<E>>>, origin: impl fmt::Display, f: F)
where
    E: MediaElement + 'static,
    F: FnOnce(&mut Internal<E>) -> Option<Notification>,
{
    let Some(internal) = this.upgrade() else {
        return;
    };

    let (controller, notification) = {
        let Ok(mut inner) = internal.try_borrow_mut() else {
            log::warn!("dropping reentrant `{origin}` delivery");
            return;
        };
        if inner.destroyed {
            return;
        }
        let notification = f(&mut *inner);
        (inner.controller.clone(), notification)
    };

    match (controller, notification) {
        (Some(controller), Some(notification)) => controller.notify(notification),
        (None, Some(notification)) => {
            log::debug!("no controller attached, dropping {}", notification.event())
        }
        _ => {}
    }
}

impl<E: MediaElement + 'static> Internal<E> {
    /// Attach the whole table. A second call is a no-op.
    pub(crate) fn subscribe_all(&mut self) {
        if !self.listeners.is_empty() {
            return;
        }

        for (event, handler) in handler_table::<E>() {
            let this = self.this.clone();
            let listener: Listener = Rc::new(move |fired: NativeEvent| dispatch(&this, fired, handler));
            self.element.add_listener(event, &listener);
            self.listeners.push((event, listener));
        }
        log::debug!("video {}: subscribed {} native events", self.id, self.listeners.len());
    }

    /// Detach the table and any pending one-shot listener.
    pub(crate) fn unsubscribe_all(&mut self) {
        for (event, listener) in self.listeners.drain(..) {
            self.element.remove_listener(event, &listener);
        }
        self.cancel_rewind();
    }

    /// Reset the position on the next `durationchange`, then detach.
    pub(crate) fn schedule_rewind(&mut self) {
        self.cancel_rewind();

        let this = self.this.clone();
        let listener: Listener = Rc::new(move |_: NativeEvent| {
            dispatch(&this, "deferred rewind", |inner| {
                inner.finish_rewind();
                None
            })
        });
        self.element.add_listener(NativeEvent::DurationChange, &listener);
        self.pending_rewind = Some(listener);
    }

    fn finish_rewind(&mut self) {
        let Some(listener) = self.pending_rewind.take() else {
            return;
        };
        self.element.remove_listener(NativeEvent::DurationChange, &listener);
        self.rewind_now();
    }

    pub(crate) fn cancel_rewind(&mut self) {
        if let Some(listener) = self.pending_rewind.take() {
            self.element.remove_listener(NativeEvent::DurationChange, &listener);
        }
    }
}
