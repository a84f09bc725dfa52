#![allow(dead_code)]

use html5_video_wrapper::{
    CanPlayType, Container, Controller, ControllerEvent, Document, Error, EventSource, Listener,
    MediaElement, NativeEvent, Notification, Platform, Scheduler, Style, TimeRanges, VideoWrapper,
    WrapperConfig,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
struct ElementState {
    src: RefCell<String>,
    current_time: Cell<f64>,
    duration: Cell<f64>,
    volume: Cell<f64>,
    paused: Cell<bool>,
    seekable: RefCell<Option<TimeRanges>>,
    buffered: RefCell<Option<TimeRanges>>,
    error_code: Cell<Option<u16>>,
    rejects_position: Cell<bool>,
    rejects_volume: Cell<bool>,
    plays_hls: Cell<bool>,
    attributes: RefCell<BTreeMap<String, String>>,
    style: RefCell<Style>,
    listeners: RefCell<Vec<(NativeEvent, Listener)>>,
    calls: RefCell<Vec<&'static str>>,
    position_writes: RefCell<Vec<f64>>,
    removed: Cell<bool>,
}

/// Scripted `<video>` element. Clones share state, so a test keeps one
/// handle while the wrapper owns another.
#[derive(Clone)]
pub struct MockElement(Rc<ElementState>);

impl MockElement {
    pub fn new() -> Self {
        let state = ElementState {
            duration: Cell::new(f64::NAN),
            volume: Cell::new(1.0),
            paused: Cell::new(true),
            seekable: RefCell::new(Some(TimeRanges::new())),
            buffered: RefCell::new(Some(TimeRanges::new())),
            ..ElementState::default()
        };
        Self(Rc::new(state))
    }

    pub fn with_hls_support(self) -> Self {
        self.0.plays_hls.set(true);
        self
    }

    /// Deliver a native event to every listener registered for it.
    pub fn fire(&self, event: NativeEvent) {
        let listeners: Vec<Listener> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|(registered, _)| *registered == event)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    pub fn listeners_for(&self, event: NativeEvent) -> usize {
        self.0
            .listeners
            .borrow()
            .iter()
            .filter(|(registered, _)| *registered == event)
            .count()
    }

    pub fn set_time(&self, time: f64) {
        self.0.current_time.set(time);
    }

    pub fn set_duration(&self, duration: f64) {
        self.0.duration.set(duration);
    }

    pub fn set_seekable(&self, ranges: &[(f64, f64)]) {
        *self.0.seekable.borrow_mut() = Some(ranges.iter().copied().collect());
    }

    pub fn set_malformed_seekable(&self) {
        *self.0.seekable.borrow_mut() = None;
    }

    pub fn set_buffered(&self, ranges: &[(f64, f64)]) {
        *self.0.buffered.borrow_mut() = Some(ranges.iter().copied().collect());
    }

    pub fn set_error_code(&self, code: Option<u16>) {
        self.0.error_code.set(code);
    }

    pub fn reject_position_writes(&self, reject: bool) {
        self.0.rejects_position.set(reject);
    }

    pub fn reject_volume(&self, reject: bool) {
        self.0.rejects_volume.set(reject);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.calls.borrow().clone()
    }

    pub fn position_writes(&self) -> Vec<f64> {
        self.0.position_writes.borrow().clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    pub fn style(&self) -> Style {
        self.0.style.borrow().clone()
    }

    pub fn is_removed(&self) -> bool {
        self.0.removed.get()
    }

    pub fn same_as(&self, other: &MockElement) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl EventSource for MockElement {
    fn add_listener(&self, event: NativeEvent, listener: &Listener) {
        let mut listeners = self.0.listeners.borrow_mut();
        if !listeners
            .iter()
            .any(|(registered, existing)| *registered == event && Rc::ptr_eq(existing, listener))
        {
            listeners.push((event, Rc::clone(listener)));
        }
    }

    fn remove_listener(&self, event: NativeEvent, listener: &Listener) {
        self.0
            .listeners
            .borrow_mut()
            .retain(|(registered, existing)| !(*registered == event && Rc::ptr_eq(existing, listener)));
    }
}

impl MediaElement for MockElement {
    fn src(&self) -> String {
        self.0.src.borrow().clone()
    }

    fn set_src(&self, src: &str) {
        *self.0.src.borrow_mut() = src.to_owned();
    }

    fn current_src(&self) -> String {
        self.src()
    }

    fn current_time(&self) -> f64 {
        self.0.current_time.get()
    }

    fn set_current_time(&self, time: f64) -> Result<(), Error> {
        if self.0.rejects_position.get() {
            return Err(Error::element("currentTime", "InvalidStateError"));
        }
        self.0.current_time.set(time);
        self.0.position_writes.borrow_mut().push(time);
        Ok(())
    }

    fn duration(&self) -> f64 {
        self.0.duration.get()
    }

    fn volume(&self) -> f64 {
        self.0.volume.get()
    }

    fn set_volume(&self, volume: f64) -> Result<(), Error> {
        if self.0.rejects_volume.get() {
            return Err(Error::element("volume", "read-only on this device"));
        }
        self.0.volume.set(volume);
        Ok(())
    }

    fn paused(&self) -> bool {
        self.0.paused.get()
    }

    fn seekable(&self) -> Option<TimeRanges> {
        self.0.seekable.borrow().clone()
    }

    fn buffered(&self) -> Option<TimeRanges> {
        self.0.buffered.borrow().clone()
    }

    fn error_code(&self) -> Option<u16> {
        self.0.error_code.get()
    }

    fn play(&self) {
        self.0.paused.set(false);
        self.0.calls.borrow_mut().push("play");
    }

    fn pause(&self) {
        self.0.paused.set(true);
        self.0.calls.borrow_mut().push("pause");
    }

    fn load(&self) {
        self.0.calls.borrow_mut().push("load");
    }

    fn can_play_type(&self, mime_type: &str) -> CanPlayType {
        match mime_type {
            "video/mp4" => CanPlayType::Probably,
            html5_video_wrapper::element::HLS_MIME_TYPE if self.0.plays_hls.get() => {
                CanPlayType::Maybe
            }
            _ => CanPlayType::Empty,
        }
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), Error> {
        self.0
            .attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn apply_css(&self, style: &Style) {
        let mut current = self.0.style.borrow_mut();
        for (property, value) in style.iter() {
            current.set(property, value);
        }
    }

    fn remove(&self) {
        self.0.removed.set(true);
        self.0.calls.borrow_mut().push("remove");
    }
}

/// Hands out mock elements and remembers them.
#[derive(Default)]
pub struct MockDocument {
    pub plays_hls: bool,
    pub fail_creation: Cell<bool>,
    created: RefCell<Vec<MockElement>>,
}

impl MockDocument {
    pub fn new(plays_hls: bool) -> Self {
        Self {
            plays_hls,
            ..Self::default()
        }
    }

    pub fn created(&self) -> Vec<MockElement> {
        self.created.borrow().clone()
    }

    pub fn last_created(&self) -> Option<MockElement> {
        self.created.borrow().last().cloned()
    }
}

impl Document for MockDocument {
    type Element = MockElement;

    fn create_video_element(&self) -> Result<MockElement, Error> {
        if self.fail_creation.get() {
            return Err(Error::CreateElement("document is gone".into()));
        }
        let element = if self.plays_hls {
            MockElement::new().with_hls_support()
        } else {
            MockElement::new()
        };
        self.created.borrow_mut().push(element.clone());
        Ok(element)
    }
}

#[derive(Default)]
pub struct MockContainer {
    pub children: RefCell<Vec<MockElement>>,
    pub refuse: Cell<bool>,
}

impl Container<MockElement> for MockContainer {
    fn append_child(&self, element: &MockElement) -> Result<(), Error> {
        if self.refuse.get() {
            return Err(Error::Attach("container detached".into()));
        }
        self.children.borrow_mut().push(element.clone());
        Ok(())
    }
}

/// Next-tick queue drained explicitly by the test.
#[derive(Default)]
pub struct MockScheduler {
    queue: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl MockScheduler {
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn run_pending(&self) {
        loop {
            let task = self.queue.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }
}

impl Scheduler for MockScheduler {
    fn defer(&self, task: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push_back(task);
    }
}

/// Controller that records every notification.
#[derive(Default)]
pub struct Recorder {
    notifications: RefCell<Vec<Notification>>,
}

impl Recorder {
    pub fn all(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }

    pub fn events(&self) -> Vec<ControllerEvent> {
        self.notifications
            .borrow()
            .iter()
            .map(Notification::event)
            .collect()
    }

    pub fn count(&self, event: ControllerEvent) -> usize {
        self.events().into_iter().filter(|e| *e == event).count()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.notifications.borrow_mut().clear();
    }
}

impl Controller for Recorder {
    fn notify(&self, notification: Notification) {
        self.notifications.borrow_mut().push(notification);
    }
}

pub struct Harness {
    pub video: VideoWrapper<MockElement>,
    pub element: MockElement,
    pub controller: Rc<Recorder>,
    pub scheduler: Rc<MockScheduler>,
}

impl Harness {
    pub fn new(platform: Platform) -> Self {
        Self::with_config(platform, WrapperConfig::default())
    }

    /// A subscribed wrapper with a controller attached and no source.
    pub fn with_config(platform: Platform, config: WrapperConfig) -> Self {
        init_logging();
        let element = MockElement::new();
        let scheduler = Rc::new(MockScheduler::default());
        let controller = Rc::new(Recorder::default());
        let video = VideoWrapper::new("test", element.clone(), &platform, scheduler.clone(), config);
        video.set_controller(controller.clone());
        video.subscribe_all_events();
        Self {
            video,
            element,
            controller,
            scheduler,
        }
    }
}
