use crate::Error;
use crate::config::WrapperConfig;
use crate::element::{Container, Document, HLS_MIME_TYPE, MediaElement, Style};
use crate::notify::{Controller, Scheduler};
use crate::platform::Platform;
use crate::source::StreamFormat;
use crate::video::VideoWrapper;
use smallvec::{SmallVec, smallvec};
use std::rc::Rc;

/// Name the host registers this backend under.
pub const PLUGIN_NAME: &str = "ooyalaHtml5VideoTech";

/// Entry point the controller uses to build wrappers.
pub struct VideoFactory<D: Document> {
    document: D,
    platform: Platform,
    scheduler: Rc<dyn Scheduler>,
    config: WrapperConfig,
    ready: bool,
    streams: SmallVec<[StreamFormat; 2]>,
}

impl<D: Document> VideoFactory<D> {
    /// Probe native format support once; the answer never changes afterwards.
    pub fn new(document: D, platform: Platform, scheduler: Rc<dyn Scheduler>) -> Result<Self, Error> {
        let streams = detect_stream_support(&document)?;
        log::info!(
            "{PLUGIN_NAME}: ready on {platform:?}, streams {:?}",
            streams.as_slice()
        );

        Ok(Self {
            document,
            platform,
            scheduler,
            config: WrapperConfig::default(),
            ready: true,
            streams,
        })
    }

    /// Tunables handed to every wrapper created from now on.
    pub fn with_config(mut self, config: WrapperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn streams(&self) -> &[StreamFormat] {
        &self.streams
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Build a wrapper around a fresh `<video>` element appended to
    /// `container`. Returns `Ok(None)` once the factory is destroyed.
    pub fn create<C>(
        &self,
        container: &C,
        stream_url: &str,
        id: &str,
        controller: Rc<dyn Controller>,
        style: &Style,
    ) -> Result<Option<VideoWrapper<D::Element>>, Error>
    where
        C: Container<D::Element>,
    {
        if !self.ready {
            log::debug!("{PLUGIN_NAME}: create({id}) after destroy");
            return Ok(None);
        }

        let element = self.document.create_video_element()?;
        element.set_attribute("class", "video")?;
        element.set_attribute("preload", "none")?;
        element.set_attribute("crossorigin", "anonymous")?;
        if self.platform.quirks().airplay {
            element.set_attribute("x-webkit-airplay", "allow")?;
        }
        element.apply_css(style);

        let wrapper = VideoWrapper::new(
            id,
            element,
            &self.platform,
            Rc::clone(&self.scheduler),
            self.config.clone(),
        );
        wrapper.set_streams(&self.streams);
        wrapper.set_controller(controller);
        wrapper.set_video_url(stream_url);
        wrapper.subscribe_all_events();
        // The element borrow must end before `wrapper` can drop on error.
        let attached = container.append_child(&wrapper.element());
        attached?;

        log::info!("{PLUGIN_NAME}: created video {id}");
        Ok(Some(wrapper))
    }

    /// Make the factory permanently inert.
    pub fn destroy(&mut self) {
        self.ready = false;
        self.streams.clear();
        log::info!("{PLUGIN_NAME}: destroyed");
    }
}

fn detect_stream_support<D: Document>(document: &D) -> Result<SmallVec<[StreamFormat; 2]>, Error> {
    let probe = document.create_video_element()?;
    let streams = if probe.can_play_type(HLS_MIME_TYPE).is_supported() {
        smallvec![StreamFormat::M3u8, StreamFormat::Mp4]
    } else {
        smallvec![StreamFormat::Mp4]
    };
    Ok(streams)
}
