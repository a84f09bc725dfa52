/// Tunables shared by every wrapper a factory creates.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapperConfig {
    /// Seeks landing closer than this to the end go to the end exactly.
    pub seek_to_end_limit: f64,
    /// The exact end position is not always seekable; stay this far before it.
    pub end_of_stream_margin: f64,
    /// Lowest position used on platforms that break when seeking to zero.
    pub min_seek_time: f64,
    /// Query parameter carrying the cache-buster token.
    pub cache_buster_param: String,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            seek_to_end_limit: 3.0,
            end_of_stream_margin: 0.01,
            min_seek_time: 0.1,
            cache_buster_param: "_".to_owned(),
        }
    }
}

impl WrapperConfig {
    pub fn seek_to_end_limit(mut self, seconds: f64) -> Self {
        self.seek_to_end_limit = seconds;
        self
    }

    pub fn end_of_stream_margin(mut self, seconds: f64) -> Self {
        self.end_of_stream_margin = seconds;
        self
    }

    pub fn min_seek_time(mut self, seconds: f64) -> Self {
        self.min_seek_time = seconds;
        self
    }

    pub fn cache_buster_param(mut self, param: impl Into<String>) -> Self {
        self.cache_buster_param = param.into();
        self
    }
}
