use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use std::fmt;

const CACHE_BUSTER_LEN: usize = 10;

/// Stream formats a factory can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    Mp4,
    M3u8,
}

impl StreamFormat {
    /// Classify a URL by substring, the same way the host player does.
    pub fn classify(url: &str) -> Self {
        match url.to_ascii_lowercase().find("m3u8") {
            Some(index) if index > 0 => StreamFormat::M3u8,
            _ => StreamFormat::Mp4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamFormat::Mp4 => "mp4",
            StreamFormat::M3u8 => "m3u8",
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The URL currently assigned to a media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    url: String,
    base_len: usize,
    format: StreamFormat,
}

impl MediaSource {
    /// Adopt `url`, appending a fresh `param=<token>` cache-buster when `bust`
    /// is set and the URL is not empty. The base URL is always taken with
    /// `param` stripped.
    pub fn new(url: &str, param: &str, bust: bool) -> Self {
        let base = strip_cache_buster(url, param);
        let url = if bust && !url.is_empty() {
            append_cache_buster(base, param)
        } else {
            url.to_owned()
        };

        Self {
            base_len: base.len(),
            format: StreamFormat::classify(&url),
            url,
        }
    }

    /// The URL as handed to the element, cache-buster included.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL without any cache-buster we appended.
    pub fn base_url(&self) -> &str {
        &self.url[..self.base_len]
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }

    pub fn is_hls(&self) -> bool {
        self.format == StreamFormat::M3u8
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }
}

/// Drops a trailing `?param=value` or `&param=value` from `url`.
pub fn strip_cache_buster<'a>(url: &'a str, param: &str) -> &'a str {
    let Some(index) = url.rfind(['?', '&']) else {
        return url;
    };
    let tail = &url[index + 1..];
    match tail
        .strip_prefix(param)
        .and_then(|rest| rest.strip_prefix('='))
    {
        Some(value) if !value.is_empty() => &url[..index],
        _ => url,
    }
}

fn append_cache_buster(url: &str, param: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CACHE_BUSTER_LEN)
        .map(char::from)
        .collect();
    format!("{url}{separator}{param}={token}")
}
