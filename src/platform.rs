//! Host platform identity and the table of known native-element defects.
//!
//! Nothing here is a versioned contract: the browser never tells us which bugs
//! it has, so the wrapper keys each workaround off the platform it is running
//! on. [`Platform`] is injected into every wrapper so tests can pretend to be
//! any device.

use serde::{Deserialize, Serialize};

/// The platform facts the wrapper cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub is_ios: bool,
    pub is_ipad: bool,
    pub is_chrome: bool,
    pub ios_major_version: Option<u32>,
}

impl Platform {
    /// A desktop browser without any known quirks.
    pub fn generic() -> Self {
        Self::default()
    }

    pub fn chrome() -> Self {
        Self {
            is_chrome: true,
            ..Self::default()
        }
    }

    pub fn ipad(ios_major_version: u32) -> Self {
        Self {
            is_ios: true,
            is_ipad: true,
            is_chrome: false,
            ios_major_version: Some(ios_major_version),
        }
    }

    pub fn iphone(ios_major_version: u32) -> Self {
        Self {
            is_ios: true,
            is_ipad: false,
            is_chrome: false,
            ios_major_version: Some(ios_major_version),
        }
    }

    /// Sniff the platform from `navigator.userAgent` and `navigator.platform`.
    pub fn detect(user_agent: &str, platform: &str) -> Self {
        let is_ipad = platform.contains("iPad") || user_agent.contains("iPad");
        let is_ios = is_ipad
            || platform.contains("iPhone")
            || platform.contains("iPod")
            || user_agent.contains("iPhone")
            || user_agent.contains("iPod");
        let ios_major_version = if is_ios {
            ios_major_version(user_agent)
        } else {
            None
        };

        Self {
            is_ios,
            is_ipad,
            is_chrome: user_agent.contains("Chrome"),
            ios_major_version,
        }
    }

    pub fn quirks(&self) -> Quirks {
        Quirks::from(self)
    }
}

/// Extracts `8` from `... CPU OS 8_4 like Mac OS X ...` or
/// `... CPU iPhone OS 12_1 like ...`.
fn ios_major_version(user_agent: &str) -> Option<u32> {
    let (_, rest) = user_agent.split_once(" OS ")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Workarounds enabled for a platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// Chrome serves a stale response for a re-requested media URL.
    pub cache_busting: bool,
    /// iOS 8 ignores a position reset until the duration is known.
    pub deferred_rewind: bool,
    /// iPad breaks the video when seeking exactly to zero.
    pub zero_seek_floor: bool,
    /// iPad reports a spurious stall at position zero and loops buffering.
    pub pause_on_initial_stall: bool,
    /// Apple mobile devices only offer airplay on opted-in elements.
    pub airplay: bool,
}

impl From<&Platform> for Quirks {
    fn from(platform: &Platform) -> Self {
        Self {
            cache_busting: platform.is_chrome,
            deferred_rewind: platform.is_ios && platform.ios_major_version == Some(8),
            zero_seek_floor: platform.is_ipad,
            pause_on_initial_stall: platform.is_ipad,
            airplay: platform.is_ios,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPAD_IOS8: &str = "Mozilla/5.0 (iPad; CPU OS 8_4 like Mac OS X) AppleWebKit/600.1.4 \
         (KHTML, like Gecko) Version/8.0 Mobile/12H143 Safari/600.1.4";
    const IPHONE_IOS12: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 12_1 like Mac OS X) \
         AppleWebKit/605.1.15 (KHTML, like Gecko) Version/12.0 Mobile/15E148 Safari/604.1";
    const DESKTOP_CHROME: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    #[test]
    fn detects_ipad_and_version() {
        let platform = Platform::detect(IPAD_IOS8, "iPad");
        assert_eq!(platform, Platform::ipad(8));

        let quirks = platform.quirks();
        assert!(quirks.deferred_rewind);
        assert!(quirks.zero_seek_floor);
        assert!(quirks.airplay);
        assert!(!quirks.cache_busting);
    }

    #[test]
    fn detects_iphone() {
        let platform = Platform::detect(IPHONE_IOS12, "iPhone");
        assert!(platform.is_ios);
        assert!(!platform.is_ipad);
        assert_eq!(platform.ios_major_version, Some(12));
        assert!(!platform.quirks().deferred_rewind);
    }

    #[test]
    fn detects_chrome() {
        let platform = Platform::detect(DESKTOP_CHROME, "Linux x86_64");
        assert_eq!(platform, Platform::chrome());
        assert!(platform.quirks().cache_busting);
        assert!(!platform.quirks().airplay);
    }

    #[test]
    fn generic_has_no_quirks() {
        assert_eq!(Platform::generic().quirks(), Quirks::default());
    }
}
