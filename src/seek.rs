//! Seek-safety math. Pure functions over element readings so the rules can be
//! checked without an element.

use crate::config::WrapperConfig;
use crate::element::TimeRanges;
use crate::notify::SeekRange;
use crate::platform::Quirks;

/// Live and not-yet-known durations are reported as `Infinity` or `NaN`;
/// downstream duration math expects `0` for both.
pub fn normalize_duration(duration: f64) -> f64 {
    if duration.is_finite() { duration } else { 0.0 }
}

/// Seekable window spanning every reported range, or `{0, 0}` when the
/// element reports nothing usable.
pub fn safe_seek_range(seekable: Option<&TimeRanges>) -> SeekRange {
    let Some(ranges) = seekable else {
        return SeekRange::default();
    };
    match (ranges.start(0), ranges.length().checked_sub(1).and_then(|last| ranges.end(last))) {
        (Some(start), Some(end)) => SeekRange { start, end },
        _ => SeekRange::default(),
    }
}

/// End of the buffered data, `0` when nothing is buffered.
pub fn buffered_end(buffered: Option<&TimeRanges>) -> f64 {
    buffered
        .and_then(|ranges| ranges.length().checked_sub(1).and_then(|last| ranges.end(last)))
        .unwrap_or(0.0)
}

/// Adjust a requested position so the element will accept it.
pub fn safe_seek_time(time: f64, duration: f64, quirks: &Quirks, config: &WrapperConfig) -> f64 {
    if duration - time < config.seek_to_end_limit {
        return duration;
    }

    // f64::min/max ignore NaN, so an unknown duration leaves `time` alone.
    let mut safe = time.min(duration - config.end_of_stream_margin).max(0.0);
    if quirks.zero_seek_floor && safe < config.min_seek_time {
        safe = config.min_seek_time;
    }
    safe
}

/// The position to apply now, or `None` when the request must wait.
pub fn resolve_seek(
    time: f64,
    duration: f64,
    range: SeekRange,
    quirks: &Quirks,
    config: &WrapperConfig,
) -> Option<f64> {
    if range.is_unknown() {
        return None;
    }
    let safe = safe_seek_time(time, duration, quirks, config);
    range.contains(safe).then_some(safe)
}
