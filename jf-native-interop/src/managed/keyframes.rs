//! Keyframe and duration extraction from an ffprobe CSV transcript
//!
//! The transcript comes from
//! `ffprobe -show_entries format=duration -show_entries stream=duration
//! -show_entries packet=pts_time,flags -select_streams v -of csv`, e.g.:
//!
//! ```text
//! packet,7169.079000,K_
//! stream,7170.500000
//! format,7170.512000
//! ```

use serde::{Deserialize, Serialize};

/// 100-nanosecond ticks per second
pub const TICKS_PER_SECOND: f64 = 10_000_000.0;

/// Packet flag prefix marking a keyframe
pub const KEYFRAME_FLAG: &str = "K_";

/// Parsed keyframe data
///
/// Also the JSON payload returned by the native parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyframeData {
    /// Total duration in ticks
    pub total_duration_ticks: i64,

    /// Keyframe offsets in ticks, in transcript order
    pub keyframe_ticks: Vec<i64>,
}

impl KeyframeData {
    /// Create keyframe data
    pub fn new(total_duration_ticks: i64, keyframe_ticks: Vec<i64>) -> Self {
        Self {
            total_duration_ticks,
            keyframe_ticks,
        }
    }
}

/// Convert seconds to ticks, rounding half away from zero.
///
/// Computed directly on the float; a millisecond-precision intermediate
/// would drop sub-millisecond offsets.
pub fn seconds_to_ticks(seconds: f64) -> i64 {
    (seconds * TICKS_PER_SECOND).round() as i64
}

/// Parse an unsigned decimal seconds value (`12`, `12.5`, `.5`, `12.`).
///
/// Signs, exponents, whitespace and `N/A` are rejected.
pub fn parse_decimal_seconds(value: &str) -> Option<f64> {
    let mut digits = 0usize;
    let mut points = 0usize;

    for c in value.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return None,
        }
    }

    if digits == 0 || points > 1 {
        return None;
    }

    value.parse::<f64>().ok()
}

/// Parse a transcript into total duration and keyframe offsets.
///
/// The stream duration is preferred over the format duration when positive.
pub fn parse_keyframe_transcript(transcript: &str) -> KeyframeData {
    let mut keyframes = Vec::new();
    let mut stream_duration = 0f64;
    let mut format_duration = 0f64;

    for line in transcript.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((line_type, rest)) = line.split_once(',') else {
            continue;
        };

        if line_type.eq_ignore_ascii_case("packet") {
            // packet,<pts_time>,<flags>
            let (pts_time, flags) = rest.split_once(',').unwrap_or((rest, ""));
            if flags.starts_with(KEYFRAME_FLAG) {
                if let Some(seconds) = parse_decimal_seconds(pts_time) {
                    keyframes.push(seconds_to_ticks(seconds));
                }
            }
        } else if line_type.eq_ignore_ascii_case("stream") {
            if let Some(duration) = parse_decimal_seconds(rest) {
                stream_duration = duration;
            }
        } else if line_type.eq_ignore_ascii_case("format") {
            if let Some(duration) = parse_decimal_seconds(rest) {
                format_duration = duration;
            }
        }
    }

    let duration = if stream_duration > 0f64 {
        stream_duration
    } else {
        format_duration
    };

    KeyframeData {
        total_duration_ticks: seconds_to_ticks(duration),
        keyframe_ticks: keyframes,
    }
}
