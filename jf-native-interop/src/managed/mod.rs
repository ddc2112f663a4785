//! Managed reference implementations of both capabilities
//!
//! These are the behavior the native library is graded against.

pub mod keyframes;
pub mod probe;

pub use keyframes::{parse_keyframe_transcript, seconds_to_ticks, KeyframeData};
pub use probe::{normalize_probe_document, normalize_probe_json};
