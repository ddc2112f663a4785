//! Aspect-ratio normalization of ffprobe JSON output

use serde_json::Value;

use crate::error::Result;

/// Stream fields carrying an aspect ratio
pub const ASPECT_RATIO_FIELDS: [&str; 2] = ["display_aspect_ratio", "sample_aspect_ratio"];

/// ffprobe's spelling of an unknown aspect ratio
pub const UNSET_ASPECT_RATIO: &str = "0:1";

/// Whether an aspect-ratio value means "unset"
pub fn is_unset_aspect_ratio(value: &str) -> bool {
    value.eq_ignore_ascii_case(UNSET_ASPECT_RATIO)
}

/// Rewrite every stream's unset aspect ratios to `""` in place
pub fn normalize_probe_document(document: &mut Value) {
    let streams = document
        .get_mut("streams")
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten();

    for stream in streams {
        for field in ASPECT_RATIO_FIELDS {
            normalize_aspect_field(stream, field);
        }
    }
}

/// Normalize a serialized ffprobe document.
///
/// Key order and number text are preserved.
pub fn normalize_probe_json(input: &[u8]) -> Result<Vec<u8>> {
    let mut document: Value = serde_json::from_slice(input)?;
    normalize_probe_document(&mut document);
    Ok(serde_json::to_vec(&document)?)
}

fn normalize_aspect_field(stream: &mut Value, field: &str) {
    let Some(value) = stream.get_mut(field) else {
        return;
    };

    if value.as_str().is_some_and(is_unset_aspect_ratio) {
        *value = Value::String(String::new());
    }
}
