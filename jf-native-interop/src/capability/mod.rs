//! Native-first capability dispatch with managed fallback
//!
//! The native attempt and the managed fallback are composed explicitly; the
//! result records which path produced the value.

use crate::error::{Error, Result};
use crate::managed::{self, KeyframeData};
use crate::mode::Mode;
use crate::runtime::NativeRuntime;

/// Native keyframe transcript parser
pub trait KeyframeParser {
    /// Policy mode
    fn mode(&self) -> Mode;

    /// Parse natively; fails when the native path is not usable
    fn try_parse(&self, transcript: &str) -> Result<KeyframeData>;
}

/// Native ffprobe JSON normalizer
pub trait ProbeNormalizer {
    /// Policy mode
    fn mode(&self) -> Mode;

    /// Normalize natively; fails when the native path is not usable
    fn try_normalize(&self, ffprobe_json: &[u8]) -> Result<Vec<u8>>;
}

impl KeyframeParser for NativeRuntime {
    fn mode(&self) -> Mode {
        NativeRuntime::mode(self)
    }

    fn try_parse(&self, transcript: &str) -> Result<KeyframeData> {
        NativeRuntime::try_parse(self, transcript)
    }
}

impl ProbeNormalizer for NativeRuntime {
    fn mode(&self) -> Mode {
        NativeRuntime::mode(self)
    }

    fn try_normalize(&self, ffprobe_json: &[u8]) -> Result<Vec<u8>> {
        NativeRuntime::try_normalize(self, ffprobe_json)
    }
}

/// Which implementation produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSource {
    Native,
    Managed,
}

/// A value tagged with the path that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    pub value: T,
    pub source: ParseSource,
}

impl<T> Parsed<T> {
    fn native(value: T) -> Self {
        Self {
            value,
            source: ParseSource::Native,
        }
    }

    fn managed(value: T) -> Self {
        Self {
            value,
            source: ParseSource::Managed,
        }
    }

    /// Drop the tag
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Parse a keyframe transcript, natively when the mode allows it.
///
/// In `Required` mode a native failure is returned as
/// [`Error::NativeRequired`] instead of degrading to the managed parser.
pub fn parse_keyframes<P>(parser: &P, transcript: &str) -> Result<Parsed<KeyframeData>>
where
    P: KeyframeParser + ?Sized,
{
    let mode = parser.mode();
    if mode != Mode::Disabled {
        match parser.try_parse(transcript) {
            Ok(data) => return Ok(Parsed::native(data)),
            Err(e) => native_failed(mode, "keyframe parsing", e)?,
        }
    }

    Ok(Parsed::managed(managed::parse_keyframe_transcript(transcript)))
}

/// Normalize an ffprobe JSON document, natively when the mode allows it
pub fn normalize_probe<N>(normalizer: &N, ffprobe_json: &[u8]) -> Result<Parsed<Vec<u8>>>
where
    N: ProbeNormalizer + ?Sized,
{
    let mode = normalizer.mode();
    if mode != Mode::Disabled {
        match normalizer.try_normalize(ffprobe_json) {
            Ok(json) => return Ok(Parsed::native(json)),
            Err(e) => native_failed(mode, "probe normalization", e)?,
        }
    }

    managed::normalize_probe_json(ffprobe_json).map(Parsed::managed)
}

fn native_failed(mode: Mode, capability: &'static str, error: Error) -> Result<()> {
    if !mode.allows_fallback() {
        return Err(Error::NativeRequired {
            capability,
            reason: error.to_string(),
        });
    }

    log::warn!("Native {} failed ({}), using managed implementation", capability, error);
    Ok(())
}
