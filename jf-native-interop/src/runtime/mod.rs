//! Process interop context
//!
//! [`NativeRuntime`] holds everything that is decided once per process: the
//! mode, the loaded library, and the memoized availability probe. Build it
//! once at startup (see [`NativeRuntime::start`]) and share it as
//! `Arc<NativeRuntime>`.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::{InteropConfig, LIBRARY_PATH_ENV};
use crate::error::{Error, Result, UnavailableReason};
use crate::ffi::NativeLibrary;
use crate::locator;
use crate::managed::KeyframeData;
use crate::mode::Mode;

/// Interop context: mode, library handle, and availability
#[derive(Debug)]
pub struct NativeRuntime {
    /// Policy mode, fixed at construction
    mode: Mode,

    /// Library loaded by the locator, if any
    library: Option<NativeLibrary>,

    /// Health probe result, computed on first access
    availability: OnceCell<bool>,
}

impl NativeRuntime {
    /// Build the context from configuration.
    ///
    /// Library resolution runs here, once. Nothing is probed yet.
    pub fn new(config: &InteropConfig) -> Self {
        let library = match config.mode {
            // Disabled never touches the native side
            Mode::Disabled => None,
            _ => locator::load(config),
        };

        Self::with_library(config.mode, library)
    }

    /// Build the context around an already resolved library
    pub fn with_library(mode: Mode, library: Option<NativeLibrary>) -> Self {
        Self {
            mode,
            library,
            availability: OnceCell::new(),
        }
    }

    /// Build the context and run the startup guard.
    ///
    /// Call once during process startup. Fails when the mode is `Required`
    /// and the library is not operational.
    pub fn start(config: &InteropConfig) -> Result<Arc<Self>> {
        let runtime = Self::new(config);
        runtime.ensure_availability()?;
        Ok(Arc::new(runtime))
    }

    /// Policy mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Loaded library, if any
    pub fn library(&self) -> Option<&NativeLibrary> {
        self.library.as_ref()
    }

    /// Whether the native library is operational.
    ///
    /// Probed once, then memoized. A library that becomes loadable later is
    /// not picked up.
    pub fn is_available(&self) -> bool {
        *self.availability.get_or_init(|| {
            let available = match self.library {
                Some(ref library) => library.healthcheck(),
                None => false,
            };
            log::info!(
                "Native library {} (mode={})",
                if available { "available" } else { "unavailable" },
                self.mode
            );
            available
        })
    }

    /// Startup guard: `Required` with an unavailable library is fatal
    pub fn ensure_availability(&self) -> Result<()> {
        match self.mode {
            Mode::Required => {
                if !self.is_available() {
                    log::error!(
                        "{} is required but could not be loaded; set {}",
                        locator::LIBRARY_BASE_NAME,
                        LIBRARY_PATH_ENV
                    );
                    return Err(Error::Configuration);
                }
            }
            Mode::Prefer => {
                if !self.is_available() {
                    log::warn!("Native library unavailable, managed parsers will be used");
                }
            }
            Mode::Disabled => {
                log::info!("Native interop disabled");
            }
        }
        Ok(())
    }

    /// Normalize an ffprobe JSON document on the native side
    pub fn try_normalize(&self, ffprobe_json: &[u8]) -> Result<Vec<u8>> {
        let library = self.native()?;
        library.normalize(ffprobe_json).into_payload()
    }

    /// Parse an ffprobe keyframe transcript on the native side
    pub fn try_parse(&self, transcript: &str) -> Result<KeyframeData> {
        let library = self.native()?;
        let payload = library
            .parse_keyframe_transcript(transcript.as_bytes())
            .into_payload()?;

        serde_json::from_slice(&payload).map_err(|e| Error::Payload(e.to_string()))
    }

    /// Dispatch gate shared by both capabilities.
    ///
    /// `Disabled` is checked before availability so it never triggers a probe.
    fn native(&self) -> Result<&NativeLibrary> {
        if self.mode == Mode::Disabled {
            return Err(Error::Unavailable(UnavailableReason::ModeDisabled));
        }

        if !self.is_available() {
            return Err(Error::Unavailable(UnavailableReason::LibraryUnavailable));
        }

        self.library
            .as_ref()
            .ok_or(Error::Unavailable(UnavailableReason::LibraryUnavailable))
    }
}
