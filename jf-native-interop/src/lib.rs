//! Jellyfin native interop - optional native acceleration for media metadata parsing
//!
//! This crate decides, per process, whether ffprobe keyframe parsing and
//! probe normalization run in the `jf_native_abi` shared library or in the
//! managed reference implementations bundled here:
//! - Mode resolution (`required` / `prefer` / `disabled`)
//! - Native library location and loading
//! - Lazy, memoized availability probe and startup guard
//! - Foreign calls with guaranteed buffer release
//! - Native-first dispatch with managed fallback
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Capability Module            │
//! │  (native-first, managed fallback)    │
//! └─────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────┐
//! │          Runtime Module              │
//! │  (mode, availability, dispatch)      │
//! └─────────────────────────────────────┘
//!          │                  │
//!          ▼                  ▼
//! ┌─────────────────┐ ┌─────────────────┐
//! │   FFI Adapter   │ │  Managed Module │
//! │ (libloading,    │ │ (reference      │
//! │  buffer guard)  │ │  algorithms)    │
//! └─────────────────┘ └─────────────────┘
//!          ▲
//!          │
//! ┌─────────────────┐
//! │ Locator Module  │
//! │ (candidate      │
//! │  search)        │
//! └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use jf_native_interop::{capability, InteropConfig, NativeRuntime};
//!
//! jf_native_interop::init();
//! let runtime = NativeRuntime::start(&InteropConfig::from_env())?;
//! let parsed = capability::parse_keyframes(&*runtime, "packet,1.000000,K_\nformat,2.0")?;
//! assert_eq!(parsed.value.keyframe_ticks, vec![10_000_000]);
//! # Ok::<(), jf_native_interop::Error>(())
//! ```

pub mod capability;
pub mod config;
pub mod error;
pub mod ffi;
pub mod locator;
pub mod managed;
pub mod mode;
pub mod runtime;

// Re-export main types
pub use capability::{KeyframeParser, ParseSource, Parsed, ProbeNormalizer};
pub use config::InteropConfig;
pub use error::{Error, Result, UnavailableReason};
pub use ffi::{NativeBuffer, NativeLibrary, NativeSymbols};
pub use locator::Platform;
pub use managed::KeyframeData;
pub use mode::Mode;
pub use runtime::NativeRuntime;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging (call once at startup)
pub fn init() {
    // Initialize logging with info level by default if RUST_LOG is not set
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();

    log::info!("Jellyfin native interop {} initialized", VERSION);
}
