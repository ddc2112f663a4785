//! Foreign call adapter for the `jf_native_abi` library
//!
//! Every buffer the native side hands back is wrapped in a [`ForeignBuffer`]
//! the moment the call returns. The guard releases it through the library's
//! own free entry point when dropped, so both buffers of a call are reclaimed
//! on every exit path, including unwinding.

use std::marker::PhantomData;
use std::path::Path;
use std::ptr;

use crate::error::{Error, Result, EXIT_SUCCESS};

#[cfg(test)]
pub(crate) mod fake;

/// Health probe return value of an operational library
pub const HEALTHCHECK_OK: i32 = 1;

/// Message used when a failing call leaves its error buffer empty
pub const GENERIC_FAILURE_MESSAGE: &str = "native call failed";

pub const HEALTHCHECK_SYMBOL: &[u8] = b"jf_native_healthcheck\0";
pub const FREE_BUFFER_SYMBOL: &[u8] = b"jf_native_free_buffer\0";
pub const NORMALIZE_SYMBOL: &[u8] = b"jf_native_normalize_ffprobe_json\0";
pub const PARSE_KEYFRAMES_SYMBOL: &[u8] = b"jf_native_parse_keyframe_csv\0";

// =============================================================================
// ABI Types
// =============================================================================

/// Buffer handed across the boundary: (pointer, length)
///
/// A null pointer or zero length is the empty buffer and owns nothing.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NativeBuffer {
    pub ptr: *mut u8,
    pub len: usize,
}

impl NativeBuffer {
    /// The empty buffer
    pub const fn empty() -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
        }
    }

    /// Whether the buffer owns nothing
    pub fn is_empty(&self) -> bool {
        self.ptr.is_null() || self.len == 0
    }

    /// Hand ownership of `bytes` to the other side of the boundary.
    ///
    /// Empty input produces the empty buffer. Anything else must come back
    /// through [`NativeBuffer::reclaim`].
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }

        let len = bytes.len();
        let ptr = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
        Self { ptr, len }
    }

    /// Free a buffer produced by [`NativeBuffer::from_vec`].
    ///
    /// Does nothing for null pointers or zero length.
    ///
    /// # Safety
    /// `ptr`/`len` must come from `from_vec` in this same binary and must not
    /// have been reclaimed before.
    pub unsafe fn reclaim(ptr: *mut u8, len: usize) {
        if !ptr.is_null() && len > 0 {
            unsafe {
                drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)));
            }
        }
    }
}

pub type HealthcheckFn = unsafe extern "C" fn() -> i32;
pub type FreeBufferFn = unsafe extern "C" fn(*mut u8, usize);
pub type BufferCallFn =
    unsafe extern "C" fn(*const u8, usize, *mut NativeBuffer, *mut NativeBuffer) -> i32;

/// Resolved entry points of the native library
#[derive(Debug, Clone, Copy)]
pub struct NativeSymbols {
    pub healthcheck: HealthcheckFn,
    pub free_buffer: FreeBufferFn,
    pub normalize_ffprobe_json: BufferCallFn,
    pub parse_keyframe_csv: BufferCallFn,
}

impl NativeSymbols {
    /// Resolve all four entry points from an opened library.
    ///
    /// # Safety
    /// The symbols must have the signatures declared by the ABI, and the
    /// returned pointers must not outlive `library`.
    unsafe fn resolve(library: &libloading::Library) -> std::result::Result<Self, libloading::Error> {
        let healthcheck: libloading::Symbol<'_, HealthcheckFn> =
            unsafe { library.get(HEALTHCHECK_SYMBOL) }?;
        let free_buffer: libloading::Symbol<'_, FreeBufferFn> =
            unsafe { library.get(FREE_BUFFER_SYMBOL) }?;
        let normalize: libloading::Symbol<'_, BufferCallFn> =
            unsafe { library.get(NORMALIZE_SYMBOL) }?;
        let parse: libloading::Symbol<'_, BufferCallFn> =
            unsafe { library.get(PARSE_KEYFRAMES_SYMBOL) }?;

        Ok(Self {
            healthcheck: *healthcheck,
            free_buffer: *free_buffer,
            normalize_ffprobe_json: *normalize,
            parse_keyframe_csv: *parse,
        })
    }
}

// =============================================================================
// Loaded Library
// =============================================================================

/// A native backend: resolved symbols plus the library keeping them alive
pub struct NativeLibrary {
    symbols: NativeSymbols,
    origin: String,
    _library: Option<libloading::Library>,
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("origin", &self.origin)
            .field("dynamic", &self._library.is_some())
            .finish()
    }
}

impl NativeLibrary {
    /// Open a shared library and resolve every entry point.
    ///
    /// A library missing any entry point is rejected.
    pub fn open(path: &Path) -> std::result::Result<Self, libloading::Error> {
        // Safety: the candidate is a jf_native_abi build; symbol signatures
        // are fixed by the ABI.
        let library = unsafe { libloading::Library::new(path) }?;
        let symbols = unsafe { NativeSymbols::resolve(&library) }?;

        Ok(Self {
            symbols,
            origin: path.display().to_string(),
            _library: Some(library),
        })
    }

    /// Wrap entry points that are already linked into the process.
    ///
    /// # Safety
    /// The functions must honor the ABI contract: both out-buffers are always
    /// written, and `free_buffer` reclaims exactly what the calls allocate.
    pub unsafe fn from_symbols(symbols: NativeSymbols, origin: impl Into<String>) -> Self {
        Self {
            symbols,
            origin: origin.into(),
            _library: None,
        }
    }

    /// Where the library came from (path or label)
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Run the health probe
    pub fn healthcheck(&self) -> bool {
        unsafe { (self.symbols.healthcheck)() == HEALTHCHECK_OK }
    }

    /// Normalize an ffprobe JSON document
    pub(crate) fn normalize(&self, input: &[u8]) -> CallOutcome<'_> {
        self.invoke(self.symbols.normalize_ffprobe_json, input)
    }

    /// Parse an ffprobe keyframe transcript into a JSON payload
    pub(crate) fn parse_keyframe_transcript(&self, input: &[u8]) -> CallOutcome<'_> {
        self.invoke(self.symbols.parse_keyframe_csv, input)
    }

    fn invoke(&self, entry: BufferCallFn, input: &[u8]) -> CallOutcome<'_> {
        let mut output = NativeBuffer::empty();
        let mut error = NativeBuffer::empty();

        let exit_code = unsafe { entry(input.as_ptr(), input.len(), &mut output, &mut error) };

        CallOutcome {
            exit_code,
            output: ForeignBuffer::new(output, self.symbols.free_buffer),
            error: ForeignBuffer::new(error, self.symbols.free_buffer),
        }
    }
}

// =============================================================================
// Buffer Guard
// =============================================================================

/// Native-owned buffer, released exactly once when dropped
pub(crate) struct ForeignBuffer<'lib> {
    raw: NativeBuffer,
    free: FreeBufferFn,
    _library: PhantomData<&'lib NativeLibrary>,
}

impl<'lib> ForeignBuffer<'lib> {
    fn new(raw: NativeBuffer, free: FreeBufferFn) -> Self {
        Self {
            raw,
            free,
            _library: PhantomData,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Copy the contents into owned memory
    pub(crate) fn to_vec(&self) -> Vec<u8> {
        if self.is_empty() {
            return Vec::new();
        }
        unsafe { std::slice::from_raw_parts(self.raw.ptr, self.raw.len) }.to_vec()
    }

    /// Give the buffer back to the native side
    pub(crate) fn release(self) {}
}

impl Drop for ForeignBuffer<'_> {
    fn drop(&mut self) {
        if !self.raw.is_empty() {
            unsafe { (self.free)(self.raw.ptr, self.raw.len) };
        }
    }
}

/// Exit code plus both out-buffers of one native call
pub(crate) struct CallOutcome<'lib> {
    exit_code: i32,
    output: ForeignBuffer<'lib>,
    error: ForeignBuffer<'lib>,
}

impl CallOutcome<'_> {
    pub(crate) fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Copy out the relevant buffer and release both.
    ///
    /// Success reads the output buffer. Failure reads the error buffer and
    /// drops the output unread.
    pub(crate) fn into_payload(self) -> Result<Vec<u8>> {
        let succeeded = self.exit_code() == EXIT_SUCCESS;
        let CallOutcome { output, error, .. } = self;

        if succeeded {
            let payload = output.to_vec();
            output.release();
            error.release();
            return Ok(payload);
        }

        output.release();
        let message = if error.is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            String::from_utf8_lossy(&error.to_vec()).into_owned()
        };
        error.release();

        Err(Error::ForeignCall(message))
    }
}
