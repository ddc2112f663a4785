//! C ABI exports of the Jellyfin native parsers
//!
//! All functions in this module are exported with `#[no_mangle]`
//! and use C-compatible types for cross-language interop.
//!
//! # Memory Ownership
//!
//! - Both out-buffers are always written, empty (`NULL`, 0) when unused
//! - Every non-empty buffer must be returned through `jf_native_free_buffer`
//! - Exit code 0 means the output buffer holds the payload; any other code
//!   means the error buffer holds a UTF-8 message

use std::ffi::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use jf_native_interop::error::{EXIT_FAILURE, EXIT_SUCCESS};
use jf_native_interop::ffi::HEALTHCHECK_OK;
use jf_native_interop::{managed, NativeBuffer, NativeSymbols, Result};

// =============================================================================
// Lifecycle
// =============================================================================

/// Health probe; returns 1 when the library is operational
#[no_mangle]
pub extern "C" fn jf_native_healthcheck() -> i32 {
    HEALTHCHECK_OK
}

/// Initialize logging inside the library (optional)
#[no_mangle]
pub extern "C" fn jf_native_init_logging() {
    jf_native_interop::init();
}

static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Get library version
#[no_mangle]
pub extern "C" fn jf_native_get_version() -> *const c_char {
    VERSION.as_ptr() as *const c_char
}

/// Release a buffer returned by this library
#[no_mangle]
pub extern "C" fn jf_native_free_buffer(ptr: *mut u8, len: usize) {
    if ptr.is_null() || len == 0 {
        return;
    }

    unsafe { NativeBuffer::reclaim(ptr, len) };
}

// =============================================================================
// Parsers
// =============================================================================

/// Normalize an ffprobe JSON document
#[no_mangle]
pub extern "C" fn jf_native_normalize_ffprobe_json(
    input_ptr: *const u8,
    input_len: usize,
    output: *mut NativeBuffer,
    error: *mut NativeBuffer,
) -> i32 {
    run_with_buffers(input_ptr, input_len, output, error, managed::normalize_probe_json)
}

/// Parse an ffprobe keyframe CSV transcript into a JSON payload
#[no_mangle]
pub extern "C" fn jf_native_parse_keyframe_csv(
    input_ptr: *const u8,
    input_len: usize,
    output: *mut NativeBuffer,
    error: *mut NativeBuffer,
) -> i32 {
    run_with_buffers(input_ptr, input_len, output, error, |input| {
        let transcript = std::str::from_utf8(input)?;
        let parsed = managed::parse_keyframe_transcript(transcript);
        Ok(serde_json::to_vec(&parsed)?)
    })
}

/// Entry points of this build as a symbol table, for in-process use
pub fn symbols() -> NativeSymbols {
    NativeSymbols {
        healthcheck: jf_native_healthcheck,
        free_buffer: jf_native_free_buffer,
        normalize_ffprobe_json: jf_native_normalize_ffprobe_json,
        parse_keyframe_csv: jf_native_parse_keyframe_csv,
    }
}

fn run_with_buffers<F>(
    input_ptr: *const u8,
    input_len: usize,
    output: *mut NativeBuffer,
    error: *mut NativeBuffer,
    action: F,
) -> i32
where
    F: FnOnce(&[u8]) -> Result<Vec<u8>>,
{
    if output.is_null() || error.is_null() {
        return EXIT_FAILURE;
    }

    unsafe {
        ptr::write(output, NativeBuffer::empty());
        ptr::write(error, NativeBuffer::empty());
    }

    let input: &[u8] = if input_len == 0 {
        &[]
    } else if input_ptr.is_null() {
        write_error(error, "input pointer is null");
        return EXIT_FAILURE;
    } else {
        unsafe { std::slice::from_raw_parts(input_ptr, input_len) }
    };

    // Unwinding across the C boundary aborts the host
    match panic::catch_unwind(AssertUnwindSafe(|| action(input))) {
        Ok(Ok(bytes)) => {
            unsafe { ptr::write(output, NativeBuffer::from_vec(bytes)) };
            EXIT_SUCCESS
        }
        Ok(Err(e)) => {
            log::debug!("jf_native call failed: {}", e);
            write_error(error, &e.to_string());
            e.exit_code()
        }
        Err(_) => {
            write_error(error, "native parser panicked");
            EXIT_FAILURE
        }
    }
}

fn write_error(error: *mut NativeBuffer, message: &str) {
    unsafe { ptr::write(error, NativeBuffer::from_vec(message.as_bytes().to_vec())) };
}
