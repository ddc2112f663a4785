//! In-process stand-in for the native library, used by unit tests
//!
//! Behavior and counters are thread-local; every test runs on its own thread.

use std::cell::Cell;

use super::{NativeBuffer, NativeLibrary, NativeSymbols, HEALTHCHECK_OK};
use crate::managed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FakeBehavior {
    /// Run the managed algorithms, like a real build of the library
    Managed,
    /// Copy the input to the output, plus an informational error buffer
    Echo,
    /// Fail with the given message, leaving a partial output behind
    Fail(&'static str),
    /// Succeed with a payload that is not JSON
    Garbage,
    /// Health probe reports failure
    Unhealthy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FakeStats {
    pub allocated: usize,
    pub released: usize,
    pub healthchecks: usize,
    pub calls: usize,
}

thread_local! {
    static BEHAVIOR: Cell<FakeBehavior> = const { Cell::new(FakeBehavior::Managed) };
    static STATS: Cell<FakeStats> = const {
        Cell::new(FakeStats { allocated: 0, released: 0, healthchecks: 0, calls: 0 })
    };
}

pub(crate) fn reset() {
    STATS.with(|s| s.set(FakeStats::default()));
}

pub(crate) fn stats() -> FakeStats {
    STATS.with(Cell::get)
}

fn update(f: impl FnOnce(&mut FakeStats)) {
    STATS.with(|s| {
        let mut stats = s.get();
        f(&mut stats);
        s.set(stats);
    });
}

pub(crate) fn library(behavior: FakeBehavior) -> NativeLibrary {
    BEHAVIOR.with(|b| b.set(behavior));
    unsafe { NativeLibrary::from_symbols(symbols(), "fake") }
}

pub(crate) fn symbols() -> NativeSymbols {
    NativeSymbols {
        healthcheck: fake_healthcheck,
        free_buffer: fake_free_buffer,
        normalize_ffprobe_json: fake_normalize,
        parse_keyframe_csv: fake_parse,
    }
}

fn allocate(bytes: &[u8]) -> NativeBuffer {
    let buffer = NativeBuffer::from_vec(bytes.to_vec());
    if !buffer.is_empty() {
        update(|s| s.allocated += 1);
    }
    buffer
}

unsafe extern "C" fn fake_healthcheck() -> i32 {
    update(|s| s.healthchecks += 1);
    match BEHAVIOR.with(Cell::get) {
        FakeBehavior::Unhealthy => 0,
        _ => HEALTHCHECK_OK,
    }
}

unsafe extern "C" fn fake_free_buffer(ptr: *mut u8, len: usize) {
    update(|s| s.released += 1);
    unsafe { NativeBuffer::reclaim(ptr, len) };
}

unsafe extern "C" fn fake_normalize(
    input_ptr: *const u8,
    input_len: usize,
    output: *mut NativeBuffer,
    error: *mut NativeBuffer,
) -> i32 {
    let input = unsafe { std::slice::from_raw_parts(input_ptr, input_len) };
    unsafe { respond(input, output, error, |bytes| managed::normalize_probe_json(bytes)) }
}

unsafe extern "C" fn fake_parse(
    input_ptr: *const u8,
    input_len: usize,
    output: *mut NativeBuffer,
    error: *mut NativeBuffer,
) -> i32 {
    let input = unsafe { std::slice::from_raw_parts(input_ptr, input_len) };
    unsafe {
        respond(input, output, error, |bytes| {
            let transcript = std::str::from_utf8(bytes)?;
            let data = managed::parse_keyframe_transcript(transcript);
            Ok(serde_json::to_vec(&data)?)
        })
    }
}

unsafe fn respond<F>(input: &[u8], output: *mut NativeBuffer, error: *mut NativeBuffer, action: F) -> i32
where
    F: FnOnce(&[u8]) -> crate::Result<Vec<u8>>,
{
    update(|s| s.calls += 1);

    let (code, out, err) = match BEHAVIOR.with(Cell::get) {
        FakeBehavior::Managed | FakeBehavior::Unhealthy => match action(input) {
            Ok(bytes) => (0, allocate(&bytes), NativeBuffer::empty()),
            Err(e) => (-1, NativeBuffer::empty(), allocate(e.to_string().as_bytes())),
        },
        FakeBehavior::Echo => (0, allocate(input), allocate(b"ok")),
        FakeBehavior::Fail(message) => (-1, allocate(b"partial"), allocate(message.as_bytes())),
        FakeBehavior::Garbage => (0, allocate(b"not json"), NativeBuffer::empty()),
    };

    unsafe {
        *output = out;
        *error = err;
    }
    code
}
