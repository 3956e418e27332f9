use proc_diag::{Diagnostics, Error};
use serde_json::Value;

/// The argument stream handed to a native entry point: an owned,
/// already-encoded message-pack array.
///
/// Built by the caller (e.g. `proc-func`) from a `Vec<serde_json::Value>`
/// — `rmp_serde` serializes any `serde`-compatible value, and
/// `serde_json::Value` is this runtime's choice for "one dynamic,
/// self-describing value" (§6 "args_begin..args_end is a message-pack
/// array").
#[derive(Debug, Clone)]
pub struct ArgsPort {
    encoded: Vec<u8>,
}

impl ArgsPort {
    pub fn from_values(values: &[Value]) -> Result<ArgsPort, Error> {
        let encoded = rmp_serde::to_vec(values).map_err(|err| {
            Diagnostics::set(Error::IllegalParams(format!(
                "failed to encode arguments: {err}"
            )))
        })?;
        Ok(ArgsPort { encoded })
    }

    pub fn from_msgpack(encoded: Vec<u8>) -> ArgsPort {
        ArgsPort { encoded }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.encoded
    }
}

/// An opaque, append-only result stream (§6 "Result port").
///
/// The dispatcher creates one empty `RetPort` per call, passes a handle
/// to the entry point across the `extern "C"` boundary, and either
/// serializes it to the wire on success or drops it on any error exit.
#[derive(Debug, Default)]
pub struct RetPort {
    values: Vec<Value>,
}

impl RetPort {
    pub fn new() -> RetPort {
        RetPort::default()
    }

    pub fn append_value(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Append a single result value already encoded as a raw
    /// message-pack fragment, decoded lazily so a caller that only has
    /// the encoded bytes (e.g. copied directly out of the entry
    /// point's own buffer) doesn't need to build a `Value` itself.
    pub fn append_msgpack_fragment(&mut self, fragment: &[u8]) -> Result<(), Error> {
        let value: Value = rmp_serde::from_slice(fragment).map_err(|err| {
            Diagnostics::set(Error::IllegalParams(format!(
                "malformed result fragment: {err}"
            )))
        })?;
        self.values.push(value);
        Ok(())
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Re-encode the whole accumulated tuple as one message-pack array.
    pub fn to_wire(&self) -> Result<Vec<u8>, Error> {
        rmp_serde::to_vec(&self.values).map_err(|err| {
            Diagnostics::set(Error::IllegalParams(format!(
                "failed to encode results: {err}"
            )))
        })
    }
}

/// The context handed across the `extern "C"` boundary: a pointer the
/// entry point uses to append results, standing in for
/// `box_function_ctx_t`'s `{ .port = ret }`.
#[repr(C)]
pub struct RetPortHandle {
    port: *mut RetPort,
}

impl RetPortHandle {
    pub fn new(port: &mut RetPort) -> RetPortHandle {
        RetPortHandle { port }
    }

    /// # Safety
    /// `handle` must point to a live `RetPortHandle` built by
    /// [`RetPortHandle::new`] and still within the lifetime of the call
    /// that created it.
    pub unsafe fn port_mut<'a>(handle: *mut RetPortHandle) -> &'a mut RetPort {
        &mut *(*handle).port
    }
}

/// `int fn(ctx*, const char *args_begin, const char *args_end)` (§6).
///
/// Returns 0 on success; non-zero must be accompanied by a diagnostic
/// in the calling task's [`proc_diag::Diagnostics`] slot (the
/// dispatcher synthesizes "unknown error" if one wasn't set).
pub type EntryPoint =
    unsafe extern "C" fn(ctx: *mut RetPortHandle, begin: *const u8, end: *const u8) -> i32;
