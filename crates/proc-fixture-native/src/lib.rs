//! A tiny native extension compiled to a real `cdylib` so proc-runtime's
//! integration tests can dlopen and dispatch through it instead of
//! faking the loader/symbol/dispatch boundary.
//!
//! Built from the same workspace as `proc-dispatch`/`proc-func`, so this
//! links against the identical compiled types the test binary uses —
//! no FFI struct-layout assumptions beyond the `#[repr(C)]`
//! `RetPortHandle` pointer the ABI already specifies.

use proc_dispatch::RetPortHandle;
use proc_func::EffectiveUser;
use serde_json::Value;

/// Sums the numeric arguments and appends two results: the sum, then
/// the calling task's current effective user id (or `-1` if none is
/// set). Entry points can't see a task's identity through the `(ctx,
/// begin, end)` ABI itself — reading it here only works because this
/// library runs in-process on the same scheduler thread as the caller,
/// exactly like the original's C modules reading `fiber()->credentials`.
///
/// # Safety
/// `ctx` must point to a live `RetPortHandle` and `[begin, end)` a
/// message-pack encoded argument array, exactly as `proc_dispatch::call`
/// constructs them.
#[no_mangle]
pub unsafe extern "C" fn proc_fixture_sum(
    ctx: *mut RetPortHandle,
    begin: *const u8,
    end: *const u8,
) -> i32 {
    let len = end.offset_from(begin) as usize;
    let bytes = std::slice::from_raw_parts(begin, len);
    let args: Vec<Value> = match rmp_serde::from_slice(bytes) {
        Ok(args) => args,
        Err(_) => return -1,
    };
    let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
    let user = EffectiveUser::get().map_or(-1, |creds| creds.user.0 as i64);

    let port = RetPortHandle::port_mut(ctx);
    port.append_value(Value::from(sum));
    port.append_value(Value::from(user));
    0
}
