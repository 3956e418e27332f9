use std::cell::RefCell;
use std::mem::transmute;
use std::rc::Rc;

use proc_diag::{ClientError, Diagnostics, Error};
use proc_symbol::ModuleSymbol;
use tracing::debug;

use crate::arena::Arena;
use crate::port::{ArgsPort, EntryPoint, RetPort, RetPortHandle};

/// Per-task dispatch state: one [`Arena`] reused across every call this
/// task makes, reset to its prior watermark after each one (§5 "the
/// process arena ... per-task, reset at each scheduling point").
#[derive(Debug, Default)]
pub struct TaskContext {
    arena: RefCell<Arena>,
}

impl TaskContext {
    pub fn new() -> TaskContext {
        TaskContext::default()
    }

    pub fn arena(&self) -> &RefCell<Arena> {
        &self.arena
    }
}

/// Invoke a resolved symbol with a marshalled argument stream (§4.F).
///
/// Steps, matching `cmod_call`/`func_c_call` exactly: snapshot the
/// arena, pin the module for the call's duration, invoke the entry
/// point, unpin, truncate the arena on every exit path, and synthesize
/// a diagnostic if the entry point failed silently.
pub fn call(
    task: &TaskContext,
    symbol: &Rc<ModuleSymbol>,
    args: &ArgsPort,
) -> Result<RetPort, Error> {
    let mark = task.arena.borrow().snapshot();
    let outcome = call_pinned(symbol, args);
    task.arena.borrow_mut().truncate(mark);
    outcome
}

fn call_pinned(symbol: &Rc<ModuleSymbol>, args: &ArgsPort) -> Result<RetPort, Error> {
    // Pin the module for the call's duration: the symbol already holds
    // one ref, but the call may cooperatively yield inside the entry
    // point, during which a concurrent `reload` could otherwise drop
    // the symbol's own ref to zero (§4.E "dispatch takes an additional
    // ref because the call may yield").
    let module = symbol.module();
    module.acquire();

    let mut ret = RetPort::new();
    let entry_point: EntryPoint = unsafe { transmute(symbol.addr()) };
    let mut handle = RetPortHandle::new(&mut ret);

    // A stale diagnostic from an earlier, unrelated operation on this
    // task must not be mistaken for this call's own error below.
    Diagnostics::clear();
    let bytes = args.as_bytes();
    // SAFETY: `bytes` outlives the call, `handle` is a valid pointer to
    // a `RetPortHandle` we just constructed, and `entry_point` was
    // resolved from a trusted native module (Non-goals: no sandboxing
    // of untrusted code).
    let rc = unsafe { entry_point(&mut handle, bytes.as_ptr(), bytes.as_ptr().add(bytes.len())) };

    let last = module.release();
    debug!(rc, pinned_release_was_last = last, "dispatch returned");

    if rc != 0 {
        let err = match Diagnostics::last() {
            Some(err) => err,
            None => Diagnostics::set(Error::Client(ClientError::ProcC(
                "unknown error".to_string(),
            ))),
        };
        drop(ret);
        return Err(err);
    }

    Ok(ret)
}
