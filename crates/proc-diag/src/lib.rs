//! Error taxonomy and the task-local "last error" diagnostic slot.
//!
//! Every fallible operation in the runtime returns a [`Result<T, Error>`]
//! and, before returning the error, records a clone of it in the calling
//! task's [`Diagnostics`] slot. The `Result` itself is the sentinel; the
//! slot exists so a caller that only has a `-1`/`false`-shaped boundary
//! (the native entry-point ABI, the CLI) can still recover the structured
//! error after the fact.

use std::cell::RefCell;
use std::fmt;

mod client;

pub use client::ClientError;

/// The runtime's error taxonomy, mirrored 1:1 from the error kinds a
/// fallible call may surface at the boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Allocation failure. Fatal to the operation, not to the process.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// An OS syscall failed; the operation fails, the process continues.
    #[error("system error: {0}")]
    System(String),

    /// The caller violated a static contract (missing name, wrong handle
    /// type). No state is mutated before this is returned.
    #[error("illegal parameters: {0}")]
    IllegalParams(String),

    /// A client-facing error with a specific, named kind.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl Error {
    /// Shorthand for [`Error::System`] built from a [`std::io::Error`].
    pub fn from_io(context: &str, err: std::io::Error) -> Self {
        Error::System(format!("{context}: {err}"))
    }
}

thread_local! {
    static DIAGNOSTICS: RefCell<Option<Error>> = const { RefCell::new(None) };
}

/// The task-local "last error" slot.
///
/// Modeled as thread-local state rather than truly global: this runtime
/// is single-threaded (one OS thread runs every cooperative task, see
/// the concurrency model), so a thread-local is precisely as scoped as a
/// real per-task slot would be, without the bookkeeping of an explicit
/// task-id-keyed map.
pub struct Diagnostics;

impl Diagnostics {
    /// Record `err` as the last error and return it, so call sites can
    /// write `return Err(Diagnostics::set(err))`.
    pub fn set(err: Error) -> Error {
        DIAGNOSTICS.with(|slot| *slot.borrow_mut() = Some(err.clone()));
        err
    }

    /// Read back the last recorded error, if any.
    pub fn last() -> Option<Error> {
        DIAGNOSTICS.with(|slot| slot.borrow().clone())
    }

    /// Clear the slot. Used at the start of a dispatch so a stale error
    /// from a previous call on the same task is never mistaken for a
    /// fresh one.
    pub fn clear() {
        DIAGNOSTICS.with(|slot| *slot.borrow_mut() = None);
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish()
    }
}
