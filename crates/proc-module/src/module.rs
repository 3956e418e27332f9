use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicU64, Ordering};

use libloading::Library;

use crate::stat::FileStamp;

/// Unique, monotonically increasing id assigned to every loaded module,
/// including reloads of a package already seen (a reload never reuses
/// its predecessor's id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u64);

static NEXT_MODULE_ID: AtomicU64 = AtomicU64::new(1);

impl ModuleId {
    pub(crate) fn next() -> ModuleId {
        ModuleId(NEXT_MODULE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// One loaded native extension library.
///
/// `refs` counts every symbol resolved inside this module plus every
/// in-flight dispatch pin; the module cache itself never holds a ref
/// (see [`crate::cache::ModuleCache`]). Because every symbol holds a
/// ref, `refs == 0` already implies no symbol still points at this
/// module — there is no separate "symbol list empty" check to make.
#[derive(Debug)]
pub struct Module {
    id: ModuleId,
    package: String,
    stamp: FileStamp,
    library: RefCell<Option<Library>>,
    refs: Cell<i64>,
}

impl Module {
    pub(crate) fn new(package: String, stamp: FileStamp, library: Library) -> Module {
        Module {
            id: ModuleId::next(),
            package,
            stamp,
            library: RefCell::new(Some(library)),
            refs: Cell::new(0),
        }
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn stamp(&self) -> FileStamp {
        self.stamp
    }

    pub fn refs(&self) -> i64 {
        self.refs.get()
    }

    /// Whether this module's OS handle is still mapped.
    pub fn is_live(&self) -> bool {
        self.library.borrow().is_some()
    }

    /// Increment the reference count. Returns the new count.
    pub fn acquire(&self) -> i64 {
        let next = self.refs.get() + 1;
        self.refs.set(next);
        next
    }

    /// Decrement the reference count. Returns `true` if this was the
    /// last reference, in which case the OS handle has just been
    /// closed.
    pub fn release(&self) -> bool {
        let next = self.refs.get() - 1;
        debug_assert!(next >= 0, "module refcount underflow");
        self.refs.set(next);
        if next == 0 {
            // Dropping the Library unmaps it; the scratch copy was
            // already unlinked at load time so there's no file left
            // to clean up here.
            self.library.borrow_mut().take();
            true
        } else {
            false
        }
    }

    /// Borrow the loaded library to resolve a symbol from it.
    ///
    /// Panics if called after the last reference was released — a
    /// caller that holds no ref has no business resolving symbols, and
    /// resolving against a freed module would be a corruption bug, not
    /// a recoverable error (see the invariants section: a `panic` is
    /// reserved for states that cannot hold without corruption).
    pub fn with_library<R>(&self, f: impl FnOnce(&Library) -> R) -> R {
        let borrowed = self.library.borrow();
        let lib = borrowed
            .as_ref()
            .expect("with_library called on a module with no live OS handle");
        f(lib)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = ModuleId::next();
        let b = ModuleId::next();
        assert!(b.as_u64() > a.as_u64());
    }
}
