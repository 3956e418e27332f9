use std::cell::RefCell;

use crate::access::AccessBitmap;

/// A user id in the out-of-scope privilege/user store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub u32);

/// The effective identity a task runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: UserId,
    pub universal_access: AccessBitmap,
}

/// Looks up a user's credentials by id (the out-of-scope user store,
/// narrow interface per §1).
pub trait UserDirectory {
    fn lookup(&self, id: UserId) -> Option<Credentials>;
}

thread_local! {
    static EFFECTIVE_USER: RefCell<Option<Credentials>> = const { RefCell::new(None) };
}

/// The task-local "effective user" (`fiber()`'s credentials in the
/// original), swapped for the duration of a setuid call (§4.G step 2).
///
/// Modeled as thread-local for the same reason as
/// [`proc_diag::Diagnostics`]: one OS thread runs every cooperative
/// task, so a thread-local is exactly as scoped as a real per-task
/// slot.
pub struct EffectiveUser;

impl EffectiveUser {
    pub fn get() -> Option<Credentials> {
        EFFECTIVE_USER.with(|slot| slot.borrow().clone())
    }

    pub fn set(creds: Credentials) {
        EFFECTIVE_USER.with(|slot| *slot.borrow_mut() = Some(creds));
    }

    pub fn clear() {
        EFFECTIVE_USER.with(|slot| *slot.borrow_mut() = None);
    }
}
