use proc_runtime::{AccessBitmap, Credentials, PrivilegeStore, UserDirectory, UserId};

/// Grants every user full access to every function.
///
/// The real privilege/user store is out of scope for this runtime (§1
/// "referenced via narrow interfaces"); this driver has no policy
/// engine of its own to wire in its place, so it runs wide open rather
/// than pretending to enforce a policy nobody configured.
pub struct UnrestrictedPrivileges;

impl PrivilegeStore for UnrestrictedPrivileges {
    fn class_grant(&self, _user: UserId) -> AccessBitmap {
        AccessBitmap::EXECUTE | AccessBitmap::USE
    }

    fn function_grant(&self, _user: UserId, _function: &str) -> AccessBitmap {
        AccessBitmap::EXECUTE | AccessBitmap::USE
    }
}

/// Every user id resolves to credentials with full access, so a setuid
/// function's owner swap has something to look up.
pub struct PermissiveUsers;

impl UserDirectory for PermissiveUsers {
    fn lookup(&self, id: UserId) -> Option<Credentials> {
        Some(Credentials {
            user: id,
            universal_access: AccessBitmap::EXECUTE | AccessBitmap::USE,
        })
    }
}
