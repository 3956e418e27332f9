bitflags::bitflags! {
    /// The two privilege kinds a function access check cares about
    /// (Tarantool's `PRIV_X`/`PRIV_U`): execute, and "use" (the right
    /// to reference the function object at all).
    pub struct AccessBitmap: u8 {
        const EXECUTE = 0b01;
        const USE = 0b10;
    }
}

/// The out-of-scope privilege/user store, referenced only through this
/// narrow interface (§1 "referenced via narrow interfaces").
pub trait PrivilegeStore {
    /// Bits `user` is granted on the function entity class as a whole
    /// (`entity_access_get(SC_FUNCTION)[token].effective`).
    fn class_grant(&self, user: crate::credentials::UserId) -> AccessBitmap;

    /// Bits `user` is granted specifically on `function` (the
    /// per-function, per-role effective grant).
    fn function_grant(&self, user: crate::credentials::UserId, function: &str) -> AccessBitmap;
}
