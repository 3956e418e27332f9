//! Function objects, access control, and setuid dispatch (§4.G).
//!
//! A function binds a [`proc_symbol::ModuleSymbol`] (or, for
//! non-native languages, an unimplemented placeholder) to a named,
//! access-checked definition, and swaps the task's effective identity
//! for the duration of a call when the function is marked setuid.

mod access;
mod credentials;
mod function;

pub use access::{AccessBitmap, PrivilegeStore};
pub use credentials::{Credentials, EffectiveUser, UserDirectory, UserId};
pub use function::{FunctionDef, FunctionObject, Language};

#[cfg(test)]
mod tests {
    use super::*;
    use proc_dispatch::TaskContext;
    use proc_module::ModuleCache;
    use proc_path::StaticSearch;
    use proc_symbol::SymbolCache;
    use std::collections::HashMap;

    struct AllowAll;
    impl PrivilegeStore for AllowAll {
        fn class_grant(&self, _user: UserId) -> AccessBitmap {
            AccessBitmap::empty()
        }
        fn function_grant(&self, _user: UserId, _function: &str) -> AccessBitmap {
            AccessBitmap::empty()
        }
    }

    struct DenyAll;
    impl PrivilegeStore for DenyAll {
        fn class_grant(&self, _user: UserId) -> AccessBitmap {
            AccessBitmap::empty()
        }
        fn function_grant(&self, _user: UserId, _function: &str) -> AccessBitmap {
            AccessBitmap::empty()
        }
    }

    struct FixedUsers(HashMap<u32, Credentials>);
    impl UserDirectory for FixedUsers {
        fn lookup(&self, id: UserId) -> Option<Credentials> {
            self.0.get(&id.0).cloned()
        }
    }

    fn caller_with_universal_access() -> Credentials {
        Credentials {
            user: UserId(1),
            universal_access: AccessBitmap::EXECUTE | AccessBitmap::USE,
        }
    }

    fn caller_with_no_access() -> Credentials {
        Credentials {
            user: UserId(2),
            universal_access: AccessBitmap::empty(),
        }
    }

    #[test]
    fn universal_access_skips_the_per_function_check() {
        EffectiveUser::clear();
        EffectiveUser::set(caller_with_universal_access());

        let def = FunctionDef {
            name: "m.foo".to_string(),
            owner: UserId(9),
            setuid: false,
        };
        let func = FunctionObject::new(def, Language::native_unresolved());

        let modules = ModuleCache::new();
        let symbols = SymbolCache::new();
        let search = StaticSearch::new();
        let task = TaskContext::new();
        let args = proc_dispatch::ArgsPort::from_values(&[]).unwrap();

        // Access is granted (no AccessDenied); the call still fails at
        // symbol resolution since `m` was never made loadable here —
        // that's the boundary this test is checking, not dispatch.
        let err = func
            .call(&task, &DenyAll, &FixedUsers(HashMap::new()), &modules, &symbols, &search, &args)
            .unwrap_err();
        assert!(!matches!(
            err,
            proc_diag::Error::Client(proc_diag::ClientError::AccessDenied(_))
        ));
        EffectiveUser::clear();
    }

    #[test]
    fn non_owner_with_no_grants_is_denied() {
        EffectiveUser::clear();
        EffectiveUser::set(caller_with_no_access());

        let def = FunctionDef {
            name: "m.foo".to_string(),
            owner: UserId(9),
            setuid: false,
        };
        let func = FunctionObject::new(def, Language::native_unresolved());

        let modules = ModuleCache::new();
        let symbols = SymbolCache::new();
        let search = StaticSearch::new();
        let task = TaskContext::new();
        let args = proc_dispatch::ArgsPort::from_values(&[]).unwrap();

        let err = func
            .call(&task, &AllowAll, &FixedUsers(HashMap::new()), &modules, &symbols, &search, &args)
            .unwrap_err();
        assert!(matches!(
            err,
            proc_diag::Error::Client(proc_diag::ClientError::AccessDenied(_))
        ));
        EffectiveUser::clear();
    }

    #[test]
    fn call_without_an_effective_user_is_illegal_params() {
        EffectiveUser::clear();

        let def = FunctionDef {
            name: "m.foo".to_string(),
            owner: UserId(9),
            setuid: false,
        };
        let func = FunctionObject::new(def, Language::native_unresolved());

        let modules = ModuleCache::new();
        let symbols = SymbolCache::new();
        let search = StaticSearch::new();
        let task = TaskContext::new();
        let args = proc_dispatch::ArgsPort::from_values(&[]).unwrap();

        let err = func
            .call(&task, &AllowAll, &FixedUsers(HashMap::new()), &modules, &symbols, &search, &args)
            .unwrap_err();
        assert!(matches!(err, proc_diag::Error::IllegalParams(_)));
    }

    #[test]
    fn setuid_swap_installs_and_restores_effective_user() {
        EffectiveUser::clear();
        let caller = caller_with_universal_access();
        EffectiveUser::set(caller.clone());

        let owner_creds = Credentials {
            user: UserId(9),
            universal_access: AccessBitmap::empty(),
        };
        let mut users = HashMap::new();
        users.insert(9u32, owner_creds.clone());

        let def = FunctionDef {
            name: "m.foo".to_string(),
            owner: UserId(9),
            setuid: true,
        };
        let func = FunctionObject::new(def, Language::native_unresolved());

        let modules = ModuleCache::new();
        let symbols = SymbolCache::new();
        let search = StaticSearch::new();
        let task = TaskContext::new();
        let args = proc_dispatch::ArgsPort::from_values(&[]).unwrap();

        // The call fails at symbol resolution (no loadable module), but
        // by the time it returns the effective user must already be
        // restored to the caller — the swap/restore doesn't depend on
        // the dispatch actually succeeding.
        let _ = func.call(&task, &AllowAll, &FixedUsers(users), &modules, &symbols, &search, &args);
        assert_eq!(EffectiveUser::get(), Some(caller));
        EffectiveUser::clear();
    }
}
