//! Subsystem handle and scheduler (§9 "Global caches", §5 "Scheduling").
//!
//! Owns one instance of every cache (module, symbol, function, journal)
//! and wires them together behind a small facade that tests and
//! `proc-cli` drive instead of reaching into each crate directly.

mod config;
mod runtime;
mod scheduler;

pub use config::RuntimeConfig;
pub use runtime::Runtime;
pub use scheduler::block_on_local;

pub use proc_dispatch::{ArgsPort, RetPort, TaskContext};
pub use proc_func::{
    AccessBitmap, Credentials, EffectiveUser, FunctionDef, FunctionObject, Language,
    PrivilegeStore, UserDirectory, UserId,
};
pub use proc_journal::{JournalEntry, JournalQueue, JournalWriter};
pub use proc_module::{Module, ModuleCache, ModuleId};
pub use proc_path::{DirectorySearch, FunctionName, PackageSearch, StaticSearch};
pub use proc_symbol::{ModuleSymbol, SymbolCache};

#[cfg(test)]
mod tests {
    use super::*;

    struct AllowAll;
    impl PrivilegeStore for AllowAll {
        fn class_grant(&self, _user: UserId) -> AccessBitmap {
            AccessBitmap::empty()
        }
        fn function_grant(&self, _user: UserId, _function: &str) -> AccessBitmap {
            AccessBitmap::empty()
        }
    }

    struct NoUsers;
    impl UserDirectory for NoUsers {
        fn lookup(&self, _id: UserId) -> Option<Credentials> {
            None
        }
    }

    fn caller() -> Credentials {
        Credentials {
            user: UserId(1),
            universal_access: AccessBitmap::EXECUTE | AccessBitmap::USE,
        }
    }

    #[test]
    fn calling_an_unregistered_function_is_load_function() {
        let runtime = Runtime::new(
            Box::new(StaticSearch::new()),
            Box::new(AllowAll),
            Box::new(NoUsers),
            RuntimeConfig::default(),
        );
        EffectiveUser::clear();
        EffectiveUser::set(caller());

        let task = TaskContext::new();
        let args = ArgsPort::from_values(&[]).unwrap();
        let err = runtime.call(&task, "missing.fn", &args).unwrap_err();
        assert!(matches!(
            err,
            proc_diag::Error::Client(proc_diag::ClientError::LoadFunction(_))
        ));
        EffectiveUser::clear();
    }

    #[test]
    fn toml_config_loads_journal_limits() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [journal]
            max_size = 1048576
            max_len = 128
            "#,
        )
        .unwrap();
        assert_eq!(config.journal.max_size, 1048576);
        assert_eq!(config.journal.max_len, 128);
    }

    #[test]
    fn toml_config_defaults_to_unbounded_journal() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        assert_eq!(config.journal.max_size, i64::MAX);
        assert_eq!(config.journal.max_len, i64::MAX);
    }

    #[test]
    fn shutdown_releases_every_function() {
        let runtime = Runtime::new(
            Box::new(StaticSearch::new()),
            Box::new(AllowAll),
            Box::new(NoUsers),
            RuntimeConfig::default(),
        );
        runtime.define_function(FunctionDef {
            name: "a.foo".to_string(),
            owner: UserId(1),
            setuid: false,
        });
        runtime.define_function(FunctionDef {
            name: "b.bar".to_string(),
            owner: UserId(1),
            setuid: false,
        });
        runtime.shutdown();
        assert!(runtime.lookup_function("a.foo").is_none());
        assert!(runtime.lookup_function("b.bar").is_none());
    }

    #[test]
    fn block_on_local_runs_a_future_to_completion() {
        let result = block_on_local(async { 1 + 1 });
        assert_eq!(result, 2);
    }
}
