use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use proc_diag::{ClientError, Diagnostics, Error};
use proc_dispatch::{ArgsPort, RetPort, TaskContext};
use proc_func::{FunctionDef, FunctionObject, Language, PrivilegeStore, UserDirectory};
use proc_journal::JournalQueue;
use proc_module::ModuleCache;
use proc_path::{FunctionName, PackageSearch};
use proc_symbol::SymbolCache;

use crate::config::RuntimeConfig;

/// The subsystem handle (§9 "Global caches"): owns one instance of every
/// cache and wires them together, rather than leaving them as
/// process-wide statics.
pub struct Runtime {
    modules: ModuleCache,
    symbols: SymbolCache,
    journal: Rc<JournalQueue>,
    functions: RefCell<HashMap<String, Rc<FunctionObject>>>,
    search: Box<dyn PackageSearch>,
    privileges: Box<dyn PrivilegeStore>,
    users: Box<dyn UserDirectory>,
}

impl Runtime {
    pub fn new(
        search: Box<dyn PackageSearch>,
        privileges: Box<dyn PrivilegeStore>,
        users: Box<dyn UserDirectory>,
        config: RuntimeConfig,
    ) -> Rc<Runtime> {
        Rc::new(Runtime {
            modules: ModuleCache::new(),
            symbols: SymbolCache::new(),
            journal: JournalQueue::new(config.journal),
            functions: RefCell::new(HashMap::new()),
            search,
            privileges,
            users,
        })
    }

    pub fn module_cache(&self) -> &ModuleCache {
        &self.modules
    }

    pub fn symbol_cache(&self) -> &SymbolCache {
        &self.symbols
    }

    pub fn journal(&self) -> &Rc<JournalQueue> {
        &self.journal
    }

    /// Register a function definition, initially unresolved — the
    /// backing symbol is resolved lazily on first call (§4.D).
    pub fn define_function(&self, def: FunctionDef) -> Rc<FunctionObject> {
        let name = def.name.clone();
        let func = Rc::new(FunctionObject::new(def, Language::native_unresolved()));
        self.functions.borrow_mut().insert(name, Rc::clone(&func));
        func
    }

    pub fn lookup_function(&self, name: &str) -> Option<Rc<FunctionObject>> {
        self.functions.borrow().get(name).cloned()
    }

    /// Drop a function definition, releasing its hold on a resolved
    /// symbol (§8 scenario 1: "drop function; assert module unmapped").
    pub fn remove_function(&self, name: &str) -> Option<Rc<FunctionObject>> {
        let func = self.functions.borrow_mut().remove(name);
        if let Some(func) = &func {
            func.release(&self.symbols);
        }
        func
    }

    /// Call a registered function by name under `task`'s arena, with
    /// `task`'s effective user already installed by the caller via
    /// [`proc_func::EffectiveUser::set`].
    pub fn call(
        &self,
        task: &TaskContext,
        name: &str,
        args: &ArgsPort,
    ) -> Result<RetPort, Error> {
        let func = self.lookup_function(name).ok_or_else(|| {
            Diagnostics::set(Error::Client(ClientError::LoadFunction(format!(
                "no such function '{name}'"
            ))))
        })?;
        func.call(
            task,
            self.privileges.as_ref(),
            self.users.as_ref(),
            &self.modules,
            &self.symbols,
            self.search.as_ref(),
            args,
        )
    }

    /// Force an unconditional reload of `package` (§8 scenario 2).
    ///
    /// Reload preserves function identity for callers: every registered
    /// function already resolved against the old binary has its cached
    /// symbol released here, so the next call through that same function
    /// handle re-resolves lazily against the freshly loaded module
    /// instead of silently continuing to dispatch the orphan (mirrors
    /// `module_reload`'s walk of `old->funcs_list` re-pointing each
    /// `mod_sym`, done here by invalidation rather than eager re-binding
    /// since resolution is already lazy everywhere else in this crate).
    pub fn reload(&self, package: &str) -> Result<(), Error> {
        self.modules.reload(self.search.as_ref(), package)?;
        for func in self.functions.borrow().values() {
            if FunctionName::parse(&func.def().name).package == package {
                func.release(&self.symbols);
            }
        }
        Ok(())
    }

    /// Drain every function definition, releasing its symbol reference
    /// so orphaned modules collect as soon as any in-flight calls
    /// finish (§2 "on_shutdown.c-style trigger list").
    ///
    /// No generic trigger/hook registration system is built — this is
    /// the one teardown step a runtime with no shutdown path at all
    /// would be missing.
    pub fn shutdown(&self) {
        let names: Vec<String> = self.functions.borrow().keys().cloned().collect();
        for name in names {
            self.remove_function(&name);
        }
    }
}
