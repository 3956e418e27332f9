use std::cell::RefCell;
use std::rc::Rc;

use proc_dispatch::{ArgsPort, RetPort, TaskContext};
use proc_diag::{ClientError, Diagnostics, Error};
use proc_module::ModuleCache;
use proc_path::{FunctionName, PackageSearch};
use proc_symbol::{ModuleSymbol, SymbolCache};
use tracing::debug;

use crate::access::{AccessBitmap, PrivilegeStore};
use crate::credentials::{Credentials, EffectiveUser, UserDirectory, UserId};

/// A named, privileged view over a symbol (§3 "Function definition").
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Dotted `pkg.sub.fn` name.
    pub name: String,
    pub owner: UserId,
    /// Set-owner-on-call: the function runs as its owner, not its caller.
    pub setuid: bool,
}

/// The language-polymorphic backing a function dispatches through
/// (§3 "virtual-table for language-polymorphic dispatch"). Only
/// `Native` has a real implementation; the others exist so the
/// access-check/setuid machinery stays language-agnostic without a
/// second language runtime (out of scope per §1).
pub enum Language {
    /// Backed by a module symbol, resolved lazily on first call
    /// (§4.D "Deferred resolution").
    Native(RefCell<Option<Rc<ModuleSymbol>>>),
    Script(String),
    Builtin(String),
}

impl Language {
    pub fn native_unresolved() -> Language {
        Language::Native(RefCell::new(None))
    }

    pub fn native_resolved(symbol: Rc<ModuleSymbol>) -> Language {
        Language::Native(RefCell::new(Some(symbol)))
    }
}

/// A function object: a definition plus its backing, with cached owner
/// credentials for setuid dispatch (§4.G).
pub struct FunctionObject {
    def: FunctionDef,
    language: Language,
    owner_credentials: RefCell<Option<Credentials>>,
}

impl FunctionObject {
    pub fn new(def: FunctionDef, language: Language) -> FunctionObject {
        FunctionObject {
            def,
            language,
            owner_credentials: RefCell::new(None),
        }
    }

    pub fn def(&self) -> &FunctionDef {
        &self.def
    }

    /// Check "EXECUTE"/"USE" permissions (§4.G step 1).
    ///
    /// `required = (EXECUTE | USE) & !class_grant & !universal_access`;
    /// denied if the `USE` bit remains unsatisfied, or the caller isn't
    /// the owner and per-function bits remain unsatisfied.
    fn access_check(
        &self,
        effective: &Credentials,
        privileges: &dyn PrivilegeStore,
    ) -> Result<(), Error> {
        let universal = AccessBitmap::EXECUTE | AccessBitmap::USE;
        if effective.universal_access.contains(universal) {
            return Ok(());
        }

        let class_grant = privileges.class_grant(effective.user);
        let required = universal - class_grant - effective.universal_access;

        let is_owner = effective.user == self.def.owner;
        let function_grant = privileges.function_grant(effective.user, &self.def.name);
        let denied = required.contains(AccessBitmap::USE)
            || (!is_owner && !(required - function_grant).is_empty());

        if denied {
            return Err(Diagnostics::set(Error::Client(ClientError::AccessDenied(
                format!(
                    "Execute access to function '{}' is denied for user '{}'",
                    self.def.name, effective.user.0
                ),
            ))));
        }
        Ok(())
    }

    /// Materialize and cache the owner's credentials on first use
    /// (§4.G step 2: "fill the cache upon first access").
    fn owner_credentials(&self, users: &dyn UserDirectory) -> Result<Credentials, Error> {
        if let Some(creds) = self.owner_credentials.borrow().as_ref() {
            return Ok(creds.clone());
        }
        let creds = users.lookup(self.def.owner).ok_or_else(|| {
            Diagnostics::set(Error::Client(ClientError::AccessDenied(format!(
                "owner of function '{}' no longer exists",
                self.def.name
            ))))
        })?;
        *self.owner_credentials.borrow_mut() = Some(creds.clone());
        Ok(creds)
    }

    /// Release this function's hold on its resolved symbol, if any, and
    /// clear the cache so the next call resolves fresh (§4.E "symbol
    /// half of the reference lifecycle"). Not a `Drop` impl: releasing
    /// needs the owning [`SymbolCache`], which a function object doesn't
    /// keep a handle to between calls — the runtime that owns both calls
    /// this explicitly, both when a function definition is removed and
    /// when its backing package is reloaded (so a stale cached symbol
    /// never outlives the module it pointed into).
    pub fn release(&self, symbols: &SymbolCache) {
        if let Language::Native(cell) = &self.language {
            if let Some(symbol) = cell.borrow_mut().take() {
                symbols.release(&symbol);
            }
        }
    }

    fn resolved_symbol(
        &self,
        modules: &ModuleCache,
        symbols: &SymbolCache,
        search: &dyn PackageSearch,
    ) -> Result<Rc<ModuleSymbol>, Error> {
        match &self.language {
            Language::Native(cell) => {
                if let Some(symbol) = cell.borrow().as_ref() {
                    return Ok(Rc::clone(symbol));
                }
                let name = FunctionName::parse(&self.def.name);
                let symbol = symbols.resolve(modules, search, &name)?;
                *cell.borrow_mut() = Some(Rc::clone(&symbol));
                Ok(symbol)
            }
            Language::Script(_) | Language::Builtin(_) => Err(Diagnostics::set(Error::Client(
                ClientError::ProcC("unsupported language".to_string()),
            ))),
        }
    }

    /// Dispatch this function (§4.G): access check, setuid swap, then
    /// invoke through the language backing (§4.F for the native case).
    ///
    /// Reads the calling task's effective identity from
    /// [`EffectiveUser`] rather than a parameter — the caller is
    /// expected to have set it before this runs, matching the
    /// original's ambient `fiber()->credentials`.
    pub fn call(
        &self,
        task: &TaskContext,
        privileges: &dyn PrivilegeStore,
        users: &dyn UserDirectory,
        modules: &ModuleCache,
        symbols: &SymbolCache,
        search: &dyn PackageSearch,
        args: &ArgsPort,
    ) -> Result<RetPort, Error> {
        let effective = EffectiveUser::get().ok_or_else(|| {
            Diagnostics::set(Error::IllegalParams(
                "no effective user set for this task".to_string(),
            ))
        })?;

        self.access_check(&effective, privileges)?;

        if self.def.setuid {
            let owner = self.owner_credentials(users)?;
            debug!(function = %self.def.name, owner = owner.user.0, "setuid swap");
            EffectiveUser::set(owner);
        }

        let result = match self.resolved_symbol(modules, symbols, search) {
            Ok(symbol) => proc_dispatch::call(task, &symbol, args),
            Err(err) => Err(err),
        };

        if self.def.setuid {
            EffectiveUser::set(effective);
        }

        result
    }
}
