use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use proc_diag::{ClientError, Diagnostics, Error};
use proc_module::{Module, ModuleCache, ModuleId};
use proc_path::{FunctionName, PackageSearch};
use tracing::debug;

use crate::symbol::ModuleSymbol;

/// `(module_id, package_name, symbol_name) -> ModuleSymbol` mapping.
///
/// Keyed richer than strictly necessary — `module_id` alone already
/// disambiguates a reload — so that resolving the same name against a
/// reloaded module always misses and yields a distinct `ModuleSymbol`,
/// which is what makes this the canonical implementation rather than a
/// plain `package.symbol`-keyed façade (see the Open Question on two
/// historical module-cache implementations).
#[derive(Default)]
pub struct SymbolCache {
    symbols: RefCell<HashMap<(ModuleId, String, String), Rc<ModuleSymbol>>>,
}

impl SymbolCache {
    pub fn new() -> SymbolCache {
        SymbolCache::default()
    }

    /// Resolve `function` to a shared, referenced symbol, loading its
    /// module on demand via `module_cache`.
    pub fn resolve(
        &self,
        module_cache: &ModuleCache,
        search: &dyn PackageSearch,
        function: &FunctionName,
    ) -> Result<Rc<ModuleSymbol>, Error> {
        let existed_before = module_cache.contains(&function.package);
        // `pre_acquired` tracks whether `module_cache.load_or_get` just
        // handed us a ref that no symbol owns yet (a fresh load). On a
        // plain cache hit via `find`, no ref is taken — any existing
        // symbol already holds the one the module needs.
        let (module, pre_acquired) = match module_cache.find(&function.package) {
            Some(module) => (module, false),
            None => {
                let fresh = module_cache.load_or_get(search, &function.package)?;
                (fresh, true)
            }
        };

        let key = (module.id(), function.package.clone(), function.symbol.clone());
        if let Some(existing) = self.symbols.borrow().get(&key) {
            if pre_acquired {
                // An existing symbol already accounts for the module's
                // ref; this lookup's own ref is surplus.
                module.release();
            }
            existing.acquire();
            return Ok(Rc::clone(existing));
        }

        match self.resolve_raw(&module, &function.symbol) {
            Ok(addr) => {
                if !pre_acquired {
                    // `pre_acquired` already carries the one ref this new
                    // symbol needs; otherwise take it now.
                    module.acquire();
                }
                let symbol =
                    Rc::new(ModuleSymbol::new(function.symbol.clone(), Rc::clone(&module), addr));
                symbol.acquire();
                self.symbols.borrow_mut().insert(key, Rc::clone(&symbol));
                debug!(package = %function.package, symbol = %function.symbol, "resolved symbol");
                Ok(symbol)
            }
            Err(err) => {
                if pre_acquired {
                    module.release();
                }
                if !existed_before {
                    // This resolution was the one that caused the module
                    // to be cached; roll that back so we don't leak an
                    // un-useful entry. Preserve the loader's diagnostic —
                    // don't let the rollback itself produce a new error.
                    module_cache.delete(&function.package);
                }
                Err(err)
            }
        }
    }

    fn resolve_raw(&self, module: &Rc<Module>, symbol_name: &str) -> Result<*const (), Error> {
        let name = format!("{symbol_name}\0");
        module.with_library(|lib| {
            // SAFETY: `name` is NUL-terminated and the module is a
            // trusted binary per the runtime's non-goals.
            let sym: libloading::Symbol<'_, *const ()> =
                unsafe { lib.get(name.as_bytes()) }.map_err(|err| {
                    Diagnostics::set(Error::Client(ClientError::LoadFunction(format!(
                        "symbol '{symbol_name}' not found: {err}"
                    ))))
                })?;
            Ok(*sym)
        })
    }

    /// Release one reference on `symbol`. When this was the last
    /// reference, the symbol detaches from its module (removing it from
    /// this cache) and the module's own reference is released in turn,
    /// possibly collecting it.
    pub fn release(&self, symbol: &Rc<ModuleSymbol>) {
        if symbol.release() {
            let key = (
                symbol.module_id(),
                symbol.module().package().to_string(),
                symbol.name().to_string(),
            );
            self.symbols.borrow_mut().remove(&key);
        }
    }

    pub fn contains(&self, module_id: ModuleId, package: &str, symbol: &str) -> bool {
        self.symbols
            .borrow()
            .contains_key(&(module_id, package.to_string(), symbol.to_string()))
    }

    pub fn len(&self) -> usize {
        self.symbols.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
