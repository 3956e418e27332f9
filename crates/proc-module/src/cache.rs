use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use proc_diag::{Diagnostics, Error};
use proc_path::PackageSearch;
use tracing::info;

use crate::loader;
use crate::module::Module;

/// `package_name -> Module` mapping. At most one live (non-orphan)
/// module per package name. A module removed from the cache (by
/// `update` or `delete`) is not freed if it's still referenced — it
/// becomes an orphan, reachable only through surviving symbols or
/// in-flight calls, never again through this cache.
#[derive(Default)]
pub struct ModuleCache {
    modules: RefCell<HashMap<String, Rc<Module>>>,
}

impl ModuleCache {
    pub fn new() -> ModuleCache {
        ModuleCache::default()
    }

    pub fn find(&self, name: &str) -> Option<Rc<Module>> {
        self.modules.borrow().get(name).cloned()
    }

    pub fn put(&self, module: Rc<Module>) {
        self.modules
            .borrow_mut()
            .insert(module.package().to_string(), module);
    }

    /// Replace the cached entry for `name` with `module`. The caller is
    /// responsible for the old value becoming an orphan (we simply stop
    /// holding it).
    pub fn update(&self, name: &str, module: Rc<Module>) -> Result<(), Error> {
        let mut modules = self.modules.borrow_mut();
        if !modules.contains_key(name) {
            // The caller found this entry moments ago with no yield in
            // between (§5 "no yield between look up and insert"); a miss
            // here means the cache is corrupted.
            panic!("module cache lost entry '{name}' between find and update");
        }
        modules.insert(name.to_string(), module);
        Ok(())
    }

    pub fn delete(&self, name: &str) {
        self.modules.borrow_mut().remove(name);
    }

    /// Resolve `package` to a loaded, referenced module:
    /// - cache hit with matching file attributes: bump the refcount and
    ///   return it;
    /// - cache hit with stale attributes: load the new binary, swap the
    ///   cache entry (the old module becomes an orphan), log an info
    ///   event;
    /// - cache miss: load and insert.
    pub fn load_or_get(
        &self,
        search: &dyn PackageSearch,
        package: &str,
    ) -> Result<Rc<Module>, Error> {
        let source = proc_path::resolve(search, package)?;
        let fresh_stamp = {
            let metadata = std::fs::metadata(&source)
                .map_err(|err| Diagnostics::set(Error::from_io("stat", err)))?;
            crate::stat::FileStamp::capture(&metadata)
        };

        if let Some(existing) = self.find(package) {
            if existing.stamp() == fresh_stamp {
                existing.acquire();
                return Ok(existing);
            }
            let reloaded = Rc::new(loader::load(package, &source)?);
            reloaded.acquire();
            self.update(package, Rc::clone(&reloaded))?;
            info!(package, "module reloaded: file attributes changed");
            return Ok(reloaded);
        }

        let fresh = Rc::new(loader::load(package, &source)?);
        fresh.acquire();
        self.put(Rc::clone(&fresh));
        Ok(fresh)
    }

    /// Load a fresh copy of `package` unconditionally, regardless of
    /// what (if anything) is cached, and install it as the live entry.
    /// Used by an explicit `reload("pkg")` request (§8 scenario 2); the
    /// old entry — if any — becomes an orphan.
    ///
    /// Unlike `load_or_get`, the returned module is not pre-acquired:
    /// there's no symbol standing by to take ownership of that ref
    /// here, so the new entry starts at `refs() == 0` until the next
    /// resolve picks it up (a cache-resident module with zero refs is
    /// expected, not a leak — see `proc-symbol`'s notes on this).
    pub fn reload(&self, search: &dyn PackageSearch, package: &str) -> Result<Rc<Module>, Error> {
        use proc_diag::ClientError;

        if self.find(package).is_none() {
            return Err(Diagnostics::set(Error::Client(ClientError::NoSuchModule(
                package.to_string(),
            ))));
        }
        let source = proc_path::resolve(search, package)?;
        let reloaded = Rc::new(loader::load(package, &source)?);
        self.update(package, Rc::clone(&reloaded))?;
        Ok(reloaded)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
