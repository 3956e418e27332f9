//! §8 scenario 6: a changed file attribute (mtime) makes the next
//! `load_or_get` pick up a new module id; the old module is orphaned
//! and freed once its last reference drops.
//!
//! This exercises `ModuleCache`/`DirectorySearch` directly — the module
//! half of the reference lifecycle, with no function/dispatch layer
//! needed to observe it.

mod support;

use proc_runtime::{DirectorySearch, ModuleCache};

#[test]
fn attribute_change_reload_produces_new_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = support::install_fixture(dir.path(), "m");
    let search = DirectorySearch::new(dir.path());
    let modules = ModuleCache::new();

    let first = modules.load_or_get(&search, "m").unwrap();
    assert!(first.is_live());

    support::bump_mtime(&path);

    let second = modules.load_or_get(&search, "m").unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(modules.find("m").unwrap().id(), second.id());

    // The old module is orphaned (no longer reachable through the
    // cache) but stays mapped as long as something still holds it.
    assert!(first.is_live());

    first.release();
    assert!(!first.is_live());
    assert!(second.is_live());

    second.release();
}
