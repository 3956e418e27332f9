//! §8 scenario 3: a first resolution that fails at `dlsym` rolls the
//! module cache back to empty instead of leaving a useless entry.

mod support;

use proc_runtime::{
    ArgsPort, DirectorySearch, EffectiveUser, FunctionDef, Runtime, RuntimeConfig, TaskContext,
    UserId,
};

#[test]
fn missing_symbol_rolls_back_the_module_cache() {
    let dir = tempfile::tempdir().unwrap();
    support::install_fixture(dir.path(), "m");

    let runtime = Runtime::new(
        Box::new(DirectorySearch::new(dir.path())),
        Box::new(support::AllowAll),
        Box::new(support::NoUsers),
        RuntimeConfig::default(),
    );

    runtime.define_function(FunctionDef {
        name: "m.does_not_exist".to_string(),
        owner: UserId(1),
        setuid: false,
    });

    EffectiveUser::clear();
    EffectiveUser::set(support::full_access(1));

    assert!(!runtime.module_cache().contains("m"));

    let task = TaskContext::new();
    let args = ArgsPort::from_values(&[]).unwrap();
    let err = runtime
        .call(&task, "m.does_not_exist", &args)
        .unwrap_err();

    assert!(matches!(
        err,
        proc_diag::Error::Client(proc_diag::ClientError::LoadFunction(_))
    ));
    // The failed resolve is what would have loaded "m" in the first
    // place; since it never got far enough to be useful, it's rolled
    // back rather than left dangling.
    assert!(!runtime.module_cache().contains("m"));

    EffectiveUser::clear();
}
