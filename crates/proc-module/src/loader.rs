use std::path::Path;

use libloading::Library;
use proc_diag::{ClientError, Diagnostics, Error};
use proc_path::DYLIB_EXTENSION;
use tracing::warn;

use crate::module::Module;
use crate::stat::FileStamp;

/// Copy `source` to a unique scratch path, map it, and unlink the copy.
///
/// Copy-then-unlink defeats loader caches that would otherwise refuse to
/// map a rewritten file at the same path, which is what makes true
/// in-place reload possible: unlinking a file while it's still mapped
/// is safe on every platform this runtime supports.
pub fn load(package: &str, source: &Path) -> Result<Module, Error> {
    let metadata = std::fs::metadata(source)
        .map_err(|err| Diagnostics::set(Error::from_io("stat", err)))?;
    let stamp = FileStamp::capture(&metadata);

    let tmpdir = std::env::var("TMPDIR").unwrap_or_else(|_| "/tmp".to_string());
    let scratch = tempfile::Builder::new()
        .prefix("proc")
        .rand_bytes(8)
        .tempdir_in(&tmpdir)
        .map_err(|err| Diagnostics::set(Error::from_io("mkdtemp", err)))?;

    let copy_path = scratch.path().join(format!("{package}.{DYLIB_EXTENSION}"));
    std::fs::copy(source, &copy_path)
        .map_err(|err| Diagnostics::set(Error::from_io("copy module", err)))?;

    // SAFETY: the copy is a file we just wrote ourselves from a path the
    // host's package search resolved; the runtime's whole premise is
    // that loaded modules are trusted binaries (see Non-goals).
    let library = unsafe { Library::new(&copy_path) }.map_err(|err| {
        Diagnostics::set(Error::Client(ClientError::LoadModule(format!(
            "failed to load module '{package}': {err}"
        ))))
    })?;

    if let Err(err) = std::fs::remove_file(&copy_path) {
        warn!(package, error = %err, "failed to unlink scratch copy of module");
    }
    if let Err(err) = scratch.close() {
        warn!(package, error = %err, "failed to remove scratch directory for module");
    }

    Ok(Module::new(package.to_string(), stamp, library))
}
