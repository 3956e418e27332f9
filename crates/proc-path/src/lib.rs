//! Locate a module file by symbolic package name.
//!
//! The actual search is delegated to a host-supplied callback (the
//! scripting host's package search, out of scope for this crate); what
//! lives here is the dotted-name splitting and the thin wrapper around
//! that callback that turns "not found" into a [`ClientError::LoadModule`].

use std::path::{Path, PathBuf};

use proc_diag::{ClientError, Diagnostics, Error};

mod search;

pub use search::{DirectorySearch, PackageSearch};

/// A parsed `pkg.sub.fn` function name.
///
/// `module.submodule.function` splits into package `module.submodule`
/// and symbol `function`. A name with no dot splits into package ==
/// symbol == the whole name (a self-named function in its own package).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionName {
    pub package: String,
    pub symbol: String,
}

impl FunctionName {
    /// Split `name` the way the original's `func_split_name` does.
    pub fn parse(name: &str) -> FunctionName {
        match name.rfind('.') {
            Some(at) => FunctionName {
                package: name[..at].to_string(),
                symbol: name[at + 1..].to_string(),
            },
            None => FunctionName {
                package: name.to_string(),
                symbol: name.to_string(),
            },
        }
    }
}

/// Resolve `package` to an absolute path using `search`.
///
/// Failure modes: `search` returns `None` (client error, not found) or
/// the resolved path fails to canonicalize (system error).
pub fn resolve(search: &dyn PackageSearch, package: &str) -> Result<PathBuf, Error> {
    let found = search.search(package).ok_or_else(|| {
        Diagnostics::set(Error::Client(ClientError::LoadModule(format!(
            "module '{package}' not found"
        ))))
    })?;
    canonicalize(&found)
}

fn canonicalize(path: &Path) -> Result<PathBuf, Error> {
    std::fs::canonicalize(path)
        .map_err(|err| Diagnostics::set(Error::from_io("realpath", err)))
}
