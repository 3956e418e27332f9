use thiserror::Error;

/// Errors surfaced to a client of the dynamic stored-procedure runtime.
///
/// Named after the Tarantool error kinds this subsystem is modeled on
/// (`ER_LOAD_MODULE`, `ER_LOAD_FUNCTION`, `ER_NO_SUCH_MODULE`,
/// `ER_PROC_C`, `ER_ACCESS_DENIED`): each variant carries the raw
/// message produced at the point of failure (the resolver's or loader's
/// OS error string, the symbol name, the effective user and function
/// name) so it stays debuggable at the boundary.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The resolver or loader could not produce a usable mapping for a
    /// package.
    #[error("failed to load module: {0}")]
    LoadModule(String),

    /// The symbol was absent in an otherwise successfully loaded module.
    #[error("failed to load function: {0}")]
    LoadFunction(String),

    /// A reload was requested for a package that isn't in the cache.
    #[error("no such module: {0}")]
    NoSuchModule(String),

    /// The dispatched function returned non-zero.
    #[error("function raised an error: {0}")]
    ProcC(String),

    /// The access check rejected the caller.
    #[error("{0}")]
    AccessDenied(String),
}
