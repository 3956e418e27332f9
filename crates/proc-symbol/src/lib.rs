//! Symbol registry and reference lifecycle (§4.D, symbol half of §4.E).
//!
//! Resolving a dotted function name to a callable address, keyed richer
//! than the name alone so a reload always yields a fresh symbol. Runs
//! on the single scheduler thread alongside `proc-module`.

mod registry;
mod symbol;

pub use registry::SymbolCache;
pub use symbol::ModuleSymbol;
