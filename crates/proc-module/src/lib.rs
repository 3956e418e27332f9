//! Module loader and module cache (§4.A–C, §4.E module half).
//!
//! Locating, copying, loading, reference-counting, reloading and
//! evicting native extension libraries. Every operation here runs on
//! the single scheduler thread; there is no locking because there is no
//! cross-thread access.

mod cache;
mod loader;
mod module;
mod stat;

pub use cache::ModuleCache;
pub use loader::load;
pub use module::{Module, ModuleId};
pub use stat::FileStamp;
