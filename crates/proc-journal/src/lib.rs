//! Write-ahead log admission queue (§4.H).
//!
//! Bounding how many entries may be in flight to the (out-of-scope)
//! on-disk log at once, with FIFO fairness among whoever is waiting for
//! room: nobody jumps the queue, and a synchronous writer can force the
//! whole queue through as a drain barrier.

mod config;
mod entry;
mod queue;

pub use config::JournalConfig;
pub use entry::{JournalEntry, JournalWriter};
pub use queue::JournalQueue;
