//! Marshalled call path, arena, and result port (§4.F, §5, §6).
//!
//! Invoking a resolved [`proc_symbol::ModuleSymbol`] against a
//! message-pack argument stream, with arena save/restore on every exit
//! path and the pin that keeps a module mapped across a cooperative
//! yield inside the call.

mod arena;
mod dispatch;
mod port;

pub use arena::Arena;
pub use dispatch::{call, TaskContext};
pub use port::{ArgsPort, EntryPoint, RetPort, RetPortHandle};
