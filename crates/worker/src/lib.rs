//! Execution primitives for command dispatch.
//!
//! * [`spawn_blocking`] and friends run work on a shared tokio runtime.
//! * [`MainContext`] marshals closures onto one serial thread owned by the host.
//! * [`MemoCell`] computes a value once and shares it with every caller.

mod class;
mod main_context;
mod memo;
mod panic;
mod spawn;

pub use class::TaskClass;
pub use main_context::{CallError, MainContext, MainLoop};
pub use memo::{MemoCell, MemoState};
pub use panic::{join_error_panic_message, panic_message};
pub use spawn::{runtime_handle, spawn, spawn_blocking, spawn_named_thread};
