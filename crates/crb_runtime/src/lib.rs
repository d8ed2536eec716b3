//! Crowbar language runtime.
//!
//! Executes programs given as [`crb_ir::Program`] trees over a managed heap
//! with a mark-and-sweep collector, a shared value stack and scope-chain
//! variable resolution.

#![allow(clippy::collapsible_if)]
#![allow(clippy::unnecessary_cast)]

pub mod core;
pub mod errors;
mod ast_exec;
mod util;

mod runtime;
mod builtins;
pub mod builtins_registry;
mod methods;

pub use builtins::FILE_POINTER_INFO;
pub use builtins_registry::{NativeFn, NativeProvider, NativeRegistry, StdNativeProvider};
pub use core::Value;
pub use errors::RuntimeError;
pub use runtime::{CallSite, ExecResult, Flow, Frame, FrameRef, Runtime, RuntimeConfig, ValueStack};
pub use util::Appendable;
