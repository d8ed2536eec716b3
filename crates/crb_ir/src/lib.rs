//! Syntax tree consumed by the Crowbar runtime.
//!
//! The tree is produced by an external front end (or assembled directly with
//! the helpers in [`build`]) and is only ever read by the evaluator.
mod ast;
pub mod build;
mod program;

pub use ast::*;
pub use program::*;
