//! AST-based executor.
//!
//! Expressions push exactly one value onto the shared value stack; statements
//! leave the stack as they found it and report a [`crate::Flow`].

mod call;
mod expr;
mod lvalue;
mod ops;
mod stmt;
