//! Runtime configuration and result types.

use crate::core::Value;

/// Result of executing a program.
#[derive(Debug)]
pub struct ExecResult {
    /// Value of a top-level `return`, if one ran. Heap references stay valid
    /// until the next collection unless the caller roots them.
    pub value: Option<Value>,
    pub output: String,
}

/// Runtime configuration options.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    /// Bytes the heap may grow past its live size before the next collection.
    pub heap_threshold_step: usize,
    /// Values added to the stack's capacity each time it fills up.
    pub stack_alloc_step: usize,
    /// Upper bound on spare slots reserved when an array grows.
    pub array_alloc_step: usize,
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            heap_threshold_step: 256 * 1024,
            stack_alloc_step: 256,
            array_alloc_step: 1024,
            max_call_depth: 1024,
        }
    }
}

/// Control flow result from statement execution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}
