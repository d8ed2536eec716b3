//! Runtime error type and the unwinding signal used inside the evaluator.

use crb_syntax::{DiagnosticKind, DiagnosticsFormatter};

use crate::core::Value;

/// A runtime error, reported with the file and line it originated from.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{file}:{line}: {}", DiagnosticsFormatter::format(.kind))]
pub struct RuntimeError {
    pub kind: DiagnosticKind,
    pub file: String,
    pub line: u32,
}

impl RuntimeError {
    pub fn new(kind: DiagnosticKind, file: &str, line: u32) -> Self {
        Self {
            kind,
            file: file.to_string(),
            line,
        }
    }

    pub fn message(&self) -> String {
        DiagnosticsFormatter::format(&self.kind)
    }
}

/// Why evaluation stopped early.
///
/// `Throw` is a user exception and can be caught by `try`. `Error` is a
/// runtime error and always aborts the current program.
#[derive(Debug)]
pub(crate) enum Unwind {
    Throw(Value),
    Error(Box<RuntimeError>),
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Unwind::Error(Box::new(err))
    }
}

pub(crate) type ExecOutcome<T> = Result<T, Unwind>;
