//! Diagnostic vocabulary shared by the Crowbar runtime and its embedders.

mod loc;

pub use loc::{DiagnosticKind, DiagnosticsFormatter};
