//! Diagnostics for Kofl.
//!
//! Compile-time and runtime failures are separate error types in their own
//! crates; both convert into a [`Diagnostic`] for display. A diagnostic is
//! an [`ErrorCode`] (searchable), a one-line message, the source line when
//! known, and optional notes (e.g. a reconstructed call stack).

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
