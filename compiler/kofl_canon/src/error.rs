//! Compile-time errors.

use kofl_diagnostic::{Diagnostic, ErrorCode};
use kofl_ir::Line;
use thiserror::Error;

/// A failure during semantic lowering. Aborts the current unit.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("variable {name} not found")]
    UnresolvedVariable { name: String, line: Line },

    #[error("function {name} not found")]
    UnresolvedFunction { name: String, line: Line },

    #[error("unresolved parameter {index}")]
    UnresolvedParameter { index: usize, line: Line },

    #[error("expected {expected} but got {found}")]
    UnexpectedType {
        expected: String,
        found: String,
        line: Line,
    },

    #[error("missing return in function {function}")]
    MissingReturn { function: String, line: Line },

    #[error("{name} is already resolved in this scope")]
    AlreadyResolvedVariable { name: String, line: Line },

    #[error("class declaration is missing a name")]
    ClassMissingName { line: Line },
}

impl CompileError {
    pub fn line(&self) -> Line {
        match self {
            CompileError::UnresolvedVariable { line, .. }
            | CompileError::UnresolvedFunction { line, .. }
            | CompileError::UnresolvedParameter { line, .. }
            | CompileError::UnexpectedType { line, .. }
            | CompileError::MissingReturn { line, .. }
            | CompileError::AlreadyResolvedVariable { line, .. }
            | CompileError::ClassMissingName { line } => *line,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::UnresolvedVariable { .. } => ErrorCode::E2001,
            CompileError::UnresolvedFunction { .. } => ErrorCode::E2002,
            CompileError::UnresolvedParameter { .. } => ErrorCode::E2003,
            CompileError::UnexpectedType { .. } => ErrorCode::E2004,
            CompileError::MissingReturn { .. } => ErrorCode::E2005,
            CompileError::AlreadyResolvedVariable { .. } => ErrorCode::E2006,
            CompileError::ClassMissingName { .. } => ErrorCode::E2007,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .at(self.line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unexpected_type_message() {
        let error = CompileError::UnexpectedType {
            expected: "Boolean".into(),
            found: "Int".into(),
            line: Line::new(4),
        };
        assert_eq!(error.to_string(), "expected Boolean but got Int");
        assert_eq!(
            error.to_diagnostic().to_string(),
            "error[E2004]: expected Boolean but got Int\n  --> line 4"
        );
    }

    #[test]
    fn test_codes_are_compile_codes() {
        let error = CompileError::ClassMissingName { line: Line::new(1) };
        assert!(error.code().is_compile_error());
        assert_eq!(error.line(), Line::new(1));
    }
}
