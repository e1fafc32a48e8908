//! Runtime errors and the non-local return signal.
//!
//! Evaluation returns [`EvalResult`]. Its error channel carries a
//! [`ControlAction`]: either a real error, or a `return` unwinding towards
//! the nearest callable invocation. `?` propagates both unchanged; only
//! callable invocation turns a `Return` back into a value.

use std::fmt;

use kofl_diagnostic::{Diagnostic, ErrorCode};
use kofl_ir::Line;
use thiserror::Error;

use crate::value::KoflObject;

/// Result of evaluating one descriptor.
pub type EvalResult<T = KoflObject> = Result<T, ControlAction>;

/// Out-of-band outcomes of evaluation.
#[derive(Clone, Debug)]
pub enum ControlAction {
    /// A `return` on its way to the enclosing invocation.
    Return(KoflObject),
    Error(Box<EvalError>),
}

impl ControlAction {
    /// The error this action amounts to once no invocation is left to
    /// catch it. A stray `return` becomes [`EvalErrorKind::UncaughtReturn`].
    pub fn into_error(self) -> EvalError {
        match self {
            ControlAction::Error(error) => *error,
            ControlAction::Return(_) => EvalError::new(EvalErrorKind::UncaughtReturn),
        }
    }
}

impl From<EvalError> for ControlAction {
    fn from(error: EvalError) -> Self {
        ControlAction::Error(Box::new(error))
    }
}

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    #[error("var {name} does not exist")]
    UndefinedVariable { name: String },

    #[error("function {name} does not exist")]
    UndefinedFunction { name: String },

    #[error("var {name} already declared")]
    AlreadyDeclaredVariable { name: String },

    #[error("var {name} is immutable")]
    ReassignImmutableVariable { name: String },

    #[error("expected {expected} but got {found}")]
    InvalidType { expected: String, found: String },

    #[error("missing return in {function}")]
    MissingReturn { function: String },

    #[error("module {name} does not exist")]
    UndefinedModule { name: String },

    #[error("module {name} must be declared in the global environment")]
    ModuleOutsideGlobal { name: String },

    #[error("invalid operands for {op}: {left} and {right}")]
    InvalidOperands {
        op: String,
        left: String,
        right: String,
    },

    #[error("{feature} is not supported")]
    Unsupported { feature: String },

    #[error("return outside of a function")]
    UncaughtReturn,
}

impl EvalErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalErrorKind::UndefinedVariable { .. } => ErrorCode::E6001,
            EvalErrorKind::UndefinedFunction { .. } => ErrorCode::E6002,
            EvalErrorKind::AlreadyDeclaredVariable { .. } => ErrorCode::E6003,
            EvalErrorKind::ReassignImmutableVariable { .. } => ErrorCode::E6004,
            EvalErrorKind::InvalidType { .. } => ErrorCode::E6005,
            EvalErrorKind::MissingReturn { .. } => ErrorCode::E6006,
            EvalErrorKind::UndefinedModule { .. } => ErrorCode::E6007,
            EvalErrorKind::ModuleOutsideGlobal { .. } => ErrorCode::E6008,
            EvalErrorKind::InvalidOperands { .. } => ErrorCode::E6009,
            EvalErrorKind::Unsupported { .. } => ErrorCode::E6010,
            EvalErrorKind::UncaughtReturn => ErrorCode::E9001,
        }
    }
}

/// One frame of a reconstructed call stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// What opened the frame: `call add-1`, `block`, `while`, ...
    pub name: String,
    pub line: Line,
}

/// Call stack rebuilt from the call sites of nested environments,
/// innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        f.write_str("stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "\n  {i}: {} at {}", frame.name, frame.line)?;
        }
        Ok(())
    }
}

/// A runtime error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Line of the descriptor being evaluated, once known.
    pub line: Option<Line>,
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            line: None,
            backtrace: None,
        }
    }

    /// Attach the line if none was attached closer to the failure.
    #[must_use]
    pub fn at(mut self, line: Line) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    /// Attach a backtrace if none was attached closer to the failure.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() && !backtrace.is_empty() {
            self.backtrace = Some(backtrace);
        }
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(self.kind.code()).with_message(self.to_string());
        if let Some(line) = self.line {
            diagnostic = diagnostic.at(line);
        }
        if let Some(backtrace) = &self.backtrace {
            diagnostic = diagnostic.with_note(backtrace.to_string());
        }
        diagnostic
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

// Factories

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    }
    .into()
}

#[cold]
pub fn undefined_function(name: &str) -> EvalError {
    EvalErrorKind::UndefinedFunction {
        name: name.to_string(),
    }
    .into()
}

#[cold]
pub fn already_declared(name: &str) -> EvalError {
    EvalErrorKind::AlreadyDeclaredVariable {
        name: name.to_string(),
    }
    .into()
}

#[cold]
pub fn reassign_immutable(name: &str) -> EvalError {
    EvalErrorKind::ReassignImmutableVariable {
        name: name.to_string(),
    }
    .into()
}

#[cold]
pub fn invalid_type(expected: impl fmt::Display, found: impl fmt::Display) -> EvalError {
    EvalErrorKind::InvalidType {
        expected: expected.to_string(),
        found: found.to_string(),
    }
    .into()
}

#[cold]
pub fn missing_return(function: &str) -> EvalError {
    EvalErrorKind::MissingReturn {
        function: function.to_string(),
    }
    .into()
}

#[cold]
pub fn unsupported(feature: &str) -> EvalError {
    EvalErrorKind::Unsupported {
        feature: feature.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_messages() {
        assert_eq!(reassign_immutable("z").to_string(), "var z is immutable");
        assert_eq!(already_declared("x").to_string(), "var x already declared");
        assert_eq!(
            invalid_type("callable", "Int").to_string(),
            "expected callable but got Int"
        );
    }

    #[test]
    fn test_first_line_wins() {
        let error = undefined_variable("x").at(Line::new(2)).at(Line::new(9));
        assert_eq!(error.line, Some(Line::new(2)));
    }

    #[test]
    fn test_backtrace_display() {
        let backtrace = EvalBacktrace::new(vec![
            BacktraceFrame {
                name: "block".into(),
                line: Line::new(4),
            },
            BacktraceFrame {
                name: "call f-0".into(),
                line: Line::new(2),
            },
        ]);
        assert_eq!(
            backtrace.to_string(),
            "stack backtrace:\n  0: block at line 4\n  1: call f-0 at line 2"
        );
    }

    #[test]
    fn test_diagnostic_carries_backtrace() {
        let backtrace = EvalBacktrace::new(vec![BacktraceFrame {
            name: "call f-0".into(),
            line: Line::new(1),
        }]);
        let diagnostic = missing_return("f-0")
            .at(Line::new(1))
            .with_backtrace(backtrace)
            .to_diagnostic();
        assert_eq!(diagnostic.code, ErrorCode::E6006);
        assert_eq!(diagnostic.notes.len(), 1);
    }

    #[test]
    fn test_stray_return_becomes_uncaught() {
        let error = ControlAction::Return(KoflObject::Unit).into_error();
        assert_eq!(error.kind, EvalErrorKind::UncaughtReturn);
        let error = ControlAction::from(undefined_function("f-0")).into_error();
        assert_eq!(error.kind.code(), ErrorCode::E6002);
    }

    #[test]
    fn test_empty_backtrace_is_not_attached() {
        let error = unsupported("classes").with_backtrace(EvalBacktrace::default());
        assert_eq!(error.backtrace, None);
    }
}
