use kofl_canon::CompileError;
use kofl_diagnostic::{Diagnostic, ErrorCode};
use kofl_eval::EvalError;
use thiserror::Error;

/// Anything that can go wrong running a unit or a program.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] EvalError),

    #[error("no function main() returning Int")]
    MainNotFound,

    #[error("main returned {found}, expected Int")]
    MainReturnedNotInt { found: String },
}

impl SessionError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SessionError::Compile(error) => error.to_diagnostic(),
            SessionError::Runtime(error) => error.to_diagnostic(),
            SessionError::MainNotFound => {
                Diagnostic::error(ErrorCode::E6011).with_message(self.to_string())
            }
            SessionError::MainReturnedNotInt { .. } => {
                Diagnostic::error(ErrorCode::E6012).with_message(self.to_string())
            }
        }
    }
}
