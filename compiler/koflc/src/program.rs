//! Whole-program entry point.

use kofl_eval::{Arguments, EvalError};
use kofl_ir::ast::Stmt;
use kofl_types::Type;

use crate::{Session, SessionConfig, SessionError};

/// A program: a unit whose `main(): Int` is run after its declarations.
pub struct Program {
    session: Session,
}

impl Program {
    pub fn new(config: SessionConfig) -> Result<Self, EvalError> {
        Ok(Program {
            session: Session::new(config)?,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Evaluate `stmts`, then call `main` and return its Int result.
    ///
    /// `main` takes no parameters and is declared to return `Int` (or
    /// `Any`, checked when it returns).
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, stmts: &[Stmt]) -> Result<i64, SessionError> {
        self.session.run(stmts)?;

        let int = Type::int();
        let entry = self
            .session
            .scope()
            .lookup_function_overload("main")
            .into_iter()
            .find(|overload| {
                overload.ty.parameters().is_empty()
                    && overload.ty.receiver().is_none()
                    && (int.is_assignable_by(overload.ty.return_type())
                        || overload.ty.return_type().is_any())
            })
            .ok_or(SessionError::MainNotFound)?;
        tracing::debug!(entry = %entry.name, "main");

        let value = self
            .session
            .interpreter()
            .call_function(&entry.name, &Arguments::new())
            .map_err(|action| SessionError::Runtime(action.into_error()))?;
        value
            .as_int()
            .ok_or_else(|| SessionError::MainReturnedNotInt {
                found: value.ty().to_string(),
            })
    }
}
