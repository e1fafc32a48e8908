//! Unit-at-a-time lowering and evaluation.

use kofl_canon::{lower_module, CompileError};
use kofl_eval::{stdout_handler, EvalError, Interpreter, KoflObject, SharedPrintHandler};
use kofl_ir::ast::Stmt;
use kofl_ir::Descriptor;
use kofl_types::TypeScope;

use crate::SessionError;

/// How a [`Session`] is set up.
#[derive(Clone)]
pub struct SessionConfig {
    /// Where `println` writes.
    pub print_handler: SharedPrintHandler,
    /// Emit every lowered descriptor at `debug` level.
    pub trace_descriptors: bool,
}

impl SessionConfig {
    #[must_use]
    pub fn with_print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = handler;
        self
    }

    #[must_use]
    pub fn with_trace_descriptors(mut self, enabled: bool) -> Self {
        self.trace_descriptors = enabled;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            print_handler: stdout_handler(),
            trace_descriptors: false,
        }
    }
}

/// A type scope and a global environment that persist across units.
///
/// A unit that fails to lower leaves the type scope as it was. A unit that
/// fails at runtime keeps whatever it declared before failing.
pub struct Session {
    scope: TypeScope,
    interpreter: Interpreter,
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, EvalError> {
        let interpreter = Interpreter::builder()
            .print_handler(config.print_handler.clone())
            .build()?;
        Ok(Session {
            scope: TypeScope::with_builtins(),
            interpreter,
            config,
        })
    }

    pub fn scope(&self) -> &TypeScope {
        &self.scope
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.config.print_handler
    }

    /// Lower `stmts` against a copy of the scope, committing it only on
    /// success.
    pub fn compile(&mut self, stmts: &[Stmt]) -> Result<Vec<Descriptor>, CompileError> {
        let mut scope = self.scope.clone();
        let unit = lower_module(&mut scope, stmts)?;
        self.scope = scope;
        if self.config.trace_descriptors {
            for descriptor in &unit {
                tracing::debug!(line = %descriptor.line, "{descriptor}");
            }
        }
        Ok(unit)
    }

    /// Lower and evaluate one unit, returning the value of each statement.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = stmts.len()))]
    pub fn run(&mut self, stmts: &[Stmt]) -> Result<Vec<KoflObject>, SessionError> {
        let unit = self.compile(stmts)?;
        Ok(self.interpreter.evaluate_unit(&unit)?)
    }

    /// Like [`Session::run`], keeping only the last value (Unit for an
    /// empty unit).
    pub fn eval(&mut self, stmts: &[Stmt]) -> Result<KoflObject, SessionError> {
        Ok(self.run(stmts)?.pop().unwrap_or(KoflObject::Unit))
    }
}
