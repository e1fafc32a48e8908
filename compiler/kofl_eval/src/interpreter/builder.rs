//! `InterpreterBuilder` for configuring an [`Interpreter`].

use rustc_hash::FxHashMap;
use std::cell::RefCell;

use super::Interpreter;
use crate::builtins::initialize;
use crate::environment::Environment;
use crate::errors::EvalError;
use crate::native::NativeRegistry;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::value::NativeFn;

/// Builder for [`Interpreter`]. Defaults to printing on stdout with the
/// standard natives.
#[derive(Default)]
pub struct InterpreterBuilder {
    print_handler: Option<SharedPrintHandler>,
    natives: Vec<(String, NativeFn)>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where `println` writes.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Add (or replace) a native implementation.
    #[must_use]
    pub fn native(mut self, name: impl Into<String>, native: NativeFn) -> Self {
        self.natives.push((name.into(), native));
        self
    }

    /// Create the global environment and run the builtin bootstrap on it.
    pub fn build(self) -> Result<Interpreter, EvalError> {
        let print = self.print_handler.unwrap_or_else(stdout_handler);
        let mut natives = NativeRegistry::standard(print.clone());
        for (name, native) in self.natives {
            natives.register(name, native);
        }

        let global = Environment::global();
        let classes = initialize(&global)?;
        Ok(Interpreter {
            global,
            modules: RefCell::new(FxHashMap::default()),
            classes,
            natives,
            print,
        })
    }
}
