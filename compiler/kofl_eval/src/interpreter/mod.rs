//! Tree-walking evaluation of descriptors.
//!
//! [`Interpreter::evaluate`] maps one descriptor to a [`KoflObject`] in a
//! given environment. `return` travels as [`ControlAction::Return`] until an
//! invocation catches it (see `call.rs`). Errors pick up the line of the
//! innermost descriptor and the call sites of the innermost environment on
//! their way out.

mod builder;
mod call;
mod operators;

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

use kofl_ir::{Descriptor, DescriptorKind, Line};
use kofl_stack::ensure_sufficient_stack;

use crate::builtins::BuiltinClasses;
use crate::environment::{CallSite, Environment, Mutability};
use crate::errors::{invalid_type, unsupported, ControlAction, EvalError, EvalErrorKind, EvalResult};
use crate::native::NativeRegistry;
use crate::print_handler::SharedPrintHandler;
use crate::value::{Callable, ClassObject, KoflObject};

pub use builder::InterpreterBuilder;

pub struct Interpreter {
    global: Environment,
    modules: RefCell<FxHashMap<String, Environment>>,
    classes: BuiltinClasses,
    natives: NativeRegistry,
    print: SharedPrintHandler,
}

impl Interpreter {
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    pub fn global(&self) -> &Environment {
        &self.global
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print
    }

    /// A builtin class object (`String`, `Int`, ...).
    pub fn class(&self, name: &str) -> Option<Rc<ClassObject>> {
        self.classes.get(name).cloned()
    }

    pub fn module(&self, name: &str) -> Option<Environment> {
        self.modules.borrow().get(name).cloned()
    }

    /// Evaluate one compiled unit in the global environment.
    ///
    /// A top-level `module M;` sends the declarations that follow it in the
    /// unit into `M`. A `return` reaching this level is an error. On
    /// failure, everything evaluated before the failing descriptor stays
    /// declared.
    #[tracing::instrument(level = "debug", skip_all, fields(descriptors = unit.len()))]
    pub fn evaluate_unit(&self, unit: &[Descriptor]) -> Result<Vec<KoflObject>, EvalError> {
        let mut target = self.global.clone();
        let mut values = Vec::with_capacity(unit.len());
        for descriptor in unit {
            if let DescriptorKind::Module(name) = &descriptor.kind {
                target = self
                    .declare_module(name, &self.global)
                    .map_err(|error| error.at(descriptor.line))?;
                values.push(KoflObject::Unit);
                continue;
            }
            let value = self
                .evaluate(descriptor, &target)
                .map_err(|action| action.into_error().at(descriptor.line))?;
            values.push(value);
        }
        Ok(values)
    }

    pub fn evaluate(&self, descriptor: &Descriptor, env: &Environment) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(descriptor, env)).map_err(|action| match action {
            ControlAction::Error(error) => {
                ControlAction::Error(Box::new(locate(*error, descriptor.line, env)))
            }
            signal @ ControlAction::Return(_) => signal,
        })
    }

    fn eval_inner(&self, descriptor: &Descriptor, env: &Environment) -> EvalResult {
        let line = descriptor.line;
        match &descriptor.kind {
            DescriptorKind::Const(literal) => Ok(KoflObject::from_literal(literal)),
            DescriptorKind::This => Ok(env.lookup("this")?),
            DescriptorKind::AccessVar(name) => Ok(env.lookup(name)?),
            DescriptorKind::AccessFunction(name) => {
                Ok(KoflObject::Callable(env.lookup_function(name)?))
            }
            DescriptorKind::Val { name, value } => {
                self.eval_binding(name, value, Mutability::Immutable, env)
            }
            DescriptorKind::Var { name, value } => {
                self.eval_binding(name, value, Mutability::Mutable, env)
            }
            DescriptorKind::Assign { name, value } => {
                let value = self.evaluate(value, env)?;
                env.assign(name, value.clone())?;
                Ok(value)
            }
            DescriptorKind::Return(value) => {
                let value = self.evaluate(value, env)?;
                Err(ControlAction::Return(value))
            }
            DescriptorKind::Block(body) => {
                let scope = env.child(Some(CallSite::new("block", line)));
                self.eval_sequence(body, &scope)
            }
            DescriptorKind::While { condition, body } => {
                while self.eval_condition(condition, env)? {
                    let scope = env.child(Some(CallSite::new("while", line)));
                    self.eval_sequence(body, &scope)?;
                }
                Ok(KoflObject::Unit)
            }
            DescriptorKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if self.eval_condition(condition, env)? {
                    then_branch
                } else {
                    else_branch
                };
                let scope = env.child(Some(CallSite::new("if", line)));
                self.eval_sequence(branch, &scope)
            }
            DescriptorKind::Unary { op, right } => {
                let right = self.evaluate(right, env)?;
                Ok(operators::unary(*op, &right)?)
            }
            DescriptorKind::Binary { left, op, right } => {
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                Ok(operators::binary(&left, *op, &right)?)
            }
            DescriptorKind::Logical { left, op, right } => {
                self.eval_logical(left, *op, right, env)
            }
            DescriptorKind::Call { callee, arguments } => {
                self.eval_call(descriptor, callee, arguments, env)
            }
            DescriptorKind::Function(function) => {
                let callable = Callable::Function(Rc::clone(function));
                env.declare_function(&function.name, callable.clone());
                Ok(KoflObject::Callable(callable))
            }
            DescriptorKind::NativeFunction(native) => {
                let callable = Callable::NativeFunction(Rc::clone(native));
                env.declare_function(&native.name, callable.clone());
                Ok(KoflObject::Callable(callable))
            }
            DescriptorKind::LocalFunction(local) => Ok(KoflObject::Callable(Callable::LocalFunction {
                descriptor: Rc::clone(local),
                closure: env.clone(),
            })),
            DescriptorKind::Module(name) => {
                self.declare_module(name, env)?;
                Ok(KoflObject::Unit)
            }
            DescriptorKind::Use(name) => {
                let module = self.module(name).ok_or_else(|| {
                    EvalError::new(EvalErrorKind::UndefinedModule { name: name.clone() })
                })?;
                tracing::debug!(module = %name, "use");
                env.expand(&module);
                Ok(KoflObject::Unit)
            }
            DescriptorKind::Class(class) => Err(unsupported(&format!("class {}", class.name)).into()),
            DescriptorKind::Get { name, .. } => Err(unsupported(&format!("get .{name}")).into()),
            DescriptorKind::Set { name, .. } => Err(unsupported(&format!("set .{name}")).into()),
        }
    }

    fn eval_binding(
        &self,
        name: &str,
        value: &Descriptor,
        mutability: Mutability,
        env: &Environment,
    ) -> EvalResult {
        let value = self.evaluate(value, env)?;
        env.declare(name, value.clone(), mutability)?;
        Ok(value)
    }

    /// Last value of `body`, or Unit when empty.
    fn eval_sequence(&self, body: &[Descriptor], env: &Environment) -> EvalResult {
        let mut last = KoflObject::Unit;
        for descriptor in body {
            last = self.evaluate(descriptor, env)?;
        }
        Ok(last)
    }

    fn eval_condition(&self, condition: &Descriptor, env: &Environment) -> EvalResult<bool> {
        let value = self.evaluate(condition, env)?;
        value
            .as_bool()
            .ok_or_else(|| invalid_type("Boolean", value.ty()).at(condition.line).into())
    }

    /// Register `name` (or reopen it) as a child of the global environment.
    /// Only the global environment may declare modules.
    #[tracing::instrument(level = "debug", skip(self, env))]
    fn declare_module(&self, name: &str, env: &Environment) -> Result<Environment, EvalError> {
        if !env.is_global() {
            return Err(EvalError::new(EvalErrorKind::ModuleOutsideGlobal {
                name: name.to_string(),
            }));
        }
        let module = self
            .modules
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(|| env.child(None))
            .clone();
        Ok(module)
    }
}

/// First line and backtrace attached win.
fn locate(error: EvalError, line: Line, env: &Environment) -> EvalError {
    let error = error.at(line);
    if error.backtrace.is_some() {
        return error;
    }
    error.with_backtrace(env.backtrace())
}

#[cfg(test)]
mod tests;
