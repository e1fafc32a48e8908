//! Calls and callable invocation.
//!
//! Invocation is the only place a `return` signal becomes a value again.
//! A body that finishes without one is a missing-return error.

use kofl_ir::{Descriptor, DescriptorKind, Line};

use super::Interpreter;
use crate::environment::{CallSite, Environment, Mutability};
use crate::errors::{invalid_type, missing_return, ControlAction, EvalResult};
use crate::native::bridge;
use crate::value::{Arguments, Callable, KoflObject};

impl Interpreter {
    pub(super) fn eval_call(
        &self,
        call: &Descriptor,
        callee: &Descriptor,
        arguments: &[(String, Descriptor)],
        env: &Environment,
    ) -> EvalResult {
        let target = match &callee.kind {
            DescriptorKind::AccessFunction(name) => {
                KoflObject::Callable(env.lookup_function(name)?)
            }
            DescriptorKind::AccessVar(name) => env.lookup(name)?,
            _ => self.evaluate(callee, env)?,
        };

        let mut values = Arguments::new();
        for (name, argument) in arguments {
            values.push(name.clone(), self.evaluate(argument, env)?);
        }

        let Some(callable) = target.as_callable() else {
            return Err(invalid_type("a callable", target.ty()).into());
        };
        self.invoke(callable, call, &values, env)
    }

    /// Invoke `callable` from `env`.
    ///
    /// Named functions and natives run in a child of `env`; local functions
    /// run in a child of the environment they were created in. Arguments
    /// are bound immutably under their parameter names.
    #[tracing::instrument(level = "debug", skip_all, fields(callee = %callable.name()))]
    pub fn invoke(
        &self,
        callable: &Callable,
        call_site: &Descriptor,
        arguments: &Arguments,
        env: &Environment,
    ) -> EvalResult {
        let site = CallSite::new(format!("call {}", callable.name()), call_site.line);
        let (outcome, scope) = match callable {
            Callable::Function(function) => {
                let scope = env.child(Some(site));
                bind_arguments(&scope, arguments)?;
                (self.eval_body(&function.body, &scope), scope)
            }
            Callable::LocalFunction {
                descriptor,
                closure,
            } => {
                let scope = closure.child(Some(site));
                bind_arguments(&scope, arguments)?;
                (self.eval_body(&descriptor.body, &scope), scope)
            }
            Callable::NativeFunction(native) => {
                let scope = env.child(Some(site));
                let outcome = self
                    .natives
                    .call(&native.native_name, call_site, arguments, &scope);
                (outcome, scope)
            }
            Callable::LocalNative(native) => {
                let scope = env.child(Some(site));
                (bridge(&native.call, call_site, arguments, &scope), scope)
            }
        };

        match outcome {
            Err(ControlAction::Return(value)) => Ok(value),
            Err(ControlAction::Error(error)) => Err(ControlAction::Error(error)),
            Ok(()) => Err(missing_return(callable.name())
                .at(call_site.line)
                .with_backtrace(scope.backtrace())
                .into()),
        }
    }

    /// Call the function registered under `name` with no call-site
    /// expression, e.g. a program's entry point.
    pub fn call_function(&self, name: &str, arguments: &Arguments) -> EvalResult {
        let callable = self.global.lookup_function(name)?;
        let site = Descriptor::new(
            DescriptorKind::AccessFunction(name.to_string()),
            callable.ty().return_type().clone(),
            Line::SYNTHETIC,
        );
        self.invoke(&callable, &site, arguments, &self.global)
    }

    fn eval_body(&self, body: &[Descriptor], scope: &Environment) -> EvalResult<()> {
        for descriptor in body {
            self.evaluate(descriptor, scope)?;
        }
        Ok(())
    }
}

fn bind_arguments(scope: &Environment, arguments: &Arguments) -> EvalResult<()> {
    for (name, value) in arguments.iter() {
        scope.declare(name, value.clone(), Mutability::Immutable)?;
    }
    Ok(())
}
