//! Native bridge: host implementations for `native func` declarations.
//!
//! A bridged call never returns its value normally. The result travels
//! back as [`ControlAction::Return`], exactly like an interpreted body's
//! `return`, so invocation handles both the same way.

use std::rc::Rc;

use kofl_ir::Descriptor;
use rustc_hash::FxHashMap;

use crate::environment::Environment;
use crate::errors::{undefined_function, ControlAction, EvalResult};
use crate::print_handler::SharedPrintHandler;
use crate::value::{Arguments, KoflObject, NativeFn};

/// Run a host function as the bridge does.
pub fn bridge(
    native: &NativeFn,
    call_site: &Descriptor,
    arguments: &Arguments,
    env: &Environment,
) -> EvalResult<()> {
    let value = native(call_site, arguments, env)?;
    Err(ControlAction::Return(value))
}

/// Native-call name to host implementation.
pub struct NativeRegistry {
    functions: FxHashMap<String, NativeFn>,
}

impl NativeRegistry {
    pub fn empty() -> Self {
        NativeRegistry {
            functions: FxHashMap::default(),
        }
    }

    /// The standard natives, writing output through `print`.
    pub fn standard(print: SharedPrintHandler) -> Self {
        let mut registry = Self::empty();
        registry.register(
            "println",
            Rc::new(move |_: &Descriptor, arguments: &Arguments, _: &Environment| -> EvalResult {
                let line = arguments.first().map(ToString::to_string).unwrap_or_default();
                print.println(&line);
                Ok(KoflObject::Unit)
            }),
        );
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, native: NativeFn) {
        self.functions.insert(name.into(), native);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn call(
        &self,
        name: &str,
        call_site: &Descriptor,
        arguments: &Arguments,
        env: &Environment,
    ) -> EvalResult<()> {
        let native = self
            .functions
            .get(name)
            .ok_or_else(|| undefined_function(name))?;
        tracing::trace!(native = name, "bridge call");
        bridge(native, call_site, arguments, env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EvalErrorKind;
    use crate::print_handler::buffer_handler;
    use kofl_ir::{DescriptorKind, Line};
    use kofl_types::Type;
    use pretty_assertions::assert_eq;

    fn site() -> Descriptor {
        Descriptor::new(
            DescriptorKind::AccessFunction("println-0".into()),
            Type::unit(),
            Line::new(1),
        )
    }

    #[test]
    fn test_println_raises_return() {
        let print = buffer_handler();
        let registry = NativeRegistry::standard(print.clone());
        let mut arguments = Arguments::new();
        arguments.push("message", KoflObject::double(3.0));

        let result = registry.call("println", &site(), &arguments, &Environment::global());
        match result {
            Err(ControlAction::Return(value)) => assert_eq!(value, KoflObject::Unit),
            other => panic!("expected a return signal, got {other:?}"),
        }
        assert_eq!(print.output(), "3.0\n");
    }

    #[test]
    fn test_missing_native() {
        let registry = NativeRegistry::empty();
        let result = registry.call("nope", &site(), &Arguments::new(), &Environment::global());
        match result {
            Err(ControlAction::Error(error)) => assert_eq!(
                error.kind,
                EvalErrorKind::UndefinedFunction {
                    name: "nope".into()
                }
            ),
            other => panic!("expected an error, got {other:?}"),
        }
    }
}
