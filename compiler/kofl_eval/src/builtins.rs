//! Builtin bootstrap.
//!
//! [`initialize`] runs once on a fresh global environment before anything
//! is evaluated. It materializes a class object for each builtin type,
//! declares every constructor as an overload-indexed function (`String-0`)
//! and binds the `Unit` singleton.

use std::rc::Rc;

use kofl_ir::Descriptor;
use kofl_types::{overload_name, ClassType, FunctionType, Parameters, Type};
use rustc_hash::FxHashMap;

use crate::environment::{Environment, Mutability};
use crate::errors::{EvalError, EvalResult};
use crate::value::{Arguments, Callable, ClassObject, Instance, KoflObject, LocalNative, NativeFn};

/// Builtin classes by name.
pub type BuiltinClasses = FxHashMap<String, Rc<ClassObject>>;

pub fn initialize(global: &Environment) -> Result<BuiltinClasses, EvalError> {
    let mut classes = BuiltinClasses::default();
    for ty in [
        Type::string(),
        Type::int(),
        Type::double(),
        Type::boolean(),
        Type::unit(),
    ] {
        let Some(class) = ty.as_class() else {
            continue;
        };
        let object = materialize(class, global);
        tracing::debug!(
            class = object.name(),
            constructors = object.constructors.len(),
            "builtin class"
        );
        classes.insert(object.name().to_string(), Rc::new(object));
    }
    global.declare("Unit", KoflObject::Unit, Mutability::Immutable)?;
    Ok(classes)
}

fn materialize(class: &ClassType, global: &Environment) -> ClassObject {
    let name = class.name().unwrap_or("<anonymous>");
    let mut signatures = class.constructors();
    if signatures.is_empty() {
        signatures.push(FunctionType::new(
            Parameters::new(),
            Type::Class(class.clone()),
            None,
        ));
    }

    let constructors = signatures
        .into_iter()
        .enumerate()
        .map(|(index, ty)| {
            let native = LocalNative {
                name: overload_name(name, index),
                ty,
                call: constructor(class),
            };
            let callable = Callable::LocalNative(Rc::new(native));
            global.declare_function(callable.name(), callable.clone());
            callable
        })
        .collect();

    ClassObject {
        ty: class.clone(),
        constructors,
        functions: FxHashMap::default(),
    }
}

/// `String(any)` renders its argument; every other builtin constructor
/// produces a bare instance.
fn constructor(class: &ClassType) -> NativeFn {
    if Type::Class(class.clone()) == Type::string() {
        return Rc::new(
            |_: &Descriptor, arguments: &Arguments, _: &Environment| -> EvalResult {
                let text = arguments
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                Ok(KoflObject::string(text))
            },
        );
    }
    let class = class.clone();
    Rc::new(
        move |_: &Descriptor, _: &Arguments, _: &Environment| -> EvalResult {
            Ok(KoflObject::Instance(Instance { ty: class.clone() }))
        },
    )
}
