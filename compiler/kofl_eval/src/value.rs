//! Runtime objects.
//!
//! A [`KoflObject`] is cheap to clone: strings, class objects and callables
//! sit behind `Rc`.

use std::fmt;
use std::rc::Rc;

use kofl_ir::{
    Descriptor, FunctionDescriptor, Literal, LocalFunctionDescriptor, NativeFunctionDescriptor,
};
use kofl_types::{ClassType, FunctionType, Type};
use rustc_hash::FxHashMap;

use crate::environment::Environment;
use crate::errors::EvalResult;

/// A host value wrapped for the interpreter.
#[derive(Clone, Debug, PartialEq)]
pub enum HostValue {
    Int(i64),
    Double(f64),
    Boolean(bool),
    String(Rc<str>),
}

/// A host value together with its Kofl type.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeObject {
    pub value: HostValue,
    pub ty: Type,
}

/// An instance of a class type. Field storage is not modelled.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub ty: ClassType,
}

/// A class materialized at runtime.
pub struct ClassObject {
    pub ty: ClassType,
    pub constructors: Vec<Callable>,
    pub functions: FxHashMap<String, Vec<Callable>>,
}

impl ClassObject {
    pub fn name(&self) -> &str {
        self.ty.name().unwrap_or("<anonymous>")
    }
}

#[derive(Clone)]
pub enum KoflObject {
    Unit,
    Native(NativeObject),
    Instance(Instance),
    Class(Rc<ClassObject>),
    Callable(Callable),
}

impl KoflObject {
    pub fn int(value: i64) -> Self {
        Self::native(HostValue::Int(value), Type::int())
    }

    pub fn double(value: f64) -> Self {
        Self::native(HostValue::Double(value), Type::double())
    }

    pub fn boolean(value: bool) -> Self {
        Self::native(HostValue::Boolean(value), Type::boolean())
    }

    pub fn string(value: impl Into<Rc<str>>) -> Self {
        Self::native(HostValue::String(value.into()), Type::string())
    }

    pub fn native(value: HostValue, ty: Type) -> Self {
        KoflObject::Native(NativeObject { value, ty })
    }

    /// The Unit literal maps to the shared [`KoflObject::Unit`].
    pub fn from_literal(literal: &Literal) -> Self {
        match literal {
            Literal::Int(value) => Self::int(*value),
            Literal::Double(value) => Self::double(*value),
            Literal::Boolean(value) => Self::boolean(*value),
            Literal::String(value) => Self::string(value.as_str()),
            Literal::Unit => KoflObject::Unit,
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            KoflObject::Unit => Type::unit(),
            KoflObject::Native(native) => native.ty.clone(),
            KoflObject::Instance(instance) => Type::Class(instance.ty.clone()),
            KoflObject::Class(class) => Type::Class(class.ty.clone()),
            KoflObject::Callable(callable) => Type::Function(callable.ty()),
        }
    }

    pub fn host(&self) -> Option<&HostValue> {
        match self {
            KoflObject::Native(native) => Some(&native.value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.host()? {
            HostValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.host()? {
            HostValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.host()? {
            HostValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Ints widen to `f64`.
    #[expect(
        clippy::cast_precision_loss,
        reason = "number arithmetic is Double arithmetic"
    )]
    pub fn as_number(&self) -> Option<f64> {
        match self.host()? {
            HostValue::Int(value) => Some(*value as f64),
            HostValue::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            KoflObject::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, KoflObject::Unit)
    }
}

impl PartialEq for KoflObject {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KoflObject::Unit, KoflObject::Unit) => true,
            (KoflObject::Native(a), KoflObject::Native(b)) => a == b,
            (KoflObject::Instance(a), KoflObject::Instance(b)) => a == b,
            (KoflObject::Class(a), KoflObject::Class(b)) => Rc::ptr_eq(a, b),
            (KoflObject::Callable(a), KoflObject::Callable(b)) => a.same(b),
            _ => false,
        }
    }
}

impl fmt::Display for KoflObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KoflObject::Unit => f.write_str("Unit"),
            KoflObject::Native(native) => match &native.value {
                HostValue::Int(value) => write!(f, "{value}"),
                HostValue::Double(value) if value.is_finite() && value.fract() == 0.0 => {
                    write!(f, "{value:.1}")
                }
                HostValue::Double(value) => write!(f, "{value}"),
                HostValue::Boolean(value) => write!(f, "{value}"),
                HostValue::String(value) => f.write_str(value),
            },
            KoflObject::Instance(instance) => write!(f, "{}()", instance.ty),
            KoflObject::Class(class) => write!(f, "class {}", class.name()),
            KoflObject::Callable(callable) => write!(f, "<func {}>", callable.name()),
        }
    }
}

// Closures can reach themselves through their environment, so Debug
// never descends into one.
impl fmt::Debug for KoflObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KoflObject::Native(native) => write!(f, "{:?}: {}", native.value, native.ty),
            _ => write!(f, "{self}: {}", self.ty()),
        }
    }
}

/// Host implementation of a callable: call-site descriptor, arguments,
/// calling environment.
pub type NativeFn = Rc<dyn Fn(&Descriptor, &Arguments, &Environment) -> EvalResult>;

/// A host closure created at runtime (builtin constructors).
pub struct LocalNative {
    pub name: String,
    pub ty: FunctionType,
    pub call: NativeFn,
}

#[derive(Clone)]
pub enum Callable {
    /// Named function; runs in a child of the calling environment.
    Function(Rc<FunctionDescriptor>),
    /// Anonymous function; runs in a child of `closure`, which it keeps
    /// alive (a cycle when the function is stored in that environment).
    LocalFunction {
        descriptor: Rc<LocalFunctionDescriptor>,
        closure: Environment,
    },
    /// Declared in source, implemented by the native bridge.
    NativeFunction(Rc<NativeFunctionDescriptor>),
    LocalNative(Rc<LocalNative>),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::Function(function) => &function.name,
            Callable::LocalFunction { .. } => "<anonymous>",
            Callable::NativeFunction(native) => &native.name,
            Callable::LocalNative(native) => &native.name,
        }
    }

    pub fn ty(&self) -> FunctionType {
        match self {
            Callable::Function(function) => function.ty.clone(),
            Callable::LocalFunction { descriptor, .. } => descriptor.ty.clone(),
            Callable::NativeFunction(native) => native.ty.clone(),
            Callable::LocalNative(native) => native.ty.clone(),
        }
    }

    /// Identity: same declaration (and same closure for local functions).
    pub fn same(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (
                Callable::LocalFunction {
                    descriptor: a,
                    closure: ca,
                },
                Callable::LocalFunction {
                    descriptor: b,
                    closure: cb,
                },
            ) => Rc::ptr_eq(a, b) && ca.ptr_eq(cb),
            (Callable::NativeFunction(a), Callable::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Callable::LocalNative(a), Callable::LocalNative(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({}: {})", self.name(), self.ty())
    }
}

/// Call arguments keyed by parameter name, in parameter order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments(Vec<(String, KoflObject)>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: KoflObject) {
        self.0.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&KoflObject> {
        self.0
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    pub fn first(&self) -> Option<&KoflObject> {
        self.0.first().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KoflObject)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, KoflObject)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, KoflObject)>>(iter: I) -> Self {
        Arguments(iter.into_iter().collect())
    }
}
