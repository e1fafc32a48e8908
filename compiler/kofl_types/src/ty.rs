//! Structural type values.
//!
//! A class type's constructor list can grow while the surrounding
//! declaration is lowered, so it sits behind `RefCell`. Everything else is
//! immutable once built. Extension functions are not stored on the class:
//! the builtin classes are shared per thread, so their extensions live in
//! the [`TypeScope`](crate::TypeScope) that declared them.

use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A Kofl type.
#[derive(Clone)]
pub enum Type {
    /// A primitive or user-declared class type.
    Class(ClassType),
    /// A function type, optionally with a receiver (extension functions).
    Function(FunctionType),
}

thread_local! {
    static PRIMITIVES: Primitives = Primitives::new();
}

/// The builtin class types, created once per thread so that identity
/// comparison hits the fast path.
struct Primitives {
    any: Type,
    string: Type,
    int: Type,
    double: Type,
    boolean: Type,
    unit: Type,
}

impl Primitives {
    fn new() -> Self {
        let any = Type::Class(ClassBuilder::new("Any").build());
        let string = Type::Class(
            ClassBuilder::new("String")
                .constructor(Parameters::new().with("any", any.clone()))
                .build(),
        );
        Primitives {
            string,
            int: Type::Class(ClassBuilder::new("Int").build()),
            double: Type::Class(ClassBuilder::new("Double").build()),
            boolean: Type::Class(ClassBuilder::new("Boolean").build()),
            unit: Type::Class(ClassBuilder::new("Unit").build()),
            any,
        }
    }
}

impl Type {
    /// The universal type: assignable from every type.
    pub fn any() -> Type {
        PRIMITIVES.with(|p| p.any.clone())
    }

    pub fn string() -> Type {
        PRIMITIVES.with(|p| p.string.clone())
    }

    pub fn int() -> Type {
        PRIMITIVES.with(|p| p.int.clone())
    }

    pub fn double() -> Type {
        PRIMITIVES.with(|p| p.double.clone())
    }

    pub fn boolean() -> Type {
        PRIMITIVES.with(|p| p.boolean.clone())
    }

    pub fn unit() -> Type {
        PRIMITIVES.with(|p| p.unit.clone())
    }

    /// All builtin class types, in registration order.
    pub fn builtins() -> [Type; 6] {
        PRIMITIVES.with(|p| {
            [
                p.any.clone(),
                p.string.clone(),
                p.int.clone(),
                p.double.clone(),
                p.boolean.clone(),
                p.unit.clone(),
            ]
        })
    }

    /// Shorthand for a receiver-less function type.
    pub fn function(parameters: Parameters, return_type: Type) -> Type {
        Type::Function(FunctionType::new(parameters, return_type, None))
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        *self == Type::any()
    }

    /// `Int` or `Double`.
    pub fn is_number(&self) -> bool {
        *self == Type::int() || *self == Type::double()
    }

    /// Whether a value of type `source` may be stored where `self` is expected.
    pub fn is_assignable_by(&self, source: &Type) -> bool {
        self.is_any() || self == source
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(class) => Some(class),
            Type::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(function) => Some(function),
            Type::Class(_) => None,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Class(a), Type::Class(b)) => a == b,
            (Type::Function(a), Type::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Class(class) => class.fmt(f),
            Type::Function(function) => function.fmt(f),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({self})")
    }
}

/// Ordered parameter (or field) list: name to type.
#[derive(Clone, Default, PartialEq)]
pub struct Parameters(SmallVec<[(String, Type); 4]>);

impl Parameters {
    pub fn new() -> Self {
        Parameters(SmallVec::new())
    }

    /// Builder-style [`Parameters::push`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.push(name, ty);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, ty: Type) {
        self.0.push((name.into(), ty));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The parameter at `index`, in declaration order.
    pub fn at(&self, index: usize) -> Option<(&str, &Type)> {
        self.0.get(index).map(|(n, ty)| (n.as_str(), ty))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.0.iter().map(|(n, ty)| (n.as_str(), ty))
    }

    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.0.iter().map(|(_, ty)| ty)
    }
}

impl FromIterator<(String, Type)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, Type)>>(iter: I) -> Self {
        Parameters(iter.into_iter().collect())
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, ty)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {ty}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({self})")
    }
}

/// A function type.
#[derive(Clone)]
pub struct FunctionType(Rc<FunctionData>);

struct FunctionData {
    parameters: Parameters,
    return_type: Type,
    receiver: Option<Type>,
}

impl FunctionType {
    pub fn new(parameters: Parameters, return_type: Type, receiver: Option<Type>) -> Self {
        FunctionType(Rc::new(FunctionData {
            parameters,
            return_type,
            receiver,
        }))
    }

    pub fn parameters(&self) -> &Parameters {
        &self.0.parameters
    }

    pub fn return_type(&self) -> &Type {
        &self.0.return_type
    }

    pub fn receiver(&self) -> Option<&Type> {
        self.0.receiver.as_ref()
    }

    /// Arity must match, each parameter must accept its argument, and the
    /// receiver must match exactly (absent on both sides counts as a match).
    pub fn accepts(&self, arguments: &[Type], receiver: Option<&Type>) -> bool {
        self.parameters().len() == arguments.len()
            && self
                .parameters()
                .types()
                .zip(arguments)
                .all(|(parameter, argument)| parameter.is_assignable_by(argument))
            && self.receiver() == receiver
    }
}

impl PartialEq for FunctionType {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
            || (self.0.parameters == other.0.parameters
                && self.0.return_type == other.0.return_type
                && self.0.receiver == other.0.receiver)
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(receiver) = self.receiver() {
            write!(f, "{receiver}.")?;
        }
        write!(f, "({}) -> {}", self.parameters(), self.return_type())
    }
}

impl fmt::Debug for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionType({self})")
    }
}

/// One registered overload: the function's type and its indexed name.
#[derive(Clone, Debug, PartialEq)]
pub struct Overload {
    /// Overload-indexed name, e.g. `add-1`.
    pub name: String,
    pub ty: FunctionType,
}

impl Overload {
    pub fn new(name: impl Into<String>, ty: FunctionType) -> Self {
        Overload {
            name: name.into(),
            ty,
        }
    }
}

/// `add` + `1` -> `add-1`.
pub fn overload_name(name: &str, index: usize) -> String {
    format!("{name}-{index}")
}

/// First candidate, in declaration order, that accepts `arguments`.
pub fn match_overload<'a>(
    candidates: &'a [Overload],
    arguments: &[Type],
    receiver: Option<&Type>,
) -> Option<&'a Overload> {
    candidates
        .iter()
        .find(|candidate| candidate.ty.accepts(arguments, receiver))
}

/// A class type: builtin primitive or user record.
#[derive(Clone)]
pub struct ClassType(Rc<ClassData>);

struct ClassData {
    name: Option<String>,
    fields: Parameters,
    constructors: RefCell<Vec<Parameters>>,
}

impl ClassType {
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn fields(&self) -> &Parameters {
        &self.0.fields
    }

    /// Constructor signatures, each returning this class.
    pub fn constructors(&self) -> Vec<FunctionType> {
        let this = Type::Class(self.clone());
        self.0
            .constructors
            .borrow()
            .iter()
            .map(|parameters| FunctionType::new(parameters.clone(), this.clone(), None))
            .collect()
    }

    pub fn add_constructor(&self, parameters: Parameters) {
        self.0.constructors.borrow_mut().push(parameters);
    }
}

impl PartialEq for ClassType {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
            || (self.0.name == other.0.name
                && self.0.fields == other.0.fields
                && *self.0.constructors.borrow() == *other.0.constructors.borrow())
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("<anonymous>"))
    }
}

impl fmt::Debug for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassType({self})")
    }
}

/// Builds a [`ClassType`].
#[must_use]
pub struct ClassBuilder {
    name: Option<String>,
    fields: Parameters,
    constructors: Vec<Parameters>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ClassBuilder {
            name: Some(name.into()),
            fields: Parameters::new(),
            constructors: Vec::new(),
        }
    }

    pub fn anonymous() -> Self {
        ClassBuilder {
            name: None,
            fields: Parameters::new(),
            constructors: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(name, ty);
        self
    }

    pub fn fields(mut self, fields: Parameters) -> Self {
        self.fields = fields;
        self
    }

    pub fn constructor(mut self, parameters: Parameters) -> Self {
        self.constructors.push(parameters);
        self
    }

    pub fn build(self) -> ClassType {
        ClassType(Rc::new(ClassData {
            name: self.name,
            fields: self.fields,
            constructors: RefCell::new(self.constructors),
        }))
    }
}

#[cfg(test)]
mod tests;
