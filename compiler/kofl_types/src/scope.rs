//! Chained symbol table for semantic lowering.
//!
//! Scopes form a stack: [`TypeScope::push_scope`] on entering a block,
//! function body or branch, [`TypeScope::pop_scope`] on leaving it. Each
//! frame holds independent tables for types, variables, function overloads
//! and extension functions. Lookups walk outward from the innermost frame.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::ty::{overload_name, FunctionType, Overload, Type};

/// Name resolution failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("variable {0} not found")]
    UnresolvedVariable(String),
    #[error("type {0} not found")]
    UnresolvedType(String),
}

#[derive(Clone, Debug, Default)]
struct Frame {
    types: FxHashMap<String, Type>,
    variables: FxHashMap<String, Type>,
    functions: FxHashMap<String, Vec<Overload>>,
    /// Extension overloads by simple name; each carries its receiver.
    extensions: FxHashMap<String, Vec<Overload>>,
}

/// The type scope stack. The bottom frame is the root and is never popped.
#[derive(Clone, Debug)]
pub struct TypeScope {
    frames: Vec<Frame>,
}

impl TypeScope {
    /// An empty scope with a single root frame.
    pub fn new() -> Self {
        TypeScope {
            frames: vec![Frame::default()],
        }
    }

    /// A root scope with `Any`, `String`, `Int`, `Double`, `Boolean` and
    /// `Unit` defined (and their constructors registered as overloads),
    /// plus the `Unit` singleton as a variable.
    pub fn with_builtins() -> Self {
        let mut scope = TypeScope::new();
        for ty in Type::builtins() {
            let name = ty.to_string();
            scope.define_type(&name, ty);
        }
        scope.define("Unit", Type::unit());
        scope
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    fn current(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::default());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Define a type. Function types and class constructors are also
    /// registered as function overloads under `name`.
    pub fn define_type(&mut self, name: &str, ty: Type) {
        match &ty {
            Type::Function(function) => {
                self.define_function(name, function.clone());
            }
            Type::Class(class) => {
                for constructor in class.constructors() {
                    self.define_function(name, constructor);
                }
            }
        }
        self.current().types.insert(name.to_string(), ty);
    }

    /// Define (or redefine) a variable in the current frame.
    pub fn define(&mut self, name: &str, ty: Type) {
        self.current().variables.insert(name.to_string(), ty);
    }

    /// Register one overload of `name` in the current frame and return its
    /// index: the number of overloads of `name` already visible here.
    pub fn define_function(&mut self, name: &str, ty: FunctionType) -> usize {
        let index = self.lookup_function_overload(name).len();
        let overload = Overload::new(overload_name(name, index), ty);
        tracing::trace!(name, overload = %overload.name, "define function");
        self.current()
            .functions
            .entry(name.to_string())
            .or_default()
            .push(overload);
        index
    }

    /// Register an extension function: `ty` must carry a receiver. It is
    /// indexed alongside plain overloads of `name` and additionally recorded
    /// for `receiver.name(..)` resolution.
    pub fn define_extension(&mut self, name: &str, ty: FunctionType) -> usize {
        let index = self.define_function(name, ty.clone());
        let overload = Overload::new(overload_name(name, index), ty);
        self.current()
            .extensions
            .entry(name.to_string())
            .or_default()
            .push(overload);
        index
    }

    /// Extension overloads of `name` declared on exactly `receiver` and
    /// visible from the current frame, innermost frame first.
    pub fn lookup_extension(&self, receiver: &Type, name: &str) -> Vec<Overload> {
        self.frames
            .iter()
            .rev()
            .filter_map(|frame| frame.extensions.get(name))
            .flatten()
            .filter(|overload| overload.ty.receiver() == Some(receiver))
            .cloned()
            .collect()
    }

    pub fn lookup(&self, name: &str) -> Result<Type, ScopeError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.variables.get(name))
            .cloned()
            .ok_or_else(|| ScopeError::UnresolvedVariable(name.to_string()))
    }

    pub fn lookup_type(&self, name: &str) -> Result<Type, ScopeError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.types.get(name))
            .cloned()
            .ok_or_else(|| ScopeError::UnresolvedType(name.to_string()))
    }

    /// Every overload of `name` visible from the current frame, innermost
    /// frame first, declaration order within a frame.
    pub fn lookup_function_overload(&self, name: &str) -> Vec<Overload> {
        self.frames
            .iter()
            .rev()
            .filter_map(|frame| frame.functions.get(name))
            .flatten()
            .cloned()
            .collect()
    }

    /// Whether the current frame (only) defines `name` in any table.
    pub fn contains_name(&self, name: &str) -> bool {
        self.frames.last().is_some_and(|frame| {
            frame.types.contains_key(name)
                || frame.variables.contains_key(name)
                || frame.functions.contains_key(name)
        })
    }
}

impl Default for TypeScope {
    fn default() -> Self {
        Self::new()
    }
}
