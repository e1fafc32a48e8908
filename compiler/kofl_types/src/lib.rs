//! Type system for Kofl.
//!
//! Two pieces live here:
//!
//! - [`Type`]: structural type values. A type is either a class type
//!   (primitive or user record) or a function type. Types are shared by
//!   reference (`Rc`) across a whole compiled unit.
//! - [`TypeScope`]: the chained symbol table used by semantic lowering to
//!   resolve names to types, variables and function overload sets.
//!
//! # Assignability
//!
//! `target.is_assignable_by(source)` holds iff `target` is `Any` or the two
//! types are structurally equal. There is no subtyping beyond `Any`.
//!
//! # Overloads
//!
//! Every function declaration registers an [`Overload`] carrying its
//! overload-indexed name (`add-0`, `add-1`, ...). [`match_overload`] picks
//! the first candidate in declaration order whose parameters accept the
//! argument types.

mod scope;
mod ty;

pub use scope::{ScopeError, TypeScope};
pub use ty::{
    match_overload, overload_name, ClassBuilder, ClassType, FunctionType, Overload, Parameters,
    Type,
};
