//! Intermediate representations for Kofl.
//!
//! # Pipeline Position
//!
//! ```text
//! frontend -> ast::Stmt -> kofl_canon (lowering) -> Descriptor -> kofl_eval
//! ```
//!
//! - [`ast`]: the syntax tree handed over by the external lexer/parser.
//!   Names are unresolved and types are only annotations.
//! - [`Descriptor`]: the resolved, typed tree produced by lowering. Every
//!   node carries its static [`Type`](kofl_types::Type) and source [`Line`].
//!   Callable declarations carry their overload-indexed name (`add-1`),
//!   so evaluation never re-resolves overloads.
//!
//! A descriptor tree is built once and then only read.

pub mod ast;
mod descriptor;
mod line;
mod literal;
mod ops;

pub use descriptor::{
    ClassDescriptor, Descriptor, DescriptorKind, FunctionDescriptor, LocalFunctionDescriptor,
    NativeFunctionDescriptor,
};
pub use line::Line;
pub use literal::Literal;
pub use ops::{BinaryOp, LogicalOp, UnaryOp};
