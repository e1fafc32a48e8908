//! Semantic lowering for Kofl.
//!
//! # Pipeline Position
//!
//! ```text
//! ast::Stmt (frontend)
//!     |
//!     v
//! lower_module  <- TypeScope (types, variables, overloads)
//!     |
//!     v
//! Vec<Descriptor> -> kofl_eval
//! ```
//!
//! Lowering resolves every name against the [`TypeScope`](kofl_types::TypeScope),
//! computes the static type of every node, picks the overload of every
//! call, and emits one [`Descriptor`](kofl_ir::Descriptor) per syntax node.
//! The first failure aborts the whole unit; there is no recovery here.

mod error;
mod lower;

pub use error::CompileError;
pub use lower::lower_module;
