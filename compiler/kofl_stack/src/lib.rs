//! Stack growth guard for the recursive tree walks.
//!
//! Lowering and evaluation recurse once per nested syntax node, so a long
//! chain of unary or binary operators, or deeply nested blocks, can exhaust
//! the native stack long before the tree itself is unreasonable. Every
//! recursive entry point (`lower_expr`, `lower_stmt`, `evaluate`) runs its
//! body through [`ensure_sufficient_stack`], which moves onto a fresh
//! `stacker` segment once less than [`RED_ZONE`] bytes remain.

/// Remaining stack below which a new segment is allocated (128KB).
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
pub const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if less than [`RED_ZONE`] remains.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}
