//! AST -> Descriptor lowering.
//!
//! One `lower_*` method per syntax node kind, spread across the submodules:
//! - `expr`: operators, variables, property access, `if`
//! - `call`: call resolution and overload selection
//! - `decl`: functions, records, `val`/`var`, modules
//! - `stmt`: blocks, loops, `return`

mod call;
mod decl;
mod expr;
mod stmt;

use kofl_ir::ast::Stmt;
use kofl_ir::{Descriptor, DescriptorKind, Line};
use kofl_types::{ScopeError, Type, TypeScope};

use crate::CompileError;

/// Lower one compiled unit against `scope`.
///
/// Declarations are defined in `scope` as they are lowered, so later units
/// see earlier ones. On failure `scope` is left partially updated; the
/// caller is expected to discard it (or lower into a copy).
#[tracing::instrument(level = "debug", skip_all, fields(statements = stmts.len()))]
pub fn lower_module(
    scope: &mut TypeScope,
    stmts: &[Stmt],
) -> Result<Vec<Descriptor>, CompileError> {
    let mut lowerer = Lowerer::new(scope);
    stmts.iter().map(|stmt| lowerer.lower_stmt(stmt)).collect()
}

/// State for one lowering pass.
pub(crate) struct Lowerer<'a> {
    pub(crate) scope: &'a mut TypeScope,
    /// Declared return types of the enclosing function bodies, innermost last.
    pub(crate) returns: Vec<Type>,
}

impl<'a> Lowerer<'a> {
    fn new(scope: &'a mut TypeScope) -> Self {
        Lowerer {
            scope,
            returns: Vec::new(),
        }
    }

    /// Run `f` inside a fresh child scope.
    pub(crate) fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        self.scope.push_scope();
        let result = f(self);
        self.scope.pop_scope();
        result
    }

    /// Lower a statement list inside a fresh child scope.
    pub(crate) fn lower_body(&mut self, body: &[Stmt]) -> Result<Vec<Descriptor>, CompileError> {
        self.scoped(|this| body.iter().map(|stmt| this.lower_stmt(stmt)).collect())
    }

    /// Resolve a type annotation.
    pub(crate) fn resolve_type(&self, name: &str, line: Line) -> Result<Type, CompileError> {
        self.scope
            .lookup_type(name)
            .map_err(|error| scope_error(error, line))
    }
}

pub(crate) fn scope_error(error: ScopeError, line: Line) -> CompileError {
    match error {
        ScopeError::UnresolvedVariable(name) | ScopeError::UnresolvedType(name) => {
            CompileError::UnresolvedVariable { name, line }
        }
    }
}

pub(crate) fn unexpected(expected: impl ToString, found: &Type, line: Line) -> CompileError {
    CompileError::UnexpectedType {
        expected: expected.to_string(),
        found: found.to_string(),
        line,
    }
}

/// Fail unless `expected` accepts `found`.
pub(crate) fn expect_assignable(
    expected: &Type,
    found: &Type,
    line: Line,
) -> Result<(), CompileError> {
    if expected.is_assignable_by(found) {
        Ok(())
    } else {
        Err(unexpected(expected, found, line))
    }
}

/// Whether a `return` is reachable anywhere in `descriptor`, not counting
/// nested function declarations.
pub(crate) fn contains_return(descriptor: &Descriptor) -> bool {
    match &descriptor.kind {
        DescriptorKind::Return(_) => true,
        DescriptorKind::Block(body) | DescriptorKind::While { body, .. } => {
            body.iter().any(contains_return)
        }
        DescriptorKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            contains_return(condition)
                || then_branch.iter().any(contains_return)
                || else_branch.iter().any(contains_return)
        }
        DescriptorKind::Val { value, .. }
        | DescriptorKind::Var { value, .. }
        | DescriptorKind::Assign { value, .. } => contains_return(value),
        DescriptorKind::Call { callee, arguments } => {
            contains_return(callee) || arguments.iter().any(|(_, arg)| contains_return(arg))
        }
        DescriptorKind::Unary { right, .. } => contains_return(right),
        DescriptorKind::Binary { left, right, .. } | DescriptorKind::Logical { left, right, .. } => {
            contains_return(left) || contains_return(right)
        }
        DescriptorKind::Get { receiver, .. } => contains_return(receiver),
        DescriptorKind::Set {
            receiver, value, ..
        } => contains_return(receiver) || contains_return(value),
        DescriptorKind::Const(_)
        | DescriptorKind::This
        | DescriptorKind::AccessVar(_)
        | DescriptorKind::AccessFunction(_)
        | DescriptorKind::Function(_)
        | DescriptorKind::NativeFunction(_)
        | DescriptorKind::LocalFunction(_)
        | DescriptorKind::Class(_)
        | DescriptorKind::Module(_)
        | DescriptorKind::Use(_) => false,
    }
}

/// The type of the value `body` ends with, if its last descriptor is an
/// expression. `None` for empty bodies and trailing declarations.
pub(crate) fn value_type(body: &[Descriptor]) -> Option<&Type> {
    let last = body.last()?;
    match last.kind {
        DescriptorKind::Val { .. }
        | DescriptorKind::Var { .. }
        | DescriptorKind::Return(_)
        | DescriptorKind::While { .. }
        | DescriptorKind::Block(_)
        | DescriptorKind::Function(_)
        | DescriptorKind::NativeFunction(_)
        | DescriptorKind::Class(_)
        | DescriptorKind::Module(_)
        | DescriptorKind::Use(_) => None,
        _ => Some(&last.ty),
    }
}
