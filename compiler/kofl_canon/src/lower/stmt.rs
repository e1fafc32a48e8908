//! Statements: dispatch, blocks, loops, `return`.

use kofl_ir::ast::{Expr, Stmt, StmtKind};
use kofl_ir::{Descriptor, DescriptorKind, Line};
use kofl_stack::ensure_sufficient_stack;
use kofl_types::Type;

use super::{expect_assignable, Lowerer};
use crate::CompileError;

impl Lowerer<'_> {
    pub(crate) fn lower_stmt(&mut self, stmt: &Stmt) -> Result<Descriptor, CompileError> {
        ensure_sufficient_stack(|| {
            let line = stmt.line;
            match &stmt.kind {
                StmtKind::Expr(expr) => self.lower_expr(expr),
                StmtKind::Block(body) => {
                    let body = self.lower_body(body)?;
                    Ok(Descriptor::new(DescriptorKind::Block(body), Type::unit(), line))
                }
                StmtKind::While { condition, body } => {
                    let condition = self.lower_expr(condition)?;
                    expect_assignable(&Type::boolean(), &condition.ty, condition.line)?;
                    let body = self.lower_body(body)?;
                    Ok(Descriptor::new(
                        DescriptorKind::While {
                            condition: Box::new(condition),
                            body,
                        },
                        Type::unit(),
                        line,
                    ))
                }
                StmtKind::Return(value) => self.lower_return(value, line),
                StmtKind::Val { name, ty, value } => {
                    self.lower_binding(name, ty.as_deref(), value, false, line)
                }
                StmtKind::Var { name, ty, value } => {
                    self.lower_binding(name, ty.as_deref(), value, true, line)
                }
                StmtKind::Use(module) => Ok(Descriptor::new(
                    DescriptorKind::Use(module.clone()),
                    Type::unit(),
                    line,
                )),
                StmtKind::Module(module) => Ok(Descriptor::new(
                    DescriptorKind::Module(module.clone()),
                    Type::unit(),
                    line,
                )),
                StmtKind::Record { name, parameters } => self.lower_record(name, parameters, line),
            }
        })
    }

    /// `return value`: checked against the innermost enclosing function.
    /// At top level there is nothing to check against.
    fn lower_return(&mut self, value: &Expr, line: Line) -> Result<Descriptor, CompileError> {
        let value = self.lower_expr(value)?;
        if let Some(expected) = self.returns.last() {
            expect_assignable(expected, &value.ty, value.line)?;
        }
        let ty = value.ty.clone();
        Ok(Descriptor::new(
            DescriptorKind::Return(Box::new(value)),
            ty,
            line,
        ))
    }
}
