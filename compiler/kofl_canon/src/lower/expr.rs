//! Expressions: operators, names, property access, `if`.

use kofl_ir::ast::{Expr, ExprKind, Stmt};
use kofl_ir::{BinaryOp, Descriptor, DescriptorKind, Line, LogicalOp, UnaryOp};
use kofl_stack::ensure_sufficient_stack;
use kofl_types::Type;

use super::{expect_assignable, scope_error, unexpected, value_type, Lowerer};
use crate::CompileError;

impl Lowerer<'_> {
    pub(crate) fn lower_expr(&mut self, expr: &Expr) -> Result<Descriptor, CompileError> {
        ensure_sufficient_stack(|| {
            let line = expr.line;
            match &expr.kind {
                ExprKind::Literal(literal) => Ok(Descriptor::new(
                    DescriptorKind::Const(literal.clone()),
                    literal.ty(),
                    line,
                )),
                ExprKind::Grouping(inner) => self.lower_expr(inner),
                ExprKind::Var(name) => self.lower_var(name, line),
                ExprKind::This => {
                    let ty = self.scope.lookup("this").unwrap_or_else(|_| Type::any());
                    Ok(Descriptor::new(DescriptorKind::This, ty, line))
                }
                ExprKind::Assign { name, value } => self.lower_assign(name, value, line),
                ExprKind::Binary { left, op, right } => self.lower_binary(left, *op, right, line),
                ExprKind::Logical { left, op, right } => {
                    self.lower_logical(left, *op, right, line)
                }
                ExprKind::Unary { op, right } => self.lower_unary(*op, right, line),
                ExprKind::Call { callee, arguments } => self.lower_call(callee, arguments, line),
                ExprKind::Get { receiver, name } => self.lower_get(receiver, name, line),
                ExprKind::Set {
                    receiver,
                    name,
                    value,
                } => self.lower_set(receiver, name, value, line),
                ExprKind::If {
                    condition,
                    then_branch,
                    else_branch,
                } => self.lower_if(condition, then_branch, else_branch.as_deref(), line),
                ExprKind::Func(decl) => self.lower_function(decl, None, line),
                ExprKind::ExtensionFunc { receiver, decl } => {
                    self.lower_function(decl, Some(receiver), line)
                }
                ExprKind::AnonymousFunc {
                    parameters,
                    return_type,
                    body,
                } => self.lower_anonymous_function(parameters, return_type.as_deref(), body, line),
                ExprKind::NativeFunc {
                    name,
                    parameters,
                    return_type,
                } => self.lower_native_function(name, parameters, return_type.as_deref(), line),
            }
        })
    }

    /// A bare name in value position: a variable, or else a function used
    /// as a value (its first visible overload).
    fn lower_var(&mut self, name: &str, line: Line) -> Result<Descriptor, CompileError> {
        match self.scope.lookup(name) {
            Ok(ty) => Ok(Descriptor::new(
                DescriptorKind::AccessVar(name.to_string()),
                ty,
                line,
            )),
            Err(error) => match self.scope.lookup_function_overload(name).into_iter().next() {
                Some(overload) => Ok(Descriptor::new(
                    DescriptorKind::AccessFunction(overload.name),
                    Type::Function(overload.ty),
                    line,
                )),
                None => Err(scope_error(error, line)),
            },
        }
    }

    fn lower_assign(
        &mut self,
        name: &str,
        value: &Expr,
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let expected = self
            .scope
            .lookup(name)
            .map_err(|error| scope_error(error, line))?;
        let value = self.lower_expr(value)?;
        expect_assignable(&expected, &value.ty, value.line)?;
        Ok(Descriptor::new(
            DescriptorKind::Assign {
                name: name.to_string(),
                value: Box::new(value),
            },
            expected,
            line,
        ))
    }

    /// Operand types first, then the result type:
    /// - `+ - * /` on two numbers: `Double`
    /// - `+` with a `String` left operand: `String` (concatenation)
    /// - `< <= > >=` on two numbers: `Boolean`
    /// - `== !=` on mutually assignable operands: `Boolean`
    fn lower_binary(
        &mut self,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let left = self.lower_expr(left)?;
        let right = self.lower_expr(right)?;
        let numbers = left.ty.is_number() && right.ty.is_number();

        let ty = if op.is_arithmetic() {
            if numbers {
                Type::double()
            } else if op == BinaryOp::Plus && Type::string().is_assignable_by(&left.ty) {
                Type::string()
            } else {
                return Err(mismatched_operand(&left, &right, line));
            }
        } else if op.is_comparison() {
            if !numbers {
                return Err(mismatched_operand(&left, &right, line));
            }
            Type::boolean()
        } else {
            if !left.ty.is_assignable_by(&right.ty) && !right.ty.is_assignable_by(&left.ty) {
                return Err(unexpected(&left.ty, &right.ty, line));
            }
            Type::boolean()
        };

        tracing::trace!(%op, left = %left.ty, right = %right.ty, result = %ty, "binary");
        Ok(Descriptor::new(
            DescriptorKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            ty,
            line,
        ))
    }

    fn lower_logical(
        &mut self,
        left: &Expr,
        op: LogicalOp,
        right: &Expr,
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let left = self.lower_expr(left)?;
        let right = self.lower_expr(right)?;
        let boolean = Type::boolean();
        expect_assignable(&boolean, &left.ty, left.line)?;
        expect_assignable(&boolean, &right.ty, right.line)?;
        Ok(Descriptor::new(
            DescriptorKind::Logical {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            boolean,
            line,
        ))
    }

    fn lower_unary(
        &mut self,
        op: UnaryOp,
        right: &Expr,
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let right = self.lower_expr(right)?;
        let ty = match op {
            UnaryOp::Bang => {
                expect_assignable(&Type::boolean(), &right.ty, right.line)?;
                Type::boolean()
            }
            UnaryOp::Minus => {
                if !right.ty.is_number() {
                    return Err(unexpected("Int or Double", &right.ty, right.line));
                }
                right.ty.clone()
            }
        };
        Ok(Descriptor::new(
            DescriptorKind::Unary {
                op,
                right: Box::new(right),
            },
            ty,
            line,
        ))
    }

    /// `receiver.name`: a field of the receiver's class.
    fn lower_get(
        &mut self,
        receiver: &Expr,
        name: &str,
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let receiver = self.lower_expr(receiver)?;
        let ty = field_type(&receiver.ty, name).ok_or_else(|| CompileError::UnresolvedVariable {
            name: name.to_string(),
            line,
        })?;
        Ok(Descriptor::new(
            DescriptorKind::Get {
                receiver: Box::new(receiver),
                name: name.to_string(),
            },
            ty,
            line,
        ))
    }

    fn lower_set(
        &mut self,
        receiver: &Expr,
        name: &str,
        value: &Expr,
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let receiver = self.lower_expr(receiver)?;
        let expected =
            field_type(&receiver.ty, name).ok_or_else(|| CompileError::UnresolvedVariable {
                name: name.to_string(),
                line,
            })?;
        let value = self.lower_expr(value)?;
        expect_assignable(&expected, &value.ty, value.line)?;
        Ok(Descriptor::new(
            DescriptorKind::Set {
                receiver: Box::new(receiver),
                name: name.to_string(),
                value: Box::new(value),
            },
            Type::unit(),
            line,
        ))
    }

    /// Each branch gets its own scope. When both branches end in an
    /// expression, the `then` type must accept the `else` type and is the
    /// type of the whole expression; otherwise the expression is `Unit`.
    fn lower_if(
        &mut self,
        condition: &Expr,
        then_branch: &[Stmt],
        else_branch: Option<&[Stmt]>,
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let condition = self.lower_expr(condition)?;
        expect_assignable(&Type::boolean(), &condition.ty, condition.line)?;
        let then_branch = self.lower_body(then_branch)?;
        let else_branch = match else_branch {
            Some(body) => self.lower_body(body)?,
            None => Vec::new(),
        };
        let ty = match (value_type(&then_branch), value_type(&else_branch)) {
            (Some(then_ty), Some(else_ty)) => {
                let else_line = else_branch.last().map_or(line, |last| last.line);
                expect_assignable(then_ty, else_ty, else_line)?;
                then_ty.clone()
            }
            _ => Type::unit(),
        };
        Ok(Descriptor::new(
            DescriptorKind::If {
                condition: Box::new(condition),
                then_branch,
                else_branch,
            },
            ty,
            line,
        ))
    }
}

fn field_type(receiver: &Type, name: &str) -> Option<Type> {
    receiver.as_class()?.fields().get(name).cloned()
}

/// Report whichever operand is not a number.
fn mismatched_operand(left: &Descriptor, right: &Descriptor, line: Line) -> CompileError {
    let found = if left.ty.is_number() { &right.ty } else { &left.ty };
    unexpected("Int or Double", found, line)
}
