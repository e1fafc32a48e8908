//! Call resolution.
//!
//! - `name(args)`: if `name` has visible overloads, the first matching one
//!   is chosen and the callee becomes an access of its indexed name
//!   (`add-1`). Otherwise `name` must be a variable of function type.
//! - `recv.name(args)`: resolved against the extension functions declared
//!   on exactly the receiver's type in scope. The call is rewritten to a direct call
//!   of the indexed function with `this` bound to the receiver.
//! - anything else: the callee expression must have a function type.
//!
//! Arguments are positional and keyed by parameter name in the output.

use kofl_ir::ast::{Expr, ExprKind};
use kofl_ir::{Descriptor, DescriptorKind, Line};
use kofl_types::{match_overload, FunctionType, Overload, Type};

use super::{expect_assignable, unexpected, Lowerer};
use crate::CompileError;

impl Lowerer<'_> {
    pub(crate) fn lower_call(
        &mut self,
        callee: &Expr,
        arguments: &[Expr],
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        if let ExprKind::Get { receiver, name } = &callee.kind {
            return self.lower_method_call(receiver, name, arguments, line);
        }

        let arguments = arguments
            .iter()
            .map(|argument| self.lower_expr(argument))
            .collect::<Result<Vec<_>, _>>()?;
        let types: Vec<Type> = arguments.iter().map(|argument| argument.ty.clone()).collect();

        let (callee, function) = match &callee.kind {
            ExprKind::Var(name) => self.resolve_named_callee(name, &types, callee.line)?,
            _ => {
                let callee = self.lower_expr(callee)?;
                let function = callable_type(&callee)?;
                (callee, function)
            }
        };
        check_arguments(&function, &arguments)?;

        build_call(callee, &function, arguments, line)
    }

    fn resolve_named_callee(
        &mut self,
        name: &str,
        types: &[Type],
        line: Line,
    ) -> Result<(Descriptor, FunctionType), CompileError> {
        let overloads = self.scope.lookup_function_overload(name);
        if !overloads.is_empty() {
            let Some(overload) = match_overload(&overloads, types, None) else {
                return Err(CompileError::UnresolvedFunction {
                    name: name.to_string(),
                    line,
                });
            };
            tracing::trace!(name, overload = %overload.name, "resolved overload");
            return Ok(access_function(overload, line));
        }

        let ty = self
            .scope
            .lookup(name)
            .map_err(|_| CompileError::UnresolvedFunction {
                name: name.to_string(),
                line,
            })?;
        let callee = Descriptor::new(DescriptorKind::AccessVar(name.to_string()), ty, line);
        let function = callable_type(&callee)?;
        Ok((callee, function))
    }

    fn lower_method_call(
        &mut self,
        receiver: &Expr,
        name: &str,
        arguments: &[Expr],
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let receiver = self.lower_expr(receiver)?;
        let mut lowered = Vec::with_capacity(arguments.len() + 1);
        lowered.push(receiver);
        for argument in arguments {
            lowered.push(self.lower_expr(argument)?);
        }
        let types: Vec<Type> = lowered.iter().map(|argument| argument.ty.clone()).collect();
        let receiver_ty = types[0].clone();

        let candidates = self.scope.lookup_extension(&receiver_ty, name);
        let Some(overload) = match_overload(&candidates, &types, Some(&receiver_ty)) else {
            return Err(CompileError::UnresolvedFunction {
                name: name.to_string(),
                line,
            });
        };
        tracing::trace!(name, overload = %overload.name, receiver = %receiver_ty, "resolved extension");
        let (callee, function) = access_function(overload, line);
        build_call(callee, &function, lowered, line)
    }
}

fn access_function(overload: &Overload, line: Line) -> (Descriptor, FunctionType) {
    let callee = Descriptor::new(
        DescriptorKind::AccessFunction(overload.name.clone()),
        Type::Function(overload.ty.clone()),
        line,
    );
    (callee, overload.ty.clone())
}

fn callable_type(callee: &Descriptor) -> Result<FunctionType, CompileError> {
    callee
        .ty
        .as_function()
        .cloned()
        .ok_or_else(|| unexpected("a function", &callee.ty, callee.line))
}

/// Arity and argument types against a single (non-overloaded) signature.
fn check_arguments(function: &FunctionType, arguments: &[Descriptor]) -> Result<(), CompileError> {
    for (parameter, argument) in function.parameters().types().zip(arguments) {
        expect_assignable(parameter, &argument.ty, argument.line)?;
    }
    Ok(())
}

/// Key each argument by its parameter name.
fn build_call(
    callee: Descriptor,
    function: &FunctionType,
    arguments: Vec<Descriptor>,
    line: Line,
) -> Result<Descriptor, CompileError> {
    let parameters = function.parameters();
    if arguments.len() < parameters.len() {
        return Err(CompileError::UnresolvedParameter {
            index: arguments.len(),
            line,
        });
    }
    let arguments = arguments
        .into_iter()
        .enumerate()
        .map(|(index, argument)| match parameters.at(index) {
            Some((name, _)) => Ok((name.to_string(), argument)),
            None => Err(CompileError::UnresolvedParameter { index, line }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Descriptor::new(
        DescriptorKind::Call {
            callee: Box::new(callee),
            arguments,
        },
        function.return_type().clone(),
        line,
    ))
}
