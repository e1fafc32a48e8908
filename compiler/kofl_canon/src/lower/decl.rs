//! Declarations: functions, records, `val`/`var`.

use std::rc::Rc;

use kofl_ir::ast::{Expr, FuncDecl, Param, Stmt};
use kofl_ir::{
    ClassDescriptor, Descriptor, DescriptorKind, FunctionDescriptor, Line, Literal,
    LocalFunctionDescriptor, NativeFunctionDescriptor,
};
use kofl_types::{overload_name, ClassBuilder, FunctionType, Parameters, Type};

use super::{contains_return, expect_assignable, Lowerer};
use crate::CompileError;

impl Lowerer<'_> {
    /// Named function, or extension function when `receiver` is given.
    ///
    /// The overload is registered before the body is lowered so the body
    /// can call itself.
    pub(crate) fn lower_function(
        &mut self,
        decl: &FuncDecl,
        receiver: Option<&str>,
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let receiver = receiver
            .map(|name| self.resolve_type(name, line))
            .transpose()?;
        let mut parameters = Parameters::new();
        if let Some(receiver) = &receiver {
            parameters.push("this", receiver.clone());
        }
        self.resolve_parameters(&mut parameters, &decl.parameters, line)?;
        let return_type = self.resolve_return_type(decl.return_type.as_deref(), line)?;
        let ty = FunctionType::new(parameters, return_type.clone(), receiver.clone());

        let index = if receiver.is_some() {
            self.scope.define_extension(&decl.name, ty.clone())
        } else {
            self.scope.define_function(&decl.name, ty.clone())
        };
        let name = overload_name(&decl.name, index);
        tracing::debug!(function = %name, signature = %ty, "lower function");

        let mut body = self.lower_function_body(ty.parameters(), &return_type, &decl.body)?;
        let returns = body.iter().any(contains_return);
        if !returns {
            if return_type != Type::unit() {
                return Err(CompileError::MissingReturn {
                    function: decl.name.clone(),
                    line,
                });
            }
            if receiver.is_some() {
                body.push(synthetic_return());
            }
        }

        let function = FunctionDescriptor {
            name,
            simple_name: decl.name.clone(),
            ty: ty.clone(),
            body,
            line,
        };
        Ok(Descriptor::new(
            DescriptorKind::Function(Rc::new(function)),
            Type::Function(ty),
            line,
        ))
    }

    pub(crate) fn lower_anonymous_function(
        &mut self,
        parameters: &[Param],
        return_type: Option<&str>,
        body: &[Stmt],
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let mut resolved = Parameters::new();
        self.resolve_parameters(&mut resolved, parameters, line)?;
        let return_type = self.resolve_return_type(return_type, line)?;
        let ty = FunctionType::new(resolved, return_type.clone(), None);

        let body = self.lower_function_body(ty.parameters(), &return_type, body)?;
        if return_type != Type::unit() && !body.iter().any(contains_return) {
            return Err(CompileError::MissingReturn {
                function: "<anonymous>".to_string(),
                line,
            });
        }

        let local = LocalFunctionDescriptor {
            ty: ty.clone(),
            body,
            line,
        };
        Ok(Descriptor::new(
            DescriptorKind::LocalFunction(Rc::new(local)),
            Type::Function(ty),
            line,
        ))
    }

    pub(crate) fn lower_native_function(
        &mut self,
        name: &str,
        parameters: &[Param],
        return_type: Option<&str>,
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let mut resolved = Parameters::new();
        self.resolve_parameters(&mut resolved, parameters, line)?;
        let return_type = self.resolve_return_type(return_type, line)?;
        let ty = FunctionType::new(resolved, return_type, None);
        let index = self.scope.define_function(name, ty.clone());

        let native = NativeFunctionDescriptor {
            name: overload_name(name, index),
            native_name: name.to_string(),
            ty: ty.clone(),
            line,
        };
        Ok(Descriptor::new(
            DescriptorKind::NativeFunction(Rc::new(native)),
            Type::Function(ty),
            line,
        ))
    }

    /// `type record Name(field: Type, ...)`: a class type whose single
    /// constructor takes the fields in order.
    pub(crate) fn lower_record(
        &mut self,
        name: &str,
        parameters: &[Param],
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        if name.is_empty() {
            return Err(CompileError::ClassMissingName { line });
        }
        let mut fields = Parameters::new();
        self.resolve_parameters(&mut fields, parameters, line)?;
        let class = ClassBuilder::new(name)
            .fields(fields.clone())
            .constructor(fields.clone())
            .build();
        let ty = Type::Class(class);
        self.scope.define_type(name, ty.clone());

        let descriptor = ClassDescriptor {
            name: name.to_string(),
            fields,
            line,
        };
        Ok(Descriptor::new(
            DescriptorKind::Class(Rc::new(descriptor)),
            ty,
            line,
        ))
    }

    /// `val`/`var`. An annotation must accept the value and becomes the
    /// declared type; otherwise the value's type is used.
    pub(crate) fn lower_binding(
        &mut self,
        name: &str,
        annotation: Option<&str>,
        value: &Expr,
        mutable: bool,
        line: Line,
    ) -> Result<Descriptor, CompileError> {
        let value = self.lower_expr(value)?;
        let ty = match annotation {
            Some(annotation) => {
                let declared = self.resolve_type(annotation, line)?;
                expect_assignable(&declared, &value.ty, value.line)?;
                declared
            }
            None => value.ty.clone(),
        };
        self.scope.define(name, ty.clone());

        let name = name.to_string();
        let value = Box::new(value);
        let kind = if mutable {
            DescriptorKind::Var { name, value }
        } else {
            DescriptorKind::Val { name, value }
        };
        Ok(Descriptor::new(kind, ty, line))
    }

    /// Resolve annotations and append to `into`, rejecting duplicate names.
    fn resolve_parameters(
        &self,
        into: &mut Parameters,
        parameters: &[Param],
        line: Line,
    ) -> Result<(), CompileError> {
        for parameter in parameters {
            if into.contains(&parameter.name) {
                return Err(CompileError::AlreadyResolvedVariable {
                    name: parameter.name.clone(),
                    line,
                });
            }
            let ty = self.resolve_type(&parameter.ty, line)?;
            into.push(parameter.name.clone(), ty);
        }
        Ok(())
    }

    fn resolve_return_type(
        &self,
        annotation: Option<&str>,
        line: Line,
    ) -> Result<Type, CompileError> {
        annotation.map_or_else(|| Ok(Type::unit()), |name| self.resolve_type(name, line))
    }

    /// Lower a body in a scope seeded with the parameters, with `returns`
    /// checked against `return_type`.
    fn lower_function_body(
        &mut self,
        parameters: &Parameters,
        return_type: &Type,
        body: &[Stmt],
    ) -> Result<Vec<Descriptor>, CompileError> {
        self.returns.push(return_type.clone());
        let result = self.scoped(|this| {
            for (name, ty) in parameters.iter() {
                this.scope.define(name, ty.clone());
            }
            body.iter().map(|stmt| this.lower_stmt(stmt)).collect()
        });
        self.returns.pop();
        result
    }
}

fn synthetic_return() -> Descriptor {
    let unit = Descriptor::new(
        DescriptorKind::Const(Literal::Unit),
        Type::unit(),
        Line::SYNTHETIC,
    );
    Descriptor::new(
        DescriptorKind::Return(Box::new(unit)),
        Type::unit(),
        Line::SYNTHETIC,
    )
}
