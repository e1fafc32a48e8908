//! Operator evaluation.
//!
//! Arithmetic on two numbers is computed in `f64` and yields a Double,
//! matching the static type lowering assigns. `+` with a String on the
//! left concatenates the rendered right operand.

use kofl_ir::{BinaryOp, Descriptor, LogicalOp, UnaryOp};

use super::Interpreter;
use crate::environment::Environment;
use crate::errors::{invalid_type, EvalError, EvalErrorKind, EvalResult};
use crate::value::{HostValue, KoflObject};

impl Interpreter {
    /// `&&` and `||` short-circuit: the right operand is evaluated only
    /// when it decides the result.
    pub(super) fn eval_logical(
        &self,
        left: &Descriptor,
        op: LogicalOp,
        right: &Descriptor,
        env: &Environment,
    ) -> EvalResult {
        let lhs = self.evaluate(left, env)?;
        let lhs = boolean(&lhs)?;
        let decided = match op {
            LogicalOp::And => !lhs,
            LogicalOp::Or => lhs,
        };
        if decided {
            return Ok(KoflObject::boolean(lhs));
        }
        let rhs = self.evaluate(right, env)?;
        Ok(KoflObject::boolean(boolean(&rhs)?))
    }
}

pub(super) fn binary(
    left: &KoflObject,
    op: BinaryOp,
    right: &KoflObject,
) -> Result<KoflObject, EvalError> {
    if op.is_equality() {
        let equal = left == right;
        return Ok(KoflObject::boolean(if op == BinaryOp::EqualEqual {
            equal
        } else {
            !equal
        }));
    }

    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        let value = match op {
            BinaryOp::Plus => KoflObject::double(l + r),
            BinaryOp::Minus => KoflObject::double(l - r),
            BinaryOp::Star => KoflObject::double(l * r),
            BinaryOp::Slash => KoflObject::double(l / r),
            BinaryOp::Greater => KoflObject::boolean(l > r),
            BinaryOp::GreaterEqual => KoflObject::boolean(l >= r),
            BinaryOp::Less => KoflObject::boolean(l < r),
            BinaryOp::LessEqual => KoflObject::boolean(l <= r),
            BinaryOp::EqualEqual | BinaryOp::BangEqual => {
                return Err(invalid_operands(left, op, right))
            }
        };
        return Ok(value);
    }

    if op == BinaryOp::Plus {
        if let Some(prefix) = left.as_str() {
            return Ok(KoflObject::string(format!("{prefix}{right}")));
        }
    }
    Err(invalid_operands(left, op, right))
}

pub(super) fn unary(op: UnaryOp, right: &KoflObject) -> Result<KoflObject, EvalError> {
    match (op, right.host()) {
        (UnaryOp::Minus, Some(HostValue::Int(value))) => Ok(KoflObject::int(value.wrapping_neg())),
        (UnaryOp::Minus, Some(HostValue::Double(value))) => Ok(KoflObject::double(-value)),
        (UnaryOp::Minus, _) => Err(invalid_type("Int or Double", right.ty())),
        (UnaryOp::Bang, _) => Ok(KoflObject::boolean(!boolean(right)?)),
    }
}

fn boolean(value: &KoflObject) -> Result<bool, EvalError> {
    value
        .as_bool()
        .ok_or_else(|| invalid_type("Boolean", value.ty()))
}

#[cold]
fn invalid_operands(left: &KoflObject, op: BinaryOp, right: &KoflObject) -> EvalError {
    EvalErrorKind::InvalidOperands {
        op: op.to_string(),
        left: left.ty().to_string(),
        right: right.ty().to_string(),
    }
    .into()
}
