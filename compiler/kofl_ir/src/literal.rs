use kofl_types::Type;
use std::fmt;

/// A literal value as written in source.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    Unit,
}

impl Literal {
    /// The builtin type of this literal.
    pub fn ty(&self) -> Type {
        match self {
            Literal::Int(_) => Type::int(),
            Literal::Double(_) => Type::double(),
            Literal::Boolean(_) => Type::boolean(),
            Literal::String(_) => Type::string(),
            Literal::Unit => Type::unit(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "{value}"),
            Literal::Double(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{value:.1}")
            }
            Literal::Double(value) => write!(f, "{value}"),
            Literal::Boolean(value) => write!(f, "{value}"),
            Literal::String(value) => write!(f, "{value:?}"),
            Literal::Unit => f.write_str("Unit"),
        }
    }
}
