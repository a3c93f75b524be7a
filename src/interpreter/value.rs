use std::fmt;

use crate::ast::{DeclaredType, LiteralValue};

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i32),
    Float(f64),
    Char(char),
    Str(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "NIL",
            Self::Bool(_) => "BOOL",
            Self::Int(_) => "INT",
            Self::Float(_) => "FLOAT",
            Self::Char(_) => "CHAR",
            Self::Str(_) => "STRING",
        }
    }

    /// Values of different tags are never equal; `NIL` equals only `NIL`.
    pub fn is_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }

    /// Whether this value may be stored in a variable of `declared` type.
    /// `NIL` fits every type.
    pub fn conforms_to(&self, declared: DeclaredType) -> bool {
        matches!(
            (self, declared),
            (Self::Nil, _)
                | (Self::Int(_), DeclaredType::Int)
                | (Self::Float(_), DeclaredType::Float)
                | (Self::Char(_), DeclaredType::Char)
                | (Self::Bool(_), DeclaredType::Bool)
                | (Self::Str(_), DeclaredType::String)
        )
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Int(n) => Self::Int(*n),
            LiteralValue::Float(n) => Self::Float(*n),
            LiteralValue::Char(c) => Self::Char(*c),
            LiteralValue::Str(s) => Self::Str(s.clone()),
            LiteralValue::Bool(b) => Self::Bool(*b),
            LiteralValue::Nil => Self::Nil,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(true) => write!(f, "TRUE"),
            Self::Bool(false) => write!(f, "FALSE"),
            Self::Int(n) => write!(f, "{n}"),
            // `{}` on f64 already drops a trailing ".0" for whole values.
            Self::Float(n) => write!(f, "{n}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Nil, "nil")]
    #[case(Value::Bool(true), "TRUE")]
    #[case(Value::Bool(false), "FALSE")]
    #[case(Value::Int(-12), "-12")]
    #[case(Value::Float(2.0), "2")]
    #[case(Value::Float(2.5), "2.5")]
    #[case(Value::Float(0.1), "0.1")]
    #[case(Value::Float(1e22), "10000000000000000000000")]
    #[case(Value::Float(f64::INFINITY), "inf")]
    #[case(Value::Float(f64::NEG_INFINITY), "-inf")]
    #[case(Value::Float(f64::NAN), "NaN")]
    #[case(Value::Char('$'), "$")]
    #[case(Value::Str("hi there".to_string()), "hi there")]
    fn display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn equality_never_crosses_tags() {
        assert!(Value::Nil.is_equal(&Value::Nil));
        assert!(Value::Int(1).is_equal(&Value::Int(1)));
        assert!(!Value::Int(1).is_equal(&Value::Float(1.0)));
        assert!(!Value::Char('a').is_equal(&Value::Str("a".to_string())));
        assert!(!Value::Nil.is_equal(&Value::Bool(false)));
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        assert!(!Value::Float(f64::NAN).is_equal(&Value::Float(f64::NAN)));
    }

    #[rstest]
    #[case(Value::Int(1), DeclaredType::Int, true)]
    #[case(Value::Int(1), DeclaredType::Float, false)]
    #[case(Value::Float(1.0), DeclaredType::Int, false)]
    #[case(Value::Str("s".to_string()), DeclaredType::String, true)]
    #[case(Value::Char('s'), DeclaredType::String, false)]
    #[case(Value::Bool(true), DeclaredType::Bool, true)]
    #[case(Value::Nil, DeclaredType::Char, true)]
    fn conformance(#[case] value: Value, #[case] declared: DeclaredType, #[case] ok: bool) {
        assert_eq!(value.conforms_to(declared), ok);
    }
}
