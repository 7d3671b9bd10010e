//! Runtime values and the builtin function library.
//!
//! A [`Value`] is the denotation of a fully-applied constant term: numbers,
//! truth values, strings, calendar dates and opaque entity identifiers.
//! [`BuiltinOp`] enumerates the externally-computed functions of the standard
//! library (arithmetic, boolean connectives, comparisons); evaluation happens
//! in [`BuiltinOp::apply`] once every argument slot is bound.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::types::{AtomTag, LambdaType};

/// A constant denotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A numeric value
    Num(f64),
    /// A truth value
    Bool(bool),
    /// A string value
    Str(String),
    /// A calendar date
    Date(NaiveDate),
    /// An opaque knowledge-base entity identifier
    Entity(String),
}

impl Value {
    /// The atomic tag of this value's type.
    pub fn tag(&self) -> AtomTag {
        match self {
            Value::Num(_) => AtomTag::Numeric,
            Value::Bool(_) => AtomTag::Boolean,
            Value::Str(_) => AtomTag::Str,
            Value::Date(_) => AtomTag::Date,
            Value::Entity(_) => AtomTag::Entity,
        }
    }

    /// The atomic type of this value.
    pub fn ttype(&self) -> LambdaType {
        LambdaType::atom(self.tag())
    }

    /// A short kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::Entity(_) => "entity",
        }
    }

    fn as_num(&self, builtin: &'static str) -> Result<f64, CoreError> {
        match self {
            Value::Num(n) => Ok(*n),
            other => Err(CoreError::ValueMismatch {
                builtin,
                expected: "number",
                got: other.kind_name(),
            }),
        }
    }

    fn as_bool(&self, builtin: &'static str) -> Result<bool, CoreError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(CoreError::ValueMismatch {
                builtin,
                expected: "boolean",
                got: other.kind_name(),
            }),
        }
    }

    /// Order two values of the same kind. Cross-kind comparison and
    /// non-orderable kinds yield a mismatch error.
    fn order(&self, other: &Value, builtin: &'static str) -> Result<Ordering, CoreError> {
        let mismatch = || CoreError::ValueMismatch {
            builtin,
            expected: self.kind_name(),
            got: other.kind_name(),
        };
        match (self, other) {
            (Value::Num(a), Value::Num(b)) => a.partial_cmp(b).ok_or_else(mismatch),
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
            _ => Err(mismatch()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{}", n),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Str(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Entity(e) => write!(f, "{}", e),
        }
    }
}

/// The builtin functions of the standard naming context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BuiltinOp {
    /// Every builtin, in registration order.
    pub const ALL: [BuiltinOp; 13] = [
        BuiltinOp::Add,
        BuiltinOp::Sub,
        BuiltinOp::Mul,
        BuiltinOp::Div,
        BuiltinOp::And,
        BuiltinOp::Or,
        BuiltinOp::Not,
        BuiltinOp::Eq,
        BuiltinOp::Ne,
        BuiltinOp::Lt,
        BuiltinOp::Le,
        BuiltinOp::Gt,
        BuiltinOp::Ge,
    ];

    /// The surface name this builtin is bound to.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinOp::Add => "+",
            BuiltinOp::Sub => "-",
            BuiltinOp::Mul => "*",
            BuiltinOp::Div => "/",
            BuiltinOp::And => "and",
            BuiltinOp::Or => "or",
            BuiltinOp::Not => "not",
            BuiltinOp::Eq => "==",
            BuiltinOp::Ne => "!=",
            BuiltinOp::Lt => "<",
            BuiltinOp::Le => "<=",
            BuiltinOp::Gt => ">",
            BuiltinOp::Ge => ">=",
        }
    }

    /// Argument types and return type.
    ///
    /// Comparisons take the `Any` placeholder so a single operator covers
    /// numbers, strings and dates; the placeholder is resolved per
    /// application by one-shot inference.
    pub fn signature(&self) -> (Vec<LambdaType>, LambdaType) {
        match self {
            BuiltinOp::Add | BuiltinOp::Sub | BuiltinOp::Mul | BuiltinOp::Div => (
                vec![LambdaType::numeric(), LambdaType::numeric()],
                LambdaType::numeric(),
            ),
            BuiltinOp::And | BuiltinOp::Or => (
                vec![LambdaType::boolean(), LambdaType::boolean()],
                LambdaType::boolean(),
            ),
            BuiltinOp::Not => (vec![LambdaType::boolean()], LambdaType::boolean()),
            BuiltinOp::Eq
            | BuiltinOp::Ne
            | BuiltinOp::Lt
            | BuiltinOp::Le
            | BuiltinOp::Gt
            | BuiltinOp::Ge => (
                vec![LambdaType::any(), LambdaType::any()],
                LambdaType::boolean(),
            ),
        }
    }

    /// Evaluate the builtin over fully-resolved argument values.
    pub fn apply(&self, args: &[Value]) -> Result<Value, CoreError> {
        let name = self.name();
        match self {
            BuiltinOp::Add => Ok(Value::Num(args[0].as_num(name)? + args[1].as_num(name)?)),
            BuiltinOp::Sub => Ok(Value::Num(args[0].as_num(name)? - args[1].as_num(name)?)),
            BuiltinOp::Mul => Ok(Value::Num(args[0].as_num(name)? * args[1].as_num(name)?)),
            BuiltinOp::Div => {
                let denom = args[1].as_num(name)?;
                if denom == 0.0 {
                    return Err(CoreError::DivisionByZero);
                }
                Ok(Value::Num(args[0].as_num(name)? / denom))
            }
            BuiltinOp::And => Ok(Value::Bool(args[0].as_bool(name)? && args[1].as_bool(name)?)),
            BuiltinOp::Or => Ok(Value::Bool(args[0].as_bool(name)? || args[1].as_bool(name)?)),
            BuiltinOp::Not => Ok(Value::Bool(!args[0].as_bool(name)?)),
            BuiltinOp::Eq => Ok(Value::Bool(args[0] == args[1])),
            BuiltinOp::Ne => Ok(Value::Bool(args[0] != args[1])),
            BuiltinOp::Lt => Ok(Value::Bool(args[0].order(&args[1], name)? == Ordering::Less)),
            BuiltinOp::Le => Ok(Value::Bool(args[0].order(&args[1], name)? != Ordering::Greater)),
            BuiltinOp::Gt => Ok(Value::Bool(
                args[0].order(&args[1], name)? == Ordering::Greater,
            )),
            BuiltinOp::Ge => Ok(Value::Bool(args[0].order(&args[1], name)? != Ordering::Less)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let v = BuiltinOp::Add
            .apply(&[Value::Num(2.0), Value::Num(3.0)])
            .unwrap();
        assert_eq!(v, Value::Num(5.0));

        let v = BuiltinOp::Div
            .apply(&[Value::Num(7.0), Value::Num(2.0)])
            .unwrap();
        assert_eq!(v, Value::Num(3.5));
    }

    #[test]
    fn test_division_by_zero() {
        let err = BuiltinOp::Div
            .apply(&[Value::Num(1.0), Value::Num(0.0)])
            .unwrap_err();
        assert_eq!(err, CoreError::DivisionByZero);
    }

    #[test]
    fn test_connectives() {
        let v = BuiltinOp::And
            .apply(&[Value::Bool(true), Value::Bool(false)])
            .unwrap();
        assert_eq!(v, Value::Bool(false));
        let v = BuiltinOp::Not.apply(&[Value::Bool(false)]).unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn test_comparisons_over_kinds() {
        let v = BuiltinOp::Lt
            .apply(&[Value::Num(1.0), Value::Num(2.0)])
            .unwrap();
        assert_eq!(v, Value::Bool(true));

        let d1 = NaiveDate::from_ymd_opt(2018, 2, 3).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let v = BuiltinOp::Le
            .apply(&[Value::Date(d1), Value::Date(d2)])
            .unwrap();
        assert_eq!(v, Value::Bool(true));

        // equality is total, ordering is not
        let v = BuiltinOp::Eq
            .apply(&[Value::Num(1.0), Value::Str("a".into())])
            .unwrap();
        assert_eq!(v, Value::Bool(false));
        assert!(BuiltinOp::Lt
            .apply(&[Value::Num(1.0), Value::Str("a".into())])
            .is_err());
    }

    #[test]
    fn test_comparison_signature_is_placeholder() {
        let (args, ret) = BuiltinOp::Lt.signature();
        assert!(args.iter().all(|t| t.requires_inference()));
        assert!(ret.is_boolean());
    }
}
