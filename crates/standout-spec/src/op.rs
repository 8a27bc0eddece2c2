//! Comparison operators for expression trees.
//!
//! A [`CmpOp`] sits in an [`Expr::Compare`](crate::Expr::Compare) node and
//! decides how the evaluated left operand relates to the right one.

use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "regex")]
use regex::Regex;

use crate::value::{Literal, Value};

/// Comparison operator.
///
/// - **Ordering**: `Eq`, `Ne`, `Gt`, `Gte`, `Lt`, `Lte` work on any pair of
///   values of the same kind. `Eq`/`Ne` also accept null on either side.
/// - **String**: `StartsWith`, `EndsWith`, `Contains`, `Matches`
/// - **Enum**: `In` tests membership in a discriminant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    StartsWith,
    EndsWith,
    Contains,
    In,
    #[cfg(feature = "regex")]
    Matches,
}

impl CmpOp {
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            CmpOp::Eq | CmpOp::Ne | CmpOp::Gt | CmpOp::Gte | CmpOp::Lt | CmpOp::Lte
        )
    }

    /// Evaluates an ordering-based operator. Non-ordering operators yield `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            CmpOp::Eq => ordering == Ordering::Equal,
            CmpOp::Ne => ordering != Ordering::Equal,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Gte => ordering != Ordering::Less,
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Applies the operator to an evaluated pair of operands.
    ///
    /// Mismatched kinds never match. Null equals only null, so `Ne` against
    /// null holds for every present value.
    pub(crate) fn apply(self, lhs: &Value<'_>, rhs: Operand<'_>) -> bool {
        match rhs {
            Operand::Value(rhs) => self.apply_values(lhs, &rhs),
            Operand::Set(set) => match (self, lhs) {
                (CmpOp::In, Value::Enum(d)) => set.contains(d),
                _ => false,
            },
            #[cfg(feature = "regex")]
            Operand::Pattern(re) => match (self, lhs) {
                (CmpOp::Matches, Value::String(s)) => re.is_match(s),
                _ => false,
            },
        }
    }

    fn apply_values(self, lhs: &Value<'_>, rhs: &Value<'_>) -> bool {
        match (lhs, rhs) {
            (Value::None, Value::None) => self == CmpOp::Eq,
            (Value::None, _) | (_, Value::None) => self == CmpOp::Ne,
            (Value::String(s), Value::String(pattern)) if !self.is_ordering() => match self {
                CmpOp::StartsWith => s.starts_with(pattern),
                CmpOp::EndsWith => s.ends_with(pattern),
                CmpOp::Contains => s.contains(pattern),
                _ => false,
            },
            _ => lhs
                .compare(rhs)
                .is_some_and(|ordering| self.eval_ordering(ordering)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Gt => ">",
            CmpOp::Gte => ">=",
            CmpOp::Lt => "<",
            CmpOp::Lte => "<=",
            CmpOp::StartsWith => "starts_with",
            CmpOp::EndsWith => "ends_with",
            CmpOp::Contains => "contains",
            CmpOp::In => "in",
            #[cfg(feature = "regex")]
            CmpOp::Matches => "matches",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand operand of a comparison after evaluation.
#[derive(Debug, Clone)]
pub(crate) enum Operand<'a> {
    Value(Value<'a>),
    Set(&'a [u32]),
    #[cfg(feature = "regex")]
    Pattern(&'a Regex),
}

impl<'a> Operand<'a> {
    pub(crate) fn from_literal(literal: &'a Literal) -> Self {
        match literal {
            Literal::EnumSet(set) => Operand::Set(set),
            #[cfg(feature = "regex")]
            Literal::Regex(re) => Operand::Pattern(re),
            scalar => Operand::Value(scalar.as_value().unwrap_or(Value::None)),
        }
    }

    pub(crate) fn into_value(self) -> Value<'a> {
        match self {
            Operand::Value(value) => value,
            _ => Value::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Timestamp};

    fn num(n: i64) -> Value<'static> {
        Value::Number(Number::I64(n))
    }

    fn cmp(op: CmpOp, lhs: Value<'_>, rhs: Value<'_>) -> bool {
        op.apply(&lhs, Operand::Value(rhs))
    }

    #[test]
    fn ordering_operators() {
        assert!(cmp(CmpOp::Gte, num(18), num(18)));
        assert!(!cmp(CmpOp::Gt, num(18), num(18)));
        assert!(cmp(CmpOp::Lt, num(3), num(4)));
        assert!(cmp(CmpOp::Lte, num(4), num(4)));
        assert!(cmp(CmpOp::Ne, num(4), num(5)));
        assert!(cmp(
            CmpOp::Lt,
            Value::Timestamp(Timestamp(1)),
            Value::Timestamp(Timestamp(2))
        ));
    }

    #[test]
    fn null_handling() {
        assert!(cmp(CmpOp::Eq, Value::None, Value::None));
        assert!(!cmp(CmpOp::Ne, Value::None, Value::None));
        assert!(cmp(CmpOp::Ne, Value::String("X"), Value::None));
        assert!(!cmp(CmpOp::Eq, Value::String("X"), Value::None));
        assert!(!cmp(CmpOp::Gt, num(1), Value::None));
    }

    #[test]
    fn string_operators() {
        assert!(cmp(CmpOp::StartsWith, Value::String("hello"), Value::String("he")));
        assert!(cmp(CmpOp::EndsWith, Value::String("hello"), Value::String("lo")));
        assert!(cmp(CmpOp::Contains, Value::String("hello"), Value::String("ell")));
        assert!(!cmp(CmpOp::Contains, Value::String("hello"), Value::String("Ell")));
        assert!(cmp(CmpOp::Eq, Value::String("a"), Value::String("a")));
    }

    #[test]
    fn mismatched_kinds_never_match() {
        assert!(!cmp(CmpOp::Eq, Value::String("1"), num(1)));
        assert!(!cmp(CmpOp::Ne, Value::String("1"), num(1)));
        assert!(!cmp(CmpOp::Contains, num(12), num(1)));
    }

    #[test]
    fn enum_set_membership() {
        let set = [1u32, 3];
        assert!(CmpOp::In.apply(&Value::Enum(3), Operand::Set(&set)));
        assert!(!CmpOp::In.apply(&Value::Enum(2), Operand::Set(&set)));
        assert!(!CmpOp::Eq.apply(&Value::Enum(1), Operand::Set(&set)));
    }

    #[cfg(feature = "regex")]
    #[test]
    fn pattern_matching() {
        let re = Regex::new(r"^[A-Z]\d+$").unwrap();
        assert!(CmpOp::Matches.apply(&Value::String("B12"), Operand::Pattern(&re)));
        assert!(!CmpOp::Matches.apply(&Value::String("b12"), Operand::Pattern(&re)));
        assert!(!CmpOp::Matches.apply(&Value::None, Operand::Pattern(&re)));
    }

    #[test]
    fn display() {
        assert_eq!(CmpOp::Gte.to_string(), ">=");
        assert_eq!(CmpOp::StartsWith.to_string(), "starts_with");
    }
}
