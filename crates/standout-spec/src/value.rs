//! Runtime values and literals.
//!
//! [`Value`] is what an expression produces when it is evaluated against an
//! entity: it borrows from the entity (field reads) or from the expression
//! (literals). [`Literal`] is the owned form stored inside expression trees.

use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "regex")]
use regex::Regex;

/// Runtime value, borrowed from the entity or from the expression tree.
///
/// [`Entity::field_value`](crate::Entity::field_value) returns this type.
///
/// ```
/// use standout_spec::{Number, Value};
///
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// fn accessor<'a>(person: &'a Person, field: &str) -> Value<'a> {
///     match field {
///         "name" => Value::String(&person.name),
///         "age" => Value::Number(Number::from(person.age)),
///         _ => Value::None,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Point in time.
    Timestamp(Timestamp),
    /// Enum discriminant.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
    /// Missing field, unset optional, or null literal.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this value is [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns the boolean this value stands for in a condition.
    ///
    /// Only `Bool(true)` is truthy; every other value, including a type
    /// mismatch, counts as `false`.
    pub fn is_truthy(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// Returns the string if this is a string value.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this is a numeric value.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Orders two values of the same kind.
    ///
    /// Returns `None` for mismatched kinds, for `None` values and for NaN.
    pub fn compare(&self, other: &Value<'_>) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => a.compare(*b),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Timestamp(t) => write!(f, "@{}", t.as_millis()),
            Value::Enum(d) => write!(f, "#{}", d),
            Value::Bool(b) => write!(f, "{}", b),
            Value::None => f.write_str("null"),
        }
    }
}

/// Numeric value that keeps the precision of its source type.
///
/// Mixed-kind comparisons go through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed integer.
    I64(i64),
    /// Unsigned integer.
    U64(u64),
    /// Floating point.
    F64(f64),
}

impl Number {
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            // Exact for the integer pairs that fit in i64.
            (Number::I64(a), Number::U64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::U64(a), Number::I64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! number_from {
    ($variant:ident, $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }

            impl From<$source> for Literal {
                fn from(n: $source) -> Self {
                    Literal::Number(Number::from(n))
                }
            }
        )+
    };
}

number_from!(I64, i64: i8, i16, i32, i64, isize);
number_from!(U64, u64: u8, u16, u32, u64, usize);
number_from!(F64, f64: f32, f64);

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Saturates at the `i64` range.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }
}

/// Owned constant stored in an expression tree.
#[derive(Debug, Clone)]
pub enum Literal {
    Null,
    String(String),
    Number(Number),
    Timestamp(Timestamp),
    Enum(u32),
    /// Discriminant set, the right-hand side of [`CmpOp::In`](crate::CmpOp::In).
    EnumSet(Vec<u32>),
    Bool(bool),
    /// Compiled pattern, the right-hand side of [`CmpOp::Matches`](crate::CmpOp::Matches).
    #[cfg(feature = "regex")]
    Regex(Regex),
}

impl Literal {
    /// Returns the scalar view of this literal.
    ///
    /// Sets and patterns have no scalar view and yield `None`.
    pub fn as_value(&self) -> Option<Value<'_>> {
        Some(match self {
            Literal::Null => Value::None,
            Literal::String(s) => Value::String(s),
            Literal::Number(n) => Value::Number(*n),
            Literal::Timestamp(t) => Value::Timestamp(*t),
            Literal::Enum(d) => Value::Enum(*d),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::EnumSet(_) => return None,
            #[cfg(feature = "regex")]
            Literal::Regex(_) => return None,
        })
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::EnumSet(a), Literal::EnumSet(b)) => a == b,
            #[cfg(feature = "regex")]
            (Literal::Regex(a), Literal::Regex(b)) => a.as_str() == b.as_str(),
            (a, b) => match (a.as_value(), b.as_value()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::EnumSet(set) => {
                f.write_str("[")?;
                for (i, d) in set.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "#{}", d)?;
                }
                f.write_str("]")
            }
            #[cfg(feature = "regex")]
            Literal::Regex(re) => write!(f, "/{}/", re.as_str()),
            scalar => match scalar.as_value() {
                Some(value) => write!(f, "{}", value),
                None => Ok(()),
            },
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<Number> for Literal {
    fn from(n: Number) -> Self {
        Literal::Number(n)
    }
}

impl From<Timestamp> for Literal {
    fn from(t: Timestamp) -> Self {
        Literal::Timestamp(t)
    }
}

impl From<Vec<u32>> for Literal {
    fn from(set: Vec<u32>) -> Self {
        Literal::EnumSet(set)
    }
}

impl<L: Into<Literal>> From<Option<L>> for Literal {
    fn from(value: Option<L>) -> Self {
        value.map_or(Literal::Null, Into::into)
    }
}

#[cfg(feature = "regex")]
impl From<Regex> for Literal {
    fn from(re: Regex) -> Self {
        Literal::Regex(re)
    }
}
