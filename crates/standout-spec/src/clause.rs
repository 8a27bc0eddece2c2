//! Field clauses: leaf specifications built from a field, an operator and a value.
//!
//! ```
//! use standout_spec::{field, Entity, Number, Value};
//!
//! struct Person {
//!     age: u32,
//!     license: Option<String>,
//! }
//!
//! impl Entity for Person {
//!     fn field_value(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "age" => Value::Number(Number::from(self.age)),
//!             "license" => self.license.as_deref().map_or(Value::None, Value::String),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! let adult = field::<Person>("age").gte(18u32);
//! let licensed = field::<Person>("license").is_not_null();
//! let driver = adult & licensed;
//!
//! assert!(driver.is_satisfied_by(&Person { age: 20, license: Some("X".into()) }));
//! assert!(!driver.is_satisfied_by(&Person { age: 20, license: None }));
//! ```

use std::marker::PhantomData;

#[cfg(feature = "regex")]
use crate::error::Result;
use crate::expr::{CompiledPredicate, Expr, Lambda, Param};
use crate::op::CmpOp;
use crate::spec::Specification;
use crate::traits::Entity;
use crate::value::Literal;

/// Starts a clause on the named field of `T`.
pub fn field<T: Entity>(name: &str) -> FieldClause<T> {
    FieldClause {
        name: name.to_string(),
        _entity: PhantomData,
    }
}

/// A field awaiting its comparison.
#[derive(Debug, Clone)]
pub struct FieldClause<T> {
    name: String,
    _entity: PhantomData<fn(&T)>,
}

impl<T: Entity> FieldClause<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds `e.<field> <op> <value>` as an expression leaf.
    pub fn compare(self, op: CmpOp, value: impl Into<Literal>) -> Specification<T> {
        self.build(|field| field.compare(op, Expr::literal(value)))
    }

    pub fn eq(self, value: impl Into<Literal>) -> Specification<T> {
        self.compare(CmpOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<Literal>) -> Specification<T> {
        self.compare(CmpOp::Ne, value)
    }

    pub fn gt(self, value: impl Into<Literal>) -> Specification<T> {
        self.compare(CmpOp::Gt, value)
    }

    pub fn gte(self, value: impl Into<Literal>) -> Specification<T> {
        self.compare(CmpOp::Gte, value)
    }

    pub fn lt(self, value: impl Into<Literal>) -> Specification<T> {
        self.compare(CmpOp::Lt, value)
    }

    pub fn lte(self, value: impl Into<Literal>) -> Specification<T> {
        self.compare(CmpOp::Lte, value)
    }

    pub fn contains(self, needle: &str) -> Specification<T> {
        self.compare(CmpOp::Contains, needle)
    }

    pub fn starts_with(self, prefix: &str) -> Specification<T> {
        self.compare(CmpOp::StartsWith, prefix)
    }

    pub fn ends_with(self, suffix: &str) -> Specification<T> {
        self.compare(CmpOp::EndsWith, suffix)
    }

    pub fn is_in<I>(self, discriminants: I) -> Specification<T>
    where
        I: IntoIterator<Item = u32>,
    {
        self.build(|field| field.is_in(discriminants))
    }

    pub fn is_null(self) -> Specification<T> {
        self.compare(CmpOp::Eq, Literal::Null)
    }

    pub fn is_not_null(self) -> Specification<T> {
        self.compare(CmpOp::Ne, Literal::Null)
    }

    /// Returns an error if the pattern is invalid.
    #[cfg(feature = "regex")]
    pub fn matches(self, pattern: &str) -> Result<Specification<T>> {
        let re = regex::Regex::new(pattern)?;
        Ok(self.compare(CmpOp::Matches, re))
    }

    fn build(self, comparison: impl FnOnce(Expr<T>) -> Expr<T>) -> Specification<T> {
        let param = Param::fresh();
        let body = comparison(Expr::param(&param).field(self.name));
        // Field-on-parameter compared with a literal always validates.
        let lambda = Lambda::from_parts(param, body);
        Specification::from_compiled(CompiledPredicate::from_validated(lambda, T::accessor()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Value};

    #[derive(Debug, Clone)]
    struct Task {
        title: String,
        priority: i64,
        status: u32,
        done: bool,
    }

    impl Entity for Task {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "title" => Value::String(&self.title),
                "priority" => Value::Number(Number::I64(self.priority)),
                "status" => Value::Enum(self.status),
                "done" => Value::Bool(self.done),
                _ => Value::None,
            }
        }
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task {
                title: "Write docs".to_string(),
                priority: 3,
                status: 0,
                done: false,
            },
            Task {
                title: "Fix bug".to_string(),
                priority: 5,
                status: 1,
                done: false,
            },
            Task {
                title: "Old task".to_string(),
                priority: 1,
                status: 2,
                done: true,
            },
        ]
    }

    #[test]
    fn numeric_clauses() {
        let items = tasks();
        assert_eq!(field::<Task>("priority").gte(3i64).count(&items), 2);
        assert_eq!(field::<Task>("priority").gt(3i64).count(&items), 1);
        assert_eq!(field::<Task>("priority").lt(3i64).count(&items), 1);
        assert_eq!(field::<Task>("priority").lte(3i64).count(&items), 2);
        assert_eq!(field::<Task>("priority").eq(5i64).count(&items), 1);
        assert_eq!(field::<Task>("priority").ne(5i64).count(&items), 2);
    }

    #[test]
    fn string_clauses() {
        let items = tasks();
        assert_eq!(field::<Task>("title").contains("task").count(&items), 1);
        assert_eq!(field::<Task>("title").starts_with("Fix").count(&items), 1);
        assert_eq!(field::<Task>("title").ends_with("s").count(&items), 1);
    }

    #[test]
    fn enum_and_bool_clauses() {
        let items = tasks();
        assert_eq!(field::<Task>("status").is_in([1, 2]).count(&items), 2);
        assert_eq!(field::<Task>("done").eq(true).count(&items), 1);
    }

    #[test]
    fn missing_field() {
        let items = tasks();
        assert_eq!(field::<Task>("owner").is_null().count(&items), 3);
        assert_eq!(field::<Task>("owner").eq("me").count(&items), 0);
    }

    #[test]
    fn clause_exports_its_lambda() {
        let lambda = field::<Task>("priority").gte(3i64).to_expression().unwrap();
        assert_eq!(lambda.to_string(), "|e| (e.priority >= 3)");
        assert_eq!(lambda.body().params(), vec![lambda.param().clone()]);
    }

    #[cfg(feature = "regex")]
    #[test]
    fn regex_clause() {
        let items = tasks();
        let spec = field::<Task>("title").matches(r"^[A-Z]\w+ \w+$").unwrap();
        assert_eq!(spec.count(&items), 3);
        assert!(field::<Task>("title").matches("[").is_err());
    }

    #[test]
    fn clauses_compose() {
        let items = tasks();
        let open_and_urgent = field::<Task>("done").eq(false) & field::<Task>("priority").gte(5i64);
        assert_eq!(open_and_urgent.filter(&items)[0].title, "Fix bug");
        assert_eq!(
            open_and_urgent.to_string(),
            "((e.done == false) AND (e.priority >= 5))"
        );
    }
}
