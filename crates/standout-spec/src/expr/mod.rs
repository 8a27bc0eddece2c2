//! Inspectable expression trees.
//!
//! Every specification can be exported as a [`Lambda`]: one formal
//! [`Param`] plus a body [`Expr`] that references it. The tree is what an
//! external layer walks when it translates a specification into a native
//! filter; [`Lambda::compile`] turns it into a reusable predicate.
//!
//! ```
//! use standout_spec::{Entity, Expr, Lambda, Number, Param, Value};
//!
//! struct Person {
//!     age: u32,
//! }
//!
//! impl Entity for Person {
//!     fn field_value(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "age" => Value::Number(Number::from(self.age)),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! let p = Param::new("p");
//! let body = Expr::<Person>::param(&p).field("age").gte(18u32);
//! let adult = Lambda::new(p, body).unwrap();
//! assert_eq!(adult.to_string(), "|p| (p.age >= 18)");
//!
//! let compiled = adult.compile().unwrap();
//! assert!(compiled.call(&Person { age: 20 }));
//! assert!(!compiled.call(&Person { age: 16 }));
//! ```

mod compile;
mod rebind;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[cfg(feature = "regex")]
use regex::Regex;

use crate::error::{Result, SpecError};
use crate::op::CmpOp;
use crate::traits::Accessor;
use crate::value::{Literal, Value};

pub use compile::CompiledPredicate;
pub use rebind::Rebinder;

/// Display name given to parameters created without one.
pub const DEFAULT_PARAM_NAME: &str = "e";

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque predicate shared by leaves and [`Expr::Call`] nodes.
pub type PredicateFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A formal parameter.
///
/// Two parameters are the same parameter only if they come from the same
/// [`Param::new`] call; the name is for display.
#[derive(Clone)]
pub struct Param {
    id: u64,
    name: Arc<str>,
}

impl Param {
    pub fn new(name: &str) -> Self {
        Param {
            id: NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name),
        }
    }

    /// Creates a parameter named [`DEFAULT_PARAM_NAME`].
    pub fn fresh() -> Self {
        Param::new(DEFAULT_PARAM_NAME)
    }

    /// The parameter of the identity lambda. Never handed out by [`Param::new`].
    pub(crate) fn identity() -> Self {
        Param {
            id: 0,
            name: Arc::from(DEFAULT_PARAM_NAME),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Param {}

impl Hash for Param {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// A node kind defined outside this crate.
///
/// Extension nodes are evaluated against the entity bound to the enclosing
/// lambda's parameter. The [`Rebinder`] cannot look inside them: a node that
/// does not implement [`ExtensionNode::rebind`] makes rebinding fail with
/// [`SpecError::UnsupportedExpression`].
pub trait ExtensionNode<T>: fmt::Debug + fmt::Display + Send + Sync {
    /// Short name of the node kind.
    fn kind(&self) -> &'static str;

    fn evaluate<'a>(&'a self, entity: &'a T) -> Value<'a>;

    /// Parameters this node refers to.
    fn params(&self) -> Vec<Param> {
        Vec::new()
    }

    /// Returns a copy of this node with `from` replaced by `to`, or `None`
    /// if the node cannot be rebound.
    fn rebind(&self, from: &Param, to: &Param) -> Option<Arc<dyn ExtensionNode<T>>> {
        let _ = (from, to);
        None
    }
}

/// Expression tree node.
pub enum Expr<T> {
    /// Reference to a formal parameter.
    Param(Param),
    Literal(Literal),
    /// Named field read, `base.name`. The base must be the lambda parameter.
    Field { base: Box<Expr<T>>, name: String },
    /// Opaque predicate applied to the lambda parameter, `name(arg)`.
    Call {
        name: Arc<str>,
        func: PredicateFn<T>,
        arg: Box<Expr<T>>,
    },
    Compare {
        op: CmpOp,
        lhs: Box<Expr<T>>,
        rhs: Box<Expr<T>>,
    },
    Not(Box<Expr<T>>),
    /// Short-circuit conjunction.
    AndAlso(Box<Expr<T>>, Box<Expr<T>>),
    /// Short-circuit disjunction.
    OrElse(Box<Expr<T>>, Box<Expr<T>>),
    Conditional {
        test: Box<Expr<T>>,
        then: Box<Expr<T>>,
        otherwise: Box<Expr<T>>,
    },
    Extension(Arc<dyn ExtensionNode<T>>),
    /// Field reads inside `body` go through `accessor` instead of the one the
    /// enclosing lambda is compiled with. Renders as `body`.
    Scoped {
        accessor: Accessor<T>,
        body: Box<Expr<T>>,
    },
}

impl<T> Expr<T> {
    pub fn param(param: &Param) -> Self {
        Expr::Param(param.clone())
    }

    pub fn literal(value: impl Into<Literal>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn call<F>(name: &str, func: F, arg: Expr<T>) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Expr::Call {
            name: Arc::from(name),
            func: Arc::new(func),
            arg: Box::new(arg),
        }
    }

    pub fn conditional(test: Expr<T>, then: Expr<T>, otherwise: Expr<T>) -> Self {
        Expr::Conditional {
            test: Box::new(test),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn extension(node: impl ExtensionNode<T> + 'static) -> Self {
        Expr::Extension(Arc::new(node))
    }

    /// Pins the field reads of `body` to `accessor`.
    ///
    /// A body that is already scoped is returned as is.
    pub fn scoped(accessor: Accessor<T>, body: Expr<T>) -> Self {
        match body {
            scoped @ Expr::Scoped { .. } => scoped,
            body => Expr::Scoped {
                accessor,
                body: Box::new(body),
            },
        }
    }

    /// Reads `name` from this expression, which must be the lambda parameter.
    pub fn field(self, name: impl Into<String>) -> Self {
        Expr::Field {
            base: Box::new(self),
            name: name.into(),
        }
    }

    pub fn compare(self, op: CmpOp, rhs: Expr<T>) -> Self {
        Expr::Compare {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }

    pub fn equals(self, value: impl Into<Literal>) -> Self {
        self.compare(CmpOp::Eq, Expr::literal(value))
    }

    pub fn not_equals(self, value: impl Into<Literal>) -> Self {
        self.compare(CmpOp::Ne, Expr::literal(value))
    }

    pub fn gt(self, value: impl Into<Literal>) -> Self {
        self.compare(CmpOp::Gt, Expr::literal(value))
    }

    pub fn gte(self, value: impl Into<Literal>) -> Self {
        self.compare(CmpOp::Gte, Expr::literal(value))
    }

    pub fn lt(self, value: impl Into<Literal>) -> Self {
        self.compare(CmpOp::Lt, Expr::literal(value))
    }

    pub fn lte(self, value: impl Into<Literal>) -> Self {
        self.compare(CmpOp::Lte, Expr::literal(value))
    }

    pub fn contains(self, needle: &str) -> Self {
        self.compare(CmpOp::Contains, Expr::literal(needle))
    }

    pub fn starts_with(self, prefix: &str) -> Self {
        self.compare(CmpOp::StartsWith, Expr::literal(prefix))
    }

    pub fn ends_with(self, suffix: &str) -> Self {
        self.compare(CmpOp::EndsWith, Expr::literal(suffix))
    }

    pub fn is_in<I>(self, discriminants: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let set: Vec<u32> = discriminants.into_iter().collect();
        self.compare(CmpOp::In, Expr::literal(set))
    }

    pub fn is_null(self) -> Self {
        self.compare(CmpOp::Eq, Expr::Literal(Literal::Null))
    }

    pub fn is_not_null(self) -> Self {
        self.compare(CmpOp::Ne, Expr::Literal(Literal::Null))
    }

    /// Compares against a regular expression.
    ///
    /// Returns an error if the pattern is invalid.
    #[cfg(feature = "regex")]
    pub fn matches(self, pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern)?;
        Ok(self.compare(CmpOp::Matches, Expr::Literal(Literal::Regex(re))))
    }

    pub fn and_also(self, other: Expr<T>) -> Self {
        Expr::AndAlso(Box::new(self), Box::new(other))
    }

    pub fn or_else(self, other: Expr<T>) -> Self {
        Expr::OrElse(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Distinct parameters referenced anywhere in this tree, in visit order.
    pub fn params(&self) -> Vec<Param> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params(&self, out: &mut Vec<Param>) {
        match self {
            Expr::Param(param) => push_distinct(out, param.clone()),
            Expr::Literal(_) => {}
            Expr::Extension(node) => {
                for param in node.params() {
                    push_distinct(out, param);
                }
            }
            Expr::Field { base: inner, .. }
            | Expr::Call { arg: inner, .. }
            | Expr::Not(inner)
            | Expr::Scoped { body: inner, .. } => inner.collect_params(out),
            Expr::Compare { lhs, rhs, .. } | Expr::AndAlso(lhs, rhs) | Expr::OrElse(lhs, rhs) => {
                lhs.collect_params(out);
                rhs.collect_params(out);
            }
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                test.collect_params(out);
                then.collect_params(out);
                otherwise.collect_params(out);
            }
        }
    }

    /// Number of nodes, extension nodes counting as one.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Expr::Param(_) | Expr::Literal(_) | Expr::Extension(_) => 0,
            Expr::Field { base: inner, .. }
            | Expr::Call { arg: inner, .. }
            | Expr::Not(inner)
            | Expr::Scoped { body: inner, .. } => inner.node_count(),
            Expr::Compare { lhs, rhs, .. } | Expr::AndAlso(lhs, rhs) | Expr::OrElse(lhs, rhs) => {
                lhs.node_count() + rhs.node_count()
            }
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => test.node_count() + then.node_count() + otherwise.node_count(),
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, show_ids: bool) -> fmt::Result {
        match self {
            Expr::Param(param) if show_ids => write!(f, "{:?}", param),
            Expr::Param(param) => write!(f, "{}", param),
            Expr::Literal(literal) => write!(f, "{}", literal),
            Expr::Field { base, name } => {
                base.render(f, show_ids)?;
                write!(f, ".{}", name)
            }
            Expr::Call { name, arg, .. } => {
                write!(f, "{}(", name)?;
                arg.render(f, show_ids)?;
                f.write_str(")")
            }
            Expr::Compare { op, lhs, rhs } => {
                f.write_str("(")?;
                lhs.render(f, show_ids)?;
                write!(f, " {} ", op)?;
                rhs.render(f, show_ids)?;
                f.write_str(")")
            }
            Expr::Not(inner) => {
                f.write_str("!")?;
                inner.render(f, show_ids)
            }
            Expr::AndAlso(lhs, rhs) | Expr::OrElse(lhs, rhs) => {
                let connective = if matches!(self, Expr::AndAlso(..)) {
                    "&&"
                } else {
                    "||"
                };
                f.write_str("(")?;
                lhs.render(f, show_ids)?;
                write!(f, " {} ", connective)?;
                rhs.render(f, show_ids)?;
                f.write_str(")")
            }
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                f.write_str("(")?;
                test.render(f, show_ids)?;
                f.write_str(" ? ")?;
                then.render(f, show_ids)?;
                f.write_str(" : ")?;
                otherwise.render(f, show_ids)?;
                f.write_str(")")
            }
            Expr::Extension(node) => write!(f, "{}", node),
            Expr::Scoped { body, .. } => body.render(f, show_ids),
        }
    }
}

fn push_distinct(out: &mut Vec<Param>, param: Param) {
    if !out.contains(&param) {
        out.push(param);
    }
}

impl<T> Clone for Expr<T> {
    fn clone(&self) -> Self {
        match self {
            Expr::Param(param) => Expr::Param(param.clone()),
            Expr::Literal(literal) => Expr::Literal(literal.clone()),
            Expr::Field { base, name } => Expr::Field {
                base: base.clone(),
                name: name.clone(),
            },
            Expr::Call { name, func, arg } => Expr::Call {
                name: Arc::clone(name),
                func: Arc::clone(func),
                arg: arg.clone(),
            },
            Expr::Compare { op, lhs, rhs } => Expr::Compare {
                op: *op,
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            },
            Expr::Not(inner) => Expr::Not(inner.clone()),
            Expr::AndAlso(lhs, rhs) => Expr::AndAlso(lhs.clone(), rhs.clone()),
            Expr::OrElse(lhs, rhs) => Expr::OrElse(lhs.clone(), rhs.clone()),
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => Expr::Conditional {
                test: test.clone(),
                then: then.clone(),
                otherwise: otherwise.clone(),
            },
            Expr::Extension(node) => Expr::Extension(Arc::clone(node)),
            Expr::Scoped { accessor, body } => Expr::Scoped {
                accessor: *accessor,
                body: body.clone(),
            },
        }
    }
}

impl<T> fmt::Display for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, false)
    }
}

/// Renders parameters with their identity, `e#12.age`.
impl<T> fmt::Debug for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, true)
    }
}

/// A single-parameter function from `T` to `bool`.
pub struct Lambda<T> {
    param: Param,
    body: Expr<T>,
}

impl<T> Lambda<T> {
    /// Creates a lambda, rejecting bodies that reference any other parameter.
    pub fn new(param: Param, body: Expr<T>) -> Result<Self> {
        if let Some(stray) = body.params().into_iter().find(|p| *p != param) {
            return Err(SpecError::UnboundParameter {
                param: format!("{:?}", stray),
            });
        }
        Ok(Lambda { param, body })
    }

    /// Callers guarantee `body` only references `param`.
    pub(crate) fn from_parts(param: Param, body: Expr<T>) -> Self {
        Lambda { param, body }
    }

    pub fn param(&self) -> &Param {
        &self.param
    }

    pub fn body(&self) -> &Expr<T> {
        &self.body
    }

    pub fn into_parts(self) -> (Param, Expr<T>) {
        (self.param, self.body)
    }

    /// Returns the same function with `target` as its parameter.
    pub fn rebind_to(self, target: Param) -> Result<Self> {
        let body = Rebinder::new(self.param, target.clone()).rebind(self.body)?;
        Ok(Lambda::from_parts(target, body))
    }

    /// Wraps the body in a logical complement, keeping the parameter.
    pub fn negate(self) -> Self {
        Lambda::from_parts(self.param, self.body.negate())
    }
}

impl<T> Clone for Lambda<T> {
    fn clone(&self) -> Self {
        Lambda {
            param: self.param.clone(),
            body: self.body.clone(),
        }
    }
}

impl<T> fmt::Display for Lambda<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}| {}", self.param, self.body)
    }
}

impl<T> fmt::Debug for Lambda<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{:?}| {:?}", self.param, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unit;

    #[test]
    fn params_are_distinct_by_identity() {
        let a = Param::new("e");
        let b = Param::new("e");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(Param::identity(), Param::fresh());
    }

    #[test]
    fn builders_render() {
        let p = Param::new("x");
        let e: Expr<Unit> = Expr::param(&p)
            .field("age")
            .gte(18u32)
            .and_also(Expr::param(&p).field("license").is_not_null());
        assert_eq!(e.to_string(), "((x.age >= 18) && (x.license != null))");

        let e: Expr<Unit> = Expr::conditional(
            Expr::param(&p).field("vip").equals(true),
            Expr::literal(true),
            Expr::param(&p).field("tags").is_in([1, 2]).negate(),
        );
        assert_eq!(e.to_string(), "((x.vip == true) ? true : !(x.tags in [#1, #2]))");
    }

    #[test]
    fn debug_shows_identity() {
        let p = Param::new("x");
        let e: Expr<Unit> = Expr::param(&p).field("age");
        assert_eq!(format!("{:?}", e), format!("x#{}.age", p.id()));
    }

    #[test]
    fn params_collects_distinct() {
        let a = Param::new("a");
        let b = Param::new("b");
        let e: Expr<Unit> = Expr::param(&a)
            .field("x")
            .equals(1i64)
            .or_else(Expr::param(&b).field("y").equals(2i64))
            .or_else(Expr::param(&a).field("z").equals(3i64));
        assert_eq!(e.params(), vec![a, b]);
        assert_eq!(e.node_count(), 14);
    }

    #[test]
    fn lambda_rejects_foreign_param() {
        let a = Param::new("a");
        let b = Param::new("b");
        let body: Expr<Unit> = Expr::param(&b).field("x").equals(1i64);
        let err = Lambda::new(a, body).unwrap_err();
        assert!(matches!(err, SpecError::UnboundParameter { .. }));
    }

    #[test]
    fn lambda_rebind_to() {
        let b = Param::new("b");
        let lambda = Lambda::new(b.clone(), Expr::<Unit>::param(&b).field("x").equals(1i64)).unwrap();
        let target = Param::new("t");
        let rebound = lambda.rebind_to(target.clone()).unwrap();
        assert_eq!(rebound.param(), &target);
        assert_eq!(rebound.body().params(), vec![target]);
        assert_eq!(rebound.to_string(), "|t| (t.x == 1)");
    }

    #[test]
    fn lambda_negate_keeps_param() {
        let p = Param::new("p");
        let lambda = Lambda::new(p.clone(), Expr::<Unit>::param(&p).field("ok").equals(true)).unwrap();
        let negated = lambda.negate();
        assert_eq!(negated.param(), &p);
        assert_eq!(negated.to_string(), "|p| !(p.ok == true)");
    }
}
