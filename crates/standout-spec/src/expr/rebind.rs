//! Parameter rebinding.
//!
//! Two lambdas built independently each own their parameter. Before their
//! bodies can live under one lambda, every reference to the right-hand
//! parameter has to point at the left-hand one. [`Rebinder`] does that
//! rewrite, node by node, without touching anything else.

use log::trace;

use super::{Expr, Param};
use crate::error::{Result, SpecError};

/// Rewrites references to one parameter into references to another.
///
/// A rebinder is a one-shot value: build a new one for every merge.
///
/// ```
/// use standout_spec::{Expr, Param, Rebinder};
///
/// struct Person;
///
/// let from = Param::new("a");
/// let to = Param::new("b");
/// let body: Expr<Person> = Expr::param(&from).field("age").gte(18u32);
///
/// let rebound = Rebinder::new(from, to.clone()).rebind(body).unwrap();
/// assert_eq!(rebound.params(), vec![to]);
/// ```
#[derive(Debug, Clone)]
pub struct Rebinder {
    from: Param,
    to: Param,
}

impl Rebinder {
    pub fn new(from: Param, to: Param) -> Self {
        Rebinder { from, to }
    }

    pub fn from(&self) -> &Param {
        &self.from
    }

    pub fn to(&self) -> &Param {
        &self.to
    }

    /// Returns `expr` with every `from` reference replaced by `to`.
    ///
    /// Fails with [`SpecError::UnsupportedExpression`] on extension nodes
    /// that cannot be rebound.
    pub fn rebind<T>(&self, expr: Expr<T>) -> Result<Expr<T>> {
        if self.from == self.to {
            trace!("rebind({:?} => {:?}): same parameter", self.from, self.to);
            return Ok(expr);
        }
        trace!("rebind({:?} => {:?})", self.from, self.to);
        self.visit(expr)
    }

    fn visit<T>(&self, expr: Expr<T>) -> Result<Expr<T>> {
        Ok(match expr {
            Expr::Param(param) if param == self.from => Expr::Param(self.to.clone()),
            Expr::Param(param) => Expr::Param(param),
            Expr::Literal(literal) => Expr::Literal(literal),
            Expr::Field { base, name } => Expr::Field {
                base: self.visit_boxed(base)?,
                name,
            },
            Expr::Call { name, func, arg } => Expr::Call {
                name,
                func,
                arg: self.visit_boxed(arg)?,
            },
            Expr::Compare { op, lhs, rhs } => Expr::Compare {
                op,
                lhs: self.visit_boxed(lhs)?,
                rhs: self.visit_boxed(rhs)?,
            },
            Expr::Not(inner) => Expr::Not(self.visit_boxed(inner)?),
            Expr::AndAlso(lhs, rhs) => {
                Expr::AndAlso(self.visit_boxed(lhs)?, self.visit_boxed(rhs)?)
            }
            Expr::OrElse(lhs, rhs) => Expr::OrElse(self.visit_boxed(lhs)?, self.visit_boxed(rhs)?),
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => Expr::Conditional {
                test: self.visit_boxed(test)?,
                then: self.visit_boxed(then)?,
                otherwise: self.visit_boxed(otherwise)?,
            },
            Expr::Scoped { accessor, body } => Expr::Scoped {
                accessor,
                body: self.visit_boxed(body)?,
            },
            Expr::Extension(node) => match node.rebind(&self.from, &self.to) {
                Some(rebound) => Expr::Extension(rebound),
                None => {
                    trace!("rebind: `{}` node cannot be rebound", node.kind());
                    return Err(SpecError::UnsupportedExpression { kind: node.kind() });
                }
            },
        })
    }

    fn visit_boxed<T>(&self, expr: Box<Expr<T>>) -> Result<Box<Expr<T>>> {
        self.visit(*expr).map(Box::new)
    }
}
