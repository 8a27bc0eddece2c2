//! Atomic conditions at the bottom of a specification tree.

use std::fmt;
use std::sync::Arc;

use crate::expr::{CompiledPredicate, Expr, Lambda, Param, PredicateFn};

/// An atomic condition.
///
/// - `Predicate`: a named closure. It exports as a call node, `name(e)`, so
///   translators see where the opaque part of the tree sits.
/// - `Expression`: an inspectable lambda, compiled once at construction.
pub enum Leaf<T> {
    Predicate {
        name: Arc<str>,
        param: Param,
        func: PredicateFn<T>,
    },
    Expression(CompiledPredicate<T>),
}

impl<T> Leaf<T> {
    pub fn predicate<F>(name: &str, func: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Leaf::Predicate {
            name: Arc::from(name),
            param: Param::fresh(),
            func: Arc::new(func),
        }
    }

    pub fn expression(compiled: CompiledPredicate<T>) -> Self {
        Leaf::Expression(compiled)
    }

    /// Name of a predicate leaf; expression leaves are unnamed.
    pub fn name(&self) -> Option<&str> {
        match self {
            Leaf::Predicate { name, .. } => Some(&**name),
            Leaf::Expression(_) => None,
        }
    }

    pub fn evaluate(&self, entity: &T) -> bool {
        match self {
            Leaf::Predicate { func, .. } => func(entity),
            Leaf::Expression(compiled) => compiled.call(entity),
        }
    }

    /// Exports the leaf. Every call yields the same parameter.
    ///
    /// An expression leaf comes out scoped to the accessor it was compiled
    /// with, so merged trees keep reading its fields the same way.
    pub fn to_lambda(&self) -> Lambda<T> {
        match self {
            Leaf::Predicate { name, param, func } => {
                let body = Expr::Call {
                    name: Arc::clone(name),
                    func: Arc::clone(func),
                    arg: Box::new(Expr::param(param)),
                };
                Lambda::from_parts(param.clone(), body)
            }
            Leaf::Expression(compiled) => compiled.to_scoped_lambda(),
        }
    }
}

impl<T> Clone for Leaf<T> {
    fn clone(&self) -> Self {
        match self {
            Leaf::Predicate { name, param, func } => Leaf::Predicate {
                name: Arc::clone(name),
                param: param.clone(),
                func: Arc::clone(func),
            },
            Leaf::Expression(compiled) => Leaf::Expression(compiled.clone()),
        }
    }
}

impl<T> fmt::Display for Leaf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Predicate { name, .. } => f.write_str(name),
            Leaf::Expression(compiled) => write!(f, "{}", compiled.lambda().body()),
        }
    }
}

impl<T> fmt::Debug for Leaf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Predicate { name, param, .. } => f
                .debug_struct("Predicate")
                .field("name", name)
                .field("param", param)
                .finish_non_exhaustive(),
            Leaf::Expression(compiled) => f.debug_tuple("Expression").field(compiled.lambda()).finish(),
        }
    }
}
