//! Validation and evaluation of exported lambdas.

use std::fmt;

use log::trace;

use super::{Expr, Lambda, Param};
use crate::error::{Result, SpecError};
use crate::op::Operand;
use crate::traits::{Accessor, Entity};
use crate::value::Value;

/// A validated lambda, ready to be applied to entities.
///
/// Compiling checks the tree once; [`CompiledPredicate::call`] then walks it
/// without further checks and cannot fail.
pub struct CompiledPredicate<T> {
    lambda: Lambda<T>,
    accessor: Accessor<T>,
}

impl<T: Entity> Lambda<T> {
    /// Validates this lambda and reads fields through [`Entity::field_value`].
    pub fn compile(self) -> Result<CompiledPredicate<T>> {
        self.compile_with(T::accessor())
    }
}

impl<T> Lambda<T> {
    /// Validates this lambda and reads fields through `accessor`.
    pub fn compile_with(self, accessor: Accessor<T>) -> Result<CompiledPredicate<T>> {
        trace!("compile({:?})", self);
        validate(&self.param, &self.body)?;
        Ok(CompiledPredicate::from_validated(self, accessor))
    }
}

impl<T> CompiledPredicate<T> {
    /// The lambda must already satisfy everything [`Lambda::compile_with`] checks.
    pub(crate) fn from_validated(lambda: Lambda<T>, accessor: Accessor<T>) -> Self {
        CompiledPredicate { lambda, accessor }
    }

    /// Applies the predicate to `entity`.
    pub fn call(&self, entity: &T) -> bool {
        holds(&self.lambda.body, entity, self.accessor)
    }

    pub fn lambda(&self) -> &Lambda<T> {
        &self.lambda
    }

    pub fn into_lambda(self) -> Lambda<T> {
        self.lambda
    }

    /// The accessor unscoped field reads go through.
    pub fn accessor(&self) -> Accessor<T> {
        self.accessor
    }

    /// Returns the lambda with its body pinned to this predicate's accessor,
    /// so it reads fields the same way whatever it is compiled with next.
    pub fn to_scoped_lambda(&self) -> Lambda<T> {
        let (param, body) = self.lambda.clone().into_parts();
        Lambda::from_parts(param, Expr::scoped(self.accessor, body))
    }
}

fn holds<T>(expr: &Expr<T>, entity: &T, accessor: Accessor<T>) -> bool {
    eval(expr, entity, accessor).into_value().is_truthy()
}

fn eval<'a, T>(expr: &'a Expr<T>, entity: &'a T, accessor: Accessor<T>) -> Operand<'a> {
    let value = match expr {
        Expr::Literal(literal) => return Operand::from_literal(literal),
        Expr::Conditional {
            test,
            then,
            otherwise,
        } => {
            let branch = if holds(test, entity, accessor) { then } else { otherwise };
            return eval(branch, entity, accessor);
        }
        Expr::Scoped { accessor, body } => return eval(body, entity, *accessor),
        // Rejected by validation.
        Expr::Param(_) => Value::None,
        Expr::Field { name, .. } => accessor(entity, name),
        Expr::Call { func, .. } => Value::Bool(func(entity)),
        Expr::Compare { op, lhs, rhs } => {
            let lhs = eval(lhs, entity, accessor).into_value();
            Value::Bool(op.apply(&lhs, eval(rhs, entity, accessor)))
        }
        Expr::Not(inner) => Value::Bool(!holds(inner, entity, accessor)),
        Expr::AndAlso(lhs, rhs) => {
            Value::Bool(holds(lhs, entity, accessor) && holds(rhs, entity, accessor))
        }
        Expr::OrElse(lhs, rhs) => {
            Value::Bool(holds(lhs, entity, accessor) || holds(rhs, entity, accessor))
        }
        Expr::Extension(node) => node.evaluate(entity),
    };
    Operand::Value(value)
}

impl<T> Clone for CompiledPredicate<T> {
    fn clone(&self) -> Self {
        CompiledPredicate {
            lambda: self.lambda.clone(),
            accessor: self.accessor,
        }
    }
}

impl<T> fmt::Debug for CompiledPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPredicate")
            .field("lambda", &self.lambda)
            .finish_non_exhaustive()
    }
}

fn validate<T>(param: &Param, expr: &Expr<T>) -> Result<()> {
    match expr {
        Expr::Param(p) if p == param => Err(SpecError::MisplacedParameter {
            param: p.to_string(),
        }),
        Expr::Param(p) => Err(unbound(p)),
        Expr::Literal(_) => Ok(()),
        Expr::Field { base, .. } => validate_entity(param, base, "field access"),
        Expr::Call { arg, .. } => validate_entity(param, arg, "call"),
        Expr::Not(inner) | Expr::Scoped { body: inner, .. } => validate(param, inner),
        Expr::Compare { lhs, rhs, .. } | Expr::AndAlso(lhs, rhs) | Expr::OrElse(lhs, rhs) => {
            validate(param, lhs)?;
            validate(param, rhs)
        }
        Expr::Conditional {
            test,
            then,
            otherwise,
        } => {
            validate(param, test)?;
            validate(param, then)?;
            validate(param, otherwise)
        }
        Expr::Extension(node) => match node.params().iter().find(|p| *p != param) {
            Some(stray) => Err(unbound(stray)),
            None => Ok(()),
        },
    }
}

fn validate_entity<T>(param: &Param, expr: &Expr<T>, context: &'static str) -> Result<()> {
    match expr {
        Expr::Param(p) if p == param => Ok(()),
        Expr::Param(p) => Err(unbound(p)),
        _ => Err(SpecError::NotAnEntity { context }),
    }
}

fn unbound(param: &Param) -> SpecError {
    SpecError::UnboundParameter {
        param: format!("{:?}", param),
    }
}
