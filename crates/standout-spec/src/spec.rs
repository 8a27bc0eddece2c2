//! Composable specifications.
//!
//! A [`Specification`] is a boolean condition over `T` kept as a tree. Leaves
//! come from the application; the algebra methods (`and`, `or`, `nand`,
//! `nor`, `not`) and the `&`, `|`, `!` operators each allocate a new node and
//! leave their operands untouched.
//!
//! # Identity
//!
//! [`Specification::Identity`] means "no constraint". Combining any `S` with
//! it under any of the four binary operators returns `S` itself. That holds
//! for NAND and NOR too: they do not apply their truth table against `true`.
//!
//! ```
//! use standout_spec::Specification;
//!
//! let even = Specification::leaf("even", |n: &u32| n % 2 == 0);
//! let rule = even.clone().nand(Specification::identity());
//! assert!(rule.is_satisfied_by(&4));
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use log::debug;

use crate::error::Result;
use crate::expr::{CompiledPredicate, Expr, Lambda, Param, Rebinder};
use crate::leaf::Leaf;
use crate::traits::{Accessor, Entity};
use crate::value::Literal;

/// A boolean condition over `T`, kept as an inspectable tree.
///
/// The variants are public so that translators can walk the tree. Build
/// binary nodes through [`and`](Self::and), [`or`](Self::or),
/// [`nand`](Self::nand) and [`nor`](Self::nor): they never create a node
/// with an `Identity` operand. A node built by hand with one is read the same
/// way anyway, as its other operand.
pub enum Specification<T> {
    /// Atomic condition.
    Leaf(Leaf<T>),
    /// Satisfied when both operands are.
    And(Box<Specification<T>>, Box<Specification<T>>),
    /// Satisfied when either operand is.
    Or(Box<Specification<T>>, Box<Specification<T>>),
    /// Satisfied unless both operands are.
    Nand(Box<Specification<T>>, Box<Specification<T>>),
    /// Satisfied only if neither operand is.
    Nor(Box<Specification<T>>, Box<Specification<T>>),
    /// Logical complement.
    Not(Box<Specification<T>>),
    /// Neutral element, always satisfied.
    Identity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
    Nand,
    Nor,
}

impl Connective {
    fn as_str(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
            Connective::Nand => "NAND",
            Connective::Nor => "NOR",
        }
    }
}

impl<T> Specification<T> {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Returns the specification with no constraint.
    pub fn identity() -> Self {
        Specification::Identity
    }

    /// Creates a leaf from a named closure.
    pub fn leaf<F>(name: &str, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Specification::Leaf(Leaf::predicate(name, predicate))
    }

    /// Creates a leaf from a lambda whose fields are read through `Entity`.
    pub fn from_lambda(lambda: Lambda<T>) -> Result<Self>
    where
        T: Entity,
    {
        Ok(Specification::from_compiled(lambda.compile()?))
    }

    /// Creates a leaf from a lambda whose fields are read through `accessor`.
    pub fn from_lambda_with(lambda: Lambda<T>, accessor: Accessor<T>) -> Result<Self> {
        Ok(Specification::from_compiled(lambda.compile_with(accessor)?))
    }

    /// Creates a leaf from an already compiled lambda. The leaf keeps its
    /// accessor through exports and merges.
    pub fn from_compiled(compiled: CompiledPredicate<T>) -> Self {
        Specification::Leaf(Leaf::expression(compiled))
    }

    /// Conjunction of every specification; `Identity` when empty.
    pub fn all_of<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = Specification<T>>,
    {
        specs.into_iter().fold(Specification::Identity, Specification::and)
    }

    /// Disjunction of every specification; `Identity` when empty.
    ///
    /// An empty disjunction is "no constraint" here, not "unsatisfiable".
    pub fn any_of<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = Specification<T>>,
    {
        specs.into_iter().fold(Specification::Identity, Specification::or)
    }

    // ========================================================================
    // Algebra
    // ========================================================================

    /// Satisfied when both `self` and `other` are.
    pub fn and(self, other: Specification<T>) -> Self {
        self.combine(Connective::And, other)
    }

    /// Satisfied when `self` or `other` is.
    pub fn or(self, other: Specification<T>) -> Self {
        self.combine(Connective::Or, other)
    }

    /// Satisfied unless both operands are.
    pub fn nand(self, other: Specification<T>) -> Self {
        self.combine(Connective::Nand, other)
    }

    /// Satisfied only if neither operand is.
    pub fn nor(self, other: Specification<T>) -> Self {
        self.combine(Connective::Nor, other)
    }

    /// Logical complement. `not().not()` is kept as two nodes.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        debug!("not({})", self);
        Specification::Not(Box::new(self))
    }

    fn combine(self, connective: Connective, other: Specification<T>) -> Self {
        let op = connective.as_str();
        if self.is_identity() {
            debug!("IDENTITY {} S => S", op);
            return other;
        }
        if other.is_identity() {
            debug!("S {} IDENTITY => S", op);
            return self;
        }
        debug!("{} {} {}", self, op, other);
        let (lhs, rhs) = (Box::new(self), Box::new(other));
        match connective {
            Connective::And => Specification::And(lhs, rhs),
            Connective::Or => Specification::Or(lhs, rhs),
            Connective::Nand => Specification::Nand(lhs, rhs),
            Connective::Nor => Specification::Nor(lhs, rhs),
        }
    }

    /// For a binary node with an `Identity` operand, the other operand.
    fn non_identity_operand(&self) -> Option<&Specification<T>> {
        match self {
            Specification::And(lhs, rhs)
            | Specification::Or(lhs, rhs)
            | Specification::Nand(lhs, rhs)
            | Specification::Nor(lhs, rhs) => {
                if lhs.is_identity() {
                    Some(rhs)
                } else if rhs.is_identity() {
                    Some(lhs)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Evaluates the tree against `entity` with `&&`/`||` short-circuiting.
    pub fn is_satisfied_by(&self, entity: &T) -> bool {
        if let Some(operand) = self.non_identity_operand() {
            return operand.is_satisfied_by(entity);
        }
        match self {
            Specification::Leaf(leaf) => leaf.evaluate(entity),
            Specification::And(lhs, rhs) => {
                lhs.is_satisfied_by(entity) && rhs.is_satisfied_by(entity)
            }
            Specification::Or(lhs, rhs) => {
                lhs.is_satisfied_by(entity) || rhs.is_satisfied_by(entity)
            }
            Specification::Nand(lhs, rhs) => {
                !lhs.is_satisfied_by(entity) || !rhs.is_satisfied_by(entity)
            }
            Specification::Nor(lhs, rhs) => {
                !lhs.is_satisfied_by(entity) && !rhs.is_satisfied_by(entity)
            }
            Specification::Not(inner) => !inner.is_satisfied_by(entity),
            Specification::Identity => true,
        }
    }

    /// Exports the tree as a single-parameter lambda.
    ///
    /// Binary nodes take the left operand's parameter; the right operand is
    /// rebound onto it. NAND and NOR are exported through De Morgan:
    /// `!l || !r` and `!l && !r`.
    ///
    /// Fails only when an extension node inside an expression leaf cannot be
    /// rebound.
    pub fn to_expression(&self) -> Result<Lambda<T>> {
        if let Some(operand) = self.non_identity_operand() {
            return operand.to_expression();
        }
        match self {
            Specification::Leaf(leaf) => Ok(leaf.to_lambda()),
            Specification::And(lhs, rhs) => {
                merge(lhs.to_expression()?, rhs.to_expression()?, Expr::and_also)
            }
            Specification::Or(lhs, rhs) => {
                merge(lhs.to_expression()?, rhs.to_expression()?, Expr::or_else)
            }
            Specification::Nand(lhs, rhs) => merge(
                lhs.to_expression()?.negate(),
                rhs.to_expression()?.negate(),
                Expr::or_else,
            ),
            Specification::Nor(lhs, rhs) => merge(
                lhs.to_expression()?.negate(),
                rhs.to_expression()?.negate(),
                Expr::and_also,
            ),
            Specification::Not(inner) => Ok(inner.to_expression()?.negate()),
            Specification::Identity => Ok(Lambda::from_parts(
                Param::identity(),
                Expr::Literal(Literal::Bool(true)),
            )),
        }
    }

    /// Exports and compiles the tree once, for repeated evaluation.
    ///
    /// Expression leaves keep reading fields through their own accessor;
    /// [`Entity`] serves the rest.
    pub fn compile(&self) -> Result<CompiledPredicate<T>>
    where
        T: Entity,
    {
        self.to_expression()?.compile()
    }

    /// Like [`compile`](Self::compile), with `accessor` in place of [`Entity`].
    pub fn compile_with(&self, accessor: Accessor<T>) -> Result<CompiledPredicate<T>> {
        self.to_expression()?.compile_with(accessor)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns `true` if this is the `Identity` node.
    pub fn is_identity(&self) -> bool {
        matches!(self, Specification::Identity)
    }

    /// Nesting depth; leaves and `Identity` have depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Specification::Leaf(_) | Specification::Identity => 1,
            Specification::Not(inner) => 1 + inner.depth(),
            Specification::And(lhs, rhs)
            | Specification::Or(lhs, rhs)
            | Specification::Nand(lhs, rhs)
            | Specification::Nor(lhs, rhs) => 1 + lhs.depth().max(rhs.depth()),
        }
    }

    /// Number of leaves; `Identity` counts as none.
    pub fn leaf_count(&self) -> usize {
        match self {
            Specification::Leaf(_) => 1,
            Specification::Identity => 0,
            Specification::Not(inner) => inner.leaf_count(),
            Specification::And(lhs, rhs)
            | Specification::Or(lhs, rhs)
            | Specification::Nand(lhs, rhs)
            | Specification::Nor(lhs, rhs) => lhs.leaf_count() + rhs.leaf_count(),
        }
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Returns references to the items that satisfy this specification.
    pub fn filter<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        items
            .iter()
            .filter(|item| self.is_satisfied_by(item))
            .collect()
    }

    /// Returns clones of the items that satisfy this specification.
    pub fn filter_cloned(&self, items: &[T]) -> Vec<T>
    where
        T: Clone,
    {
        self.filter(items).into_iter().cloned().collect()
    }

    /// Keeps only the items that satisfy this specification.
    pub fn retain(&self, items: &mut Vec<T>) {
        items.retain(|item| self.is_satisfied_by(item));
    }

    /// Counts the items that satisfy this specification.
    pub fn count(&self, items: &[T]) -> usize {
        items
            .iter()
            .filter(|item| self.is_satisfied_by(item))
            .count()
    }

    /// Returns `true` if at least one item satisfies this specification.
    pub fn any(&self, items: &[T]) -> bool {
        items.iter().any(|item| self.is_satisfied_by(item))
    }

    /// Returns `true` if every item satisfies this specification.
    pub fn all(&self, items: &[T]) -> bool {
        items.iter().all(|item| self.is_satisfied_by(item))
    }

    /// Returns the first item that satisfies this specification.
    pub fn find<'a>(&self, items: &'a [T]) -> Option<&'a T> {
        items.iter().find(|item| self.is_satisfied_by(item))
    }

    /// Returns the index of the first item that satisfies this specification.
    pub fn position(&self, items: &[T]) -> Option<usize> {
        items.iter().position(|item| self.is_satisfied_by(item))
    }
}

/// Merges two independently built lambdas under the left one's parameter.
fn merge<T>(
    lhs: Lambda<T>,
    rhs: Lambda<T>,
    connective: fn(Expr<T>, Expr<T>) -> Expr<T>,
) -> Result<Lambda<T>> {
    let (param, lhs_body) = lhs.into_parts();
    let (rhs_param, rhs_body) = rhs.into_parts();
    let rhs_body = Rebinder::new(rhs_param, param.clone()).rebind(rhs_body)?;
    Ok(Lambda::from_parts(param, connective(lhs_body, rhs_body)))
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Specification::Identity
    }
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        match self {
            Specification::Leaf(leaf) => Specification::Leaf(leaf.clone()),
            Specification::And(lhs, rhs) => Specification::And(lhs.clone(), rhs.clone()),
            Specification::Or(lhs, rhs) => Specification::Or(lhs.clone(), rhs.clone()),
            Specification::Nand(lhs, rhs) => Specification::Nand(lhs.clone(), rhs.clone()),
            Specification::Nor(lhs, rhs) => Specification::Nor(lhs.clone(), rhs.clone()),
            Specification::Not(inner) => Specification::Not(inner.clone()),
            Specification::Identity => Specification::Identity,
        }
    }
}

impl<T> fmt::Display for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (connective, lhs, rhs) = match self {
            Specification::Leaf(leaf) => return write!(f, "{}", leaf),
            Specification::Not(inner) => return write!(f, "NOT {}", inner),
            Specification::Identity => return f.write_str("IDENTITY"),
            Specification::And(lhs, rhs) => (Connective::And, lhs, rhs),
            Specification::Or(lhs, rhs) => (Connective::Or, lhs, rhs),
            Specification::Nand(lhs, rhs) => (Connective::Nand, lhs, rhs),
            Specification::Nor(lhs, rhs) => (Connective::Nor, lhs, rhs),
        };
        write!(f, "({} {} {})", lhs, connective.as_str(), rhs)
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specification::Leaf(leaf) => f.debug_tuple("Leaf").field(leaf).finish(),
            Specification::And(lhs, rhs) => f.debug_tuple("And").field(lhs).field(rhs).finish(),
            Specification::Or(lhs, rhs) => f.debug_tuple("Or").field(lhs).field(rhs).finish(),
            Specification::Nand(lhs, rhs) => f.debug_tuple("Nand").field(lhs).field(rhs).finish(),
            Specification::Nor(lhs, rhs) => f.debug_tuple("Nor").field(lhs).field(rhs).finish(),
            Specification::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Specification::Identity => f.write_str("Identity"),
        }
    }
}

// Operator sugar. Reference forms clone their operands.

impl<T> BitAnd for Specification<T> {
    type Output = Specification<T>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl<T> BitAnd for &Specification<T> {
    type Output = Specification<T>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.clone().and(rhs.clone())
    }
}

impl<T> BitOr for Specification<T> {
    type Output = Specification<T>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl<T> BitOr for &Specification<T> {
    type Output = Specification<T>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.clone().or(rhs.clone())
    }
}

impl<T> Not for Specification<T> {
    type Output = Specification<T>;

    fn not(self) -> Self::Output {
        Specification::not(self)
    }
}

impl<T> Not for &Specification<T> {
    type Output = Specification<T>;

    fn not(self) -> Self::Output {
        Specification::not(self.clone())
    }
}
