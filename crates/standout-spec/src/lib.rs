//! Spec - Composable predicate specifications for Rust structs.
//!
//! A [`Specification`] is a boolean condition over entities of type `T`,
//! kept as an explicit tree rather than an opaque closure. Specifications:
//!
//! - Combine with AND, OR, NAND, NOR and NOT (or `&`, `|`, `!`)
//! - Treat [`Specification::Identity`] as "no constraint"
//! - Evaluate directly with [`Specification::is_satisfied_by`]
//! - Export as a single-parameter [`Lambda`] that external layers can
//!   translate into their own filters, or compile into a reusable predicate
//!
//! # Quick Start
//!
//! ```rust
//! use standout_spec::{field, Entity, Number, Specification, Value};
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
//! let is_adult = field::<Person>("age").gte(18u32);
//! let has_license = Specification::leaf("has_license", |p: &Person| p.license.is_some());
//!
//! let driver = is_adult.clone().and(has_license.clone());
//! let teen = Person { age: 16, license: None };
//! let adult = Person { age: 20, license: Some("X".to_string()) };
//!
//! assert!(driver.is_satisfied_by(&adult));
//! assert!(!is_adult.clone().nand(has_license).is_satisfied_by(&adult));
//! assert!(is_adult.clone().not().is_satisfied_by(&teen));
//!
//! let lambda = driver.to_expression().unwrap();
//! assert_eq!(lambda.to_string(), "|e| ((e.age >= 18) && has_license(e))");
//! ```
//!
//! # Composition Semantics
//!
//! ```text
//! S and IDENTITY  = S        S nand IDENTITY = S
//! S or  IDENTITY  = S        S nor  IDENTITY = S
//! nand(a, b)      = !a || !b
//! nor(a, b)       = !a && !b
//! ```
//!
//! Every operator returns a new node; operands are never modified, so one
//! specification can appear in many compositions.
//!
//! # Expression Export
//!
//! [`Specification::to_expression`] produces a [`Lambda`]: one [`Param`] and
//! a body [`Expr`]. Leaves built independently each own a parameter; binary
//! nodes keep the left one and rewrite the right subtree with a
//! [`Rebinder`], so the exported lambda never has a second free variable.
//!
//! | Node | Rendered as |
//! |------|-------------|
//! | Field read | `e.age` |
//! | Comparison | `(e.age >= 18)` |
//! | Named predicate | `has_license(e)` |
//! | And / Or | `(a && b)`, `(a \|\| b)` |
//! | Not | `!a` |
//! | Conditional | `(c ? a : b)` |
//!
//! # Features
//!
//! - `regex` (default): regex literals, [`CmpOp::Matches`] and the
//!   `matches` builders.

mod clause;
mod error;
mod expr;
mod leaf;
mod op;
mod spec;
mod traits;
mod value;

// Re-export public API
pub use clause::{field, FieldClause};
pub use error::{Result, SpecError};
pub use expr::{
    CompiledPredicate, Expr, ExtensionNode, Lambda, Param, PredicateFn, Rebinder,
    DEFAULT_PARAM_NAME,
};
pub use leaf::Leaf;
pub use op::CmpOp;
pub use spec::Specification;
pub use traits::{Accessor, Entity};
pub use value::{Literal, Number, Timestamp, Value};
