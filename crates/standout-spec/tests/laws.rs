//! Property-based tests for the specification algebra using proptest.

use proptest::prelude::*;
use standout_spec::{field, Entity, Expr, Lambda, Number, Param, Specification, Value};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone)]
struct Person {
    age: u32,
    name: String,
    license: Option<String>,
}

impl Entity for Person {
    fn field_value(&self, field: &str) -> Value<'_> {
        match field {
            "age" => Value::Number(Number::from(self.age)),
            "name" => Value::String(&self.name),
            "license" => self.license.as_deref().map_or(Value::None, Value::String),
            _ => Value::None,
        }
    }
}

const LEAVES: usize = 6;

/// Field reader that bypasses `Entity`.
fn years<'a>(p: &'a Person, field: &str) -> Value<'a> {
    match field {
        "years" => Value::Number(Number::from(p.age)),
        _ => Value::None,
    }
}

/// Leaf table: expression leaves, closure leaves and a leaf with its own
/// accessor mixed, so merges cross every kind.
fn leaf(index: usize) -> Specification<Person> {
    match index {
        0 => field::<Person>("age").gte(18u32),
        1 => field::<Person>("license").is_not_null(),
        2 => Specification::leaf("senior", |p: &Person| p.age >= 65),
        3 => field::<Person>("name").starts_with("a"),
        4 => {
            let p = Param::fresh();
            let young = Lambda::new(p.clone(), Expr::param(&p).field("years").lt(30u32)).unwrap();
            Specification::from_lambda_with(young, years).unwrap()
        }
        _ => Specification::leaf("short_name", |p: &Person| p.name.len() < 3),
    }
}

fn leaf_oracle(index: usize, p: &Person) -> bool {
    match index {
        0 => p.age >= 18,
        1 => p.license.is_some(),
        2 => p.age >= 65,
        3 => p.name.starts_with('a'),
        4 => p.age < 30,
        _ => p.name.len() < 3,
    }
}

/// Shape of a specification, evaluated independently as an oracle.
#[derive(Debug, Clone)]
enum Shape {
    Leaf(usize),
    Identity,
    And(Box<Shape>, Box<Shape>),
    Or(Box<Shape>, Box<Shape>),
    Nand(Box<Shape>, Box<Shape>),
    Nor(Box<Shape>, Box<Shape>),
    Not(Box<Shape>),
}

impl Shape {
    fn build(&self) -> Specification<Person> {
        match self {
            Shape::Leaf(i) => leaf(*i),
            Shape::Identity => Specification::identity(),
            Shape::And(a, b) => a.build().and(b.build()),
            Shape::Or(a, b) => a.build().or(b.build()),
            Shape::Nand(a, b) => a.build().nand(b.build()),
            Shape::Nor(a, b) => a.build().nor(b.build()),
            Shape::Not(a) => a.build().not(),
        }
    }

    /// Whether the built specification collapses to `Identity`.
    fn collapses(&self) -> bool {
        match self {
            Shape::Identity => true,
            Shape::Leaf(_) | Shape::Not(_) => false,
            Shape::And(a, b) | Shape::Or(a, b) | Shape::Nand(a, b) | Shape::Nor(a, b) => {
                a.collapses() && b.collapses()
            }
        }
    }

    fn oracle(&self, p: &Person) -> bool {
        let binary = |a: &Shape, b: &Shape, op: fn(bool, bool) -> bool| {
            if a.collapses() {
                b.oracle(p)
            } else if b.collapses() {
                a.oracle(p)
            } else {
                op(a.oracle(p), b.oracle(p))
            }
        };
        match self {
            Shape::Leaf(i) => leaf_oracle(*i, p),
            Shape::Identity => true,
            Shape::And(a, b) => binary(a, b, |x, y| x && y),
            Shape::Or(a, b) => binary(a, b, |x, y| x || y),
            Shape::Nand(a, b) => binary(a, b, |x, y| !(x && y)),
            Shape::Nor(a, b) => binary(a, b, |x, y| !(x || y)),
            Shape::Not(a) => !a.oracle(p),
        }
    }
}

fn person_strategy() -> impl Strategy<Value = Person> {
    (0u32..100, "[a-c]{0,5}", proptest::option::of("[A-Z]{1,3}")).prop_map(
        |(age, name, license)| Person { age, name, license },
    )
}

fn shape_strategy(with_identity: bool) -> impl Strategy<Value = Shape> {
    let leaf = if with_identity {
        prop_oneof![4 => (0..LEAVES).prop_map(Shape::Leaf), 1 => Just(Shape::Identity)].boxed()
    } else {
        (0..LEAVES).prop_map(Shape::Leaf).boxed()
    };
    leaf.prop_recursive(5, 48, 2, |inner| {
        let pair = (inner.clone(), inner.clone());
        prop_oneof![
            pair.clone().prop_map(|(a, b)| Shape::And(Box::new(a), Box::new(b))),
            pair.clone().prop_map(|(a, b)| Shape::Or(Box::new(a), Box::new(b))),
            pair.clone().prop_map(|(a, b)| Shape::Nand(Box::new(a), Box::new(b))),
            pair.prop_map(|(a, b)| Shape::Nor(Box::new(a), Box::new(b))),
            inner.prop_map(|a| Shape::Not(Box::new(a))),
        ]
    })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Direct evaluation agrees with the boolean oracle, identity rule included.
    #[test]
    fn evaluation_matches_oracle(shape in shape_strategy(true), p in person_strategy()) {
        prop_assert_eq!(shape.build().is_satisfied_by(&p), shape.oracle(&p));
    }

    /// The exported lambda evaluates exactly like the tree it came from.
    #[test]
    fn compiled_export_matches_evaluation(shape in shape_strategy(true), p in person_strategy()) {
        let spec = shape.build();
        let compiled = spec.compile().unwrap();
        prop_assert_eq!(compiled.call(&p), spec.is_satisfied_by(&p));
    }

    /// Exported lambdas have exactly one free variable, their own parameter.
    #[test]
    fn export_binds_a_single_parameter(shape in shape_strategy(true)) {
        let lambda = shape.build().to_expression().unwrap();
        let params = lambda.body().params();
        prop_assert!(params.len() <= 1);
        prop_assert!(params.iter().all(|param| param == lambda.param()));
    }

    /// Exporting twice yields the same tree.
    #[test]
    fn export_is_deterministic(shape in shape_strategy(true)) {
        let spec = shape.build();
        let first = spec.to_expression().unwrap();
        let second = spec.to_expression().unwrap();
        prop_assert_eq!(first.param(), second.param());
        prop_assert_eq!(format!("{:?}", first), format!("{:?}", second));
    }

    /// Combining with Identity on either side changes nothing.
    #[test]
    fn identity_law(shape in shape_strategy(true), p in person_strategy()) {
        let s = shape.build();
        let id = Specification::identity;
        let expected = s.is_satisfied_by(&p);
        prop_assert_eq!(s.clone().and(id()).is_satisfied_by(&p), expected);
        prop_assert_eq!(id().and(s.clone()).is_satisfied_by(&p), expected);
        prop_assert_eq!(s.clone().or(id()).is_satisfied_by(&p), expected);
        prop_assert_eq!(id().or(s.clone()).is_satisfied_by(&p), expected);
        prop_assert_eq!(s.clone().nand(id()).is_satisfied_by(&p), expected);
        prop_assert_eq!(id().nand(s.clone()).is_satisfied_by(&p), expected);
        prop_assert_eq!(s.clone().nor(id()).is_satisfied_by(&p), expected);
        prop_assert_eq!(id().nor(s).is_satisfied_by(&p), expected);
    }

    #[test]
    fn commutativity(a in shape_strategy(true), b in shape_strategy(true), p in person_strategy()) {
        let (s1, s2) = (a.build(), b.build());
        prop_assert_eq!(
            s1.clone().and(s2.clone()).is_satisfied_by(&p),
            s2.clone().and(s1.clone()).is_satisfied_by(&p)
        );
        prop_assert_eq!(
            s1.clone().or(s2.clone()).is_satisfied_by(&p),
            s2.clone().or(s1.clone()).is_satisfied_by(&p)
        );
        prop_assert_eq!(
            s1.clone().nand(s2.clone()).is_satisfied_by(&p),
            s2.clone().nand(s1.clone()).is_satisfied_by(&p)
        );
        prop_assert_eq!(
            s1.clone().nor(s2.clone()).is_satisfied_by(&p),
            s2.nor(s1).is_satisfied_by(&p)
        );
    }

    /// De Morgan, for operands that are not the identity.
    #[test]
    fn de_morgan(a in shape_strategy(false), b in shape_strategy(false), p in person_strategy()) {
        let (s1, s2) = (a.build(), b.build());
        let (x, y) = (s1.is_satisfied_by(&p), s2.is_satisfied_by(&p));
        prop_assert_eq!(s1.clone().nand(s2.clone()).is_satisfied_by(&p), !(x && y));
        prop_assert_eq!(s1.nor(s2).is_satisfied_by(&p), !(x || y));
    }

    #[test]
    fn de_morgan_holds_after_export(a in shape_strategy(false), b in shape_strategy(false), p in person_strategy()) {
        let (s1, s2) = (a.build(), b.build());
        let (x, y) = (s1.is_satisfied_by(&p), s2.is_satisfied_by(&p));
        prop_assert_eq!(s1.clone().nand(s2.clone()).compile().unwrap().call(&p), !(x && y));
        prop_assert_eq!(s1.nor(s2).compile().unwrap().call(&p), !(x || y));
    }

    #[test]
    fn double_negation(shape in shape_strategy(true), p in person_strategy()) {
        let s = shape.build();
        prop_assert_eq!(s.clone().not().not().is_satisfied_by(&p), s.is_satisfied_by(&p));
        prop_assert_eq!((!!s.clone()).compile().unwrap().call(&p), s.is_satisfied_by(&p));
    }

    #[test]
    fn associativity(
        a in shape_strategy(true),
        b in shape_strategy(true),
        c in shape_strategy(true),
        p in person_strategy(),
    ) {
        let (s1, s2, s3) = (a.build(), b.build(), c.build());
        prop_assert_eq!(
            s1.clone().and(s2.clone()).and(s3.clone()).is_satisfied_by(&p),
            s1.clone().and(s2.clone().and(s3.clone())).is_satisfied_by(&p)
        );
        prop_assert_eq!(
            s1.clone().or(s2.clone()).or(s3.clone()).is_satisfied_by(&p),
            s1.or(s2.or(s3)).is_satisfied_by(&p)
        );
    }

    /// Independently built leaves compose without failing and combine like booleans.
    #[test]
    fn parameter_isolation(i in 0..LEAVES, j in 0..LEAVES, p in person_strategy()) {
        let (x, y) = (leaf_oracle(i, &p), leaf_oracle(j, &p));
        let both = leaf(i).and(leaf(j));
        let lambda = both.to_expression().unwrap();
        prop_assert_eq!(lambda.body().params(), vec![lambda.param().clone()]);
        prop_assert_eq!(lambda.compile().unwrap().call(&p), x && y);
        prop_assert_eq!(leaf(i).or(leaf(j)).compile().unwrap().call(&p), x || y);
    }

    /// A specification composed with itself still exports one parameter.
    #[test]
    fn self_composition(shape in shape_strategy(true), p in person_strategy()) {
        let s = shape.build();
        let doubled = s.clone().and(s.clone()).or(s.clone().nand(s.clone()));
        let lambda = doubled.to_expression().unwrap();
        prop_assert!(lambda.body().params().len() <= 1);
        prop_assert_eq!(lambda.compile().unwrap().call(&p), doubled.is_satisfied_by(&p));
    }
}
