//! Field access for expression evaluation.

use crate::value::Value;

/// Function that reads a named field from an entity.
///
/// This is the shape [`Lambda::compile_with`](crate::Lambda::compile_with)
/// takes when the entity type does not implement [`Entity`].
pub type Accessor<T> = for<'a> fn(&'a T, &str) -> Value<'a>;

/// Types whose fields can be read by name from an expression tree.
///
/// Field nodes (`e.age`) resolve through this trait. Unknown fields should
/// return [`Value::None`].
///
/// ```
/// use standout_spec::{Entity, Number, Value};
///
/// struct Person {
///     age: u32,
///     license: Option<String>,
/// }
///
/// impl Entity for Person {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "age" => Value::Number(Number::from(self.age)),
///             "license" => self.license.as_deref().map_or(Value::None, Value::String),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Entity {
    /// Returns the value of `field`, or [`Value::None`] if it is absent.
    fn field_value(&self, field: &str) -> Value<'_>;

    /// Returns [`Entity::field_value`] as a plain function pointer.
    fn accessor() -> Accessor<Self>
    where
        Self: Sized,
    {
        |entity, field| entity.field_value(field)
    }
}
