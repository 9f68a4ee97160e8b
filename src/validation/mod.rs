//! Rule-based record validation.
//!
//! Records describe themselves once through a [`Schema`]; the engine walks
//! that schema, runs the named rules from a [`RuleRegistry`], and collects
//! failures into an [`Aggregate`](crate::errors::Aggregate).

mod engine;
mod rules;
mod schema;
mod value;

use tracing::debug;

pub use engine::validate;
pub use rules::{Rule, RuleRegistry};
pub use schema::{FormScalar, RuleSpec, Schema, Validate};
pub use value::Value;

/// Copies URL-encoded form values into `record` through its schema's form
/// slots.
///
/// The first value of a repeated key wins. Values that do not coerce into
/// the slot's type are skipped and the slot keeps its previous content.
pub fn bind_form<T: Validate>(record: &mut T, values: &[(String, String)]) {
    for field in &T::schema().form {
        let Some((_, raw)) = values.iter().find(|(key, _)| *key == field.key) else {
            continue;
        };
        if !(field.set)(record, raw) {
            debug!(key = %field.key, raw = %raw, "form value does not fit its field, skipped");
        }
    }
}
