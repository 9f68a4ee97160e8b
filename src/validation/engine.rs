//! Schema-driven record validation.

use tracing::trace;

use super::rules::RuleRegistry;
use super::schema::{Check, Validate};
use crate::errors::Aggregate;

/// Validates `record` against its schema.
///
/// Per field: rules run in declared order and the first failure ends that
/// field (every other field is still checked). An absent optional value is
/// only checked by `required`, if listed; no other rule sees it. Rule names
/// the registry does not know are skipped.
pub fn validate<T: Validate>(registry: &RuleRegistry, record: &T) -> Result<(), Aggregate> {
    let mut errors = Aggregate::new();

    for field in &T::schema().fields {
        match &field.check {
            Check::Rules { rules, read } => {
                let value = read(record);

                if value.is_absent() {
                    let required = rules.iter().find(|spec| spec.name == "required");
                    if let (Some(spec), Some(rule)) = (required, registry.get("required")) {
                        if let Err(err) = rule(&value, spec.param.as_str()) {
                            errors.insert(field.name.as_str(), err);
                        }
                    }
                    continue;
                }

                for spec in rules {
                    let Some(rule) = registry.get(&spec.name) else {
                        trace!(rule = %spec.name, field = %field.name, "skipping unregistered rule");
                        continue;
                    };
                    if let Err(err) = rule(&value, spec.param.as_str()) {
                        errors.insert(field.name.as_str(), err);
                        break;
                    }
                }
            }
            Check::Nested(check) => {
                if let Err(nested) = check(record, registry) {
                    errors.insert_nested(field.name.as_str(), nested);
                }
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
