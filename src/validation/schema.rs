//! Per-type validation and form-binding schema.
//!
//! A schema lists, once per record type, which fields to check, under which
//! display name, and with which rules. It replaces struct-tag reflection with
//! plain function pointers:
//!
//! ```rust
//! use std::sync::OnceLock;
//! use gerbang::validation::{Schema, Validate};
//!
//! #[derive(Default)]
//! struct Signup {
//!     name: String,
//!     email: Option<String>,
//!     age: i64,
//! }
//!
//! impl Validate for Signup {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: OnceLock<Schema<Signup>> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             Schema::<Self>::new()
//!                 .field("name",  "required,minlen=3",  |s| (&s.name).into())
//!                 .field("email", "email",              |s| (&s.email).into())
//!                 .field("age",   "min=18",             |s| (&s.age).into())
//!                 .form("name", |s| &mut s.name)
//!                 .form("age",  |s| &mut s.age)
//!         })
//!     }
//! }
//! ```

use std::str::FromStr;

use super::engine;
use super::rules::RuleRegistry;
use super::value::Value;
use crate::errors::Aggregate;

/// Implemented by every record the engine can validate or bind.
pub trait Validate: Sized + 'static {
    fn schema() -> &'static Schema<Self>;
}

/// One `name` or `name=param` token of a rule list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleSpec {
    pub name: String,
    pub param: String,
}

impl RuleSpec {
    /// Parses `rule[=param](,rule[=param])*`. Blank tokens are dropped.
    pub fn parse_list(rules: &str) -> Vec<RuleSpec> {
        rules
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| match token.split_once('=') {
                Some((name, param)) => RuleSpec { name: name.trim().to_owned(), param: param.trim().to_owned() },
                None => RuleSpec { name: token.to_owned(), param: String::new() },
            })
            .collect()
    }
}

type NestedCheck<T> = Box<dyn Fn(&T, &RuleRegistry) -> Result<(), Aggregate> + Send + Sync>;
type FormSetter<T> = Box<dyn Fn(&mut T, &str) -> bool + Send + Sync>;

pub(crate) enum Check<T> {
    Rules { rules: Vec<RuleSpec>, read: fn(&T) -> Value<'_> },
    Nested(NestedCheck<T>),
}

pub(crate) struct Field<T> {
    pub(crate) name: String,
    pub(crate) check: Check<T>,
}

pub(crate) struct FormField<T> {
    pub(crate) key: String,
    pub(crate) set: FormSetter<T>,
}

/// Validation and form-binding schema for `T`. See the module docs.
pub struct Schema<T> {
    pub(crate) fields: Vec<Field<T>>,
    pub(crate) form: Vec<FormField<T>>,
}

impl<T: 'static> Schema<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new(), form: Vec::new() }
    }

    /// Checks the value `read` returns against `rules`, reporting failures
    /// under `name`.
    pub fn field(mut self, name: &str, rules: &str, read: fn(&T) -> Value<'_>) -> Self {
        self.fields.push(Field {
            name: name.to_owned(),
            check: Check::Rules { rules: RuleSpec::parse_list(rules), read },
        });
        self
    }

    /// Validates a sub-record and stores its errors as a nested aggregate
    /// under `name`.
    pub fn nested<N: Validate>(mut self, name: &str, read: fn(&T) -> &N) -> Self {
        self.fields.push(Field {
            name: name.to_owned(),
            check: Check::Nested(Box::new(move |record: &T, registry: &RuleRegistry| {
                engine::validate(registry, read(record))
            })),
        });
        self
    }

    /// Binds form value `key` into the slot `slot` points at.
    ///
    /// Values that do not parse as the slot's type leave the slot untouched.
    pub fn form<F: FormScalar>(mut self, key: &str, slot: fn(&mut T) -> &mut F) -> Self {
        self.form.push(FormField {
            key: key.to_owned(),
            set: Box::new(move |record: &mut T, raw: &str| match F::coerce(raw) {
                Some(value) => {
                    *slot(record) = value;
                    true
                }
                None => false,
            }),
        });
        self
    }
}

impl<T: 'static> Default for Schema<T> {
    fn default() -> Self { Self::new() }
}

/// A field type a raw form value can be coerced into.
pub trait FormScalar: Sized + 'static {
    fn coerce(raw: &str) -> Option<Self>;
}

impl FormScalar for String {
    fn coerce(raw: &str) -> Option<Self> { Some(raw.to_owned()) }
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
impl FormScalar for bool {
    fn coerce(raw: &str) -> Option<Self> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
            _ => None,
        }
    }
}

macro_rules! parsed_scalar {
    ($($ty:ty),+) => {
        $(
            impl FormScalar for $ty {
                fn coerce(raw: &str) -> Option<Self> { <$ty as FromStr>::from_str(raw).ok() }
            }
        )+
    };
}

parsed_scalar!(i32, i64, u32, u64, f32, f64);

/// A present value fills the option; a value that fails coercion leaves it
/// as it was.
impl<F: FormScalar> FormScalar for Option<F> {
    fn coerce(raw: &str) -> Option<Self> { F::coerce(raw).map(Some) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rule_lists() {
        assert_eq!(
            RuleSpec::parse_list("required, minlen=3 ,max = 10,,"),
            vec![
                RuleSpec { name: "required".into(), param: String::new() },
                RuleSpec { name: "minlen".into(), param: "3".into() },
                RuleSpec { name: "max".into(), param: "10".into() },
            ],
        );
        assert!(RuleSpec::parse_list("").is_empty());
    }

    #[test]
    fn param_keeps_everything_after_first_equals() {
        let specs = RuleSpec::parse_list("oneof=a=b");
        assert_eq!(specs[0].name, "oneof");
        assert_eq!(specs[0].param, "a=b");
    }

    #[test]
    fn scalar_coercion() {
        assert_eq!(i64::coerce("42"), Some(42));
        assert_eq!(i64::coerce("4x"), None);
        assert_eq!(f64::coerce("2.5"), Some(2.5));
        assert_eq!(bool::coerce("T"), Some(true));
        assert_eq!(bool::coerce("yes"), None);
        assert_eq!(Option::<u32>::coerce("7"), Some(Some(7)));
        assert_eq!(Option::<u32>::coerce("-7"), None);
    }
}
