//! Named validation rules.
//!
//! Built once at boot from the catalog (each built-in rule resolves the
//! identifiers it reports up front), optionally extended with application
//! rules, then shared read-only behind an `Arc`.
//!
//! | rule | passes when |
//! |---|---|
//! | `required` | value is present and not its type's zero value |
//! | `minlen=n` / `maxlen=n` | string has at least / at most `n` characters |
//! | `min=n` / `max=n` | number ≥ / ≤ `n`; numeric strings compare by value, other strings by length |
//! | `email` | string looks like `local@domain.tld` |
//! | `digit` / `alphanum` / `alphabet` | string is `[0-9]+` / `[A-Za-z0-9]+` / `[A-Za-z]+` |
//! | `date` / `datetime` | text parses as `YYYY-MM-DD` / `YYYY-MM-DD hh:mm:ss` |

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::{debug, info};

use super::engine;
use super::schema::Validate;
use super::value::Value;
use crate::errors::{ids, Aggregate, Catalog, CatalogError, CodedError, Template};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("digit pattern"));
static ALPHANUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("alphanum pattern"));
static ALPHABET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("alphabet pattern"));
static DATE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern")
});
static DATETIME_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$").expect("datetime pattern")
});

/// A validation predicate over a field value and the rule's parameter
/// (empty when the rule is written without `=`).
///
/// Implemented for every matching closure.
pub trait Rule: Fn(&Value<'_>, &str) -> Result<(), CodedError> + Send + Sync + 'static {}

impl<F> Rule for F where F: Fn(&Value<'_>, &str) -> Result<(), CodedError> + Send + Sync + 'static {}

type BoxedRule = Arc<dyn Fn(&Value<'_>, &str) -> Result<(), CodedError> + Send + Sync>;

/// Rule name → predicate.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, BoxedRule>,
}

impl RuleRegistry {
    /// A registry with no rules at all.
    pub fn new() -> Self { Self::default() }

    /// A registry holding every built-in rule.
    ///
    /// Fails if `catalog` lacks any identifier the built-ins report.
    pub fn builtin(catalog: &Catalog) -> Result<Self, CatalogError> {
        let t = |id| catalog.template(id);
        let invalid_param = t(ids::FIELD_INVALID_PARAM)?;
        let unsupported = t(ids::FIELD_UNSUPPORTED_TYPE)?;

        let registry = Self::new()
            .with("required", required(t(ids::FIELD_REQUIRED)?))
            .with("minlen", length(Bound::Min, t(ids::FIELD_LENGTH_BELOW_MINIMUM)?, invalid_param.clone()))
            .with("maxlen", length(Bound::Max, t(ids::FIELD_LENGTH_ABOVE_MAXIMUM)?, invalid_param.clone()))
            .with("min", numeric(Bound::Min, t(ids::FIELD_BELOW_MINIMUM)?, unsupported.clone(), invalid_param.clone()))
            .with("max", numeric(Bound::Max, t(ids::FIELD_ABOVE_MAXIMUM)?, unsupported, invalid_param))
            .with("email", pattern(&EMAIL, t(ids::FIELD_MUST_BE_EMAIL)?, NonString::Pass))
            .with("digit", pattern(&DIGIT, t(ids::FIELD_MUST_BE_DIGIT)?, NonString::Fail))
            .with("alphanum", pattern(&ALPHANUM, t(ids::FIELD_MUST_BE_ALPHANUM)?, NonString::Fail))
            .with("alphabet", pattern(&ALPHABET, t(ids::FIELD_MUST_BE_ALPHABET)?, NonString::Fail))
            .with("date", calendar(Calendar::Date, t(ids::FIELD_MUST_BE_DATE)?))
            .with("datetime", calendar(Calendar::Datetime, t(ids::FIELD_MUST_BE_DATETIME)?));

        info!(rules = registry.len(), "built-in validation rules registered");
        Ok(registry)
    }

    /// Adds a rule.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered. Rule names are write-once.
    pub fn register(&mut self, name: &str, rule: impl Rule) {
        assert!(!self.rules.contains_key(name), "validation rule `{name}` registered twice");
        debug!(name, "registering validation rule");
        self.rules.insert(name.to_owned(), Arc::new(rule));
    }

    /// Chaining form of [`register`](Self::register).
    pub fn with(mut self, name: &str, rule: impl Rule) -> Self {
        self.register(name, rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&(dyn Fn(&Value<'_>, &str) -> Result<(), CodedError> + Send + Sync)> {
        self.rules.get(name).map(|rule| rule.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool { self.rules.contains_key(name) }
    pub fn len(&self) -> usize { self.rules.len() }
    pub fn is_empty(&self) -> bool { self.rules.is_empty() }

    /// Runs every rule of `T`'s schema against `record`.
    pub fn validate<T: Validate>(&self, record: &T) -> Result<(), Aggregate> {
        engine::validate(self, record)
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("RuleRegistry").field("rules", &names).finish()
    }
}

// ── Built-in predicates ───────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Bound {
    Min,
    Max,
}

impl Bound {
    fn violated(self, actual: f64, limit: f64) -> bool {
        match self {
            Self::Min => actual < limit,
            Self::Max => actual > limit,
        }
    }
}

/// How a string-pattern rule treats values that are not strings.
#[derive(Clone, Copy)]
enum NonString {
    Pass,
    Fail,
}

#[derive(Clone, Copy)]
enum Calendar {
    Date,
    Datetime,
}

impl Calendar {
    fn parses(self, text: &str) -> bool {
        match self {
            Self::Date => {
                DATE_SHAPE.is_match(text) && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
            }
            Self::Datetime => {
                DATETIME_SHAPE.is_match(text)
                    && NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").is_ok()
            }
        }
    }
}

fn required(err: Template) -> impl Rule {
    move |value: &Value<'_>, _: &str| if value.is_zero() { Err(err.error()) } else { Ok(()) }
}

/// `minlen` / `maxlen`: character count of plain strings. Other kinds pass.
fn length(bound: Bound, err: Template, invalid_param: Template) -> impl Rule {
    move |value: &Value<'_>, param: &str| {
        let limit: usize = param.trim().parse().map_err(|_| invalid_param.error_with(&[&param]))?;
        let Value::Str(s) = *value else { return Ok(()) };

        if bound.violated(s.chars().count() as f64, limit as f64) {
            return Err(err.error_with(&[&limit]));
        }
        Ok(())
    }
}

/// `min` / `max`: numbers compare by value. Strings and rendered values
/// compare by value when they parse as a number, by character count
/// otherwise.
fn numeric(bound: Bound, err: Template, unsupported: Template, invalid_param: Template) -> impl Rule {
    move |value: &Value<'_>, param: &str| {
        let limit: f64 = param.trim().parse().map_err(|_| invalid_param.error_with(&[&param]))?;
        let actual = match *value {
            Value::Str(s) => number_or_length(s),
            Value::Rendered(r) => number_or_length(&r.to_string()),
            Value::Int(n) => n as f64,
            Value::Uint(n) => n as f64,
            Value::Float(f) => f,
            Value::Bool(_) | Value::Absent => return Err(unsupported.error()),
        };

        if bound.violated(actual, limit) {
            return Err(err.error_with(&[&(limit as i64)]));
        }
        Ok(())
    }
}

fn number_or_length(s: &str) -> f64 {
    s.parse::<f64>().unwrap_or_else(|_| s.chars().count() as f64)
}

fn pattern(re: &'static Regex, err: Template, non_string: NonString) -> impl Rule {
    move |value: &Value<'_>, _: &str| match (*value, non_string) {
        (Value::Str(s), _) if re.is_match(s) => Ok(()),
        (Value::Str(_), _) | (_, NonString::Fail) => Err(err.error()),
        (_, NonString::Pass) => Ok(()),
    }
}

/// `date` / `datetime`: accepts strings and rendered values, rejects the rest.
fn calendar(kind: Calendar, err: Template) -> impl Rule {
    move |value: &Value<'_>, _: &str| {
        let text = match *value {
            Value::Str(s) => Cow::Borrowed(s),
            Value::Rendered(r) => Cow::Owned(r.to_string()),
            _ => return Err(err.error()),
        };
        if kind.parses(&text) { Ok(()) } else { Err(err.error()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;

    fn registry() -> RuleRegistry {
        RuleRegistry::builtin(&Catalog::builtin().unwrap()).unwrap()
    }

    fn check(registry: &RuleRegistry, rule: &str, value: Value<'_>, param: &str) -> Result<(), String> {
        let rule = registry.get(rule).unwrap();
        rule(&value, param).map_err(|e| e.id().to_owned())
    }

    #[test]
    fn every_builtin_is_registered() {
        let r = registry();
        for name in [
            "required", "minlen", "maxlen", "min", "max", "email", "digit", "alphanum", "alphabet",
            "date", "datetime",
        ] {
            assert!(r.contains(name), "{name}");
        }
        assert_eq!(r.len(), 11);
    }

    #[test]
    fn required_rejects_absent_and_zero() {
        let r = registry();
        assert_eq!(check(&r, "required", Value::Absent, ""), Err(ids::FIELD_REQUIRED.into()));
        assert_eq!(check(&r, "required", Value::Str(""), ""), Err(ids::FIELD_REQUIRED.into()));
        assert_eq!(check(&r, "required", Value::Int(0), ""), Err(ids::FIELD_REQUIRED.into()));
        assert_eq!(check(&r, "required", Value::Str("x"), ""), Ok(()));
        assert_eq!(check(&r, "required", Value::Bool(true), ""), Ok(()));
    }

    #[test]
    fn minlen_and_maxlen_are_inclusive() {
        let r = registry();
        assert_eq!(check(&r, "minlen", Value::Str("ab"), "3"), Err(ids::FIELD_LENGTH_BELOW_MINIMUM.into()));
        assert_eq!(check(&r, "minlen", Value::Str("abc"), "3"), Ok(()));
        assert_eq!(check(&r, "maxlen", Value::Str("abc"), "3"), Ok(()));
        assert_eq!(check(&r, "maxlen", Value::Str("abcd"), "3"), Err(ids::FIELD_LENGTH_ABOVE_MAXIMUM.into()));
        // characters, not bytes
        assert_eq!(check(&r, "maxlen", Value::Str("äöü"), "3"), Ok(()));
        // non-strings are not length-checked
        assert_eq!(check(&r, "minlen", Value::Int(1), "3"), Ok(()));
    }

    #[test]
    fn length_message_carries_the_limit() {
        let r = registry();
        let err = r.get("minlen").unwrap()(&Value::Str("ab"), "3").unwrap_err();
        assert_eq!(err.localized(Locale::English), "length must be at least 3 characters");
        assert_eq!(err.localized(Locale::Bahasa), "panjang minimal 3 karakter");
    }

    #[test]
    fn min_max_compare_numbers() {
        let r = registry();
        assert_eq!(check(&r, "min", Value::Int(17), "18"), Err(ids::FIELD_BELOW_MINIMUM.into()));
        assert_eq!(check(&r, "min", Value::Int(18), "18"), Ok(()));
        assert_eq!(check(&r, "max", Value::Float(10.5), "10"), Err(ids::FIELD_ABOVE_MAXIMUM.into()));
        assert_eq!(check(&r, "max", Value::Uint(10), "10"), Ok(()));
    }

    #[test]
    fn min_max_parse_numeric_strings_before_falling_back_to_length() {
        let r = registry();
        // "9" parses: 9 < 10
        assert_eq!(check(&r, "min", Value::Str("9"), "10"), Err(ids::FIELD_BELOW_MINIMUM.into()));
        // "abcdefghijk" does not parse: length 11 >= 10
        assert_eq!(check(&r, "min", Value::Str("abcdefghijk"), "10"), Ok(()));
        assert_eq!(check(&r, "max", Value::Str("abc"), "2"), Err(ids::FIELD_ABOVE_MAXIMUM.into()));
        assert_eq!(check(&r, "max", Value::rendered(&150), "100"), Err(ids::FIELD_ABOVE_MAXIMUM.into()));
    }

    #[test]
    fn min_max_reject_bad_params_and_booleans() {
        let r = registry();
        assert_eq!(check(&r, "min", Value::Int(1), "ten"), Err(ids::FIELD_INVALID_PARAM.into()));
        assert_eq!(check(&r, "max", Value::Bool(true), "1"), Err(ids::FIELD_UNSUPPORTED_TYPE.into()));

        let err = r.get("min").unwrap()(&Value::Int(1), "ten").unwrap_err();
        assert_eq!(err.localized(Locale::English), "invalid rule parameter: ten");
    }

    #[test]
    fn email() {
        let r = registry();
        assert_eq!(check(&r, "email", Value::Str("a@b.com"), ""), Ok(()));
        assert_eq!(check(&r, "email", Value::Str("first.last+tag@mail.example.co"), ""), Ok(()));
        assert_eq!(check(&r, "email", Value::Str("a@b"), ""), Err(ids::FIELD_MUST_BE_EMAIL.into()));
        assert_eq!(check(&r, "email", Value::Str("a@b.com\n"), ""), Err(ids::FIELD_MUST_BE_EMAIL.into()));
        assert_eq!(check(&r, "email", Value::Int(3), ""), Ok(()));
    }

    #[test]
    fn character_classes() {
        let r = registry();
        assert_eq!(check(&r, "digit", Value::Str("0123"), ""), Ok(()));
        assert_eq!(check(&r, "digit", Value::Str("12a"), ""), Err(ids::FIELD_MUST_BE_DIGIT.into()));
        assert_eq!(check(&r, "digit", Value::Str("١٢"), ""), Err(ids::FIELD_MUST_BE_DIGIT.into()));
        assert_eq!(check(&r, "digit", Value::Int(12), ""), Err(ids::FIELD_MUST_BE_DIGIT.into()));
        assert_eq!(check(&r, "alphanum", Value::Str("abc123"), ""), Ok(()));
        assert_eq!(check(&r, "alphanum", Value::Str("abc 123"), ""), Err(ids::FIELD_MUST_BE_ALPHANUM.into()));
        assert_eq!(check(&r, "alphabet", Value::Str("Budi"), ""), Ok(()));
        assert_eq!(check(&r, "alphabet", Value::Str("Budi1"), ""), Err(ids::FIELD_MUST_BE_ALPHABET.into()));
        assert_eq!(check(&r, "alphabet", Value::Str(""), ""), Err(ids::FIELD_MUST_BE_ALPHABET.into()));
    }

    #[test]
    fn dates_are_strict() {
        let r = registry();
        assert_eq!(check(&r, "date", Value::Str("2024-02-29"), ""), Ok(()));
        assert_eq!(check(&r, "date", Value::Str("2023-02-29"), ""), Err(ids::FIELD_MUST_BE_DATE.into()));
        assert_eq!(check(&r, "date", Value::Str("2024-2-9"), ""), Err(ids::FIELD_MUST_BE_DATE.into()));
        assert_eq!(check(&r, "date", Value::Str("2024-02-09 10:00:00"), ""), Err(ids::FIELD_MUST_BE_DATE.into()));
        assert_eq!(check(&r, "date", Value::Int(20240209), ""), Err(ids::FIELD_MUST_BE_DATE.into()));

        assert_eq!(check(&r, "datetime", Value::Str("2024-02-09 23:59:59"), ""), Ok(()));
        assert_eq!(check(&r, "datetime", Value::Str("2024-02-09 24:00:00"), ""), Err(ids::FIELD_MUST_BE_DATETIME.into()));
        assert_eq!(check(&r, "datetime", Value::Str("2024-02-09T10:00:00"), ""), Err(ids::FIELD_MUST_BE_DATETIME.into()));
    }

    #[test]
    fn dates_accept_rendered_values() {
        struct Day(&'static str);
        impl fmt::Display for Day {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.0) }
        }

        let r = registry();
        assert_eq!(check(&r, "date", Value::rendered(&Day("2024-01-31")), ""), Ok(()));
        assert_eq!(check(&r, "date", Value::rendered(&Day("31/01/2024")), ""), Err(ids::FIELD_MUST_BE_DATE.into()));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_rule_name_panics() {
        let mut r = registry();
        r.register("email", |_: &Value<'_>, _: &str| Ok(()));
    }

    #[test]
    fn missing_catalog_entry_fails_boot() {
        let err = RuleRegistry::builtin(&Catalog::new()).unwrap_err();
        assert!(matches!(err, CatalogError::Missing(_)));
    }
}
