//! A single catalog-backed error.

use std::collections::BTreeMap;
use std::fmt;

use http::StatusCode;

use crate::locale::Locale;

/// An error carrying a catalog identifier, an HTTP status, a numeric code and
/// one message per locale.
///
/// Immutable once built. Obtain one from the catalog
/// ([`Catalog::error`](super::Catalog::error), [`Template`](super::Template))
/// rather than assembling it by hand.
#[derive(Clone, Debug, PartialEq)]
pub struct CodedError {
    pub(crate) id: String,
    pub(crate) code: u32,
    pub(crate) status: StatusCode,
    pub(crate) messages: BTreeMap<Locale, String>,
}

impl CodedError {
    pub fn id(&self) -> &str { &self.id }
    pub fn code(&self) -> u32 { self.code }
    pub fn status(&self) -> StatusCode { self.status }

    /// Message for `locale`.
    ///
    /// Falls back to the default locale's message, then to the raw
    /// identifier.
    pub fn localized(&self, locale: Locale) -> &str {
        self.messages
            .get(&locale)
            .or_else(|| self.messages.get(&Locale::DEFAULT))
            .map(String::as_str)
            .unwrap_or(&self.id)
    }
}

impl fmt::Display for CodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.localized(Locale::DEFAULT))
    }
}

impl std::error::Error for CodedError {}

/// Fills `{}` placeholders left to right with `args`.
///
/// Placeholders without a matching argument are kept verbatim so a missing
/// argument shows up in the rendered text instead of vanishing.
pub(crate) fn fill(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(at) = rest.find("{}") {
        out.push_str(&rest[..at]);
        match args.next() {
            Some(arg) => out.push_str(&arg.to_string()),
            None => out.push_str("{}"),
        }
        rest = &rest[at + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coded(messages: &[(Locale, &str)]) -> CodedError {
        CodedError {
            id: "ErrSample".to_owned(),
            code: 40099,
            status: StatusCode::BAD_REQUEST,
            messages: messages.iter().map(|(l, m)| (*l, (*m).to_owned())).collect(),
        }
    }

    #[test]
    fn localized_prefers_requested_locale() {
        let err = coded(&[(Locale::English, "too short"), (Locale::Bahasa, "terlalu pendek")]);
        assert_eq!(err.localized(Locale::Bahasa), "terlalu pendek");
        assert_eq!(err.localized(Locale::English), "too short");
    }

    #[test]
    fn localized_falls_back_to_default_then_identifier() {
        let err = coded(&[(Locale::English, "too short")]);
        assert_eq!(err.localized(Locale::Bahasa), "too short");

        let bare = coded(&[]);
        assert_eq!(bare.localized(Locale::Bahasa), "ErrSample");
        assert_eq!(bare.to_string(), "ErrSample");
    }

    #[test]
    fn fill_substitutes_in_order() {
        assert_eq!(fill("between {} and {}", &[&1, &"ten"]), "between 1 and ten");
        assert_eq!(fill("no placeholders", &[&1]), "no placeholders");
        assert_eq!(fill("at least {} of {}", &[&3]), "at least 3 of {}");
    }
}
