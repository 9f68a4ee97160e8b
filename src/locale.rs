//! Supported message locales.
//!
//! Exactly two languages are served. Every catalog message is keyed by one of
//! these tags, and every request carries one of them (English until a
//! middleware or handler switches it).

use std::fmt;
use std::str::FromStr;

/// A supported locale tag.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Locale {
    #[default]
    English,
    Bahasa,
}

impl Locale {
    /// The locale used when a request does not select one, and the fallback
    /// for messages missing a translation.
    pub const DEFAULT: Locale = Locale::English;

    pub const ALL: [Locale; 2] = [Locale::English, Locale::Bahasa];

    /// Returns the wire tag (`"en"` / `"id"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Bahasa  => "id",
        }
    }
}

/// Parses a wire tag. Only the exact lowercase tags are accepted.
impl FromStr for Locale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::English),
            "id" => Ok(Self::Bahasa),
            _    => Err(()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
