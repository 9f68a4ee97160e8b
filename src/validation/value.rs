//! The view of a field that rules get to inspect.

use std::fmt;

/// A borrowed field value.
///
/// [`Value::Absent`] stands for an optional field that holds nothing. Any
/// other variant is the field's current content, including zero values such
/// as `""` or `0`.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    Absent,
    Str(&'a str),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// A non-string type that renders itself as text (date wrappers and the
    /// like). `date`/`datetime` parse the rendering; `min`/`max` treat it as
    /// a string.
    Rendered(&'a (dyn fmt::Display + Sync)),
}

impl<'a> Value<'a> {
    pub fn rendered(value: &'a (dyn fmt::Display + Sync)) -> Self {
        Self::Rendered(value)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// True for the absent sentinel and for the zero value of each kind.
    pub fn is_zero(&self) -> bool {
        match *self {
            Self::Absent => true,
            Self::Str(s) => s.is_empty(),
            Self::Int(n) => n == 0,
            Self::Uint(n) => n == 0,
            Self::Float(f) => f == 0.0,
            Self::Bool(b) => !b,
            Self::Rendered(v) => v.to_string().is_empty(),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Uint(n) => f.debug_tuple("Uint").field(n).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Rendered(v) => f.debug_tuple("Rendered").field(&v.to_string()).finish(),
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self { Self::Str(s) }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(s: &'a String) -> Self { Self::Str(s) }
}

impl<'a> From<&'a bool> for Value<'a> {
    fn from(b: &'a bool) -> Self { Self::Bool(*b) }
}

macro_rules! numeric_value {
    ($variant:ident as $wide:ty: $($ty:ty),+) => {
        $(
            impl<'a> From<&'a $ty> for Value<'a> {
                fn from(n: &'a $ty) -> Self { Self::$variant(*n as $wide) }
            }
        )+
    };
}

numeric_value!(Int as i64: i8, i16, i32, i64, isize);
numeric_value!(Uint as u64: u8, u16, u32, u64, usize);
numeric_value!(Float as f64: f32, f64);

macro_rules! optional_value {
    ($($ty:ty),+) => {
        $(
            /// `None` is [`Value::Absent`]; `Some` is the inner value.
            impl<'a> From<&'a Option<$ty>> for Value<'a> {
                fn from(opt: &'a Option<$ty>) -> Self {
                    match opt {
                        Some(v) => Value::from(v),
                        None => Self::Absent,
                    }
                }
            }
        )+
    };
}

optional_value!(String, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
