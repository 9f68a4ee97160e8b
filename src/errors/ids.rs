//! Identifiers of the errors this crate raises itself.
//!
//! Every identifier listed in [`ALL`] must be present in the loaded catalog;
//! [`Catalog::builtin`](super::Catalog::builtin) refuses to finish otherwise.

pub const FIELD_REQUIRED: &str = "ErrFieldRequired";
pub const FIELD_BELOW_MINIMUM: &str = "ErrFieldBelowMinimum";
pub const FIELD_ABOVE_MAXIMUM: &str = "ErrFieldAboveMaximum";
pub const FIELD_LENGTH_BELOW_MINIMUM: &str = "ErrFieldLengthBelowMinimum";
pub const FIELD_LENGTH_ABOVE_MAXIMUM: &str = "ErrFieldLengthAboveMaximum";
pub const FIELD_MUST_BE_EMAIL: &str = "ErrFieldMustBeEmail";
pub const FIELD_MUST_BE_DIGIT: &str = "ErrFieldMustBeDigit";
pub const FIELD_MUST_BE_ALPHANUM: &str = "ErrFieldMustBeAlphanum";
pub const FIELD_MUST_BE_ALPHABET: &str = "ErrFieldMustBeAlphabet";
pub const FIELD_MUST_BE_DATE: &str = "ErrFieldMustBeDate";
pub const FIELD_MUST_BE_DATETIME: &str = "ErrFieldMustBeDatetime";
pub const FIELD_UNSUPPORTED_TYPE: &str = "ErrFieldUnsupportedType";
pub const FIELD_INVALID_PARAM: &str = "ErrFieldInvalidParam";

pub const UNAUTHORIZED_USER: &str = "ErrUnauthorizedUser";
pub const EXPIRED_TOKEN: &str = "ErrExpiredToken";
pub const ACCOUNT_SUSPENDED: &str = "ErrAccountSuspended";
pub const UNAUTHORIZED_APPLICATION: &str = "ErrUnauthorizedApplication";

pub const ALL: &[&str] = &[
    FIELD_REQUIRED,
    FIELD_BELOW_MINIMUM,
    FIELD_ABOVE_MAXIMUM,
    FIELD_LENGTH_BELOW_MINIMUM,
    FIELD_LENGTH_ABOVE_MAXIMUM,
    FIELD_MUST_BE_EMAIL,
    FIELD_MUST_BE_DIGIT,
    FIELD_MUST_BE_ALPHANUM,
    FIELD_MUST_BE_ALPHABET,
    FIELD_MUST_BE_DATE,
    FIELD_MUST_BE_DATETIME,
    FIELD_UNSUPPORTED_TYPE,
    FIELD_INVALID_PARAM,
    UNAUTHORIZED_USER,
    EXPIRED_TOKEN,
    ACCOUNT_SUSPENDED,
    UNAUTHORIZED_APPLICATION,
];
