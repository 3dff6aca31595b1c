//! Closed sets of legal values for request fields.
//!
//! Every HMRC field that only accepts a fixed list of codes (obligation status,
//! sandbox test scenarios, HTTP methods, ...) is declared with the
//! [`validated_enum!`](crate::validated_enum) macro, which implements
//! [`ValidatedEnum`] for it. Requests parse caller-supplied strings through
//! [`ValidatedEnum::parse`], so an illegal value is rejected at assignment time
//! and never reaches the wire.

use std::fmt::{self, Debug};

/// A value rejected by a field's validation rule.
///
/// Raised by request constructors and setters, never by `fire`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error)]
pub struct InvalidFieldValue {
    field: &'static str,
    supplied: String,
    allowed: Vec<String>,
}

impl InvalidFieldValue {
    /// Creates an error for a value outside of an enumeration.
    pub fn new<I, S>(field: &'static str, supplied: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field,
            supplied: supplied.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an error for a value breaking a free-form rule (date format, non-empty, ...).
    pub fn rule(field: &'static str, supplied: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::new(field, supplied, [rule.into()])
    }

    /// Name of the rejected field.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The value that was supplied.
    pub fn supplied(&self) -> &str {
        &self.supplied
    }

    /// Legal values (or the description of the rule) for the field.
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl fmt::Display for InvalidFieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid value '{}' for field '{}', expected ",
            self.supplied, self.field
        )?;
        match self.allowed.as_slice() {
            [single] => f.write_str(single),
            values => write!(f, "one of {values:?}"),
        }
    }
}

/// A closed enumeration of string codes accepted by an API field.
///
/// Implemented by the [`validated_enum!`](crate::validated_enum) macro.
pub trait ValidatedEnum: Debug + Copy + Sized + 'static {
    /// Name of the field the enumeration governs, used in errors.
    const FIELD: &'static str;

    /// Every member of the enumeration, in declaration order.
    const VALUES: &'static [Self];

    /// The wire code of this member.
    fn code(&self) -> &'static str;

    /// Legal wire codes.
    fn values() -> Vec<&'static str> {
        Self::VALUES.iter().map(Self::code).collect()
    }

    /// Checks whether `value` is a legal code.
    fn is_valid(value: &str) -> bool {
        Self::VALUES.iter().any(|member| member.code() == value)
    }

    /// Parses a wire code into a member of the enumeration.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFieldValue`] listing the legal codes when `value` is not one of them.
    fn parse(value: &str) -> Result<Self, InvalidFieldValue> {
        Self::VALUES
            .iter()
            .copied()
            .find(|member| member.code() == value)
            .ok_or_else(|| InvalidFieldValue::new(Self::FIELD, value, Self::values()))
    }
}

/// Parses `value` and stores it in `slot`.
///
/// The slot is left untouched when the value is rejected.
pub(crate) fn assign<E: ValidatedEnum>(
    slot: &mut Option<E>,
    value: &str,
) -> Result<(), InvalidFieldValue> {
    let parsed = E::parse(value)?;
    *slot = Some(parsed);
    Ok(())
}
