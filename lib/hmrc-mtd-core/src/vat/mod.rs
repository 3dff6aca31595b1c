//! VAT (Making Tax Digital) endpoints.
//!
//! Every endpoint lives under `/organisations/vat/{vrn}` and needs a user
//! access token with the `read:vat` (or `write:vat`) scope.
//!
//! | Request                           | Method | Path                       |
//! |-----------------------------------|--------|----------------------------|
//! | [`RetrieveVatObligationsRequest`] | `GET`  | `…/obligations`            |
//! | [`ViewVatReturnRequest`]          | `GET`  | `…/returns/{periodKey}`    |
//! | [`SubmitVatReturnRequest`]        | `POST` | `…/returns`                |
//! | [`RetrieveVatLiabilitiesRequest`] | `GET`  | `…/liabilities`            |
//! | [`RetrieveVatPaymentsRequest`]    | `GET`  | `…/payments`               |

use std::fmt;

use jiff::civil::Date;

use crate::enumeration::InvalidFieldValue;

mod liabilities;
mod obligations;
mod payments;
mod returns;

pub use self::liabilities::{LiabilitiesGovTestScenario, RetrieveVatLiabilitiesRequest};
pub use self::obligations::{
    ObligationStatus, ObligationsGovTestScenario, RetrieveVatObligationsRequest, VatObligation,
    VatObligations,
};
pub use self::payments::{PaymentsGovTestScenario, RetrieveVatPaymentsRequest};
pub use self::returns::{
    SubmitReturnGovTestScenario, SubmitVatReturnBody, SubmitVatReturnRequest,
    ViewReturnGovTestScenario, ViewVatReturnRequest,
};

/// A VAT registration number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vrn(String);

impl Vrn {
    /// Validates a VAT registration number.
    ///
    /// # Errors
    ///
    /// Rejects empty values and anything but ASCII letters and digits.
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidFieldValue> {
        let value = value.into();
        let valid = !value.is_empty() && value.chars().all(|ch| ch.is_ascii_alphanumeric());
        if valid {
            Ok(Self(value))
        } else {
            Err(InvalidFieldValue::rule(
                "vrn",
                value,
                "a non-empty identifier of ASCII letters and digits",
            ))
        }
    }

    /// Returns the number.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Vrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A period key identifying a VAT return period, e.g. `18A1` or `#001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Validates a period key: four letters, digits or `#`.
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidFieldValue> {
        let value = value.into();
        let valid = value.chars().count() == 4
            && value
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '#');
        if valid {
            Ok(Self(value))
        } else {
            Err(InvalidFieldValue::rule(
                "periodKey",
                value,
                "four letters, digits or '#'",
            ))
        }
    }

    /// Returns the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inclusive `from`..`to` range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: Date,
    to: Date,
}

impl DateRange {
    /// Parses two `YYYY-MM-DD` dates.
    ///
    /// # Errors
    ///
    /// Rejects malformed dates and ranges where `to` is before `from`.
    pub fn parse(from: &str, to: &str) -> Result<Self, InvalidFieldValue> {
        let from = parse_date("from", from)?;
        let to = parse_date("to", to)?;
        Self::new(from, to)
    }

    /// Creates a range from two dates.
    pub fn new(from: Date, to: Date) -> Result<Self, InvalidFieldValue> {
        if to < from {
            return Err(InvalidFieldValue::rule(
                "to",
                to.to_string(),
                format!("a date on or after {from}"),
            ));
        }
        Ok(Self { from, to })
    }

    /// Returns the first day of the range.
    pub fn from(&self) -> Date {
        self.from
    }

    /// Returns the last day of the range.
    pub fn to(&self) -> Date {
        self.to
    }
}

/// Parses a strict `YYYY-MM-DD` date.
pub(crate) fn parse_date(field: &'static str, value: &str) -> Result<Date, InvalidFieldValue> {
    let invalid = || InvalidFieldValue::rule(field, value, "a date formatted as YYYY-MM-DD");
    if value.len() != 10 {
        return Err(invalid());
    }
    value.parse::<Date>().map_err(|_| invalid())
}

/// Path of a VAT endpoint.
fn vat_path(suffix: &str) -> String {
    format!("/organisations/vat/{{vrn}}{suffix}")
}
