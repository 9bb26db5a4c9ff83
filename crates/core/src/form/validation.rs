use chrono::NaiveDate;
use serde::Serialize;

use crate::models::field::{FieldName, FieldRule};

/// Date layout accepted by the `incomeDate` field and used for persistence.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A per-field validation error. `Display` yields the message shown next to
/// the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldError {
    /// Value is empty
    Required,
    /// Value does not parse as a number
    NumberRequired,
    /// Value is a negative number
    OnlyPositive,
    /// Value is not a strict `YYYY-MM-DD` date
    InvalidDate,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        match self {
            FieldError::Required => "*",
            FieldError::NumberRequired => "number required",
            FieldError::OnlyPositive => "only positive",
            FieldError::InvalidDate => "Date is invalid",
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Every failing field of a draft, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(pub Vec<(FieldName, FieldError)>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, name: FieldName) -> Option<FieldError> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, e)| *e)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (name, error)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} ({error})")?;
        }
        Ok(())
    }
}

/// Trim surrounding whitespace and turn the first decimal comma into a period.
pub fn sanitize(raw: &str) -> String {
    raw.trim().replacen(',', ".", 1)
}

/// Parse a numeric field value. Only finite numbers count.
pub fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a strict `YYYY-MM-DD` date: four-digit year, two-digit month and day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Check an already-sanitized value against the field's rule.
pub fn validate(name: FieldName, value: &str) -> Option<FieldError> {
    match name.rule() {
        FieldRule::Date => parse_date(value).is_none().then_some(FieldError::InvalidDate),
        FieldRule::Required => value.is_empty().then_some(FieldError::Required),
        FieldRule::Number | FieldRule::NonNegativeNumber => {
            if value.is_empty() {
                return Some(FieldError::Required);
            }
            let parsed = match parse_number(value) {
                Some(v) => v,
                None => return Some(FieldError::NumberRequired),
            };
            if name.rule() == FieldRule::NonNegativeNumber && parsed < 0.0 {
                return Some(FieldError::OnlyPositive);
            }
            None
        }
    }
}
