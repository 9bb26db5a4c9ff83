use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// The nine named fields of an income draft.
///
/// Declaration order is the order fields are listed and validated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    IncomeDate,
    Amount,
    ExchangeRate,
    Currency,
    AmountInUah,
    EsvTax,
    EpTax,
    TaxesSum,
    AmountAfterTaxes,
}

/// How raw input for a field is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Strict `YYYY-MM-DD` calendar date.
    Date,
    /// Required, numeric, not negative.
    NonNegativeNumber,
    /// Required, numeric, any sign.
    Number,
    /// Required only.
    Required,
}

impl FieldName {
    pub const COUNT: usize = 9;

    pub const ALL: [FieldName; Self::COUNT] = [
        FieldName::IncomeDate,
        FieldName::Amount,
        FieldName::ExchangeRate,
        FieldName::Currency,
        FieldName::AmountInUah,
        FieldName::EsvTax,
        FieldName::EpTax,
        FieldName::TaxesSum,
        FieldName::AmountAfterTaxes,
    ];

    /// Field name as persisted and as shown to form bindings (camelCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::IncomeDate => "incomeDate",
            FieldName::Amount => "amount",
            FieldName::ExchangeRate => "exchangeRate",
            FieldName::Currency => "currency",
            FieldName::AmountInUah => "amountInUah",
            FieldName::EsvTax => "esvTax",
            FieldName::EpTax => "epTax",
            FieldName::TaxesSum => "taxesSum",
            FieldName::AmountAfterTaxes => "amountAfterTaxes",
        }
    }

    /// Dense index, usable for array-backed storage.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn rule(&self) -> FieldRule {
        match self {
            FieldName::IncomeDate => FieldRule::Date,
            FieldName::Amount
            | FieldName::ExchangeRate
            | FieldName::EsvTax
            | FieldName::EpTax
            | FieldName::TaxesSum => FieldRule::NonNegativeNumber,
            FieldName::AmountAfterTaxes => FieldRule::Number,
            FieldName::Currency | FieldName::AmountInUah => FieldRule::Required,
        }
    }

    /// Whether raw input is trimmed and comma-normalized before validation.
    pub fn is_sanitized(&self) -> bool {
        *self != FieldName::IncomeDate
    }

    /// Fields only ever written by the recomputation graph.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            FieldName::AmountInUah
                | FieldName::EpTax
                | FieldName::TaxesSum
                | FieldName::AmountAfterTaxes
        )
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = CoreError;

    /// Accepts the camelCase name; `"date"` is accepted as an alias of `incomeDate`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "date" {
            return Ok(FieldName::IncomeDate);
        }
        FieldName::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}
