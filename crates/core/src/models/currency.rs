use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// Currencies an income can be received in.
///
/// `UAH` is the local currency: amounts are converted into it, and its
/// exchange rate is always 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    EUR,
    USD,
    CAD,
    GBP,
    UAH,
}

impl Currency {
    /// The currency taxes are computed in.
    pub const LOCAL: Currency = Currency::UAH;

    /// Every selectable currency, in display order.
    pub const ALL: [Currency; 5] = [
        Currency::EUR,
        Currency::USD,
        Currency::CAD,
        Currency::GBP,
        Currency::UAH,
    ];

    /// ISO 4217 code, e.g. `"EUR"`.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::CAD => "CAD",
            Currency::GBP => "GBP",
            Currency::UAH => "UAH",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::EUR => "€",
            Currency::USD | Currency::CAD => "$",
            Currency::GBP => "£",
            Currency::UAH => "₴",
        }
    }

    /// Label shown in the currency picker, e.g. `"EUR, €"`.
    pub fn label(&self) -> String {
        format!("{}, {}", self.code(), self.symbol())
    }

    pub fn is_local(&self) -> bool {
        *self == Self::LOCAL
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    /// Parses a currency code, case-insensitive and ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| CoreError::UnknownCurrency(s.to_string()))
    }
}
