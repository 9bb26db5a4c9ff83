use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::currency::Currency;

/// Storage-assigned identifier of a persisted income.
pub type IncomeId = i64;

/// A persisted income record.
///
/// Field names serialize in camelCase to match the `incomes` table columns.
/// All amounts are in `currency` except the `*_in_uah`, tax and after-tax
/// fields, which are in the local currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: IncomeId,
    pub income_date: NaiveDate,
    pub amount: f64,
    pub exchange_rate: f64,
    pub currency: Currency,
    pub amount_in_uah: f64,
    pub esv_tax: f64,
    pub ep_tax: f64,
    pub taxes_sum: f64,
    pub amount_after_taxes: f64,
}

/// An income record without its identifier, as sent to `create` / `update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncome {
    pub income_date: NaiveDate,
    pub amount: f64,
    pub exchange_rate: f64,
    pub currency: Currency,
    pub amount_in_uah: f64,
    pub esv_tax: f64,
    pub ep_tax: f64,
    pub taxes_sum: f64,
    pub amount_after_taxes: f64,
}

impl NewIncome {
    /// Attach a storage identifier.
    pub fn with_id(self, id: IncomeId) -> Income {
        Income {
            id,
            income_date: self.income_date,
            amount: self.amount,
            exchange_rate: self.exchange_rate,
            currency: self.currency,
            amount_in_uah: self.amount_in_uah,
            esv_tax: self.esv_tax,
            ep_tax: self.ep_tax,
            taxes_sum: self.taxes_sum,
            amount_after_taxes: self.amount_after_taxes,
        }
    }
}

impl From<&Income> for NewIncome {
    fn from(income: &Income) -> Self {
        Self {
            income_date: income.income_date,
            amount: income.amount,
            exchange_rate: income.exchange_rate,
            currency: income.currency,
            amount_in_uah: income.amount_in_uah,
            esv_tax: income.esv_tax,
            ep_tax: income.ep_tax,
            taxes_sum: income.taxes_sum,
            amount_after_taxes: income.amount_after_taxes,
        }
    }
}
