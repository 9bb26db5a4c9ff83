use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::currency::Currency;

/// Trait abstraction for exchange-rate sources.
///
/// A provider answers one question: how many units of the local currency
/// one unit of `currency` was worth on `date`. Swapping the rate source
/// means adding another implementation; nothing else changes.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RateProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Whether this provider publishes rates for `currency`.
    fn supports(&self, currency: Currency) -> bool;

    /// Rate of `currency` in local currency on `date`.
    async fn get_rate(&self, currency: Currency, date: NaiveDate) -> Result<f64, CoreError>;
}
