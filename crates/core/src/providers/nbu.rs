use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::currency::Currency;
use crate::models::settings::{Settings, NBU_RATE_URL};
use super::traits::RateProvider;

const PROVIDER: &str = "NBU";

/// National Bank of Ukraine official exchange rates.
///
/// - **Free**: no API key.
/// - **Endpoint**: `exchangenew?json&valcode={CODE}&date={YYYYMMDD}`
/// - **Response**: JSON array with one object per currency; `rate` is the
///   price of one unit in UAH. An empty array means no rate was published.
pub struct NbuProvider {
    client: Client,
    base_url: String,
}

impl NbuProvider {
    pub fn new() -> Self {
        Self::with_base_url(NBU_RATE_URL, 30)
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_base_url(&settings.rate_api_url, settings.http_timeout_secs)
    }

    #[cfg_attr(target_arch = "wasm32", allow(unused_variables))]
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Request URL for one (currency, date) lookup.
    pub fn rate_url(&self, currency: Currency, date: NaiveDate) -> String {
        format!(
            "{}?json&valcode={}&date={}",
            self.base_url,
            currency.code(),
            date.format("%Y%m%d")
        )
    }

    /// Extract the rate from a response body.
    pub fn parse_response(body: &str, currency: Currency, date: NaiveDate) -> Result<f64, CoreError> {
        let rates: Vec<NbuRate> = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse rate for {currency} on {date}: {e}"),
        })?;

        rates
            .first()
            .map(|r| r.rate)
            .ok_or_else(|| CoreError::RateNotAvailable {
                currency: currency.to_string(),
                date: date.to_string(),
            })
    }
}

impl Default for NbuProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── NBU API response types ──────────────────────────────────────────

#[derive(Deserialize)]
struct NbuRate {
    rate: f64,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RateProvider for NbuProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supports(&self, currency: Currency) -> bool {
        !currency.is_local()
    }

    async fn get_rate(&self, currency: Currency, date: NaiveDate) -> Result<f64, CoreError> {
        if currency.is_local() {
            return Ok(1.0);
        }

        let response = self
            .client
            .get(self.rate_url(currency, date))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("HTTP {status} for {currency} on {date}"),
            });
        }

        let body = response.text().await?;
        Self::parse_response(&body, currency, date)
    }
}
