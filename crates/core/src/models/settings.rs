use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::form::validation::parse_number;

use super::currency::Currency;

/// National Bank of Ukraine exchange-rate endpoint.
pub const NBU_RATE_URL: &str = "https://bank.gov.ua/NBUStatService/v1/statdirectory/exchangenew";

/// User-configurable settings. Every key is optional in a config file;
/// missing keys take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Currency preselected on a new income.
    pub default_currency: Currency,

    /// ESV tax constant (local currency), kept as the string written into the form.
    pub esv_tax: String,

    /// EP tax rate applied to the amount in local currency.
    pub ep_tax_rate: f64,

    /// Number of incomes per list page.
    pub page_size: u32,

    /// Base URL of the exchange-rate service.
    pub rate_api_url: String,

    /// HTTP client timeout for rate lookups.
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: Currency::EUR,
            esv_tax: "1760".to_string(),
            ep_tax_rate: 0.05,
            page_size: 15,
            rate_api_url: NBU_RATE_URL.to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document and validate them.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file on disk.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page_size == 0 {
            return Err(CoreError::Config("page_size must be positive".into()));
        }
        match parse_number(&self.esv_tax) {
            Some(v) if v >= 0.0 => {}
            _ => {
                return Err(CoreError::Config(format!(
                    "esv_tax must be a non-negative number, got '{}'",
                    self.esv_tax
                )))
            }
        }
        if !self.ep_tax_rate.is_finite() || self.ep_tax_rate < 0.0 {
            return Err(CoreError::Config(format!(
                "ep_tax_rate must be finite and non-negative, got {}",
                self.ep_tax_rate
            )));
        }
        Ok(())
    }
}
