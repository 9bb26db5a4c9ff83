use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::cache::{QueryCache, RateKey};
use crate::models::currency::Currency;
use crate::providers::registry::RateProviderRegistry;

/// Fetches exchange rates from the registered providers, reading through
/// the shared [`QueryCache`].
///
/// Cache strategy: one entry per (date, currency), fetched once and kept
/// for the lifetime of the cache. Published rates for a date don't change.
pub struct RateService {
    registry: RateProviderRegistry,
}

impl RateService {
    pub fn new(registry: RateProviderRegistry) -> Self {
        Self { registry }
    }

    /// Check if at least one provider publishes rates for `currency`.
    pub fn has_provider_for(&self, currency: Currency) -> bool {
        !self.registry.get_providers_for(currency).is_empty()
    }

    /// Names of the providers for `currency`, in fallback order.
    pub fn get_provider_names(&self, currency: Currency) -> Vec<String> {
        self.registry
            .get_providers_for(currency)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Rate of `key.currency` in local currency on `key.date`.
    ///
    /// 1. Local currency → `1.0`, no lookup.
    /// 2. Cached → return it.
    /// 3. Otherwise fetch with provider fallback and store the result.
    pub async fn get_rate(&self, cache: &QueryCache, key: RateKey) -> Result<f64, CoreError> {
        if key.currency.is_local() {
            return Ok(1.0);
        }

        if let Some(rate) = cache.rate(&key) {
            debug!(%key, rate, "exchange rate served from cache");
            return Ok(rate);
        }

        let rate = self.fetch_rate(key).await?;
        cache.set_rate(key, rate);
        debug!(%key, rate, "exchange rate cached");
        Ok(rate)
    }

    /// Tries providers in registration order. If one fails (API down, no
    /// rate published, garbage value), falls back to the next.
    async fn fetch_rate(&self, key: RateKey) -> Result<f64, CoreError> {
        let providers = self.registry.get_providers_for(key.currency);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(key.currency.to_string()));
        }

        let mut last_error = None;
        for provider in &providers {
            match provider.get_rate(key.currency, key.date).await {
                Ok(rate) if rate.is_finite() && rate >= 0.0 => return Ok(rate),
                Ok(rate) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!(
                            "Invalid rate returned for {key}: {rate} (must be finite and non-negative)"
                        ),
                    });
                }
                Err(e) => {
                    warn!(provider = provider.name(), %key, error = %e, "rate provider failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(key.currency.to_string())))
    }
}
