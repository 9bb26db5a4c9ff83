use crate::models::currency::Currency;
use crate::models::settings::Settings;

use super::nbu::NbuProvider;
use super::traits::RateProvider;

/// Registry of exchange-rate providers, in fallback order.
pub struct RateProviderRegistry {
    providers: Vec<Box<dyn RateProvider>>,
}

impl RateProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with the default provider (NBU) configured from `settings`.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(NbuProvider::from_settings(settings)));
        registry
    }

    /// Register a provider after the existing ones.
    pub fn register(&mut self, provider: Box<dyn RateProvider>) {
        self.providers.push(provider);
    }

    /// All providers that publish `currency`, ordered by registration priority.
    pub fn get_providers_for(&self, currency: Currency) -> Vec<&dyn RateProvider> {
        self.providers
            .iter()
            .filter(|p| p.supports(currency))
            .map(|p| p.as_ref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for RateProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
