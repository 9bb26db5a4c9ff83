use crate::models::cache::RateKey;

/// Exchange-rate lookup state of a draft, for its current (date, currency).
#[derive(Debug, Clone, PartialEq)]
pub enum RateLookup {
    /// Nothing outstanding: the rate is resolved, or there is no valid key
    Idle,
    /// A lookup for this key has been requested and not yet resolved;
    /// the exchange-rate field is read-only meanwhile
    Pending(RateKey),
    /// The lookup for this key failed
    Failed { key: RateKey, message: String },
}

impl RateLookup {
    pub fn is_pending(&self) -> bool {
        matches!(self, RateLookup::Pending(_))
    }

    pub fn pending_key(&self) -> Option<&RateKey> {
        match self {
            RateLookup::Pending(key) => Some(key),
            _ => None,
        }
    }

    pub fn is_pending_for(&self, key: &RateKey) -> bool {
        self.pending_key() == Some(key)
    }
}

/// Format a resolved rate for the `exchangeRate` field: shortest form that
/// round-trips, `1.0` → `"1"`.
pub fn format_rate(rate: f64) -> String {
    rate.to_string()
}
