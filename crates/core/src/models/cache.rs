use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::currency::Currency;
use super::income::{Income, IncomeId};

/// Key of an exchange-rate lookup: one rate per (date, currency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RateKey {
    pub date: NaiveDate,
    pub currency: Currency,
}

impl RateKey {
    pub fn new(date: NaiveDate, currency: Currency) -> Self {
        Self { date, currency }
    }
}

impl std::fmt::Display for RateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.currency, self.date.format("%Y-%m-%d"))
    }
}

/// Cached income queries, keyed like the list and detail screens query them.
#[derive(Debug, Default)]
struct IncomeQueries {
    /// (page, page_size) → page contents
    pages: HashMap<(u32, u32), Vec<Income>>,
    /// id → record, as loaded for editing
    records: HashMap<IncomeId, Income>,
}

/// Query cache shared by the forms and services of one application instance.
///
/// Holds exchange rates (never invalidated: a published rate for a past date
/// does not change) and income queries, which are dropped by the
/// invalidation hooks after every successful create / update / delete.
///
/// Wrap it in an `Arc` and hand it to everything that reads through it.
#[derive(Debug, Default)]
pub struct QueryCache {
    rates: Mutex<HashMap<RateKey, f64>>,
    incomes: Mutex<IncomeQueries>,
}

/// Lock a cache section, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Exchange rates ──────────────────────────────────────────────

    pub fn rate(&self, key: &RateKey) -> Option<f64> {
        lock(&self.rates).get(key).copied()
    }

    pub fn set_rate(&self, key: RateKey, rate: f64) {
        lock(&self.rates).insert(key, rate);
    }

    pub fn rate_count(&self) -> usize {
        lock(&self.rates).len()
    }

    pub fn clear_rates(&self) {
        lock(&self.rates).clear();
    }

    // ── Income queries ──────────────────────────────────────────────

    pub fn page(&self, page: u32, page_size: u32) -> Option<Vec<Income>> {
        lock(&self.incomes).pages.get(&(page, page_size)).cloned()
    }

    pub fn set_page(&self, page: u32, page_size: u32, incomes: Vec<Income>) {
        lock(&self.incomes).pages.insert((page, page_size), incomes);
    }

    pub fn cached_page_count(&self) -> usize {
        lock(&self.incomes).pages.len()
    }

    pub fn income(&self, id: IncomeId) -> Option<Income> {
        lock(&self.incomes).records.get(&id).cloned()
    }

    pub fn set_income(&self, income: Income) {
        lock(&self.incomes).records.insert(income.id, income);
    }

    // ── Invalidation hooks ──────────────────────────────────────────

    /// Drop every cached income list page.
    pub fn invalidate_incomes(&self) {
        lock(&self.incomes).pages.clear();
    }

    /// Drop the cached copy of a single record.
    pub fn invalidate_income(&self, id: IncomeId) {
        lock(&self.incomes).records.remove(&id);
    }
}
