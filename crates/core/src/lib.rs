pub mod errors;
pub mod form;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use errors::CoreError;
#[cfg(not(target_arch = "wasm32"))]
use form::session::FormSession;
use form::IncomeForm;
use models::{
    cache::QueryCache,
    income::{Income, IncomeId},
    listing::MonthSection,
    settings::Settings,
};
use providers::registry::RateProviderRegistry;
use services::{
    income_service::IncomeService, listing_service::ListingService, rate_service::RateService,
};
use storage::traits::IncomeStore;

/// Main entry point for the Income Monitor core library.
/// Holds the settings, the shared query cache and all services the income
/// drafts and the income list run on.
#[must_use]
pub struct IncomeMonitor {
    settings: Settings,
    cache: Arc<QueryCache>,
    income_service: IncomeService,
    rate_service: Arc<RateService>,
    listing_service: ListingService,
}

impl std::fmt::Debug for IncomeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomeMonitor")
            .field("settings", &self.settings)
            .field("cached_rates", &self.cache.rate_count())
            .field("cached_pages", &self.cache.cached_page_count())
            .finish()
    }
}

impl IncomeMonitor {
    /// Build on `store`, fetching rates from the default provider (NBU).
    pub fn new(settings: Settings, store: Arc<dyn IncomeStore>) -> Result<Self, CoreError> {
        let registry = RateProviderRegistry::new_with_defaults(&settings);
        Self::with_rate_service(settings, store, RateService::new(registry))
    }

    /// Build with a custom rate service (other providers, or mocks in tests).
    pub fn with_rate_service(
        settings: Settings,
        store: Arc<dyn IncomeStore>,
        rate_service: RateService,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let cache = Arc::new(QueryCache::new());
        Ok(Self {
            income_service: IncomeService::new(store, Arc::clone(&cache)),
            rate_service: Arc::new(rate_service),
            listing_service: ListingService::new(),
            settings,
            cache,
        })
    }

    /// Open (or create) the SQLite database at `path` (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_sqlite(
        settings: Settings,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, CoreError> {
        let store = storage::sqlite::SqliteStore::open(path)?;
        Self::new(settings, Arc::new(store))
    }

    // ── Drafts ──────────────────────────────────────────────────────

    /// New income draft dated today.
    pub fn new_form(&self) -> IncomeForm {
        IncomeForm::new(&self.settings, Arc::clone(&self.cache))
    }

    /// Edit draft seeded from a persisted record.
    pub async fn edit_form(&self, id: IncomeId) -> Result<IncomeForm, CoreError> {
        let income = self
            .income_service
            .get_income(id)
            .await?
            .ok_or(CoreError::IncomeNotFound(id))?;
        Ok(IncomeForm::edit(&income, &self.settings, Arc::clone(&self.cache)))
    }

    /// Drive `form` on the current Tokio runtime: rate lookups run on
    /// spawned tasks and land in the draft as they arrive.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_session(&self, form: IncomeForm) -> Result<FormSession, CoreError> {
        FormSession::new(form, Arc::clone(&self.rate_service))
    }

    /// Resolve every rate lookup `form` has requested, one after another,
    /// until it requests no more. Failures are recorded on the draft.
    pub async fn resolve_rates(&self, form: &mut IncomeForm) {
        loop {
            let keys = form.take_rate_requests();
            if keys.is_empty() {
                break;
            }
            for key in keys {
                match self.rate_service.get_rate(&self.cache, key).await {
                    Ok(rate) => {
                        form.apply_rate(key, rate);
                    }
                    Err(e) => form.fail_rate(key, &e),
                }
            }
        }
    }

    /// Validate and persist `form`; on success the draft is disposed.
    pub async fn submit(&self, form: &mut IncomeForm) -> Result<IncomeId, CoreError> {
        self.income_service.submit(form).await
    }

    /// Submit through a running session.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn submit_session(&self, session: &mut FormSession) -> Result<IncomeId, CoreError> {
        session.submit(&self.income_service).await
    }

    // ── Incomes ─────────────────────────────────────────────────────

    pub async fn get_income(&self, id: IncomeId) -> Result<Option<Income>, CoreError> {
        self.income_service.get_income(id).await
    }

    pub async fn delete_income(&self, id: IncomeId) -> Result<(), CoreError> {
        self.income_service.delete(id).await
    }

    /// One page (1-based) of the income list, newest first.
    pub async fn incomes_page(&self, page: u32) -> Result<Vec<Income>, CoreError> {
        self.income_service
            .get_page(page, self.settings.page_size)
            .await
    }

    /// The first `pages` pages of the list, grouped into month sections.
    /// Stops early at the first empty page.
    pub async fn income_sections(&self, pages: u32) -> Result<Vec<MonthSection>, CoreError> {
        let mut feed = Vec::new();
        let mut page = Some(1);
        while let Some(current) = page.filter(|p| *p <= pages) {
            let incomes = self.incomes_page(current).await?;
            page = self.listing_service.next_page(current, incomes.len());
            feed.extend(incomes);
        }
        Ok(self.listing_service.group_by_month(&feed))
    }

    // ── Settings & Cache ────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn rate_service(&self) -> &Arc<RateService> {
        &self.rate_service
    }
}
