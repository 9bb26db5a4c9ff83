use std::sync::Arc;
use tracing::{debug, error, info};

use crate::errors::CoreError;
use crate::form::{IncomeForm, SubmitRequest, SubmitTarget};
use crate::models::cache::QueryCache;
use crate::models::income::{Income, IncomeId, NewIncome};
use crate::storage::traits::IncomeStore;

/// Income CRUD on top of an [`IncomeStore`], reading through the shared
/// [`QueryCache`] and invalidating it after every successful write.
pub struct IncomeService {
    store: Arc<dyn IncomeStore>,
    cache: Arc<QueryCache>,
}

impl IncomeService {
    pub fn new(store: Arc<dyn IncomeStore>, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Load one record, as the edit screen does.
    pub async fn get_income(&self, id: IncomeId) -> Result<Option<Income>, CoreError> {
        if let Some(income) = self.cache.income(id) {
            debug!(id, "income served from cache");
            return Ok(Some(income));
        }
        let income = self.store.read(id).await?;
        if let Some(income) = &income {
            self.cache.set_income(income.clone());
        }
        Ok(income)
    }

    /// Load one page of the list, newest first.
    pub async fn get_page(&self, page: u32, page_size: u32) -> Result<Vec<Income>, CoreError> {
        if let Some(incomes) = self.cache.page(page, page_size) {
            debug!(page, page_size, "income page served from cache");
            return Ok(incomes);
        }
        let incomes = self.store.read_page(page, page_size).await?;
        self.cache.set_page(page, page_size, incomes.clone());
        Ok(incomes)
    }

    // ── Mutations ───────────────────────────────────────────────────

    pub async fn create(&self, income: &NewIncome) -> Result<IncomeId, CoreError> {
        let id = self.store.create(income).await?;
        self.cache.invalidate_incomes();
        info!(id, date = %income.income_date, currency = %income.currency, "income created");
        Ok(id)
    }

    pub async fn update(&self, id: IncomeId, income: &NewIncome) -> Result<(), CoreError> {
        self.store.update(id, income).await?;
        self.cache.invalidate_incomes();
        self.cache.invalidate_income(id);
        info!(id, date = %income.income_date, currency = %income.currency, "income updated");
        Ok(())
    }

    pub async fn delete(&self, id: IncomeId) -> Result<(), CoreError> {
        self.store.delete(id).await?;
        self.cache.invalidate_incomes();
        self.cache.invalidate_income(id);
        info!(id, "income deleted");
        Ok(())
    }

    /// Send a validated draft to its target and return the record's id.
    pub async fn persist(&self, request: &SubmitRequest) -> Result<IncomeId, CoreError> {
        match request.target {
            SubmitTarget::Create => self.create(&request.income).await,
            SubmitTarget::Update(id) => {
                self.update(id, &request.income).await?;
                Ok(id)
            }
        }
    }

    /// Validate, persist and record the outcome on `form`.
    ///
    /// An invalid draft fails with [`CoreError::InvalidForm`] before storage
    /// is touched. A storage failure leaves the draft intact with an
    /// `Error` status.
    pub async fn submit(&self, form: &mut IncomeForm) -> Result<IncomeId, CoreError> {
        let request = form.begin_submit()?;
        let outcome = self.persist(&request).await;
        if let Err(e) = &outcome {
            error!(target_kind = ?request.target, error = %e, "income submit failed");
        }
        form.finish_submit(outcome.as_ref().copied().map_err(|e| e.to_string()));
        outcome
    }
}
