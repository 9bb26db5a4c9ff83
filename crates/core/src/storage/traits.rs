use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::income::{Income, IncomeId, NewIncome};

/// Persistence collaborator for income records.
///
/// Pages are 1-based and ordered newest income date first; a page past the
/// end is empty, not an error.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait IncomeStore: Send + Sync {
    /// Insert a record and return its new identifier.
    async fn create(&self, income: &NewIncome) -> Result<IncomeId, CoreError>;

    async fn read(&self, id: IncomeId) -> Result<Option<Income>, CoreError>;

    async fn read_page(&self, page: u32, page_size: u32) -> Result<Vec<Income>, CoreError>;

    /// Overwrite every field of an existing record.
    /// Fails with [`CoreError::IncomeNotFound`] if `id` does not exist.
    async fn update(&self, id: IncomeId, income: &NewIncome) -> Result<(), CoreError>;

    /// Remove a record. Removing a missing id is not an error.
    async fn delete(&self, id: IncomeId) -> Result<(), CoreError>;
}

/// Row offset of a 1-based page. Page 0 reads as page 1.
pub fn page_offset(page: u32, page_size: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(page_size)
}
