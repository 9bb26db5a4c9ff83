use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::errors::CoreError;
use crate::models::cache::lock;
use crate::models::income::{Income, IncomeId, NewIncome};

use super::traits::{page_offset, IncomeStore};

#[derive(Debug, Default)]
struct Table {
    next_id: IncomeId,
    rows: BTreeMap<IncomeId, Income>,
}

/// Volatile [`IncomeStore`], for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.table).rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl IncomeStore for MemoryStore {
    async fn create(&self, income: &NewIncome) -> Result<IncomeId, CoreError> {
        let mut table = lock(&self.table);
        table.next_id += 1;
        let id = table.next_id;
        table.rows.insert(id, income.clone().with_id(id));
        Ok(id)
    }

    async fn read(&self, id: IncomeId) -> Result<Option<Income>, CoreError> {
        Ok(lock(&self.table).rows.get(&id).cloned())
    }

    async fn read_page(&self, page: u32, page_size: u32) -> Result<Vec<Income>, CoreError> {
        let table = lock(&self.table);
        let mut rows: Vec<&Income> = table.rows.values().collect();
        rows.sort_by(|a, b| {
            b.income_date
                .cmp(&a.income_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        let skip = usize::try_from(page_offset(page, page_size)).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(skip)
            .take(page_size as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, id: IncomeId, income: &NewIncome) -> Result<(), CoreError> {
        let mut table = lock(&self.table);
        match table.rows.get_mut(&id) {
            Some(row) => {
                *row = income.clone().with_id(id);
                Ok(())
            }
            None => Err(CoreError::IncomeNotFound(id)),
        }
    }

    async fn delete(&self, id: IncomeId) -> Result<(), CoreError> {
        lock(&self.table).rows.remove(&id);
        Ok(())
    }
}
