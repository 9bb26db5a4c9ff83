use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::cache::{lock, RateKey};
use crate::models::field::FieldName;
use crate::models::income::IncomeId;
use crate::services::income_service::IncomeService;
use crate::services::rate_service::RateService;

use super::store::{ChangeSet, FieldValues};
use super::IncomeForm;

/// Drives an [`IncomeForm`] on a Tokio runtime: every rate lookup the
/// draft requests is fetched on a spawned task and fed back into it.
///
/// Spawned lookups only hold a weak reference to the draft. Once the
/// session is dropped the draft is disposed, and results that arrive
/// afterwards are discarded without touching it.
pub struct FormSession {
    form: Arc<Mutex<IncomeForm>>,
    rates: Arc<RateService>,
    runtime: Handle,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSession")
            .field("form", &self.form)
            .field("outstanding", &self.tasks.len())
            .finish()
    }
}

impl FormSession {
    /// Start driving `form`. Must be called from within a Tokio runtime.
    pub fn new(form: IncomeForm, rates: Arc<RateService>) -> Result<Self, CoreError> {
        let runtime = Handle::try_current()
            .map_err(|e| CoreError::Runtime(format!("Form session needs a Tokio runtime: {e}")))?;
        let mut session = Self {
            form: Arc::new(Mutex::new(form)),
            rates,
            runtime,
            tasks: Vec::new(),
        };
        session.dispatch_rate_lookups();
        Ok(session)
    }

    /// Run `f` against the draft, then start any lookups it requested.
    pub fn with_form<R>(&mut self, f: impl FnOnce(&mut IncomeForm) -> R) -> R {
        let result = {
            let mut form = lock(&self.form);
            f(&mut form)
        };
        self.dispatch_rate_lookups();
        result
    }

    pub fn set_field(&mut self, name: FieldName, raw: &str) -> Result<ChangeSet, CoreError> {
        self.with_form(|form| form.set_field(name, raw))
    }

    /// Copy of the current field values.
    pub fn snapshot(&self) -> FieldValues {
        lock(&self.form).values().clone()
    }

    pub fn is_rate_pending(&self) -> bool {
        lock(&self.form).is_rate_pending()
    }

    /// Number of spawned lookups not yet awaited.
    pub fn outstanding_lookups(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }

    /// Wait until every spawned lookup has resolved into the draft.
    pub async fn settle(&mut self) {
        while !self.tasks.is_empty() {
            for task in std::mem::take(&mut self.tasks) {
                if let Err(e) = task.await {
                    warn!(error = %e, "exchange rate task did not complete");
                }
            }
            self.dispatch_rate_lookups();
        }
    }

    /// Validate and persist the draft through `incomes`.
    ///
    /// The draft lock is never held across the storage call; a second submit
    /// issued meanwhile fails with [`CoreError::SubmitInProgress`].
    pub async fn submit(&mut self, incomes: &IncomeService) -> Result<IncomeId, CoreError> {
        let request = lock(&self.form).begin_submit()?;
        let outcome = incomes.persist(&request).await;
        lock(&self.form).finish_submit(outcome.as_ref().copied().map_err(|e| e.to_string()));
        outcome
    }

    /// Shared handle to the draft, e.g. for a second driver.
    pub fn form(&self) -> Arc<Mutex<IncomeForm>> {
        Arc::clone(&self.form)
    }

    /// Discard the draft. Outstanding lookups are left to finish and ignored.
    pub fn dispose(self) {
        drop(self);
    }

    fn dispatch_rate_lookups(&mut self) {
        self.tasks.retain(|t| !t.is_finished());
        let keys = lock(&self.form).take_rate_requests();
        for key in keys {
            let task = self.spawn_lookup(key);
            self.tasks.push(task);
        }
    }

    fn spawn_lookup(&self, key: RateKey) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.form);
        let rates = Arc::clone(&self.rates);
        let cache = Arc::clone(lock(&self.form).cache());
        self.runtime.spawn(async move {
            let result = rates.get_rate(&cache, key).await;
            let Some(form) = weak.upgrade() else {
                debug!(%key, "form session gone before exchange rate arrived");
                return;
            };
            let mut form = lock(&form);
            match result {
                Ok(rate) => {
                    form.apply_rate(key, rate);
                }
                Err(e) => form.fail_rate(key, &e),
            }
        })
    }
}

impl Drop for FormSession {
    fn drop(&mut self) {
        lock(&self.form).dispose();
    }
}
