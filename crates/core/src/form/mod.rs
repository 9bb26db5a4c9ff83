//! The income draft and its derived-field engine.
//!
//! An [`IncomeForm`] owns a [`FieldStore`](store::FieldStore), the
//! recomputation [`DependencyGraph`](graph::DependencyGraph), the ESV
//! toggle state and the exchange-rate lookup state. Every mutation runs
//! synchronously: store the value, re-derive the rate key if date or
//! currency changed, propagate through the graph, then notify subscribers
//! once with the converged change set.

pub mod esv;
pub mod graph;
pub mod rate;
#[cfg(not(target_arch = "wasm32"))]
pub mod session;
pub mod store;
pub mod validation;

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::cache::{QueryCache, RateKey};
use crate::models::currency::Currency;
use crate::models::field::FieldName;
use crate::models::income::{Income, IncomeId, NewIncome};
use crate::models::money::format_currency;
use crate::models::settings::Settings;

use esv::{EsvAction, EsvState, EsvWrite};
use graph::DependencyGraph;
use rate::{format_rate, RateLookup};
use store::{ChangeSet, FieldStore, FieldValues, Listener, SubscriptionId};
use validation::{parse_date, parse_number, FieldError, FieldErrors, DATE_FORMAT};

/// Whether the draft creates a new record or edits a persisted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    New,
    Edit(IncomeId),
}

/// Where a validated draft is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update(IncomeId),
}

/// A validated draft ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub target: SubmitTarget,
    pub income: NewIncome,
}

/// Outcome of the last submit, as shown on the save button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    Pending,
    Success,
    Error(String),
}

impl SubmitStatus {
    /// Save button caption for this status.
    pub fn caption(&self) -> &'static str {
        match self {
            SubmitStatus::Idle => "Save",
            SubmitStatus::Pending => "Saving...",
            SubmitStatus::Success => "Saved",
            SubmitStatus::Error(_) => "Error",
        }
    }
}

/// In-memory draft of an income record.
pub struct IncomeForm {
    store: FieldStore,
    graph: DependencyGraph,
    esv: EsvState,
    esv_constant: String,
    mode: FormMode,
    lookup: RateLookup,
    rate_requests: Vec<RateKey>,
    cache: Arc<QueryCache>,
    status: SubmitStatus,
    disposed: bool,
}

impl std::fmt::Debug for IncomeForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomeForm")
            .field("mode", &self.mode)
            .field("values", self.store.values())
            .field("esv", &self.esv)
            .field("lookup", &self.lookup)
            .field("status", &self.status)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl IncomeForm {
    /// New draft dated today, in the configured default currency.
    pub fn new(settings: &Settings, cache: Arc<QueryCache>) -> Self {
        Self::new_on(settings, cache, chrono::Local::now().date_naive())
    }

    /// New draft dated `date`.
    ///
    /// The rate lookup for (date, default currency) is requested right away
    /// unless it resolves synchronously (local currency or cached).
    pub fn new_on(settings: &Settings, cache: Arc<QueryCache>, date: NaiveDate) -> Self {
        let mut store = FieldStore::new();
        store.seed(FieldName::IncomeDate, date.format(DATE_FORMAT).to_string());
        store.seed(FieldName::Currency, settings.default_currency.code());
        store.seed(FieldName::EsvTax, settings.esv_tax.clone());

        let mut form = Self::build(store, settings, cache, FormMode::New, EsvState::initial(None));
        let mut changed = ChangeSet::new();
        form.rederive_rate_key(&mut changed);
        form.graph.propagate(&mut form.store, &mut changed);
        form
    }

    /// Draft re-hydrated from a persisted record, field by field as strings.
    ///
    /// Derived fields keep their persisted values and no rate lookup is
    /// issued until the date or currency is edited, so submitting without
    /// edits writes back exactly what was loaded.
    pub fn edit(income: &Income, settings: &Settings, cache: Arc<QueryCache>) -> Self {
        let mut store = FieldStore::new();
        store.seed(FieldName::IncomeDate, income.income_date.format(DATE_FORMAT).to_string());
        store.seed(FieldName::Amount, income.amount.to_string());
        store.seed(FieldName::ExchangeRate, income.exchange_rate.to_string());
        store.seed(FieldName::Currency, income.currency.code());
        store.seed(FieldName::AmountInUah, income.amount_in_uah.to_string());
        store.seed(FieldName::EsvTax, income.esv_tax.to_string());
        store.seed(FieldName::EpTax, income.ep_tax.to_string());
        store.seed(FieldName::TaxesSum, income.taxes_sum.to_string());
        store.seed(FieldName::AmountAfterTaxes, income.amount_after_taxes.to_string());

        Self::build(
            store,
            settings,
            cache,
            FormMode::Edit(income.id),
            EsvState::initial(Some(income.esv_tax)),
        )
    }

    fn build(
        store: FieldStore,
        settings: &Settings,
        cache: Arc<QueryCache>,
        mode: FormMode,
        esv: EsvState,
    ) -> Self {
        Self {
            store,
            graph: DependencyGraph::income_form(settings.ep_tax_rate),
            esv,
            esv_constant: settings.esv_tax.clone(),
            mode,
            lookup: RateLookup::Idle,
            rate_requests: Vec::new(),
            cache,
            status: SubmitStatus::Idle,
            disposed: false,
        }
    }

    // ── Field access ────────────────────────────────────────────────

    pub fn value(&self, name: FieldName) -> &str {
        self.store.value(name)
    }

    pub fn error(&self, name: FieldName) -> Option<FieldError> {
        self.store.error(name)
    }

    pub fn values(&self) -> &FieldValues {
        self.store.values()
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Whether a user edit of `name` is accepted right now.
    pub fn is_editable(&self, name: FieldName) -> bool {
        match name {
            FieldName::EsvTax => self.esv.is_editable(),
            FieldName::ExchangeRate => !self.lookup.is_pending() && !self.is_local_currency(),
            other => !other.is_derived(),
        }
    }

    /// Local currency pins `exchangeRate` to 1.
    fn is_local_currency(&self) -> bool {
        self.value(FieldName::Currency)
            .parse::<Currency>()
            .is_ok_and(|c| c.is_local())
    }

    /// Apply a user edit and run the recomputation cascade.
    /// Returns every field whose value changed.
    pub fn set_field(&mut self, name: FieldName, raw: &str) -> Result<ChangeSet, CoreError> {
        self.ensure_live()?;
        if !self.is_editable(name) {
            return Err(CoreError::ReadOnlyField(name));
        }
        if name == FieldName::Currency && !raw.trim().is_empty() {
            let currency: Currency = raw.parse()?;
            return Ok(self.write(name, currency.code()));
        }
        Ok(self.write(name, raw))
    }

    /// [`IncomeForm::set_field`] addressed by the field's camelCase name.
    pub fn set_field_by_name(&mut self, name: &str, raw: &str) -> Result<ChangeSet, CoreError> {
        self.set_field(name.parse()?, raw)
    }

    /// Store a value, re-derive the rate key, propagate and notify.
    fn write(&mut self, name: FieldName, value: &str) -> ChangeSet {
        let mut changed = ChangeSet::new();
        if self.store.set_field(name, value) {
            changed.insert(name);
        }
        if changed.contains(&FieldName::IncomeDate) || changed.contains(&FieldName::Currency) {
            self.rederive_rate_key(&mut changed);
        }
        self.graph.propagate(&mut self.store, &mut changed);
        self.store.notify(&changed);
        changed
    }

    // ── Subscriptions ───────────────────────────────────────────────

    /// Listen for value changes of any field in `fields`. The listener sees
    /// the converged values after each update.
    pub fn subscribe(
        &mut self,
        fields: impl IntoIterator<Item = FieldName>,
        listener: Listener,
    ) -> Result<SubscriptionId, CoreError> {
        self.ensure_live()?;
        Ok(self.store.subscribe(fields, listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn subscription_count(&self) -> usize {
        self.store.subscription_count()
    }

    // ── ESV toggle / override ───────────────────────────────────────

    pub fn esv_state(&self) -> EsvState {
        self.esv
    }

    /// Apply an ESV action. Actions not permitted in the current state are
    /// ignored; the resulting state is returned either way.
    pub fn esv_action(&mut self, action: EsvAction) -> Result<EsvState, CoreError> {
        self.ensure_live()?;
        let Some(transition) = self.esv.next(action) else {
            debug!(state = ?self.esv, ?action, "ESV action ignored");
            return Ok(self.esv);
        };
        self.esv = transition.state;
        match transition.write {
            Some(EsvWrite::Constant) => {
                let constant = self.esv_constant.clone();
                self.write(FieldName::EsvTax, &constant);
            }
            Some(EsvWrite::Zero) => {
                self.write(FieldName::EsvTax, "0");
            }
            None => {}
        }
        Ok(self.esv)
    }

    /// Tap on the ESV field.
    pub fn toggle_esv(&mut self) -> Result<EsvState, CoreError> {
        self.esv_action(EsvAction::Toggle)
    }

    /// Tap on the ESV edit icon: unlocks when locked, re-locks when unlocked.
    pub fn press_esv_edit(&mut self) -> Result<EsvState, CoreError> {
        match self.esv.edit_icon_action() {
            Some(action) => self.esv_action(action),
            None => {
                self.ensure_live()?;
                Ok(self.esv)
            }
        }
    }

    // ── Exchange rate ───────────────────────────────────────────────

    /// Lookup key for the current date and currency, if both are valid.
    pub fn rate_key(&self) -> Option<RateKey> {
        let date = parse_date(self.value(FieldName::IncomeDate))?;
        let currency = self.value(FieldName::Currency).parse::<Currency>().ok()?;
        Some(RateKey::new(date, currency))
    }

    pub fn rate_lookup(&self) -> &RateLookup {
        &self.lookup
    }

    pub fn is_rate_pending(&self) -> bool {
        self.lookup.is_pending()
    }

    /// Lookups requested since the last call, for the caller to fetch.
    pub fn take_rate_requests(&mut self) -> Vec<RateKey> {
        std::mem::take(&mut self.rate_requests)
    }

    /// Resolve the current key again after a failed lookup.
    pub fn retry_rate_lookup(&mut self) -> Result<(), CoreError> {
        self.ensure_live()?;
        let mut changed = ChangeSet::new();
        self.lookup = RateLookup::Idle;
        self.rederive_rate_key(&mut changed);
        self.graph.propagate(&mut self.store, &mut changed);
        self.store.notify(&changed);
        Ok(())
    }

    /// Feed a resolved rate into the draft, replacing whatever
    /// `exchangeRate` held. A result for a key that is no longer current is
    /// still applied, unless the draft has since switched to the local
    /// currency; then it is only cached. Returns `false` when the draft was
    /// already disposed.
    pub fn apply_rate(&mut self, key: RateKey, rate: f64) -> bool {
        if self.disposed {
            debug!(%key, "exchange rate arrived after the form was disposed");
            return false;
        }
        self.cache.set_rate(key, rate);
        if self.lookup.is_pending_for(&key) {
            self.lookup = RateLookup::Idle;
        } else if self.is_local_currency() {
            debug!(%key, "exchange rate for a superseded lookup cached; local currency keeps rate 1");
            return true;
        } else {
            debug!(%key, "applying exchange rate for a superseded lookup");
        }
        self.write(FieldName::ExchangeRate, &format_rate(rate));
        true
    }

    /// Record a failed lookup. The draft's values are left untouched.
    pub fn fail_rate(&mut self, key: RateKey, error: &CoreError) {
        if self.disposed {
            return;
        }
        warn!(%key, %error, "exchange rate lookup failed");
        if self.lookup.is_pending_for(&key) {
            self.lookup = RateLookup::Failed {
                key,
                message: error.to_string(),
            };
        }
    }

    /// Re-derive the lookup key after a date or currency change.
    ///
    /// Local currency forces a rate of 1 and a cached rate applies
    /// immediately; otherwise a lookup is requested once per key.
    fn rederive_rate_key(&mut self, changed: &mut ChangeSet) {
        let Some(key) = self.rate_key() else {
            self.lookup = RateLookup::Idle;
            return;
        };

        let resolved = if key.currency.is_local() {
            Some(1.0)
        } else {
            self.cache.rate(&key)
        };

        match resolved {
            Some(rate) => {
                self.lookup = RateLookup::Idle;
                if self.store.set_field(FieldName::ExchangeRate, &format_rate(rate)) {
                    changed.insert(FieldName::ExchangeRate);
                }
            }
            None if self.lookup.is_pending_for(&key) => {}
            None => {
                self.lookup = RateLookup::Pending(key);
                self.rate_requests.push(key);
            }
        }
    }

    // ── Validation & submit ─────────────────────────────────────────

    /// Validate every field and build the record to persist.
    pub fn validate(&mut self) -> Result<NewIncome, FieldErrors> {
        let errors = self.store.validate_all();
        if !errors.is_empty() {
            return Err(errors);
        }
        self.to_new_income()
    }

    fn to_new_income(&self) -> Result<NewIncome, FieldErrors> {
        let mut errors = Vec::new();
        let mut number = |name: FieldName| {
            parse_number(self.value(name)).unwrap_or_else(|| {
                errors.push((name, FieldError::NumberRequired));
                0.0
            })
        };

        let amount = number(FieldName::Amount);
        let exchange_rate = number(FieldName::ExchangeRate);
        let amount_in_uah = number(FieldName::AmountInUah);
        let esv_tax = number(FieldName::EsvTax);
        let ep_tax = number(FieldName::EpTax);
        let taxes_sum = number(FieldName::TaxesSum);
        let amount_after_taxes = number(FieldName::AmountAfterTaxes);

        let income_date = parse_date(self.value(FieldName::IncomeDate));
        if income_date.is_none() {
            errors.push((FieldName::IncomeDate, FieldError::InvalidDate));
        }
        let currency = self.value(FieldName::Currency).parse::<Currency>().ok();
        if currency.is_none() {
            errors.push((FieldName::Currency, FieldError::Required));
        }

        match (income_date, currency) {
            (Some(income_date), Some(currency)) if errors.is_empty() => Ok(NewIncome {
                income_date,
                amount,
                exchange_rate,
                currency,
                amount_in_uah,
                esv_tax,
                ep_tax,
                taxes_sum,
                amount_after_taxes,
            }),
            _ => {
                errors.sort_by_key(|(name, _)| *name);
                Err(FieldErrors(errors))
            }
        }
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    /// Validate and mark the submit as outstanding.
    ///
    /// Fails while another submit is outstanding, so one draft never has
    /// two concurrent submits.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, CoreError> {
        self.ensure_live()?;
        if self.status == SubmitStatus::Pending {
            return Err(CoreError::SubmitInProgress);
        }
        let income = self.validate().map_err(CoreError::InvalidForm)?;
        self.status = SubmitStatus::Pending;
        let target = match self.mode {
            FormMode::New => SubmitTarget::Create,
            FormMode::Edit(id) => SubmitTarget::Update(id),
        };
        Ok(SubmitRequest { target, income })
    }

    /// Record the storage outcome of the outstanding submit. A success
    /// disposes the draft; a failure leaves every value in place.
    pub fn finish_submit(&mut self, outcome: Result<IncomeId, String>) {
        match outcome {
            Ok(_) => {
                self.status = SubmitStatus::Success;
                self.dispose();
            }
            Err(message) => self.status = SubmitStatus::Error(message),
        }
    }

    /// Clear a finished submit's outcome back to `Idle`.
    pub fn acknowledge_status(&mut self) {
        if matches!(self.status, SubmitStatus::Success | SubmitStatus::Error(_)) {
            self.status = SubmitStatus::Idle;
        }
    }

    // ── Display ─────────────────────────────────────────────────────

    /// Value formatted for display: money fields in local currency,
    /// everything else as typed.
    pub fn display_value(&self, name: FieldName) -> String {
        let raw = self.value(name);
        let fraction_digits = match name {
            FieldName::IncomeDate | FieldName::Currency | FieldName::Amount => {
                return raw.to_string()
            }
            FieldName::EsvTax => 0,
            FieldName::AmountAfterTaxes => 2,
            FieldName::ExchangeRate
            | FieldName::AmountInUah
            | FieldName::EpTax
            | FieldName::TaxesSum => 4,
        };
        match parse_number(raw) {
            Some(v) if !raw.is_empty() => format_currency(v, Currency::LOCAL, fraction_digits),
            _ => raw.to_string(),
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Discard the draft: every subscription and graph edge is released and
    /// later writes (including late exchange rates) are ignored.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.store.clear_subscriptions();
        self.graph.detach();
        self.rate_requests.clear();
        self.lookup = RateLookup::Idle;
        self.disposed = true;
        debug!(mode = ?self.mode, "income form disposed");
    }

    fn ensure_live(&self) -> Result<(), CoreError> {
        if self.disposed {
            Err(CoreError::FormDisposed)
        } else {
            Ok(())
        }
    }
}

impl Drop for IncomeForm {
    fn drop(&mut self) {
        self.dispose();
    }
}
