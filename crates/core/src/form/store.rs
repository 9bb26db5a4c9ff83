use std::collections::BTreeSet;

use crate::models::field::FieldName;

use super::validation::{self, FieldError, FieldErrors};

/// Set of fields whose value changed during one update, in field order.
pub type ChangeSet = BTreeSet<FieldName>;

/// Callback invoked with the fields that changed and the converged values.
pub type Listener = Box<dyn FnMut(&ChangeSet, &FieldValues) + Send>;

/// Handle returned by [`FieldStore::subscribe`], used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Current value and validation error of one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    pub value: String,
    pub error: Option<FieldError>,
}

/// Read-only view over the nine field states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    states: [FieldState; FieldName::COUNT],
}

impl FieldValues {
    pub fn value(&self, name: FieldName) -> &str {
        &self.states[name.index()].value
    }

    pub fn error(&self, name: FieldName) -> Option<FieldError> {
        self.states[name.index()].error
    }

    pub fn state(&self, name: FieldName) -> &FieldState {
        &self.states[name.index()]
    }
}

struct Subscription {
    id: SubscriptionId,
    fields: BTreeSet<FieldName>,
    listener: Listener,
}

/// String-typed store for the fields of one income draft.
///
/// `set_field` sanitizes and validates but never recomputes dependents; the
/// caller runs the dependency graph and then calls [`FieldStore::notify`]
/// once with the whole change set, so subscribers only ever observe
/// converged values.
#[derive(Default)]
pub struct FieldStore {
    values: FieldValues,
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl std::fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldStore")
            .field("values", &self.values)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an initial value: no sanitizing, no validation, no change reported.
    pub fn seed(&mut self, name: FieldName, value: impl Into<String>) {
        self.values.states[name.index()] = FieldState {
            value: value.into(),
            error: None,
        };
    }

    /// Sanitize, validate and store a raw value.
    /// Returns `true` when the stored value changed (error-only updates return `false`).
    pub fn set_field(&mut self, name: FieldName, raw: &str) -> bool {
        let value = if name.is_sanitized() {
            validation::sanitize(raw)
        } else {
            raw.to_string()
        };
        let error = validation::validate(name, &value);

        let state = &mut self.values.states[name.index()];
        state.error = error;
        if state.value == value {
            return false;
        }
        state.value = value;
        true
    }

    pub fn value(&self, name: FieldName) -> &str {
        self.values.value(name)
    }

    pub fn error(&self, name: FieldName) -> Option<FieldError> {
        self.values.error(name)
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Re-validate every field, store the errors and return the failing ones.
    pub fn validate_all(&mut self) -> FieldErrors {
        let mut errors = Vec::new();
        for name in FieldName::ALL {
            let state = &mut self.values.states[name.index()];
            state.error = validation::validate(name, &state.value);
            if let Some(error) = state.error {
                errors.push((name, error));
            }
        }
        FieldErrors(errors)
    }

    // ── Subscriptions ───────────────────────────────────────────────

    /// Register `listener` for changes to any of `fields`.
    pub fn subscribe(
        &mut self,
        fields: impl IntoIterator<Item = FieldName>,
        listener: Listener,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            fields: fields.into_iter().collect(),
            listener,
        });
        id
    }

    /// Deregister a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn clear_subscriptions(&mut self) {
        self.subscriptions.clear();
    }

    /// Invoke every listener whose field set intersects `changed`.
    pub fn notify(&mut self, changed: &ChangeSet) {
        if changed.is_empty() {
            return;
        }
        let values = &self.values;
        for sub in &mut self.subscriptions {
            if !sub.fields.is_disjoint(changed) {
                (sub.listener)(changed, values);
            }
        }
    }
}
