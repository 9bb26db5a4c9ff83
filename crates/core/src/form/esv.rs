use serde::{Deserialize, Serialize};

/// Whether the ESV (social contribution) tax applies to a draft and whether
/// the user may override its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EsvState {
    /// ESV = configured constant, not editable
    IncludedLocked,
    /// ESV = 0, not editable
    Excluded,
    /// ESV editable; the user's value replaces the constant
    IncludedUnlocked,
}

/// User actions on the ESV field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EsvAction {
    /// Tap on the field: include / exclude ESV
    Toggle,
    /// Allow free-form editing of the amount
    Unlock,
    /// Stop editing; the edited amount is kept
    Lock,
}

/// Value a transition writes into the `esvTax` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EsvWrite {
    /// The configured ESV constant
    Constant,
    /// Zero
    Zero,
}

/// Result of a permitted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EsvTransition {
    pub state: EsvState,
    pub write: Option<EsvWrite>,
}

impl EsvState {
    /// Initial state of a draft: excluded only when editing a record whose
    /// persisted ESV is zero.
    pub fn initial(persisted_esv: Option<f64>) -> Self {
        match persisted_esv {
            Some(v) if v == 0.0 => EsvState::Excluded,
            _ => EsvState::IncludedLocked,
        }
    }

    pub fn is_included(&self) -> bool {
        !matches!(self, EsvState::Excluded)
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, EsvState::IncludedUnlocked)
    }

    /// Apply an action. Returns `None` when the action is not permitted in
    /// the current state (toggling while unlocked, unlocking while excluded,
    /// locking while not unlocked).
    pub fn next(self, action: EsvAction) -> Option<EsvTransition> {
        use EsvState::*;
        let (state, write) = match (self, action) {
            (IncludedLocked, EsvAction::Toggle) => (Excluded, Some(EsvWrite::Zero)),
            (Excluded, EsvAction::Toggle) => (IncludedLocked, Some(EsvWrite::Constant)),
            (IncludedLocked, EsvAction::Unlock) => (IncludedUnlocked, None),
            (IncludedUnlocked, EsvAction::Lock) => (IncludedLocked, None),
            _ => return None,
        };
        Some(EsvTransition { state, write })
    }

    /// The action behind the edit icon: unlock when locked, lock when unlocked.
    pub fn edit_icon_action(&self) -> Option<EsvAction> {
        match self {
            EsvState::IncludedLocked => Some(EsvAction::Unlock),
            EsvState::IncludedUnlocked => Some(EsvAction::Lock),
            EsvState::Excluded => None,
        }
    }
}
