// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use income_monitor_core::errors::CoreError;
use income_monitor_core::form::validation::{FieldError, FieldErrors};
use income_monitor_core::models::field::FieldName;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn storage() {
        let err = CoreError::Storage("database is locked".into());
        assert_eq!(err.to_string(), "Storage error: database is locked");
    }

    #[test]
    fn income_not_found() {
        assert_eq!(CoreError::IncomeNotFound(42).to_string(), "Income not found: 42");
    }

    #[test]
    fn api() {
        let err = CoreError::Api {
            provider: "NBU".into(),
            message: "HTTP 503".into(),
        };
        assert_eq!(err.to_string(), "API error (NBU): HTTP 503");
    }

    #[test]
    fn rate_not_available() {
        let err = CoreError::RateNotAvailable {
            currency: "EUR".into(),
            date: "2024-01-05".into(),
        };
        assert_eq!(err.to_string(), "Exchange rate not available for EUR on 2024-01-05");
    }

    #[test]
    fn no_provider() {
        assert_eq!(
            CoreError::NoProvider("CAD".into()).to_string(),
            "No rate provider available for currency: CAD"
        );
    }

    #[test]
    fn invalid_form_lists_fields() {
        let err = CoreError::InvalidForm(FieldErrors(vec![
            (FieldName::Amount, FieldError::Required),
            (FieldName::EpTax, FieldError::NumberRequired),
        ]));
        assert_eq!(
            err.to_string(),
            "Form has invalid fields: amount (*), epTax (number required)"
        );
    }

    #[test]
    fn read_only_field() {
        assert_eq!(
            CoreError::ReadOnlyField(FieldName::TaxesSum).to_string(),
            "Field is read-only: taxesSum"
        );
    }

    #[test]
    fn form_lifecycle() {
        assert_eq!(CoreError::SubmitInProgress.to_string(), "A submit is already in progress");
        assert_eq!(CoreError::FormDisposed.to_string(), "Form has been disposed");
    }

    #[test]
    fn unknown_names() {
        assert_eq!(CoreError::UnknownField("x".into()).to_string(), "Unknown field: x");
        assert_eq!(
            CoreError::UnknownCurrency("PLN".into()).to_string(),
            "Unsupported currency: PLN"
        );
    }

    #[test]
    fn invalid_graph() {
        assert_eq!(
            CoreError::InvalidGraph("cycle detected in field dependencies".into()).to_string(),
            "Invalid dependency graph: cycle detected in field dependencies"
        );
    }

    #[test]
    fn config() {
        assert_eq!(
            CoreError::Config("page_size must be positive".into()).to_string(),
            "Invalid configuration: page_size must be positive"
        );
    }
}

// ── From conversions ────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIO(ref m) if m.contains("no such file")));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<Vec<f64>>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn from_rusqlite_error() {
        let err: CoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, CoreError::Storage(_)));
    }
}

// ── FieldErrors helpers ─────────────────────────────────────────────

mod field_errors {
    use super::*;

    #[test]
    fn lookup_by_field() {
        let errors = FieldErrors(vec![(FieldName::IncomeDate, FieldError::InvalidDate)]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(FieldName::IncomeDate), Some(FieldError::InvalidDate));
        assert_eq!(errors.get(FieldName::Amount), None);
        assert!(FieldErrors::default().is_empty());
    }
}
