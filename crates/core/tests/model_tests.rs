// ═══════════════════════════════════════════════════════════════════
// Model Tests — Currency, FieldName, Settings, QueryCache, money
// formatting, serialization
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;

use income_monitor_core::errors::CoreError;
use income_monitor_core::models::cache::{QueryCache, RateKey};
use income_monitor_core::models::currency::Currency;
use income_monitor_core::models::field::{FieldName, FieldRule};
use income_monitor_core::models::income::{Income, NewIncome};
use income_monitor_core::models::money::format_currency;
use income_monitor_core::models::settings::{Settings, NBU_RATE_URL};

fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_income(id: i64) -> Income {
    NewIncome {
        income_date: make_date(2024, 3, 10),
        amount: 100.0,
        exchange_rate: 40.0,
        currency: Currency::EUR,
        amount_in_uah: 4000.0,
        esv_tax: 1760.0,
        ep_tax: 200.0,
        taxes_sum: 1960.0,
        amount_after_taxes: 2040.0,
    }
    .with_id(id)
}

// ═══════════════════════════════════════════════════════════════════
// Currency
// ═══════════════════════════════════════════════════════════════════

mod currency {
    use super::*;

    #[test]
    fn labels() {
        let labels: Vec<String> = Currency::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["EUR, €", "USD, $", "CAD, $", "GBP, £", "UAH, ₴"]);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(" usd ".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!("Uah".parse::<Currency>().unwrap(), Currency::UAH);
    }

    #[test]
    fn parse_unknown() {
        let err = "PLN".parse::<Currency>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownCurrency(code) if code == "PLN"));
    }

    #[test]
    fn only_uah_is_local() {
        assert!(Currency::UAH.is_local());
        assert_eq!(Currency::ALL.iter().filter(|c| c.is_local()).count(), 1);
    }

    #[test]
    fn serializes_as_code() {
        assert_eq!(serde_json::to_string(&Currency::GBP).unwrap(), "\"GBP\"");
        assert_eq!(Currency::CAD.to_string(), "CAD");
    }
}

// ═══════════════════════════════════════════════════════════════════
// FieldName
// ═══════════════════════════════════════════════════════════════════

mod field_name {
    use super::*;

    #[test]
    fn names_round_trip() {
        for field in FieldName::ALL {
            assert_eq!(field.as_str().parse::<FieldName>().unwrap(), field);
        }
    }

    #[test]
    fn date_alias() {
        assert_eq!("date".parse::<FieldName>().unwrap(), FieldName::IncomeDate);
    }

    #[test]
    fn unknown_name() {
        assert!(matches!("esv".parse::<FieldName>(), Err(CoreError::UnknownField(_))));
    }

    #[test]
    fn rules() {
        assert_eq!(FieldName::IncomeDate.rule(), FieldRule::Date);
        assert_eq!(FieldName::Amount.rule(), FieldRule::NonNegativeNumber);
        assert_eq!(FieldName::AmountAfterTaxes.rule(), FieldRule::Number);
        assert_eq!(FieldName::Currency.rule(), FieldRule::Required);
        assert_eq!(FieldName::AmountInUah.rule(), FieldRule::Required);
    }

    #[test]
    fn derived_fields() {
        let derived: Vec<FieldName> = FieldName::ALL.into_iter().filter(|f| f.is_derived()).collect();
        assert_eq!(
            derived,
            vec![
                FieldName::AmountInUah,
                FieldName::EpTax,
                FieldName::TaxesSum,
                FieldName::AmountAfterTaxes
            ]
        );
    }

    #[test]
    fn only_date_skips_sanitizing() {
        assert!(!FieldName::IncomeDate.is_sanitized());
        assert!(FieldName::Currency.is_sanitized());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.default_currency, Currency::EUR);
        assert_eq!(s.esv_tax, "1760");
        assert_eq!(s.ep_tax_rate, 0.05);
        assert_eq!(s.page_size, 15);
        assert_eq!(s.rate_api_url, NBU_RATE_URL);
        assert_eq!(s.http_timeout_secs, 30);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{"default_currency":"USD","page_size":20}"#).unwrap();
        assert_eq!(s.default_currency, Currency::USD);
        assert_eq!(s.page_size, 20);
        assert_eq!(s.esv_tax, "1760");
    }

    #[test]
    fn json_round_trip() {
        let s = Settings {
            esv_tax: "1500".into(),
            ..Settings::default()
        };
        assert_eq!(Settings::from_json(&s.to_json().unwrap()).unwrap(), s);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Settings::from_json(r#"{"page_size":0}"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{"esv_tax":"abc"}"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{"ep_tax_rate":-0.1}"#),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn rejects_unknown_currency() {
        assert!(matches!(
            Settings::from_json(r#"{"default_currency":"PLN"}"#),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"ep_tax_rate":0.03}"#).unwrap();
        assert_eq!(Settings::load(&path).unwrap().ep_tax_rate, 0.03);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CoreError::FileIO(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// QueryCache
// ═══════════════════════════════════════════════════════════════════

mod cache {
    use super::*;

    #[test]
    fn rate_key_display() {
        let key = RateKey::new(make_date(2024, 1, 5), Currency::EUR);
        assert_eq!(key.to_string(), "EUR@2024-01-05");
    }

    #[test]
    fn rates_by_key() {
        let cache = QueryCache::new();
        let eur = RateKey::new(make_date(2024, 1, 5), Currency::EUR);
        let usd = RateKey::new(make_date(2024, 1, 5), Currency::USD);
        cache.set_rate(eur, 41.0);
        assert_eq!(cache.rate(&eur), Some(41.0));
        assert_eq!(cache.rate(&usd), None);
        cache.clear_rates();
        assert_eq!(cache.rate_count(), 0);
    }

    #[test]
    fn invalidation_hooks() {
        let cache = QueryCache::new();
        cache.set_page(1, 15, vec![sample_income(1)]);
        cache.set_page(2, 15, Vec::new());
        cache.set_income(sample_income(1));
        cache.set_income(sample_income(2));

        cache.invalidate_incomes();
        assert_eq!(cache.cached_page_count(), 0);
        assert!(cache.income(1).is_some());

        cache.invalidate_income(1);
        assert!(cache.income(1).is_none());
        assert!(cache.income(2).is_some());
    }

    #[test]
    fn rates_survive_income_invalidation() {
        let cache = QueryCache::new();
        let key = RateKey::new(make_date(2024, 1, 5), Currency::EUR);
        cache.set_rate(key, 41.0);
        cache.invalidate_incomes();
        assert_eq!(cache.rate(&key), Some(41.0));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Money formatting (uk-UA)
// ═══════════════════════════════════════════════════════════════════

mod money {
    use super::*;

    #[test]
    fn groups_thousands_with_nbsp() {
        assert_eq!(format_currency(1234.5, Currency::UAH, 4), "1\u{a0}234,50\u{a0}₴");
        assert_eq!(
            format_currency(1234567.891, Currency::UAH, 2),
            "1\u{a0}234\u{a0}567,89\u{a0}₴"
        );
    }

    #[test]
    fn zero_fraction_digits() {
        assert_eq!(format_currency(1760.0, Currency::UAH, 0), "1\u{a0}760\u{a0}₴");
    }

    #[test]
    fn keeps_significant_fraction_digits() {
        assert_eq!(format_currency(41.1234, Currency::UAH, 4), "41,1234\u{a0}₴");
        assert_eq!(format_currency(41.12, Currency::UAH, 4), "41,12\u{a0}₴");
    }

    #[test]
    fn negative_amounts() {
        assert_eq!(format_currency(-1570.0, Currency::UAH, 2), "-1\u{a0}570,00\u{a0}₴");
        assert_eq!(format_currency(-0.001, Currency::UAH, 2), "0,00\u{a0}₴");
    }

    #[test]
    fn other_currency_symbol() {
        assert_eq!(format_currency(5.0, Currency::EUR, 2), "5,00\u{a0}€");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Income serialization
// ═══════════════════════════════════════════════════════════════════

mod income {
    use super::*;

    #[test]
    fn camel_case_fields() {
        let json = serde_json::to_value(sample_income(3)).unwrap();
        assert_eq!(json["incomeDate"], "2024-03-10");
        assert_eq!(json["amountInUah"], 4000.0);
        assert_eq!(json["amountAfterTaxes"], 2040.0);
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["id"], 3);
    }

    #[test]
    fn new_income_from_record() {
        let income = sample_income(9);
        let new = NewIncome::from(&income);
        assert_eq!(new.with_id(9), income);
    }
}
