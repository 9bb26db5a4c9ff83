// ═══════════════════════════════════════════════════════════════════
// Storage Tests — MemoryStore, SqliteStore (in-memory and on disk)
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;

use income_monitor_core::errors::CoreError;
use income_monitor_core::models::currency::Currency;
use income_monitor_core::models::income::NewIncome;
use income_monitor_core::storage::memory::MemoryStore;
use income_monitor_core::storage::sqlite::SqliteStore;
use income_monitor_core::storage::traits::{page_offset, IncomeStore};

fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample(date: NaiveDate, amount: f64) -> NewIncome {
    NewIncome {
        income_date: date,
        amount,
        exchange_rate: 41.25,
        currency: Currency::USD,
        amount_in_uah: amount * 41.25,
        esv_tax: 1760.0,
        ep_tax: 12.5,
        taxes_sum: 1772.5,
        amount_after_taxes: -1500.25,
    }
}

/// The shared contract, run against every store implementation.
mod contract {
    use super::*;

    pub async fn create_and_read(store: &dyn IncomeStore) {
        let income = sample(make_date(2024, 3, 10), 100.0);
        let id = store.create(&income).await.unwrap();
        let loaded = store.read(id).await.unwrap().unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(NewIncome::from(&loaded), income);
        assert!(store.read(id + 100).await.unwrap().is_none());
    }

    pub async fn ids_are_distinct(store: &dyn IncomeStore) {
        let a = store.create(&sample(make_date(2024, 1, 1), 1.0)).await.unwrap();
        let b = store.create(&sample(make_date(2024, 1, 1), 2.0)).await.unwrap();
        assert_ne!(a, b);
    }

    pub async fn pages_newest_first(store: &dyn IncomeStore) {
        let old = store.create(&sample(make_date(2023, 12, 31), 1.0)).await.unwrap();
        let first = store.create(&sample(make_date(2024, 2, 1), 2.0)).await.unwrap();
        let second = store.create(&sample(make_date(2024, 2, 1), 3.0)).await.unwrap();
        let newest = store.create(&sample(make_date(2024, 3, 1), 4.0)).await.unwrap();

        let page1: Vec<i64> = store.read_page(1, 2).await.unwrap().iter().map(|i| i.id).collect();
        let page2: Vec<i64> = store.read_page(2, 2).await.unwrap().iter().map(|i| i.id).collect();
        // same date: later id first
        assert_eq!(page1, vec![newest, second]);
        assert_eq!(page2, vec![first, old]);
        assert!(store.read_page(3, 2).await.unwrap().is_empty());
    }

    pub async fn page_zero_reads_first_page(store: &dyn IncomeStore) {
        store.create(&sample(make_date(2024, 1, 1), 1.0)).await.unwrap();
        assert_eq!(store.read_page(0, 15).await.unwrap().len(), 1);
    }

    pub async fn update_overwrites(store: &dyn IncomeStore) {
        let id = store.create(&sample(make_date(2024, 1, 1), 1.0)).await.unwrap();
        let changed = NewIncome {
            currency: Currency::GBP,
            esv_tax: 0.0,
            ..sample(make_date(2024, 1, 2), 5.0)
        };
        store.update(id, &changed).await.unwrap();
        let loaded = store.read(id).await.unwrap().unwrap();
        assert_eq!(NewIncome::from(&loaded), changed);
    }

    pub async fn update_missing(store: &dyn IncomeStore) {
        let err = store.update(999, &sample(make_date(2024, 1, 1), 1.0)).await.unwrap_err();
        assert!(matches!(err, CoreError::IncomeNotFound(999)));
    }

    pub async fn delete_is_idempotent(store: &dyn IncomeStore) {
        let id = store.create(&sample(make_date(2024, 1, 1), 1.0)).await.unwrap();
        store.delete(id).await.unwrap();
        assert!(store.read(id).await.unwrap().is_none());
        store.delete(id).await.unwrap();
    }
}

// ═══════════════════════════════════════════════════════════════════
// MemoryStore
// ═══════════════════════════════════════════════════════════════════

mod memory {
    use super::*;

    #[tokio::test]
    async fn create_and_read() {
        contract::create_and_read(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn ids_are_distinct() {
        contract::ids_are_distinct(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn pages_newest_first() {
        contract::pages_newest_first(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn page_zero_reads_first_page() {
        contract::page_zero_reads_first_page(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn update_overwrites() {
        contract::update_overwrites(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn update_missing() {
        contract::update_missing(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        contract::delete_is_idempotent(&store).await;
        assert!(store.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// SqliteStore
// ═══════════════════════════════════════════════════════════════════

mod sqlite {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[tokio::test]
    async fn create_and_read() {
        contract::create_and_read(&store()).await;
    }

    #[tokio::test]
    async fn ids_are_distinct() {
        contract::ids_are_distinct(&store()).await;
    }

    #[tokio::test]
    async fn pages_newest_first() {
        contract::pages_newest_first(&store()).await;
    }

    #[tokio::test]
    async fn page_zero_reads_first_page() {
        contract::page_zero_reads_first_page(&store()).await;
    }

    #[tokio::test]
    async fn update_overwrites() {
        contract::update_overwrites(&store()).await;
    }

    #[tokio::test]
    async fn update_missing() {
        contract::update_missing(&store()).await;
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        contract::delete_is_idempotent(&store()).await;
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("incomeMonitor.db");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store.create(&sample(make_date(2024, 3, 10), 100.0)).await.unwrap()
        };

        let reopened = SqliteStore::open(&path).unwrap();
        let loaded = reopened.read(id).await.unwrap().unwrap();
        assert_eq!(loaded.amount, 100.0);
        assert_eq!(loaded.currency, Currency::USD);
        assert_eq!(loaded.income_date, make_date(2024, 3, 10));
    }

    #[tokio::test]
    async fn null_esv_reads_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        SqliteStore::open(&path).unwrap();
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute(
                "INSERT INTO incomes (incomeDate, amount, exchangeRate, currency, amountInUah,
                                      esvTax, epTax, taxesSum, amountAfterTaxes)
                 VALUES ('2024-01-05', 10, 40, 'EUR', 400, NULL, 20, 20, 380)",
                [],
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let page = store.read_page(1, 15).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].esv_tax, 0.0);
        assert_eq!(page[0].currency, Currency::EUR);
    }

    #[tokio::test]
    async fn corrupt_currency_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.db");
        SqliteStore::open(&path).unwrap();
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute(
                "INSERT INTO incomes (incomeDate, amount, exchangeRate, currency, amountInUah,
                                      esvTax, epTax, taxesSum, amountAfterTaxes)
                 VALUES ('2024-01-05', 10, 40, 'XXX', 400, 0, 20, 20, 380)",
                [],
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let err = store.read_page(1, 15).await.unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
    }
}

mod paging {
    use super::*;

    #[test]
    fn offsets_are_one_based() {
        assert_eq!(page_offset(1, 15), 0);
        assert_eq!(page_offset(2, 15), 15);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(0, 15), 0);
    }
}
