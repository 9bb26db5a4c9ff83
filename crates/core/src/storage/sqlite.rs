use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::errors::CoreError;
use crate::form::validation::DATE_FORMAT;
use crate::models::cache::lock;
use crate::models::currency::Currency;
use crate::models::income::{Income, IncomeId, NewIncome};

use super::traits::{page_offset, IncomeStore};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS incomes (
      id INTEGER PRIMARY KEY NOT NULL,
      incomeDate TEXT NOT NULL,
      amount REAL NOT NULL,
      exchangeRate REAL NOT NULL,
      currency TEXT NOT NULL,
      amountInUah REAL NOT NULL,
      esvTax REAL,
      epTax REAL NOT NULL,
      taxesSum REAL NOT NULL,
      amountAfterTaxes REAL NOT NULL
    )";

const COLUMNS: &str = "id, incomeDate, amount, exchangeRate, currency, amountInUah, \
                       esvTax, epTax, taxesSum, amountAfterTaxes";

/// A row as stored; date and currency are still text.
struct RawIncome {
    id: IncomeId,
    income_date: String,
    amount: f64,
    exchange_rate: f64,
    currency: String,
    amount_in_uah: f64,
    esv_tax: Option<f64>,
    ep_tax: f64,
    taxes_sum: f64,
    amount_after_taxes: f64,
}

impl RawIncome {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            income_date: row.get(1)?,
            amount: row.get(2)?,
            exchange_rate: row.get(3)?,
            currency: row.get(4)?,
            amount_in_uah: row.get(5)?,
            esv_tax: row.get(6)?,
            ep_tax: row.get(7)?,
            taxes_sum: row.get(8)?,
            amount_after_taxes: row.get(9)?,
        })
    }

    fn into_income(self) -> Result<Income, CoreError> {
        let income_date = NaiveDate::parse_from_str(&self.income_date, DATE_FORMAT).map_err(|e| {
            CoreError::Storage(format!(
                "Income {} has an invalid date '{}': {e}",
                self.id, self.income_date
            ))
        })?;
        let currency = self.currency.parse::<Currency>().map_err(|_| {
            CoreError::Storage(format!(
                "Income {} has an unsupported currency '{}'",
                self.id, self.currency
            ))
        })?;
        Ok(Income {
            id: self.id,
            income_date,
            amount: self.amount,
            exchange_rate: self.exchange_rate,
            currency,
            amount_in_uah: self.amount_in_uah,
            // nullable column: rows without ESV read as 0
            esv_tax: self.esv_tax.unwrap_or(0.0),
            ep_tax: self.ep_tax,
            taxes_sum: self.taxes_sum,
            amount_after_taxes: self.amount_after_taxes,
        })
    }
}

/// SQLite-backed [`IncomeStore`] on a single shared connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and ensure the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened income database");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, CoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CoreError> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(SCHEMA, [])?;
        Ok(())
    }
}

#[async_trait]
impl IncomeStore for SqliteStore {
    async fn create(&self, income: &NewIncome) -> Result<IncomeId, CoreError> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO incomes (incomeDate, amount, exchangeRate, currency, amountInUah,
                                  esvTax, epTax, taxesSum, amountAfterTaxes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                income.income_date.format(DATE_FORMAT).to_string(),
                income.amount,
                income.exchange_rate,
                income.currency.code(),
                income.amount_in_uah,
                income.esv_tax,
                income.ep_tax,
                income.taxes_sum,
                income.amount_after_taxes,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn read(&self, id: IncomeId) -> Result<Option<Income>, CoreError> {
        let raw = lock(&self.conn)
            .query_row(
                &format!("SELECT {COLUMNS} FROM incomes WHERE id = ?1"),
                params![id],
                RawIncome::from_row,
            )
            .optional()?;
        raw.map(RawIncome::into_income).transpose()
    }

    async fn read_page(&self, page: u32, page_size: u32) -> Result<Vec<Income>, CoreError> {
        let offset = i64::try_from(page_offset(page, page_size)).unwrap_or(i64::MAX);
        let raws = {
            let conn = lock(&self.conn);
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM incomes
                 ORDER BY incomeDate DESC, id DESC
                 LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt.query_map(params![i64::from(page_size), offset], RawIncome::from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        raws.into_iter().map(RawIncome::into_income).collect()
    }

    async fn update(&self, id: IncomeId, income: &NewIncome) -> Result<(), CoreError> {
        let changed = lock(&self.conn).execute(
            "UPDATE incomes SET
                incomeDate = ?1, amount = ?2, exchangeRate = ?3, currency = ?4,
                amountInUah = ?5, esvTax = ?6, epTax = ?7, taxesSum = ?8,
                amountAfterTaxes = ?9
             WHERE id = ?10",
            params![
                income.income_date.format(DATE_FORMAT).to_string(),
                income.amount,
                income.exchange_rate,
                income.currency.code(),
                income.amount_in_uah,
                income.esv_tax,
                income.ep_tax,
                income.taxes_sum,
                income.amount_after_taxes,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::IncomeNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: IncomeId) -> Result<(), CoreError> {
        lock(&self.conn).execute("DELETE FROM incomes WHERE id = ?1", params![id])?;
        Ok(())
    }
}
