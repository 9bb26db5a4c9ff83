use serde::Serialize;

use super::income::Income;

/// A run of consecutive incomes from the same calendar month, as the list
/// screen shows them under a sticky month header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSection {
    pub year: i32,
    /// 1-based month number
    pub month: u32,
    /// Header text, e.g. "March, 2024"
    pub title: String,
    pub incomes: Vec<Income>,
}
