use chrono::Datelike;

use crate::models::income::Income;
use crate::models::listing::MonthSection;

/// Shapes the paginated income feed for the list screen.
pub struct ListingService;

impl ListingService {
    pub fn new() -> Self {
        Self
    }

    /// Split an already-ordered feed into month sections.
    ///
    /// A new section starts whenever (year, month) differs from the previous
    /// record's, so a feed that is out of order yields repeated months.
    pub fn group_by_month(&self, incomes: &[Income]) -> Vec<MonthSection> {
        let mut sections: Vec<MonthSection> = Vec::new();
        for income in incomes {
            let (year, month) = (income.income_date.year(), income.income_date.month());
            match sections.last_mut() {
                Some(section) if section.year == year && section.month == month => {
                    section.incomes.push(income.clone());
                }
                _ => sections.push(MonthSection {
                    year,
                    month,
                    title: income.income_date.format("%B, %Y").to_string(),
                    incomes: vec![income.clone()],
                }),
            }
        }
        sections
    }

    /// Page to request after `last_page`, or `None` once a page came back empty.
    pub fn next_page(&self, last_page: u32, last_page_len: usize) -> Option<u32> {
        if last_page_len == 0 {
            None
        } else {
            Some(last_page + 1)
        }
    }
}

impl Default for ListingService {
    fn default() -> Self {
        Self::new()
    }
}
