//! Projection rows produced by the backend's forecast model.
//!
//! All numeric fields default to zero when absent so a partially populated
//! row still renders.

use serde::{Deserialize, Serialize};

/// Last year shown in projection tables and charts.
pub const PROJECTION_HORIZON_YEAR: i32 = 2030;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YearlyFinancials {
    pub year: i32,
    pub income: f64,
    pub expenses: f64,
    pub ebitda: f64,
    pub client_count: f64,
    pub paying_clients: f64,
    pub total_staff: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyFinancials {
    pub date: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub income: f64,
    pub expenses: f64,
    pub ebitda: f64,
    pub client_count: f64,
    pub paying_clients: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YearlyStaff {
    pub year: i32,
    pub client_count: f64,
    pub paying_clients: f64,
    pub developer_count: f64,
    pub affiliate_count: f64,
    pub sales_staff: f64,
    pub jr_devs: f64,
    pub admin_staff: f64,
    pub cto_count: f64,
    /// Older responses omit it; there is always one CEO
    #[serde(default = "one")]
    pub ceo_count: f64,
    pub total_staff: f64,
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyExpenses {
    pub date: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub cto_cost: f64,
    pub ceo_cost: f64,
    pub sales_cost: f64,
    pub jr_dev_cost: f64,
    pub admin_cost: f64,
    pub infrastructure_cost: f64,
    pub marketing_cost: f64,
    pub affiliate_cost: f64,
    pub other_expenses: f64,
}

impl MonthlyExpenses {
    /// Expense categories in display order, paired with their labels
    pub fn categories(&self) -> [(&'static str, f64); 9] {
        [
            ("CTO", self.cto_cost),
            ("CEO", self.ceo_cost),
            ("Sales Staff", self.sales_cost),
            ("Jr. Developers", self.jr_dev_cost),
            ("Admin Staff", self.admin_cost),
            ("Infrastructure", self.infrastructure_cost),
            ("Marketing", self.marketing_cost),
            ("Affiliates", self.affiliate_cost),
            ("Other", self.other_expenses),
        ]
    }

    pub fn total(&self) -> f64 {
        self.categories().iter().map(|(_, v)| v).sum()
    }

    /// Calendar year, taken from the `YYYY-MM-DD` date when the row has none
    pub fn year(&self) -> Option<i32> {
        self.year.or_else(|| self.date.get(0..4)?.parse().ok())
    }

    pub fn month(&self) -> Option<u32> {
        self.month.or_else(|| self.date.get(5..7)?.parse().ok())
    }
}

/// Distinct years in the order they first appear
pub fn expense_years(rows: &[MonthlyExpenses]) -> Vec<i32> {
    let mut years = Vec::new();
    for year in rows.iter().filter_map(MonthlyExpenses::year) {
        if !years.contains(&year) {
            years.push(year);
        }
    }
    years
}

/// Rows for one year, ordered by month
pub fn expenses_for_year(rows: &[MonthlyExpenses], year: i32) -> Vec<&MonthlyExpenses> {
    let mut selected: Vec<&MonthlyExpenses> =
        rows.iter().filter(|row| row.year() == Some(year)).collect();
    selected.sort_by_key(|row| row.month());
    selected
}

/// Rows up to and including the projection horizon
pub fn within_horizon<T, F>(rows: &[T], year: F) -> Vec<&T>
where
    F: Fn(&T) -> i32,
{
    rows.iter()
        .filter(|row| year(*row) <= PROJECTION_HORIZON_YEAR)
        .collect()
}
