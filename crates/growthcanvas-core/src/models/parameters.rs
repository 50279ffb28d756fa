use serde::{Deserialize, Serialize};

use super::forecast::YearlyFinancials;

/// Inputs to the backend's growth, staffing and expense model.
///
/// Salaries are monthly; rates and percentages are fractions (0.15 = 15%).
/// Fields missing from a backend response take the values from `Default`,
/// so a sparse response merges over the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthParameters {
    pub start_date: String,
    pub initial_clients: f64,
    pub initial_developers: f64,
    pub initial_affiliates: f64,
    pub client_growth_rates: Vec<f64>,
    pub developer_growth_rates: Vec<f64>,
    pub affiliate_growth_rates: Vec<f64>,
    pub subscription_price: f64,
    pub affiliate_commission: f64,
    pub free_months: u32,
    pub conversion_rate: f64,
    pub cto_start_month: u32,
    pub sales_start_month: u32,
    pub sales_hiring_interval: u32,
    pub max_sales_staff: u32,
    pub jr_dev_start_month: u32,
    pub admin_start_month: u32,
    pub ceo_start_month: u32,
    pub cto_salary: f64,
    pub sales_base_salary: f64,
    pub sales_commission: f64,
    pub jr_dev_salary: f64,
    pub admin_salary: f64,
    pub ceo_salary: f64,
    pub marketing_percentage: f64,
    pub infrastructure_cost_per_user: f64,
    pub other_expenses_percentage: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for GrowthParameters {
    fn default() -> Self {
        Self {
            start_date: "2025-04-01".to_string(),
            initial_clients: 0.0,
            initial_developers: 0.0,
            initial_affiliates: 0.0,
            client_growth_rates: vec![0.10, 0.12, 0.15, 0.12, 0.10],
            developer_growth_rates: vec![0.05, 0.07, 0.10, 0.08, 0.06],
            affiliate_growth_rates: vec![0.08, 0.10, 0.12, 0.10, 0.08],
            subscription_price: 25.0,
            affiliate_commission: 5.0,
            free_months: 1,
            conversion_rate: 0.75,
            cto_start_month: 0,
            sales_start_month: 3,
            sales_hiring_interval: 3,
            max_sales_staff: 10,
            jr_dev_start_month: 6,
            admin_start_month: 6,
            ceo_start_month: 6,
            cto_salary: 12500.0,
            sales_base_salary: 10000.0,
            sales_commission: 0.05,
            jr_dev_salary: 8333.0,
            admin_salary: 8333.0,
            ceo_salary: 16667.0,
            marketing_percentage: 0.15,
            infrastructure_cost_per_user: 1.5,
            other_expenses_percentage: 0.10,
            extra: serde_json::Map::new(),
        }
    }
}

/// Number of yearly growth rates per series
pub const GROWTH_RATE_YEARS: usize = 5;

impl GrowthParameters {
    /// Check the values the backend would reject, returning a message per problem.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for (name, rates) in [
            ("client_growth_rates", &self.client_growth_rates),
            ("developer_growth_rates", &self.developer_growth_rates),
            ("affiliate_growth_rates", &self.affiliate_growth_rates),
        ] {
            if rates.len() != GROWTH_RATE_YEARS {
                problems.push(format!(
                    "{} needs {} values, got {}",
                    name,
                    GROWTH_RATE_YEARS,
                    rates.len()
                ));
            }
        }

        for (name, value) in [
            ("conversion_rate", self.conversion_rate),
            ("sales_commission", self.sales_commission),
            ("marketing_percentage", self.marketing_percentage),
            ("other_expenses_percentage", self.other_expenses_percentage),
        ] {
            if !(0.0..=1.0).contains(&value) {
                problems.push(format!("{} must be between 0 and 1, got {}", name, value));
            }
        }

        if self.sales_hiring_interval == 0 {
            problems.push("sales_hiring_interval must be at least 1".to_string());
        }

        problems
    }
}

/// Result of a parameter update. The backend reports failures in-band with
/// `status: "error"` as well as through HTTP status codes.
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterUpdate {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub yearly_summary: Option<Vec<YearlyFinancials>>,
}

impl ParameterUpdate {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}
