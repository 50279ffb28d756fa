//! Scenario dashboard data: the joint fetch behind the overview screen.
//!
//! Financials and staffing for a scenario are requested concurrently and the
//! load succeeds only if both do. `LoadTracker` makes sure a slow response
//! for a scenario the user has already left is not committed over a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::api::{ApiClient, ApiError};
use crate::models::{within_horizon, ScenarioRef, YearlyFinancials, YearlyStaff};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioDashboard {
    pub financials: Vec<YearlyFinancials>,
    pub staff: Vec<YearlyStaff>,
}

/// Headline numbers shown above the charts
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardMetrics {
    pub total_revenue: f64,
    pub total_ebitda: f64,
    pub final_client_count: f64,
    pub final_staff_count: f64,
}

impl ScenarioDashboard {
    /// Fetch yearly financials and staffing together. If either request
    /// fails the whole load fails and nothing partial is returned.
    pub async fn load(api: &ApiClient, scenario: ScenarioRef) -> Result<Self, ApiError> {
        debug!(scenario = %scenario, "Loading dashboard");
        let (financials, staff) = futures::try_join!(
            api.yearly_financials(scenario),
            api.yearly_staff(scenario)
        )?;
        info!(
            scenario = %scenario,
            years = financials.len(),
            "Dashboard loaded"
        );
        Ok(Self { financials, staff })
    }

    /// True when there is nothing to chart; callers show a "no data" state
    pub fn is_empty(&self) -> bool {
        self.financials.is_empty() || self.staff.is_empty()
    }

    pub fn metrics(&self) -> DashboardMetrics {
        let last = self.financials.last();
        DashboardMetrics {
            total_revenue: self.financials.iter().map(|f| f.income).sum(),
            total_ebitda: self.financials.iter().map(|f| f.ebitda).sum(),
            final_client_count: last.map(|f| f.client_count).unwrap_or_default(),
            final_staff_count: last.map(|f| f.total_staff).unwrap_or_default(),
        }
    }

    pub fn financials_in_horizon(&self) -> Vec<&YearlyFinancials> {
        within_horizon(&self.financials, |f| f.year)
    }

    pub fn staff_in_horizon(&self) -> Vec<&YearlyStaff> {
        within_horizon(&self.staff, |s| s.year)
    }
}

/// Ticket identifying one dashboard load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Latest-wins bookkeeping for loads that can overlap.
///
/// Meant for long-lived front ends (a TUI, a GUI, a server pushing updates)
/// where the user can switch scenarios while a load is in flight. The CLI
/// runs one load per process and does not need it.
///
/// Call [`begin`](Self::begin) when a load starts and only commit its result
/// if [`is_current`](Self::is_current) still holds when it completes.
#[derive(Debug, Default)]
pub struct LoadTracker {
    latest: AtomicU64,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Store `result` into `slot` if `ticket` is still the newest load.
    /// Returns whether it was stored.
    pub fn commit<T>(&self, ticket: LoadTicket, slot: &mut Option<T>, result: T) -> bool {
        if !self.is_current(ticket) {
            debug!(ticket = ticket.0, "Discarding superseded load");
            return false;
        }
        *slot = Some(result);
        true
    }
}
