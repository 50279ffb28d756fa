//! Command handlers. Each talks to the backend through one `ApiClient` and
//! prints either a table or JSON.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tracing::{info, warn};

use growthcanvas_core::models::{
    expense_years, expenses_for_year, select_scenario, GrowthParameters, MonthlyExpenses, NewUser,
    OAuthProvider, Scenario, ScenarioId, ScenarioInput, ScenarioRef, ScenarioUpdate, YearlyStaff,
};
use growthcanvas_core::utils::{format_count, format_currency, format_percent, truncate_string};
use growthcanvas_core::{ApiClient, Config, ScenarioDashboard};

use crate::output::{print_json, print_table, Column};

/// Width of the description column in scenario listings
const DESCRIPTION_WIDTH: usize = 40;

pub struct App {
    config: Config,
    api: ApiClient,
    json: bool,
}

impl App {
    pub fn new(api_url: Option<&str>, json: bool) -> Result<Self> {
        let config = Config::load()?;
        let base_url = config.resolve_base_url(api_url);
        let session = config.open_session()?;
        let api = ApiClient::new(&base_url, session).context("Failed to create API client")?;
        info!(base_url = %base_url, "Client ready");
        Ok(Self { config, api, json })
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // ===== Account =====

    pub async fn login(&mut self, username: Option<String>) -> Result<()> {
        let username = match username {
            Some(username) => username,
            None => prompt_username(self.config.last_username.as_deref())?,
        };
        if username.is_empty() {
            bail!("Username required");
        }
        let password = rpassword::prompt_password("Password: ")?;

        eprintln!("Authenticating...");
        self.api.login(&username, &password).await?;

        self.config.last_username = Some(username);
        self.save_config();

        println!("Login successful");
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.api.logout();
        println!("Logged out");
        Ok(())
    }

    pub async fn register(&self, username: String, email: String) -> Result<()> {
        let password = rpassword::prompt_password("Password: ")?;
        let confirm = rpassword::prompt_password("Confirm password: ")?;
        if password != confirm {
            bail!("Passwords do not match");
        }

        let profile = self
            .api
            .register(&NewUser { username, email, password })
            .await?;
        println!(
            "Account created for {}. Run `growthcanvas login` to sign in.",
            profile.display_name()
        );
        Ok(())
    }

    pub async fn whoami(&self) -> Result<()> {
        if !self.api.session().is_logged_in() {
            println!("Not logged in");
            return Ok(());
        }
        let user = self.api.me().await?;
        if self.json {
            return print_json(&user);
        }
        println!("{}", user.display_name());
        if let Some(ref username) = user.username {
            println!("  username: {}", username);
        }
        if let Some(ref email) = user.email {
            println!("  email:    {}", email);
        }
        Ok(())
    }

    pub fn oauth_url(&self, provider: OAuthProvider) -> Result<()> {
        println!("{}", self.api.oauth_login_url(provider));
        Ok(())
    }

    pub fn callback(&self, url: &str) -> Result<()> {
        self.api.complete_oauth_callback(url)?;
        println!("Login successful");
        Ok(())
    }

    // ===== Scenarios =====

    pub async fn list_scenarios(&self) -> Result<()> {
        let scenarios = self.api.list_scenarios().await?;
        if self.json {
            return print_json(&scenarios);
        }
        if scenarios.is_empty() {
            println!("No scenarios");
            return Ok(());
        }

        let rows: Vec<Vec<String>> = scenarios.iter().map(scenario_row).collect();
        print_table(
            &[
                Column::right("ID"),
                Column::left("Name"),
                Column::left("Default"),
                Column::left("Description"),
                Column::left("Updated"),
            ],
            &rows,
        );
        Ok(())
    }

    pub async fn show_scenario(&self, id: ScenarioId) -> Result<()> {
        let scenario = self.api.get_scenario(id).await?;
        self.print_scenario(&scenario)
    }

    pub async fn create_scenario(&self, name: String, description: Option<String>) -> Result<()> {
        let scenario = self
            .api
            .create_scenario(&ScenarioInput { name, description })
            .await?;
        self.print_scenario(&scenario)
    }

    pub async fn update_scenario(
        &self,
        id: ScenarioId,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<()> {
        let update = ScenarioUpdate {
            name,
            description,
            is_default: None,
        };
        if update.is_empty() {
            bail!("Nothing to update: pass --name and/or --description");
        }
        let scenario = self.api.update_scenario(id, &update).await?;
        self.print_scenario(&scenario)
    }

    pub async fn delete_scenario(&mut self, id: ScenarioId) -> Result<()> {
        self.api.delete_scenario(id).await?;
        if self.config.last_scenario_id == Some(id) {
            self.config.last_scenario_id = None;
            self.save_config();
        }
        println!("Deleted scenario {}", id);
        Ok(())
    }

    pub async fn set_default_scenario(&self, id: ScenarioId) -> Result<()> {
        self.api.set_default_scenario(id).await?;
        println!("Scenario {} is now the default", id);
        Ok(())
    }

    pub async fn duplicate_scenario(
        &self,
        id: ScenarioId,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<()> {
        let input = name.map(|name| ScenarioInput { name, description });
        let scenario = self.api.duplicate_scenario(id, input.as_ref()).await?;
        self.print_scenario(&scenario)
    }

    fn print_scenario(&self, scenario: &Scenario) -> Result<()> {
        if self.json {
            return print_json(scenario);
        }
        println!("{} (id {})", scenario.name, scenario.id);
        if scenario.is_default {
            println!("  default scenario");
        }
        if let Some(ref description) = scenario.description {
            println!("  {}", description);
        }
        if let Some(investment) = scenario.investment {
            println!("  investment: {}", format_currency(investment));
        }
        if let Some(updated) = scenario.updated_at.or(scenario.created_at) {
            println!("  updated:    {}", updated.format("%Y-%m-%d %H:%M UTC"));
        }
        Ok(())
    }

    // ===== Parameters =====

    pub async fn show_parameters(&self, scenario: ScenarioRef) -> Result<()> {
        let params = self.api.parameters(scenario).await?;
        if self.json {
            return print_json(&params);
        }
        for (field, value) in parameter_fields(&params)? {
            println!("{:<30} {}", field, value);
        }
        Ok(())
    }

    pub async fn set_parameters(
        &self,
        scenario: ScenarioRef,
        file: Option<PathBuf>,
        assignments: &[String],
    ) -> Result<()> {
        let params = match file {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => {
                if assignments.is_empty() {
                    bail!("Nothing to set: pass FIELD=VALUE pairs or --file");
                }
                let current = self.api.parameters(scenario).await?;
                apply_assignments(&current, assignments)?
            }
        };

        let problems = params.validate();
        if !problems.is_empty() {
            bail!("Invalid parameters:\n  {}", problems.join("\n  "));
        }

        let result = self.api.update_parameters(scenario, &params).await?;
        if !result.is_success() {
            bail!(
                "Update failed: {}",
                result.message.as_deref().unwrap_or("unknown error")
            );
        }
        println!("Parameters updated");
        if let Some(summary) = result.yearly_summary {
            if !self.json {
                print_yearly_financials(&summary);
            }
        }
        Ok(())
    }

    // ===== Projections =====

    pub async fn financials(&self, scenario: ScenarioRef, monthly: bool) -> Result<()> {
        if monthly {
            let rows = self.api.monthly_financials(scenario).await?;
            if self.json {
                return print_json(&rows);
            }
            let table: Vec<Vec<String>> = rows
                .iter()
                .map(|m| {
                    vec![
                        m.date.clone(),
                        format_currency(m.income),
                        format_currency(m.expenses),
                        format_currency(m.ebitda),
                        format_count(m.client_count),
                        format_count(m.paying_clients),
                    ]
                })
                .collect();
            print_table(
                &[
                    Column::left("Month"),
                    Column::right("Income"),
                    Column::right("Expenses"),
                    Column::right("EBITDA"),
                    Column::right("Clients"),
                    Column::right("Paying"),
                ],
                &table,
            );
        } else {
            let rows = self.api.yearly_financials(scenario).await?;
            if self.json {
                return print_json(&rows);
            }
            print_yearly_financials(&rows);
        }
        Ok(())
    }

    /// Headcount with one column per year and one row per metric
    pub async fn staff(&self, scenario: ScenarioRef) -> Result<()> {
        let rows = self.api.yearly_staff(scenario).await?;
        if self.json {
            return print_json(&rows);
        }
        if rows.is_empty() {
            println!("No staffing data");
            return Ok(());
        }

        let mut columns = vec![Column::left("Year")];
        columns.extend(rows.iter().map(|s| Column::right(s.year.to_string())));
        print_table(&columns, &staff_table(&rows));
        Ok(())
    }

    /// Monthly expenses for one year, ordered by month. Without `year` the
    /// first year in the response is shown. JSON output is unfiltered unless
    /// a year is given.
    pub async fn expenses(&self, scenario: ScenarioRef, year: Option<i32>) -> Result<()> {
        let rows = self.api.monthly_expenses(scenario).await?;
        if self.json && year.is_none() {
            return print_json(&rows);
        }

        let years = expense_years(&rows);
        let Some(selected) = select_expense_year(&years, year)? else {
            println!("No expense data");
            return Ok(());
        };
        let year_rows = expenses_for_year(&rows, selected);
        if self.json {
            return print_json(&year_rows);
        }

        let mut columns = vec![Column::left("Month")];
        columns.extend(
            MonthlyExpenses::default()
                .categories()
                .iter()
                .map(|(label, _)| Column::right(*label)),
        );
        columns.push(Column::right("Total"));

        let table: Vec<Vec<String>> = year_rows
            .iter()
            .map(|e| {
                let mut row = vec![e.date.clone()];
                row.extend(e.categories().iter().map(|(_, v)| format_currency(*v)));
                row.push(format_currency(e.total()));
                row
            })
            .collect();

        let available: Vec<String> = years.iter().map(i32::to_string).collect();
        println!("Year {} (available: {})", selected, available.join(", "));
        print_table(&columns, &table);
        Ok(())
    }

    /// Load the dashboard for `scenario`, or for the last viewed scenario
    /// (falling back to the default, then the first) when none is given.
    pub async fn dashboard(&mut self, scenario: Option<ScenarioRef>) -> Result<()> {
        let scenario = match scenario {
            Some(scenario) => scenario,
            None => {
                let scenarios = self.api.list_scenarios().await?;
                match select_scenario(&scenarios, self.config.last_scenario_id) {
                    Some(s) => ScenarioRef::Id(s.id),
                    None => ScenarioRef::Default,
                }
            }
        };

        let dashboard = ScenarioDashboard::load(&self.api, scenario).await?;

        if let ScenarioRef::Id(id) = scenario {
            if self.config.last_scenario_id != Some(id) {
                self.config.last_scenario_id = Some(id);
                self.save_config();
            }
        }

        if self.json {
            return print_json(&json!({
                "scenario": scenario.to_string(),
                "financials": dashboard.financials,
                "staff": dashboard.staff,
            }));
        }
        if dashboard.is_empty() {
            println!("No forecast data for scenario {}", scenario);
            return Ok(());
        }

        let metrics = dashboard.metrics();
        println!("Scenario {}", scenario);
        println!("  Total revenue:  {}", format_currency(metrics.total_revenue));
        println!("  Total EBITDA:   {}", format_currency(metrics.total_ebitda));
        println!("  Final clients:  {}", format_count(metrics.final_client_count));
        println!("  Final staff:    {}", format_count(metrics.final_staff_count));
        println!();

        let financials: Vec<_> = dashboard.financials_in_horizon().into_iter().cloned().collect();
        print_yearly_financials(&financials);
        Ok(())
    }
}

fn prompt_username(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match last {
        Some(last) if input.is_empty() => last.to_string(),
        _ => input.to_string(),
    })
}

/// The requested year if the data has it, else the first year present
fn select_expense_year(years: &[i32], requested: Option<i32>) -> Result<Option<i32>> {
    match requested {
        Some(year) if years.contains(&year) => Ok(Some(year)),
        Some(year) => {
            let available: Vec<String> = years.iter().map(i32::to_string).collect();
            bail!(
                "No expense data for {} (available: {})",
                year,
                if available.is_empty() { "none".to_string() } else { available.join(", ") }
            )
        }
        None => Ok(years.first().copied()),
    }
}

/// Staffing rows, one per metric, with a cell per year
fn staff_table(rows: &[YearlyStaff]) -> Vec<Vec<String>> {
    let metrics: [(&str, fn(&YearlyStaff) -> f64); 10] = [
        ("Total Clients", |s| s.client_count),
        ("Paying Clients", |s| s.paying_clients),
        ("Developers", |s| s.developer_count),
        ("Affiliates", |s| s.affiliate_count),
        ("Sales Staff", |s| s.sales_staff),
        ("Junior Developers", |s| s.jr_devs),
        ("Admin Staff", |s| s.admin_staff),
        ("CTO", |s| s.cto_count),
        ("CEO", |s| s.ceo_count),
        ("Total Staff", |s| s.total_staff),
    ];
    metrics
        .iter()
        .map(|(label, value)| {
            let mut row = vec![label.to_string()];
            row.extend(rows.iter().map(|s| format_count(value(s))));
            row
        })
        .collect()
}

fn scenario_row(scenario: &Scenario) -> Vec<String> {
    vec![
        scenario.id.to_string(),
        scenario.name.clone(),
        if scenario.is_default { "*".to_string() } else { String::new() },
        truncate_string(scenario.description.as_deref().unwrap_or(""), DESCRIPTION_WIDTH),
        scenario
            .updated_at
            .or(scenario.created_at)
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    ]
}

fn print_yearly_financials(rows: &[growthcanvas_core::models::YearlyFinancials]) {
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|f| {
            let margin = if f.income > 0.0 { f.ebitda / f.income } else { 0.0 };
            vec![
                f.year.to_string(),
                format_currency(f.income),
                format_currency(f.expenses),
                format_currency(f.ebitda),
                format_percent(margin),
                format_count(f.client_count),
                format_count(f.total_staff),
            ]
        })
        .collect();
    print_table(
        &[
            Column::left("Year"),
            Column::right("Income"),
            Column::right("Expenses"),
            Column::right("EBITDA"),
            Column::right("Margin"),
            Column::right("Clients"),
            Column::right("Staff"),
        ],
        &table,
    );
}

/// Parameters as `(field, value)` pairs, sorted by field name
fn parameter_fields(params: &GrowthParameters) -> Result<Vec<(String, String)>> {
    let Value::Object(map) = serde_json::to_value(params)? else {
        bail!("Parameters did not serialize to an object");
    };
    Ok(map
        .into_iter()
        .map(|(field, value)| {
            let shown = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (field, shown)
        })
        .collect())
}

/// Apply `field=value` assignments over `current`. Values are read as JSON,
/// falling back to a plain string, so `free_months=2`,
/// `client_growth_rates=[0.1,0.1,0.1,0.1,0.1]` and `start_date=2026-01-01`
/// all work.
fn apply_assignments(current: &GrowthParameters, assignments: &[String]) -> Result<GrowthParameters> {
    let mut value = serde_json::to_value(current)?;
    let Some(map) = value.as_object_mut() else {
        bail!("Parameters did not serialize to an object");
    };

    for assignment in assignments {
        let Some((field, raw)) = assignment.split_once('=') else {
            bail!("Expected FIELD=VALUE, got '{}'", assignment);
        };
        let field = field.trim();
        if !map.contains_key(field) {
            bail!("Unknown parameter '{}'", field);
        }
        let parsed = serde_json::from_str(raw.trim()).unwrap_or_else(|_| Value::String(raw.trim().to_string()));
        map.insert(field.to_string(), parsed);
    }

    serde_json::from_value(value).context("Parameter value has the wrong type")
}
