//! GrowthCanvas CLI - command-line access to the forecasting service.
//!
//! Logs in against the backend, manages scenarios and their growth
//! parameters, and prints the resulting projections as tables.

mod app;
mod output;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use growthcanvas_core::config::API_URL_ENV;
use growthcanvas_core::models::{OAuthProvider, ScenarioId, ScenarioRef};
use growthcanvas_core::ApiError;

use app::App;

#[derive(Debug, Parser)]
#[command(name = "growthcanvas", version, about = "GrowthCanvas forecasting client")]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in with a username and password
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
    },
    /// Show the logged-in user
    Whoami,
    /// Print the browser URL that starts a third-party login
    OauthUrl {
        #[arg(value_parser = parse_provider)]
        provider: OAuthProvider,
    },
    /// Finish a third-party login from the redirect URL
    Callback { url: String },
    /// List scenarios
    Scenarios,
    /// Manage a single scenario
    #[command(subcommand)]
    Scenario(ScenarioCommand),
    /// Show or change a scenario's growth parameters
    #[command(subcommand)]
    Params(ParamsCommand),
    /// Projected income, expenses and EBITDA
    Financials {
        scenario: ScenarioRef,
        #[arg(long)]
        monthly: bool,
    },
    /// Projected headcount by role
    Staff { scenario: ScenarioRef },
    /// Monthly expense breakdown for one year
    Expenses {
        scenario: ScenarioRef,
        /// Year to show; the first projected year when omitted
        #[arg(long)]
        year: Option<i32>,
    },
    /// Headline metrics with yearly financials and staffing
    Dashboard {
        /// Scenario id or `default`; the last viewed scenario when omitted
        scenario: Option<ScenarioRef>,
    },
}

#[derive(Debug, Subcommand)]
enum ScenarioCommand {
    Show { id: ScenarioId },
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    Update {
        id: ScenarioId,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    Delete { id: ScenarioId },
    SetDefault { id: ScenarioId },
    Duplicate {
        id: ScenarioId,
        #[command(flatten)]
        copy: CopyArgs,
    },
}

#[derive(Debug, Args)]
struct CopyArgs {
    /// Name for the copy; the backend picks one when omitted
    #[arg(short, long)]
    name: Option<String>,
    #[arg(short, long, requires = "name")]
    description: Option<String>,
}

#[derive(Debug, Subcommand)]
enum ParamsCommand {
    Show { scenario: ScenarioRef },
    /// Change parameters with `field=value` pairs or replace them from a JSON file
    Set {
        scenario: ScenarioRef,
        #[arg(long, conflicts_with = "assignments")]
        file: Option<PathBuf>,
        #[arg(value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
    },
}

fn parse_provider(s: &str) -> Result<OAuthProvider, String> {
    OAuthProvider::from_slug(s)
        .ok_or_else(|| format!("unknown provider '{}' (expected google, github or linkedin)", s))
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();
    debug!(command = ?cli.command, "Starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut app = App::new(cli.api_url.as_deref(), cli.json)?;

    match cli.command {
        Command::Login { username } => app.login(username).await,
        Command::Logout => app.logout(),
        Command::Register { username, email } => app.register(username, email).await,
        Command::Whoami => app.whoami().await,
        Command::OauthUrl { provider } => app.oauth_url(provider),
        Command::Callback { url } => app.callback(&url),
        Command::Scenarios => app.list_scenarios().await,
        Command::Scenario(cmd) => match cmd {
            ScenarioCommand::Show { id } => app.show_scenario(id).await,
            ScenarioCommand::Create { name, description } => {
                app.create_scenario(name, description).await
            }
            ScenarioCommand::Update { id, name, description } => {
                app.update_scenario(id, name, description).await
            }
            ScenarioCommand::Delete { id } => app.delete_scenario(id).await,
            ScenarioCommand::SetDefault { id } => app.set_default_scenario(id).await,
            ScenarioCommand::Duplicate { id, copy } => {
                app.duplicate_scenario(id, copy.name, copy.description).await
            }
        },
        Command::Params(cmd) => match cmd {
            ParamsCommand::Show { scenario } => app.show_parameters(scenario).await,
            ParamsCommand::Set { scenario, file, assignments } => {
                app.set_parameters(scenario, file, &assignments).await
            }
        },
        Command::Financials { scenario, monthly } => app.financials(scenario, monthly).await,
        Command::Staff { scenario } => app.staff(scenario).await,
        Command::Expenses { scenario, year } => app.expenses(scenario, year).await,
        Command::Dashboard { scenario } => app.dashboard(scenario).await,
    }
}

/// Print an error for the user. API errors get their user-facing message;
/// anything else prints its context chain.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) => {
            eprintln!("Error: {}", api_err.user_message());
            if api_err.requires_login() && !matches!(api_err, ApiError::InvalidCredentials(_)) {
                eprintln!("Run `growthcanvas login` to sign in again.");
            }
        }
        None => eprintln!("Error: {:#}", err),
    }
}
