//! # Bakery Console Entry Point
//!
//! Command line front end for the bakery admin console.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        bakery-console                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  clap subcommand (login, products, generate-bill, open, ...)     │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  bakery_console (library)                                        │  │
//! │  │  AppState ──► Navigator / commands ──► dispatch ──► stores       │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Bakery REST API  +  session.token in the platform data dir      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr)
//! 2. Load console.toml + environment overrides
//! 3. Open the token file and boot the session from it
//! 4. Run the subcommand, print JSON on stdout

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use bakery_client::{ConsoleConfig, FileTokenStore, HttpClient, SharedToken};
use bakery_console::commands::{auth, bill, product};
use bakery_console::{init_tracing, ApiError, AppState, ErrorCode, Navigator, StateOptions};
use bakery_core::route::DASHBOARD_DAYS;
use bakery_core::{
    BillLine, BillRequest, Credentials, DateRange, Money, PaymentMethod, ProductDraft,
    Registration, Route, StockAdjustment,
};
use chrono::{Local, NaiveDate};
use clap::{ArgGroup, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

// =============================================================================
// Command Line
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "bakery-console", version, about = "Bakery inventory and billing console")]
struct Cli {
    /// Path to console.toml (defaults to the platform config directory)
    #[arg(long, global = true, env = "BAKERY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and persist the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BAKERY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account (does not sign in)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "BAKERY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and erase the persisted token
    Logout,
    /// Show the current session
    Whoami,
    /// Navigate to a console path and print the resulting screen
    Open { path: String },
    /// List products
    Products,
    /// Create a product
    ProductCreate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        /// Cost price in rupees
        #[arg(long)]
        cost: f64,
        #[arg(long, default_value_t = 0)]
        stock: i64,
        #[arg(long)]
        inactive: bool,
    },
    /// Add or remove stock
    #[command(group(ArgGroup::new("change").required(true).args(["add", "remove"])))]
    Stock {
        #[arg(long)]
        id: String,
        #[arg(long)]
        add: Option<i64>,
        #[arg(long)]
        remove: Option<i64>,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Delete a product
    ProductDelete {
        #[arg(long)]
        id: String,
    },
    /// List bills
    Bills,
    /// Show one bill
    Bill {
        #[arg(long)]
        id: String,
    },
    /// Generate a bill from `<product-id>:<quantity>` lines
    GenerateBill {
        #[arg(long = "item", required = true, value_parser = parse_line)]
        items: Vec<BillLine>,
        #[arg(long, default_value = "cash")]
        payment: PaymentMethod,
    },
    /// Show (or correct) today's income
    Income {
        /// New amount in rupees
        #[arg(long)]
        set: Option<f64>,
    },
    /// Dashboard summary
    Dashboard {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

fn parse_line(raw: &str) -> Result<BillLine, String> {
    let (id, qty) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected <product-id>:<quantity>, got '{}'", raw))?;
    let quantity = qty
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid quantity '{}': {}", qty, e))?;
    Ok(BillLine {
        product_id: id.trim().to_string(),
        quantity,
    })
}

// =============================================================================
// Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let config = ConsoleConfig::load_or_default(cli.config.clone());
    let token_store = FileTokenStore::from_config(config.session.token_path.as_deref())
        .context("Could not locate the session token file")?;
    let token = SharedToken::default();
    let client = HttpClient::new(&config, token.clone()).context("Invalid API configuration")?;
    info!(base_url = client.base_url(), "Console starting");

    let state = AppState::new(
        client,
        token,
        Arc::new(token_store),
        StateOptions::from_config(&config),
    );

    match run(&state, cli.command).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err)?);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// Validates the persisted token before a data command runs.
async fn require_session(state: &AppState<HttpClient>) -> Result<(), ApiError> {
    let mut navigator = Navigator::new(state.clone());
    navigator.boot().await;
    if state.current_session().is_authenticated() {
        Ok(())
    } else {
        Err(ApiError::new(ErrorCode::Unauthorized, "Not signed in"))
    }
}

async fn run(state: &AppState<HttpClient>, command: Command) -> Result<Value, ApiError> {
    match command {
        Command::Login { email, password } => {
            let session = auth::login(state, Credentials { email, password }).await?;
            to_json(&session)
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            auth::register(state, Registration { name, email, password }).await?;
            Ok(json!({ "registered": true }))
        }
        Command::Logout => {
            auth::logout(state)?;
            Ok(json!({ "signedOut": true }))
        }
        Command::Whoami => {
            let mut navigator = Navigator::new(state.clone());
            navigator.boot().await;
            to_json(&state.current_session())
        }
        Command::Open { path } => {
            let mut navigator = Navigator::new(state.clone());
            navigator.boot().await;
            let screen = navigator.navigate(Route::parse(&path)).await;
            Ok(json!({
                "screen": to_json(&screen)?,
                "session": to_json(&state.current_session())?,
                "products": to_json(&state.products().snapshot())?,
                "bills": to_json(&state.bills().snapshot())?,
            }))
        }
        Command::Products => {
            require_session(state).await?;
            to_json(&product::fetch_products(state).await?)
        }
        Command::ProductCreate {
            name,
            category,
            cost,
            stock,
            inactive,
        } => {
            require_session(state).await?;
            let draft = ProductDraft {
                name,
                category,
                cost_price: Money::from_decimal(cost),
                current_stock: stock,
                is_active: !inactive,
            };
            to_json(&product::create_product(state, draft).await?)
        }
        Command::Stock {
            id,
            add,
            remove,
            reason,
        } => {
            require_session(state).await?;
            product::fetch_products(state).await?;
            let mut adjustment = match (add, remove) {
                (Some(quantity), _) => StockAdjustment::add(quantity),
                (None, Some(quantity)) => StockAdjustment::remove(quantity),
                (None, None) => return Err(ApiError::new(ErrorCode::ValidationError, "quantity is required")),
            };
            adjustment.reason = reason;
            to_json(&product::adjust_stock(state, &id, adjustment).await?)
        }
        Command::ProductDelete { id } => {
            require_session(state).await?;
            product::delete_product(state, &id).await?;
            Ok(json!({ "deleted": id }))
        }
        Command::Bills => {
            require_session(state).await?;
            to_json(&bill::fetch_bills(state).await?)
        }
        Command::Bill { id } => {
            require_session(state).await?;
            to_json(&bill::fetch_bill(state, &id).await?)
        }
        Command::GenerateBill { items, payment } => {
            require_session(state).await?;
            let request = BillRequest {
                items,
                payment_method: payment,
            };
            let generated = bill::generate_bill(state, request).await?;
            Ok(json!({
                "bill": to_json(&generated)?,
                "todayIncome": to_json(&state.bills().read(|s| s.today_income))?,
            }))
        }
        Command::Income { set } => {
            require_session(state).await?;
            let amount = match set {
                Some(amount) => bill::update_today_income(state, Money::from_decimal(amount)).await?,
                None => bill::fetch_today_income(state).await?,
            };
            Ok(json!({ "income": to_json(&amount)? }))
        }
        Command::Dashboard { from, to } => {
            require_session(state).await?;
            let today = Local::now().date_naive();
            let range = match (from, to) {
                (None, None) => DateRange::last_days(today, DASHBOARD_DAYS),
                (from, to) => {
                    let end = to.unwrap_or(today);
                    DateRange {
                        start: from.unwrap_or_else(|| DateRange::last_days(end, DASHBOARD_DAYS).start),
                        end,
                    }
                }
            };
            let summary = product::fetch_inventory_value(state).await?;
            let categories = product::fetch_category_values(state).await?;
            let income = product::fetch_income_stats(state, None).await?;
            let daily = product::fetch_daily_income(state, range).await?;
            Ok(json!({
                "inventory": to_json(&summary)?,
                "categories": to_json(&categories)?,
                "incomeStats": to_json(&income)?,
                "dailyIncome": to_json(&daily)?,
                "rangeTotal": to_json(&daily.total())?,
            }))
        }
    }
}
