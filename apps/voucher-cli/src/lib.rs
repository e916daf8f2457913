//! # Voucher Desk CLI Library
//!
//! Core library for the `voucher` command-line application.
//!
//! ## Module Organization
//! ```text
//! voucher_cli/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── state/
//! │   ├── config.rs   ◄─── AppConfig from environment
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── session.rs  ◄─── Authentication
//! ├── commands/       ◄─── One function per operator action
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments ─────────────────────────────────────────────────► │
//! │  2. Initialize logging (stderr, RUST_LOG) ───────────────────────────► │
//! │  3. Load AppConfig from VOUCHER_* variables ─────────────────────────► │
//! │  4. Open database, run migrations, seed empty tables ────────────────► │
//! │  5. Authenticate operator → Session ─────────────────────────────────► │
//! │  6. Run command, print Display text or JSON on stdout ───────────────► │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use clap::Parser;
use serde::Serialize;
use std::fmt::Display;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{
    AirlineCommand, Cli, Command, InvoiceCommand, ReportCommand, RestaurantCommand, TaxCommand,
    UserCommand, VoucherCommand,
};
use commands::voucher::AddVoucherInput;
use error::ApiError;
use state::{AppConfig, DbState};
use voucher_core::Session;

/// Parses arguments and runs one command.
///
/// Command failures are printed here (as JSON with `--json`) and returned so
/// the process exits non-zero.
pub async fn run() -> anyhow::Result<()> {
    let Cli {
        json,
        username,
        password,
        command,
    } = Cli::parse();
    init_tracing();

    let config = AppConfig::from_env()?;
    debug!(?config, "Configuration loaded");

    let db = DbState::open(&config).await.map_err(ApiError::from)?;

    let result = async {
        let session = state::authenticate(&db, username.as_deref(), password.as_deref()).await?;
        dispatch(&db, &config, &session, command, json).await
    }
    .await;

    db.inner().close().await;

    if let Err(err) = &result {
        if json {
            println!("{}", serde_json::to_string_pretty(err)?);
        }
    }
    Ok(result?)
}

/// Runs the command and prints its result.
async fn dispatch(
    db: &DbState,
    config: &AppConfig,
    session: &Session,
    command: Command,
    json: bool,
) -> Result<(), ApiError> {
    info!(username = %session.username, "Running command");

    match command {
        Command::Voucher(cmd) => match cmd {
            VoucherCommand::Add {
                date,
                receipt,
                restaurant,
                airline,
                subtotal,
            } => {
                let input = AddVoucherInput {
                    date,
                    receipt,
                    restaurant,
                    airline,
                    subtotal,
                };
                emit(json, &commands::voucher::add_voucher(db, session, input).await?)
            }
            VoucherCommand::List(filter) => emit(
                json,
                &commands::voucher::list_vouchers(db, session, filter.into()).await?,
            ),
            VoucherCommand::Archive { id } => {
                emit(json, &commands::voucher::archive_voucher(db, session, &id).await?)
            }
            VoucherCommand::Archived => {
                emit(json, &commands::voucher::list_archived(db, session).await?)
            }
            VoucherCommand::MarkPaid { id } => {
                emit(json, &commands::voucher::mark_paid(db, session, &id).await?)
            }
            VoucherCommand::Import { file } => {
                emit(json, &commands::voucher::import_vouchers(db, session, &file).await?)
            }
            VoucherCommand::Export => emit(
                json,
                &commands::voucher::export_vouchers(db, config, session).await?,
            ),
        },

        Command::Invoice(InvoiceCommand::Generate { ids }) => emit(
            json,
            &commands::invoice::generate_invoice(db, config, session, &ids).await?,
        ),

        Command::Report(ReportCommand::Aging { as_of, export }) => emit(
            json,
            &commands::report::aging_report(db, config, session, as_of, export).await?,
        ),

        Command::Restaurant(cmd) => match cmd {
            RestaurantCommand::List => {
                emit(json, &commands::registry::list_restaurants(db, session).await?)
            }
            RestaurantCommand::Add { name } => {
                emit(json, &commands::registry::add_restaurant(db, session, &name).await?)
            }
        },

        Command::Airline(cmd) => match cmd {
            AirlineCommand::List => {
                emit(json, &commands::registry::list_airlines(db, session).await?)
            }
            AirlineCommand::Add { name, code } => emit(
                json,
                &commands::registry::add_airline(db, session, &name, &code).await?,
            ),
        },

        Command::Tax(cmd) => match cmd {
            TaxCommand::Show => emit(json, &commands::tax::show_taxes(db, session).await?),
            TaxCommand::Set { tps, tvq } => {
                emit(json, &commands::tax::set_taxes(db, session, tps, tvq).await?)
            }
        },

        Command::User(cmd) => match cmd {
            UserCommand::List => emit(json, &commands::user::list_users(db, session).await?),
            UserCommand::Add {
                username,
                new_password,
                role,
            } => emit(
                json,
                &commands::user::add_user(db, session, &username, &new_password, role).await?,
            ),
            UserCommand::Passwd { old, new, confirm } => emit(
                json,
                &commands::user::change_password(db, session, &old, &new, &confirm).await?,
            ),
        },
    }
}

/// Prints a command result on stdout.
fn emit<T: Serialize + Display>(json: bool, output: &T) -> Result<(), ApiError> {
    if json {
        let text = serde_json::to_string_pretty(output)
            .map_err(|e| ApiError::internal(format!("Could not encode output: {}", e)))?;
        println!("{}", text);
    } else {
        println!("{}", output);
    }
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout carries only command output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=voucher=trace` - Show trace for voucher crates only
/// - Default: `info,voucher=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,voucher=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
