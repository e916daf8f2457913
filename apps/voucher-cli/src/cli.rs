//! Command-line arguments.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use voucher_core::{Role, VoucherFilter, VoucherStatus};

/// Airline meal-voucher reimbursement desk.
#[derive(Debug, Parser)]
#[command(name = "voucher", version, about)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Operator username
    #[arg(long, short = 'u', global = true, env = "VOUCHER_USERNAME")]
    pub username: Option<String>,

    /// Operator password
    #[arg(long, short = 'p', global = true, env = "VOUCHER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enter, list, archive, import and export vouchers
    #[command(subcommand)]
    Voucher(VoucherCommand),

    /// Bill vouchers to an airline
    #[command(subcommand)]
    Invoice(InvoiceCommand),

    /// Reports over unbilled vouchers
    #[command(subcommand)]
    Report(ReportCommand),

    /// Registered restaurants
    #[command(subcommand)]
    Restaurant(RestaurantCommand),

    /// Registered airlines and their invoice codes
    #[command(subcommand)]
    Airline(AirlineCommand),

    /// TPS/TVQ rates
    #[command(subcommand)]
    Tax(TaxCommand),

    /// User accounts
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Debug, Subcommand)]
pub enum VoucherCommand {
    /// Add a voucher
    Add {
        /// Receipt date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Receipt number
        #[arg(long)]
        receipt: String,
        #[arg(long)]
        restaurant: String,
        #[arg(long)]
        airline: String,
        /// Pre-tax amount, e.g. 12.50
        #[arg(long)]
        subtotal: String,
    },

    /// List active vouchers
    List(FilterArgs),

    /// Move a voucher to the archive
    Archive { id: String },

    /// List archived vouchers
    Archived,

    /// Record payment of an invoiced voucher
    MarkPaid { id: String },

    /// Import vouchers from a CSV file
    Import { file: PathBuf },

    /// Export all vouchers to AllVouchers.csv
    Export,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Airline name contains (case-insensitive)
    #[arg(long)]
    pub airline: Option<String>,

    /// Restaurant name (exact)
    #[arg(long)]
    pub restaurant: Option<String>,

    /// Receipt number contains
    #[arg(long)]
    pub receipt: Option<String>,

    /// Earliest receipt date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest receipt date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Unbilled, Invoiced or Paid
    #[arg(long)]
    pub status: Option<VoucherStatus>,
}

impl From<FilterArgs> for VoucherFilter {
    fn from(args: FilterArgs) -> Self {
        VoucherFilter {
            airline: args.airline,
            restaurant: args.restaurant,
            receipt: args.receipt,
            from: args.from,
            to: args.to,
            status: args.status,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum InvoiceCommand {
    /// Generate one invoice for the given vouchers and mark them invoiced
    Generate {
        /// Voucher ids (same restaurant and airline)
        ids: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Unbilled totals by age
    Aging {
        /// Age reference day (default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Also write AgingReport.csv
        #[arg(long)]
        export: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum RestaurantCommand {
    List,
    Add { name: String },
}

#[derive(Debug, Subcommand)]
pub enum AirlineCommand {
    List,
    /// Register an airline with a three-character code
    Add { name: String, code: String },
}

#[derive(Debug, Subcommand)]
pub enum TaxCommand {
    Show,
    /// Replace both rates (percent)
    Set {
        #[arg(long)]
        tps: f64,
        #[arg(long)]
        tvq: f64,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    List,
    /// Create an account
    Add {
        username: String,
        /// Initial password (8+ chars, upper, lower and digit)
        #[arg(value_name = "PASSWORD")]
        new_password: String,
        /// admin or user
        #[arg(long, default_value = "user")]
        role: Role,
    },
    /// Change your own password
    Passwd {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
}
