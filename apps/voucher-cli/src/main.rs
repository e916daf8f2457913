//! # Voucher Desk Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Voucher Desk                                     │
//! │                                                                         │
//! │  voucher --username clerk invoice generate 7d2c... 91fe...              │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    voucher_cli (this crate)                      │  │
//! │  │                                                                  │  │
//! │  │  main.rs ────► Runtime, exit status                             │  │
//! │  │  lib.rs ─────► Logging, config, database, session, dispatch     │  │
//! │  │  commands/ ──► add_voucher, generate_invoice, aging_report, ... │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         SQLite Database                          │  │
//! │  │  vouchers.db (local file, WAL mode)                              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    match voucher_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
