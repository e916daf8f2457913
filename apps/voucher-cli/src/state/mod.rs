//! # Application State
//!
//! ```text
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐
//! │    DbState       │ │    AppConfig     │ │    Session           │
//! │                  │ │                  │ │                      │
//! │  • Database pool │ │  • DB path       │ │  • User id, name     │
//! │  • Repositories  │ │  • Export dir    │ │  • Role              │
//! │  • Tax rates     │ │  • Pool size     │ │                      │
//! └──────────────────┘ └──────────────────┘ └──────────────────────┘
//! ```
//! Each command takes only the pieces it needs.

pub mod config;
pub mod db;
pub mod session;

pub use config::{AppConfig, ConfigError};
pub use db::DbState;
pub use session::authenticate;
