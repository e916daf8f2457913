//! # Commands Module
//!
//! One function per operator action.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── voucher.rs   ◄─── Entry, listing, archive, mark paid, import/export
//! ├── invoice.rs   ◄─── Invoice batch generation
//! ├── report.rs    ◄─── Aging report
//! ├── registry.rs  ◄─── Restaurants and airlines
//! ├── tax.rs       ◄─── TPS/TVQ rates
//! └── user.rs      ◄─── Accounts and password change
//! ```
//!
//! ## How Commands Work
//! ```text
//! voucher invoice generate 7d2c... 91fe...
//!         │
//!         │ (clap parse, authenticate)
//!         ▼
//! pub async fn generate_invoice(
//!     db: &DbState,          ◄── Opened once per invocation
//!     config: &AppConfig,    ◄── Only commands that write files
//!     session: &Session,     ◄── Capability checked first
//!     ids: &[String],        ◄── From arguments
//! ) -> Result<InvoiceResponse, ApiError>
//!         │
//!         ▼
//! stdout: Display text, or JSON with --json
//! ```

pub mod invoice;
pub mod registry;
pub mod report;
pub mod tax;
pub mod user;
pub mod voucher;

#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::TempDir;

    use super::voucher::{add_voucher, AddVoucherInput};
    use crate::state::{AppConfig, DbState};
    use voucher_core::{Role, Session, Voucher};
    use voucher_db::{Database, DbConfig, SeedDefaults};

    /// Seeded in-memory store, a scratch export directory, and one session
    /// per role.
    pub struct TestApp {
        pub db: DbState,
        pub config: AppConfig,
        pub export_dir: TempDir,
        pub admin: Session,
        pub clerk: Session,
    }

    impl TestApp {
        pub async fn new() -> Self {
            let db = Database::new(DbConfig::in_memory()).await.unwrap();
            db.ensure_seeded(&SeedDefaults::default()).await.unwrap();

            let admin = db.users().get_by_username("admin").await.unwrap().unwrap();
            let clerk = db.users().create("clerk", "Clerk123", Role::User).await.unwrap();

            let export_dir = tempfile::tempdir().unwrap();
            let config = AppConfig::with_paths(":memory:", export_dir.path());

            TestApp {
                db: DbState::new(db),
                config,
                export_dir,
                admin: Session::from_user(&admin),
                clerk: Session::from_user(&clerk),
            }
        }
    }

    pub fn input(
        date: &str,
        receipt: &str,
        restaurant: &str,
        airline: &str,
        subtotal: &str,
    ) -> AddVoucherInput {
        AddVoucherInput {
            date: date.to_string(),
            receipt: receipt.to_string(),
            restaurant: restaurant.to_string(),
            airline: airline.to_string(),
            subtotal: subtotal.to_string(),
        }
    }

    /// Adds a voucher as the clerk, panicking on failure.
    pub async fn add(
        app: &TestApp,
        date: &str,
        receipt: &str,
        restaurant: &str,
        airline: &str,
        subtotal: &str,
    ) -> Voucher {
        add_voucher(
            &app.db,
            &app.clerk,
            input(date, receipt, restaurant, airline, subtotal),
        )
        .await
        .unwrap()
        .voucher
    }
}
