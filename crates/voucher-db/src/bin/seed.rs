//! # Sample Voucher Generator
//!
//! Populates a development database with vouchers spread over the last
//! four months, so the aging report and invoicing have something to show.
//!
//! ## Usage
//! ```bash
//! # Generate 200 vouchers (default)
//! cargo run -p voucher-db --bin seed
//!
//! # Generate custom amount into a specific file
//! cargo run -p voucher-db --bin seed -- --count 1000 --db ./data/vouchers.db
//! ```
//!
//! Registries, tax settings and the admin account are seeded first, the same
//! way the application does on first start. Each voucher gets:
//! - Receipt: `SEED-{index:05}`
//! - A registered restaurant and airline (round robin)
//! - Subtotal: $8.00 - $47.99
//! - Date: 0 - 119 days ago

use chrono::{Duration, Utc};
use std::env;
use voucher_core::{Money, NewVoucher, VoucherDraft};
use voucher_db::{Database, DbConfig, SeedDefaults};

const DEFAULT_COUNT: usize = 200;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = DEFAULT_COUNT;
    let mut db_path = String::from("./vouchers_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Voucher Desk Sample Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of vouchers to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./vouchers_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Voucher Desk Sample Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!("Vouchers: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");

    db.ensure_seeded(&SeedDefaults::default()).await?;
    println!("✓ Registries, tax settings and admin ready");

    let existing = db.vouchers().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} vouchers", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let restaurants = db.registries().restaurants().await?;
    let airlines = db.registries().airlines().await?;
    let taxes = db.tax_settings().load(&SeedDefaults::default().tax).await?;

    let airline_names: Vec<String> = airlines.iter().map(|(name, _)| name.to_string()).collect();
    if restaurants.is_empty() || airline_names.is_empty() {
        println!("⚠ Registries are empty; nothing to generate");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let vouchers: Vec<NewVoucher> = (0..count)
        .map(|seed| {
            generate_draft(seed, restaurants.names(), &airline_names).price(&taxes, &airlines)
        })
        .collect();

    let inserted = db.vouchers().insert_many(&vouchers).await?;

    println!();
    println!(
        "✓ Generated {} vouchers in {:?}",
        inserted.len(),
        start.elapsed()
    );
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one voucher draft from a seed index.
fn generate_draft(seed: usize, restaurants: &[String], airlines: &[String]) -> VoucherDraft {
    let days_ago = ((seed * 37) % 120) as i64;
    let subtotal_cents = 800 + ((seed * 173) % 4000) as i64;

    VoucherDraft {
        date: Utc::now().date_naive() - Duration::days(days_ago),
        receipt: format!("SEED-{:05}", seed),
        restaurant: restaurants[seed % restaurants.len()].clone(),
        airline: airlines[(seed / restaurants.len()) % airlines.len()].clone(),
        subtotal: Money::from_cents(subtotal_cents),
    }
}
