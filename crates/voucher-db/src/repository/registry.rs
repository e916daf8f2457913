//! # Registry Repository
//!
//! Restaurants and airlines. Both tables are append-only: entries are
//! loaded, added and seeded, never renamed or removed.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use voucher_core::{AirlineRegistry, RestaurantRegistry};

/// Repository for the restaurant and airline registries.
#[derive(Debug, Clone)]
pub struct RegistryRepository {
    pool: SqlitePool,
}

impl RegistryRepository {
    /// Creates a new RegistryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegistryRepository { pool }
    }

    /// Loads restaurants in registration order.
    pub async fn restaurants(&self) -> DbResult<RestaurantRegistry> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM restaurants ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(RestaurantRegistry::new(names))
    }

    /// Loads the airline name → code map.
    pub async fn airlines(&self) -> DbResult<AirlineRegistry> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT name, code FROM airlines")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }

    /// Registers a restaurant.
    ///
    /// ## Errors
    /// UniqueViolation if the name is already registered.
    pub async fn add_restaurant(&self, name: &str) -> DbResult<()> {
        sqlx::query("INSERT INTO restaurants (name, created_at) VALUES (?1, ?2)")
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(name))?;

        info!(name = %name, "Restaurant registered");
        Ok(())
    }

    /// Registers an airline with its 3-character code.
    ///
    /// ## Errors
    /// UniqueViolation if the name is already registered.
    pub async fn add_airline(&self, name: &str, code: &str) -> DbResult<()> {
        sqlx::query("INSERT INTO airlines (name, code, created_at) VALUES (?1, ?2, ?3)")
            .bind(name)
            .bind(code)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(name))?;

        info!(name = %name, code = %code, "Airline registered");
        Ok(())
    }

    /// Fills the restaurant table if it is empty. Returns true if it seeded.
    pub async fn ensure_restaurants(&self, names: &[String]) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM restaurants")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(false);
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        for name in names {
            sqlx::query("INSERT INTO restaurants (name, created_at) VALUES (?1, ?2)")
                .bind(name)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!(count = names.len(), "Seeded restaurants");
        Ok(true)
    }

    /// Fills the airline table if it is empty. Returns true if it seeded.
    pub async fn ensure_airlines(&self, airlines: &[(String, String)]) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM airlines")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(false);
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        for (name, code) in airlines {
            sqlx::query("INSERT INTO airlines (name, code, created_at) VALUES (?1, ?2, ?3)")
                .bind(name)
                .bind(code)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!(count = airlines.len(), "Seeded airlines");
        Ok(true)
    }
}
