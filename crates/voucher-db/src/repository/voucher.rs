//! # Voucher Repository
//!
//! Database operations for active and archived vouchers.
//!
//! ## Voucher Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Voucher Lifecycle                                 │
//! │                                                                         │
//! │  1. INSERT                                                             │
//! │     └── insert() / insert_many() → Voucher { status: Unbilled }        │
//! │         (UNIQUE receipt + restaurant)                                  │
//! │                                                                         │
//! │  2. INVOICE                                                            │
//! │     └── mark_invoiced(ids) → all Invoiced, or none (one transaction)   │
//! │                                                                         │
//! │  3. (OPTIONAL) SETTLE                                                  │
//! │     └── mark_paid(id) → Invoiced → Paid                                │
//! │                                                                         │
//! │  ANY TIME: ARCHIVE                                                     │
//! │     └── archive(id) → copied to archived_vouchers, removed from        │
//! │         vouchers (one transaction)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use voucher_core::{ArchivedVoucher, NewVoucher, Voucher, VoucherStatus};

/// Repository for voucher database operations.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    pool: SqlitePool,
}

impl VoucherRepository {
    /// Creates a new VoucherRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VoucherRepository { pool }
    }

    /// Lists active vouchers, newest receipt date first.
    pub async fn list(&self) -> DbResult<Vec<Voucher>> {
        let vouchers = sqlx::query_as::<_, Voucher>(
            r#"
            SELECT
                id, date, receipt, restaurant, airline,
                subtotal_cents, tps_cents, tvq_cents, total_cents,
                invoice_number, status, created_at, updated_at
            FROM vouchers
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(vouchers)
    }

    /// Gets an active voucher by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Voucher>> {
        let voucher = sqlx::query_as::<_, Voucher>(
            r#"
            SELECT
                id, date, receipt, restaurant, airline,
                subtotal_cents, tps_cents, tvq_cents, total_cents,
                invoice_number, status, created_at, updated_at
            FROM vouchers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(voucher)
    }

    /// Gets several vouchers, in the order of `ids`.
    ///
    /// Fails with NotFound on the first id that has no active voucher.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Voucher>> {
        let mut vouchers = Vec::with_capacity(ids.len());
        for id in ids {
            let voucher = self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::not_found("Voucher", id))?;
            vouchers.push(voucher);
        }
        Ok(vouchers)
    }

    /// Inserts a priced voucher as Unbilled.
    ///
    /// ## Errors
    /// UniqueViolation if the restaurant already has this receipt.
    pub async fn insert(&self, new: &NewVoucher) -> DbResult<Voucher> {
        let voucher = build_voucher(new);
        debug!(id = %voucher.id, receipt = %voucher.receipt, restaurant = %voucher.restaurant, "Inserting voucher");

        insert_row(&voucher)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_receipt(e.into(), &voucher))?;

        Ok(voucher)
    }

    /// Inserts several vouchers in one transaction. All or nothing.
    pub async fn insert_many(&self, news: &[NewVoucher]) -> DbResult<Vec<Voucher>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut inserted = Vec::with_capacity(news.len());
        for new in news {
            let voucher = build_voucher(new);
            insert_row(&voucher)
                .execute(&mut *tx)
                .await
                .map_err(|e| duplicate_receipt(e.into(), &voucher))?;
            inserted.push(voucher);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(count = inserted.len(), "Vouchers inserted");
        Ok(inserted)
    }

    /// Marks Unbilled vouchers as Invoiced in one transaction.
    ///
    /// If any id is missing or no longer Unbilled, nothing changes and the
    /// call fails with NotFound for that id.
    pub async fn mark_invoiced(&self, ids: &[String]) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for id in ids {
            let result = sqlx::query(
                r#"
                UPDATE vouchers
                SET status = ?1, updated_at = ?2
                WHERE id = ?3 AND status = ?4
                "#,
            )
            .bind(VoucherStatus::Invoiced)
            .bind(now)
            .bind(id)
            .bind(VoucherStatus::Unbilled)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping tx rolls back the updates made so far
                return Err(DbError::not_found("Unbilled voucher", id));
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(count = ids.len(), "Vouchers marked invoiced");
        Ok(())
    }

    /// Moves an Invoiced voucher to Paid. Returns false if the voucher is not
    /// currently Invoiced.
    pub async fn mark_paid(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vouchers
            SET status = ?1, updated_at = ?2
            WHERE id = ?3 AND status = ?4
            "#,
        )
        .bind(VoucherStatus::Paid)
        .bind(Utc::now())
        .bind(id)
        .bind(VoucherStatus::Invoiced)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Moves a voucher into `archived_vouchers`.
    ///
    /// ## Atomicity
    /// Copy and delete run in one transaction: the voucher is never in both
    /// tables, nor in neither.
    pub async fn archive(&self, id: &str) -> DbResult<ArchivedVoucher> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let voucher = sqlx::query_as::<_, Voucher>(
            r#"
            SELECT
                id, date, receipt, restaurant, airline,
                subtotal_cents, tps_cents, tvq_cents, total_cents,
                invoice_number, status, created_at, updated_at
            FROM vouchers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Voucher", id))?;

        let archived_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO archived_vouchers (
                id, date, receipt, restaurant, airline,
                subtotal_cents, tps_cents, tvq_cents, total_cents,
                invoice_number, status, created_at, updated_at, archived_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13, ?14
            )
            "#,
        )
        .bind(&voucher.id)
        .bind(voucher.date)
        .bind(&voucher.receipt)
        .bind(&voucher.restaurant)
        .bind(&voucher.airline)
        .bind(voucher.subtotal_cents)
        .bind(voucher.tps_cents)
        .bind(voucher.tvq_cents)
        .bind(voucher.total_cents)
        .bind(&voucher.invoice_number)
        .bind(voucher.status)
        .bind(voucher.created_at)
        .bind(voucher.updated_at)
        .bind(archived_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM vouchers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, receipt = %voucher.receipt, "Voucher archived");
        Ok(ArchivedVoucher {
            voucher,
            archived_at,
        })
    }

    /// Lists archived vouchers, most recently archived first.
    pub async fn list_archived(&self) -> DbResult<Vec<ArchivedVoucher>> {
        let archived = sqlx::query_as::<_, ArchivedVoucher>(
            r#"
            SELECT
                id, date, receipt, restaurant, airline,
                subtotal_cents, tps_cents, tvq_cents, total_cents,
                invoice_number, status, created_at, updated_at, archived_at
            FROM archived_vouchers
            ORDER BY archived_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(archived)
    }

    /// Counts active vouchers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vouchers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn build_voucher(new: &NewVoucher) -> Voucher {
    let now = Utc::now();
    Voucher {
        id: Uuid::new_v4().to_string(),
        date: new.date,
        receipt: new.receipt.clone(),
        restaurant: new.restaurant.clone(),
        airline: new.airline.clone(),
        subtotal_cents: new.subtotal_cents,
        tps_cents: new.tps_cents,
        tvq_cents: new.tvq_cents,
        total_cents: new.total_cents,
        invoice_number: new.invoice_number.clone(),
        status: VoucherStatus::Unbilled,
        created_at: now,
        updated_at: now,
    }
}

fn insert_row(
    voucher: &Voucher,
) -> sqlx::query::Query<'_, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(
        r#"
        INSERT INTO vouchers (
            id, date, receipt, restaurant, airline,
            subtotal_cents, tps_cents, tvq_cents, total_cents,
            invoice_number, status, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9,
            ?10, ?11, ?12, ?13
        )
        "#,
    )
    .bind(&voucher.id)
    .bind(voucher.date)
    .bind(&voucher.receipt)
    .bind(&voucher.restaurant)
    .bind(&voucher.airline)
    .bind(voucher.subtotal_cents)
    .bind(voucher.tps_cents)
    .bind(voucher.tvq_cents)
    .bind(voucher.total_cents)
    .bind(&voucher.invoice_number)
    .bind(voucher.status)
    .bind(voucher.created_at)
    .bind(voucher.updated_at)
}

fn duplicate_receipt(err: DbError, voucher: &Voucher) -> DbError {
    err.with_duplicate_value(format!("{} @ {}", voucher.receipt, voucher.restaurant))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;

    async fn repo() -> VoucherRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().vouchers()
    }

    fn new_voucher(receipt: &str, restaurant: &str, day: u32) -> NewVoucher {
        NewVoucher {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            receipt: receipt.to_string(),
            restaurant: restaurant.to_string(),
            airline: "Air Canada".to_string(),
            subtotal_cents: 10_000,
            tps_cents: 500,
            tvq_cents: 998,
            total_cents: 11_498,
            invoice_number: "SUBACD0324".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repo().await;
        let inserted = repo.insert(&new_voucher("1", "Subway", 15)).await.unwrap();

        assert_eq!(inserted.status, VoucherStatus::Unbilled);
        let fetched = repo.get_by_id(&inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched.receipt, "1");
        assert_eq!(fetched.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(fetched.total_cents, 11_498);
        assert_eq!(fetched.invoice_number, "SUBACD0324");
    }

    #[tokio::test]
    async fn test_duplicate_receipt_rejected() {
        let repo = repo().await;
        repo.insert(&new_voucher("1", "Subway", 15)).await.unwrap();

        let err = repo.insert(&new_voucher("1", "Subway", 16)).await.unwrap_err();
        assert!(err.is_duplicate());
        assert!(err.to_string().contains("1 @ Subway"));

        // Same receipt at another restaurant is fine
        repo.insert(&new_voucher("1", "Paramount", 16)).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let repo = repo().await;
        repo.insert(&new_voucher("3", "Subway", 1)).await.unwrap();

        let batch = vec![new_voucher("2", "Subway", 2), new_voucher("3", "Subway", 3)];
        assert!(repo.insert_many(&batch).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_orders_by_date_desc() {
        let repo = repo().await;
        repo.insert_many(&[
            new_voucher("a", "Subway", 1),
            new_voucher("b", "Subway", 20),
            new_voucher("c", "Subway", 10),
        ])
        .await
        .unwrap();

        let receipts: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.receipt)
            .collect();
        assert_eq!(receipts, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_get_many_preserves_order_and_reports_missing() {
        let repo = repo().await;
        let a = repo.insert(&new_voucher("a", "Subway", 1)).await.unwrap();
        let b = repo.insert(&new_voucher("b", "Subway", 2)).await.unwrap();

        let found = repo.get_many(&[b.id.clone(), a.id.clone()]).await.unwrap();
        assert_eq!(found[0].id, b.id);
        assert_eq!(found[1].id, a.id);

        let err = repo
            .get_many(&[a.id.clone(), "missing".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_mark_invoiced_rolls_back_on_missing_id() {
        let repo = repo().await;
        let a = repo.insert(&new_voucher("a", "Subway", 1)).await.unwrap();

        let err = repo
            .mark_invoiced(&[a.id.clone(), "missing".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        let a_now = repo.get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(a_now.status, VoucherStatus::Unbilled);

        repo.mark_invoiced(&[a.id.clone()]).await.unwrap();
        let a_now = repo.get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(a_now.status, VoucherStatus::Invoiced);
    }

    #[tokio::test]
    async fn test_mark_paid_requires_invoiced() {
        let repo = repo().await;
        let a = repo.insert(&new_voucher("a", "Subway", 1)).await.unwrap();

        assert!(!repo.mark_paid(&a.id).await.unwrap());
        repo.mark_invoiced(&[a.id.clone()]).await.unwrap();
        assert!(repo.mark_paid(&a.id).await.unwrap());

        let a_now = repo.get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(a_now.status, VoucherStatus::Paid);
    }

    #[tokio::test]
    async fn test_archive_moves_voucher() {
        let repo = repo().await;
        let a = repo.insert(&new_voucher("a", "Subway", 1)).await.unwrap();

        let archived = repo.archive(&a.id).await.unwrap();
        assert_eq!(archived.voucher.id, a.id);
        assert!(repo.get_by_id(&a.id).await.unwrap().is_none());

        let listed = repo.list_archived().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].voucher.receipt, "a");

        // The receipt can be entered again once archived
        repo.insert(&new_voucher("a", "Subway", 2)).await.unwrap();

        let err = repo.archive(&a.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
