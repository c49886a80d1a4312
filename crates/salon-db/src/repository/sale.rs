//! # Sale Repository
//!
//! Database operations for front-desk sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── insert()  INV number allocated in the same transaction          │
//! │                                                                         │
//! │  2. EDIT (optional, repeatable)                                         │
//! │     └── update()  compare-and-swap on sync_version                      │
//! │                                                                         │
//! │  3. DELETE (optional)                                                   │
//! │     └── delete()  compare-and-swap on sync_version                      │
//! │                                                                         │
//! │  Shift and customer effects are applied by the reconcilers after        │
//! │  each step commits.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use salon_core::{PaymentMethod, Sale, SaleStatus};

/// Optional filters for listing sales. Empty matches everything.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub status: Option<SaleStatus>,
    pub payment_method: Option<PaymentMethod>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, invoice_number, customer_name, customer_phone, service, category,
                amount_cents, discount_cents, payment_method, status, sale_date,
                notes, created_at, updated_at, sync_version
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists sales matching the filter, newest first.
    ///
    /// Date bounds are inclusive.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            r#"
            SELECT
                id, invoice_number, customer_name, customer_phone, service, category,
                amount_cents, discount_cents, payment_method, status, sale_date,
                notes, created_at, updated_at, sync_version
            FROM sales
            WHERE 1 = 1
            "#,
        );

        if let Some(from) = filter.from {
            query.push(" AND sale_date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND sale_date <= ").push_bind(to);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(method) = filter.payment_method {
            query.push(" AND payment_method = ").push_bind(method);
        }
        query.push(" ORDER BY sale_date DESC, created_at DESC");

        let sales = query
            .build_query_as::<Sale>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Counts all sales ever recorded (seeds the INV counter).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts a sale on the caller's connection.
    pub async fn insert(&self, conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, invoice_number = %sale.invoice_number, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, invoice_number, customer_name, customer_phone, service, category,
                amount_cents, discount_cents, payment_method, status, sale_date,
                notes, created_at, updated_at, sync_version
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15
            )
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.invoice_number)
        .bind(&sale.customer_name)
        .bind(&sale.customer_phone)
        .bind(&sale.service)
        .bind(&sale.category)
        .bind(sale.amount_cents)
        .bind(sale.discount_cents)
        .bind(sale.payment_method)
        .bind(sale.status)
        .bind(sale.sale_date)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .bind(sale.sync_version)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Writes an edited sale if it is still at `expected_version`.
    ///
    /// The invoice number is never changed.
    ///
    /// ## Returns
    /// * `Err(DbError::Conflict)` - the sale changed or disappeared
    pub async fn update(&self, sale: &Sale, expected_version: i64) -> DbResult<()> {
        debug!(id = %sale.id, expected_version, "Updating sale");

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                customer_name = ?3,
                customer_phone = ?4,
                service = ?5,
                category = ?6,
                amount_cents = ?7,
                discount_cents = ?8,
                payment_method = ?9,
                status = ?10,
                sale_date = ?11,
                notes = ?12,
                updated_at = ?13,
                sync_version = sync_version + 1
            WHERE id = ?1 AND sync_version = ?2
            "#,
        )
        .bind(&sale.id)
        .bind(expected_version)
        .bind(&sale.customer_name)
        .bind(&sale.customer_phone)
        .bind(&sale.service)
        .bind(&sale.category)
        .bind(sale.amount_cents)
        .bind(sale.discount_cents)
        .bind(sale.payment_method)
        .bind(sale.status)
        .bind(sale.sale_date)
        .bind(&sale.notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Sale", &sale.id));
        }

        Ok(())
    }

    /// Deletes a sale if it is still at `expected_version`.
    pub async fn delete(&self, id: &str, expected_version: i64) -> DbResult<()> {
        debug!(id = %id, expected_version, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1 AND sync_version = ?2")
            .bind(id)
            .bind(expected_version)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Sale", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::test_support;
    use chrono::Duration;

    async fn insert(db: &Database, sale: &Sale) {
        let mut conn = db.pool().acquire().await.unwrap();
        db.sales().insert(&mut conn, sale).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut sale = test_support::sale("INV-0001", 6_000, 1_000, PaymentMethod::Card);
        sale.customer_phone = Some("0100000000".to_string());
        insert(&db, &sale).await;

        let loaded = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(loaded.invoice_number, "INV-0001");
        assert_eq!(loaded.payment_method, PaymentMethod::Card);
        assert_eq!(loaded.net_amount().cents(), 5_000);
        assert_eq!(loaded.customer_phone.as_deref(), Some("0100000000"));
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut old = test_support::sale("INV-0001", 1_000, 0, PaymentMethod::Cash);
        old.sale_date = Utc::now() - Duration::days(10);
        let card = test_support::sale("INV-0002", 2_000, 0, PaymentMethod::Card);
        let mut cancelled = test_support::sale("INV-0003", 3_000, 0, PaymentMethod::Cash);
        cancelled.status = SaleStatus::Cancelled;
        for sale in [&old, &card, &cancelled] {
            insert(&db, sale).await;
        }

        let repo = db.sales();
        assert_eq!(repo.list(&SaleFilter::default()).await.unwrap().len(), 3);

        let recent = repo
            .list(&SaleFilter {
                from: Some(Utc::now() - Duration::days(1)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(recent.len(), 2);

        let by_card = repo
            .list(&SaleFilter {
                payment_method: Some(PaymentMethod::Card),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_card.len(), 1);
        assert_eq!(by_card[0].id, card.id);

        let cancelled_only = repo
            .list(&SaleFilter {
                status: Some(SaleStatus::Cancelled),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(cancelled_only.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_are_versioned() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut sale = test_support::sale("INV-0001", 1_000, 0, PaymentMethod::Cash);
        insert(&db, &sale).await;

        sale.amount_cents = 1_500;
        db.sales().update(&sale, 0).await.unwrap();
        assert!(matches!(
            db.sales().update(&sale, 0).await,
            Err(DbError::Conflict { .. })
        ));

        assert!(db.sales().delete(&sale.id, 0).await.is_err());
        db.sales().delete(&sale.id, 1).await.unwrap();
        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_none());
    }
}
