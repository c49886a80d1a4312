//! # Supplier Repository
//!
//! Supplier records and their descriptive fields.
//!
//! The running totals (`balance`, `total_purchases`, `total_paid`) are never
//! written here except at insert. They change only through
//! [`reconcile::supplier`](crate::reconcile::supplier).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use salon_core::{Supplier, SupplierStatus};

/// Fields of a supplier an operator may edit.
#[derive(Debug, Clone)]
pub struct SupplierDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub status: SupplierStatus,
    pub notes: String,
}

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT
                id, name, phone, address, status,
                balance_cents, total_purchases_cents, total_paid_cents,
                notes, created_at, updated_at, sync_version
            FROM suppliers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Lists all suppliers by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT
                id, name, phone, address, status,
                balance_cents, total_purchases_cents, total_paid_cents,
                notes, created_at, updated_at, sync_version
            FROM suppliers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Inserts a new supplier, totals included.
    pub async fn insert(&self, supplier: &Supplier) -> DbResult<()> {
        debug!(id = %supplier.id, name = %supplier.name, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, phone, address, status,
                balance_cents, total_purchases_cents, total_paid_cents,
                notes, created_at, updated_at, sync_version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(supplier.status)
        .bind(supplier.balance_cents)
        .bind(supplier.total_purchases_cents)
        .bind(supplier.total_paid_cents)
        .bind(&supplier.notes)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .bind(supplier.sync_version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates descriptive fields. Totals are left alone.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Supplier doesn't exist
    pub async fn update_details(&self, id: &str, details: &SupplierDetails) -> DbResult<()> {
        debug!(id = %id, "Updating supplier details");

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?2,
                phone = ?3,
                address = ?4,
                status = ?5,
                notes = ?6,
                updated_at = ?7,
                sync_version = sync_version + 1
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&details.name)
        .bind(&details.phone)
        .bind(&details.address)
        .bind(details.status)
        .bind(&details.notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }

    /// Deletes a supplier. Its invoices stay; reconciliation against them
    /// is skipped from then on.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }

    /// Counts suppliers (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::test_support;

    #[tokio::test]
    async fn test_insert_get_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();

        let b = test_support::supplier("Beauty Depot");
        let a = test_support::supplier("Alpha Cosmetics");
        repo.insert(&b).await.unwrap();
        repo.insert(&a).await.unwrap();

        let loaded = repo.get_by_id(&b.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Beauty Depot");
        assert_eq!(loaded.status, SupplierStatus::Active);

        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Alpha Cosmetics", "Beauty Depot"]);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_details_bumps_version() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();
        let supplier = test_support::supplier("Nile Beauty");
        repo.insert(&supplier).await.unwrap();

        let details = SupplierDetails {
            name: "Nile Beauty Co.".to_string(),
            phone: supplier.phone.clone(),
            address: supplier.address.clone(),
            status: SupplierStatus::Suspended,
            notes: "Late deliveries".to_string(),
        };
        repo.update_details(&supplier.id, &details).await.unwrap();

        let loaded = repo.get_by_id(&supplier.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Nile Beauty Co.");
        assert_eq!(loaded.status, SupplierStatus::Suspended);
        assert_eq!(loaded.sync_version, 1);

        let err = repo.update_details("missing", &details).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();
        let supplier = test_support::supplier("Nile Beauty");
        repo.insert(&supplier).await.unwrap();

        repo.delete(&supplier.id).await.unwrap();
        assert!(repo.get_by_id(&supplier.id).await.unwrap().is_none());
        assert!(repo.delete(&supplier.id).await.is_err());
    }
}
