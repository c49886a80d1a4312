//! # Customer Repository
//!
//! Customers and their visit log.
//!
//! `visits`, `spending_cents` and the visit log change only through the
//! [`CustomerRollupUpdater`](crate::reconcile::customer::CustomerRollupUpdater).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use salon_core::{Customer, VisitEntry};

/// Fields of a customer an operator may edit.
#[derive(Debug, Clone)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub vip: bool,
}

/// Reports a unique violation with the phone that collided.
fn phone_taken(err: sqlx::Error, phone: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
            field,
            value: phone.to_string(),
        },
        other => other,
    }
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer with their visit history, oldest first.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, name, email, phone, visits, spending_cents, vip,
                created_at, updated_at, sync_version
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.with_history(customer).await
    }

    /// Finds a customer by exact phone match.
    pub async fn find_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, name, email, phone, visits, spending_cents, vip,
                created_at, updated_at, sync_version
            FROM customers
            WHERE phone = ?1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        self.with_history(customer).await
    }

    /// Lists customers by name. Visit history is not loaded.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, name, email, phone, visits, spending_cents, vip,
                created_at, updated_at, sync_version
            FROM customers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn visit_history(&self, customer_id: &str) -> DbResult<Vec<VisitEntry>> {
        let visits = sqlx::query_as::<_, VisitEntry>(
            r#"
            SELECT visit_date, services, amount_cents
            FROM customer_visits
            WHERE customer_id = ?1
            ORDER BY seq
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(visits)
    }

    async fn with_history(&self, customer: Option<Customer>) -> DbResult<Option<Customer>> {
        match customer {
            Some(mut customer) => {
                customer.visit_history = self.visit_history(&customer.id).await?;
                Ok(Some(customer))
            }
            None => Ok(None),
        }
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - phone already registered
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, email, phone, visits, spending_cents, vip,
                created_at, updated_at, sync_version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.visits)
        .bind(customer.spending_cents)
        .bind(customer.vip)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .bind(customer.sync_version)
        .execute(&self.pool)
        .await
        .map_err(|e| phone_taken(e, &customer.phone))?;

        Ok(())
    }

    /// Edits name, email, phone and VIP flag. Visit figures are untouched.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such customer
    /// * `Err(DbError::UniqueViolation)` - phone registered to someone else
    pub async fn update_details(&self, id: &str, details: &CustomerDetails) -> DbResult<()> {
        debug!(id = %id, "Updating customer details");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                phone = ?4,
                vip = ?5,
                updated_at = ?6,
                sync_version = sync_version + 1
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&details.name)
        .bind(&details.email)
        .bind(&details.phone)
        .bind(details.vip)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| phone_taken(e, &details.phone))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Deletes a customer. The visit log goes with it (`ON DELETE CASCADE`).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
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
    async fn test_insert_and_find_by_phone() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();
        let customer = test_support::customer("Salma", "0100000000");
        repo.insert(&customer).await.unwrap();

        let found = repo.find_by_phone("0100000000").await.unwrap().unwrap();
        assert_eq!(found.id, customer.id);
        assert!(found.visit_history.is_empty());

        assert!(repo.find_by_phone("0100000001").await.unwrap().is_none());
        assert!(repo.find_by_phone(" 0100000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_phone_is_unique() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();
        repo.insert(&test_support::customer("Salma", "0100000000"))
            .await
            .unwrap();

        let err = repo
            .insert(&test_support::customer("Other", "0100000000"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::UniqueViolation { ref value, .. } if value == "0100000000"
        ));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_details_keeps_visit_figures() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();
        let mut customer = test_support::customer("Salma", "0100000000");
        customer.visits = 2;
        customer.spending_cents = 10_000;
        repo.insert(&customer).await.unwrap();
        repo.insert(&test_support::customer("Other", "0111111111"))
            .await
            .unwrap();

        let details = CustomerDetails {
            name: "Salma A.".to_string(),
            email: Some("salma@example.com".to_string()),
            phone: "0122222222".to_string(),
            vip: true,
        };
        repo.update_details(&customer.id, &details).await.unwrap();

        let updated = repo.get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Salma A.");
        assert_eq!(updated.phone, "0122222222");
        assert!(updated.vip);
        assert_eq!(updated.visits, 2);
        assert_eq!(updated.spending_cents, 10_000);
        assert_eq!(updated.sync_version, 1);

        let taken = CustomerDetails {
            phone: "0111111111".to_string(),
            ..details.clone()
        };
        let err = repo.update_details(&customer.id, &taken).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::UniqueViolation { ref value, .. } if value == "0111111111"
        ));

        let err = repo.update_details("missing", &details).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_visit_log() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();
        let customer = test_support::customer("Salma", "0100000000");
        repo.insert(&customer).await.unwrap();
        let _ = db
            .customer_rollup()
            .apply_sale_create(
                "0100000000",
                salon_core::Money::from_cents(5_000),
                Some("Haircut"),
                Utc::now().date_naive(),
            )
            .await
            .unwrap();
        assert_eq!(repo.visit_history(&customer.id).await.unwrap().len(), 1);

        repo.delete(&customer.id).await.unwrap();
        assert!(repo.get_by_id(&customer.id).await.unwrap().is_none());
        assert!(repo.visit_history(&customer.id).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete(&customer.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
