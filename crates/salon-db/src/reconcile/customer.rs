//! # Customer Rollup
//!
//! Records a sale against the customer whose phone number it carries.
//!
//! Runs only when a sale is created. Edits and deletions of a sale leave the
//! visit log untouched; it is append-only.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::Reconciled;
use crate::error::DbResult;
use salon_core::{Money, MULTI_SERVICE_LABEL};

/// Applies sale creations to customer visit counts and spending.
#[derive(Debug, Clone)]
pub struct CustomerRollupUpdater {
    pool: SqlitePool,
}

impl CustomerRollupUpdater {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRollupUpdater { pool }
    }

    /// Adds one visit and `net_amount` of spending to the customer with
    /// this exact phone number, and appends a visit log entry.
    ///
    /// `service` falls back to the multi-service label when absent or blank.
    /// No customer is created when none matches.
    pub async fn apply_sale_create(
        &self,
        phone: &str,
        net_amount: Money,
        service: Option<&str>,
        date: NaiveDate,
    ) -> DbResult<Reconciled> {
        let services = service
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(MULTI_SERVICE_LABEL);

        let mut tx = self.pool.begin().await?;

        let customer_id: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE customers SET
                visits = visits + 1,
                spending_cents = spending_cents + ?2,
                updated_at = ?3,
                sync_version = sync_version + 1
            WHERE phone = ?1
            RETURNING id
            "#,
        )
        .bind(phone)
        .bind(net_amount.cents())
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(customer_id) = customer_id else {
            tx.rollback().await?;
            warn!(phone = %phone, "No customer with this phone, skipping rollup");
            return Ok(Reconciled::Skipped);
        };

        sqlx::query(
            r#"
            INSERT INTO customer_visits (customer_id, visit_date, services, amount_cents)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&customer_id)
        .bind(date)
        .bind(services)
        .bind(net_amount.cents())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            customer_id = %customer_id,
            amount = %net_amount,
            "Customer rollup applied"
        );
        Ok(Reconciled::Applied)
    }
}
