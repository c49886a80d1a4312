//! # Shift Repository
//!
//! Cashier shifts and their sales ledger columns.
//!
//! ## The Open Shift
//! A partial unique index allows at most one row with `status = 'open'`.
//! Sales are reconciled against that row until it is closed. Closing keeps
//! the sales figures as the shift's report.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use salon_core::{Money, PaymentMethod, Shift, ShiftStatus};

/// Which way a sale moves a shift's ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEntry {
    Credit,
    Debit,
}

fn bucket_column(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "cash_cents",
        PaymentMethod::Card => "card_cents",
        PaymentMethod::Instapay => "instapay_cents",
    }
}

/// Figures entered by the cashier when closing a shift.
#[derive(Debug, Clone)]
pub struct ShiftClosing {
    pub end_time: String,
    pub final_cash_cents: i64,
    pub total_expenses_cents: i64,
    pub closed_at: DateTime<Utc>,
}

/// Repository for shift database operations.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            SELECT
                id, cashier, start_time, end_time,
                starting_cash_cents, total_sales_cents, total_expenses_cents, final_cash_cents,
                status, cash_cents, card_cents, instapay_cents, details_total_cents,
                opened_at, closed_at, updated_at, sync_version
            FROM shifts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// The currently open shift, if any.
    ///
    /// The unique index makes a second open shift impossible; the ordering
    /// only matters for databases created before the index existed.
    pub async fn find_open(&self) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            SELECT
                id, cashier, start_time, end_time,
                starting_cash_cents, total_sales_cents, total_expenses_cents, final_cash_cents,
                status, cash_cents, card_cents, instapay_cents, details_total_cents,
                opened_at, closed_at, updated_at, sync_version
            FROM shifts
            WHERE status = 'open'
            ORDER BY opened_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Lists shifts, most recently opened first.
    pub async fn list(&self, status: Option<ShiftStatus>) -> DbResult<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(
            r#"
            SELECT
                id, cashier, start_time, end_time,
                starting_cash_cents, total_sales_cents, total_expenses_cents, final_cash_cents,
                status, cash_cents, card_cents, instapay_cents, details_total_cents,
                opened_at, closed_at, updated_at, sync_version
            FROM shifts
            WHERE ?1 IS NULL OR status = ?1
            ORDER BY opened_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    /// Inserts a shift.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` on `shifts.status` - another shift is open
    pub async fn insert(&self, shift: &Shift) -> DbResult<()> {
        debug!(id = %shift.id, cashier = %shift.cashier, "Inserting shift");

        sqlx::query(
            r#"
            INSERT INTO shifts (
                id, cashier, start_time, end_time,
                starting_cash_cents, total_sales_cents, total_expenses_cents, final_cash_cents,
                status, cash_cents, card_cents, instapay_cents, details_total_cents,
                opened_at, closed_at, updated_at, sync_version
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17
            )
            "#,
        )
        .bind(&shift.id)
        .bind(&shift.cashier)
        .bind(&shift.start_time)
        .bind(&shift.end_time)
        .bind(shift.starting_cash_cents)
        .bind(shift.total_sales_cents)
        .bind(shift.total_expenses_cents)
        .bind(shift.final_cash_cents)
        .bind(shift.status)
        .bind(shift.sales_details.cash_cents)
        .bind(shift.sales_details.card_cents)
        .bind(shift.sales_details.instapay_cents)
        .bind(shift.sales_details.total_cents)
        .bind(shift.opened_at)
        .bind(shift.closed_at)
        .bind(shift.updated_at)
        .bind(shift.sync_version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Closes an open shift. Sales figures are left as they are.
    ///
    /// ## Returns
    /// * `Ok(false)` - no open shift with this id
    pub async fn close(&self, id: &str, closing: &ShiftClosing) -> DbResult<bool> {
        debug!(id = %id, "Closing shift");

        let result = sqlx::query(
            r#"
            UPDATE shifts SET
                status = 'closed',
                end_time = ?2,
                final_cash_cents = ?3,
                total_expenses_cents = ?4,
                closed_at = ?5,
                updated_at = ?5,
                sync_version = sync_version + 1
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(id)
        .bind(&closing.end_time)
        .bind(closing.final_cash_cents)
        .bind(closing.total_expenses_cents)
        .bind(closing.closed_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Books a sale amount onto an open shift in a single statement.
    ///
    /// The chosen bucket, `total_sales_cents` and `details_total_cents` move
    /// together. A debit floors the bucket and the total at zero, the same
    /// way `ShiftLedger::debit` does. SQLite evaluates every `SET`
    /// expression against the row as it was before the update, so the
    /// details total is rebuilt from the old bucket value.
    ///
    /// ## Returns
    /// * `Ok(Some(total_sales_cents))` - written, with the new total
    /// * `Ok(None)` - no open shift with this id
    pub async fn book_sale(
        &self,
        id: &str,
        entry: LedgerEntry,
        method: PaymentMethod,
        amount: Money,
    ) -> DbResult<Option<i64>> {
        let bucket = bucket_column(method);
        let (next_bucket, next_total) = match entry {
            LedgerEntry::Credit => (
                format!("{bucket} + ?2"),
                "total_sales_cents + ?2".to_string(),
            ),
            LedgerEntry::Debit => (
                format!("MAX(0, {bucket} - ?2)"),
                "MAX(0, total_sales_cents - ?2)".to_string(),
            ),
        };

        let sql = format!(
            r#"
            UPDATE shifts SET
                {bucket} = {next_bucket},
                details_total_cents = details_total_cents - {bucket} + {next_bucket},
                total_sales_cents = {next_total},
                updated_at = ?3,
                sync_version = sync_version + 1
            WHERE id = ?1 AND status = 'open'
            RETURNING total_sales_cents
            "#
        );

        let total_sales = sqlx::query_scalar::<_, i64>(&sql)
            .bind(id)
            .bind(amount.cents())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(total_sales)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting shift");

        let result = sqlx::query("DELETE FROM shifts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shift", id));
        }

        Ok(())
    }
}
