//! # Shift Cash Reconciliation
//!
//! Adds and removes sale amounts from a shift's per-method buckets.
//!
//! ## Write Protocol
//! ```text
//!   sale event
//!       │
//!       ▼
//!   UPDATE shifts SET bucket, details total, total_sales
//!   WHERE id = ? AND status = 'open'
//!       │
//!       ├── 1 row:  Applied
//!       └── 0 rows: Skipped (missing or closed shift, warning logged)
//! ```
//!
//! Each event is one statement, so concurrent sales never overwrite each
//! other and never need a retry. Debits floor at zero inside the statement,
//! matching `salon_core::ledger::ShiftLedger`.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::Reconciled;
use crate::error::DbResult;
use crate::repository::shift::{LedgerEntry, ShiftRepository};
use salon_core::{Money, PaymentMethod};

/// Applies sales to a shift's ledger.
#[derive(Debug, Clone)]
pub struct ShiftCashReconciler {
    shifts: ShiftRepository,
}

impl ShiftCashReconciler {
    pub fn new(pool: SqlitePool) -> Self {
        ShiftCashReconciler {
            shifts: ShiftRepository::new(pool),
        }
    }

    /// Credits `net_amount` to the bucket of `method` and to total sales.
    pub async fn add_sale(
        &self,
        shift_id: &str,
        net_amount: Money,
        method: PaymentMethod,
    ) -> DbResult<Reconciled> {
        self.book(shift_id, net_amount, method, LedgerEntry::Credit)
            .await
    }

    /// Debits `net_amount` from the bucket of `method` and from total sales.
    ///
    /// Both floor at zero. Once a floor is hit, adding the same amount back
    /// does not restore the earlier figures.
    pub async fn subtract_sale(
        &self,
        shift_id: &str,
        net_amount: Money,
        method: PaymentMethod,
    ) -> DbResult<Reconciled> {
        self.book(shift_id, net_amount, method, LedgerEntry::Debit)
            .await
    }

    async fn book(
        &self,
        shift_id: &str,
        net_amount: Money,
        method: PaymentMethod,
        entry: LedgerEntry,
    ) -> DbResult<Reconciled> {
        match self
            .shifts
            .book_sale(shift_id, entry, method, net_amount)
            .await?
        {
            Some(total_sales) => {
                debug!(
                    shift_id = %shift_id,
                    method = method.as_str(),
                    amount = %net_amount,
                    ?entry,
                    total_sales = %Money::from_cents(total_sales),
                    "Shift ledger updated"
                );
                Ok(Reconciled::Applied)
            }
            None => {
                warn!(
                    shift_id = %shift_id,
                    "Shift not found or closed, skipping cash reconciliation"
                );
                Ok(Reconciled::Skipped)
            }
        }
    }
}
