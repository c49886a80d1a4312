//! # Reconciliation
//!
//! Propagates changes of detail records (purchase invoices, sales) into the
//! running totals of aggregate records (suppliers, shifts, customers).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Reconcilers                                     │
//! │                                                                         │
//! │  supplier   atomic `col = col + ?` deltas                               │
//! │             runs inside the purchase invoice transaction                │
//! │                                                                         │
//! │  shift      one UPDATE per sale: bucket, details total, total sales     │
//! │             debits clamped with MAX(0, ..) in the statement             │
//! │                                                                         │
//! │  customer   atomic visits/spending increment + visit log append         │
//! │             in one transaction                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Missing Aggregates
//! Reconcilers never create the aggregate they adjust. When the supplier,
//! shift or customer is missing the step is skipped with a warning and
//! [`Reconciled::Skipped`] is returned; the primary write still stands.
//! Storage failures are returned as errors.

pub mod customer;
pub mod shift;
pub mod supplier;

pub use customer::CustomerRollupUpdater;
pub use shift::ShiftCashReconciler;

/// Outcome of one reconciliation step.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The aggregate was adjusted.
    Applied,
    /// The aggregate does not exist (or was not eligible); nothing changed.
    Skipped,
}

impl Reconciled {
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, Reconciled::Applied)
    }
}
