//! # Services
//!
//! One service per record family. Each sequences its repository writes and
//! the reconciliation steps they trigger.
//!
//! ## Sequencing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Purchase invoices          one transaction                             │
//! │    invoice write + supplier delta commit or roll back together          │
//! │                                                                         │
//! │  Sales                      independent steps                           │
//! │    sale write ──commit──► shift ledger ──► customer rollup              │
//! │    A failing later step does not undo the sale.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Primary records are looked up strictly (missing → `NOT_FOUND`); the
//! aggregates touched by reconciliation are looked up leniently (missing →
//! skipped, logged).

pub mod audit;
pub mod customers;
pub mod purchase_invoices;
pub mod sales;
pub mod shifts;
pub mod suppliers;

pub use audit::AuditService;
pub use customers::{CustomerService, NewCustomer};
pub use purchase_invoices::{
    InvoiceItemInput, NewPurchaseInvoice, PurchaseInvoiceService, PurchaseInvoiceUpdate,
};
pub use sales::{SaleInput, SaleService};
pub use shifts::{CloseShift, OpenShift, ShiftService};
pub use suppliers::{SupplierInput, SupplierService};

/// Trims an optional text field; blank becomes `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
