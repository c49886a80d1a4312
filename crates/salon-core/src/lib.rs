//! # salon-core: Pure Ledger Logic for the Salon Back Office
//!
//! Everything that decides a number lives here: invoice totals and status,
//! supplier balance deltas, shift cash buckets, invoice numbers. Nothing in
//! this crate touches a database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Salon Back Office Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 backoffice (services + CLI)                     │   │
//! │  │   SaleService, PurchaseInvoiceService, ShiftService, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ salon-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌────────────────┐ ┌─────────────┐   │   │
//! │  │   │  types  │ │ ledger  │ │ invoice_number │ │    audit    │   │   │
//! │  │   │  money  │ │ deltas  │ │   PI / INV     │ │  validation │   │   │
//! │  │   └─────────┘ └─────────┘ └────────────────┘ └─────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • PURE FUNCTIONS                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 salon-db (Database Layer)                       │   │
//! │  │       SQLite, migrations, repositories, reconcilers             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Sale, PurchaseInvoice, Supplier, Shift, Customer)
//! - [`money`] - Integer money
//! - [`ledger`] - Derived fields and aggregate deltas
//! - [`invoice_number`] - `PI-0001` / `INV-0001` formatting
//! - [`audit`] - Consistency checks over stored aggregates
//! - [`report`] - Sales summaries
//! - [`validation`] - Input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use salon_core::ledger::{base_total, remaining_and_status};
//! use salon_core::{InvoiceStatus, Money};
//!
//! let total = Money::from_cents(20_000);
//! let base = base_total(total, Money::zero());
//!
//! let balance = remaining_and_status(base, Money::from_cents(5_000));
//! assert_eq!(balance.status, InvoiceStatus::Partial);
//! assert_eq!(balance.remaining.cents(), 15_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod error;
pub mod invoice_number;
pub mod ledger;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice_number::InvoiceSequence;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of purchase invoice numbers (`PI-0001`).
pub const PURCHASE_INVOICE_PREFIX: &str = "PI";

/// Prefix of sale invoice numbers (`INV-0001`).
pub const SALE_INVOICE_PREFIX: &str = "INV";

/// Visit history label used when a sale names no service.
pub const MULTI_SERVICE_LABEL: &str = "خدمات متعددة";

/// Maximum lines on one purchase invoice.
pub const MAX_INVOICE_ITEMS: usize = 200;

/// Maximum quantity of a single purchase invoice line.
///
/// ## Business Reason
/// Catches typing 10000 instead of 100 on a stock delivery.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Largest single amount accepted from input (1,000,000,000.00).
///
/// Keeps every line total, invoice total and running balance far inside
/// the i64 range.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

pub const MAX_NAME_LENGTH: usize = 200;

pub const MAX_NOTES_LENGTH: usize = 2_000;
