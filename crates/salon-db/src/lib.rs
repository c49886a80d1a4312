//! # salon-db: Database Layer for the Salon Back Office
//!
//! SQLite storage for suppliers, purchase invoices, sales, shifts and
//! customers, plus the reconcilers that keep aggregate totals in step with
//! the invoices and sales that drive them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Salon Back Office Data Flow                        │
//! │                                                                         │
//! │  backoffice service (SaleService::create)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     salon-db (THIS CRATE)                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐  ┌───────────────┐  ┌──────────────────┐    │    │
//! │  │   │   Database    │  │ Repositories  │  │   Reconcilers    │    │    │
//! │  │   │   (pool.rs)   │  │               │  │                  │    │    │
//! │  │   │               │  │ SupplierRepo  │  │ supplier deltas  │    │    │
//! │  │   │ SqlitePool    │◄─│ InvoiceRepo   │  │ shift buckets    │    │    │
//! │  │   │ Transactions  │  │ SaleRepo ...  │  │ customer rollup  │    │    │
//! │  │   └───────────────┘  └───────────────┘  └──────────────────┘    │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (migrations/sqlite/*.sql embedded)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table group
//! - [`reconcile`] - Supplier, shift and customer reconciliation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use salon_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("salon.db")).await?;
//! let open = db.shifts().find_open().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod reconcile;
pub mod repository;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};
pub use reconcile::{CustomerRollupUpdater, Reconciled, ShiftCashReconciler};

// Repository re-exports for convenience
pub use repository::customer::{CustomerDetails, CustomerRepository};
pub use repository::purchase_invoice::PurchaseInvoiceRepository;
pub use repository::sale::{SaleFilter, SaleRepository};
pub use repository::sequence::SequenceRepository;
pub use repository::shift::{ShiftClosing, ShiftRepository};
pub use repository::supplier::{SupplierDetails, SupplierRepository};
