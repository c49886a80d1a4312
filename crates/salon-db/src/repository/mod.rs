//! # Repository Module
//!
//! Database repository implementations for the back office.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service (backoffice app)                                               │
//! │       │                                                                 │
//! │       │  db.suppliers().get_by_id(id)                                   │
//! │       ▼                                                                 │
//! │  SupplierRepository                                                     │
//! │  ├── get_by_id(&self, id)          ← own pooled connection              │
//! │  ├── list(&self)                                                        │
//! │  └── insert(&self, supplier)                                            │
//! │                                                                         │
//! │  PurchaseInvoiceRepository                                              │
//! │  └── insert(&self, conn, invoice)  ← caller's transaction               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods that take a `&mut SqliteConnection` run on the caller's
//! connection so they can join a transaction (`&mut *tx`). Everything else
//! uses the repository's pool.
//!
//! ## Available Repositories
//!
//! - [`SupplierRepository`](supplier::SupplierRepository)
//! - [`PurchaseInvoiceRepository`](purchase_invoice::PurchaseInvoiceRepository)
//! - [`SaleRepository`](sale::SaleRepository)
//! - [`ShiftRepository`](shift::ShiftRepository)
//! - [`CustomerRepository`](customer::CustomerRepository)
//! - [`SequenceRepository`](sequence::SequenceRepository) - invoice number counters

use uuid::Uuid;

pub mod customer;
pub mod purchase_invoice;
pub mod sale;
pub mod sequence;
pub mod shift;
pub mod supplier;

/// Generates a new record ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
