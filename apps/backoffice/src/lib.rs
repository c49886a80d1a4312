//! # Salon Backoffice
//!
//! Orchestration layer of the salon back office: the services that sequence
//! multi-record writes on top of `salon-db`, configuration loading, and the
//! error type handed to the HTTP layer.
//!
//! ## Module Organization
//! ```text
//! salon_backoffice/
//! ├── lib.rs              ◄─── Backoffice handle
//! ├── config.rs           ◄─── File + environment configuration
//! ├── error.rs            ◄─── ApiError { code, message }
//! └── services/
//!     ├── sales.rs        ◄─── Sale → shift ledger → customer rollup
//!     ├── purchase_invoices.rs ◄─ Invoice + supplier balance, one transaction
//!     ├── shifts.rs       ◄─── Open / close
//!     ├── suppliers.rs    ◄─── Records + manual balance adjustments
//!     ├── customers.rs    ◄─── Records
//!     └── audit.rs        ◄─── Consistency scan
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let config = BackofficeConfig::load()?;
//! let app = Backoffice::connect(&config).await?;
//!
//! let sale = app.sales().create(input).await?;
//! let report = app.audit().run().await?;
//! ```

pub mod config;
pub mod error;
pub mod services;

use tracing::info;

pub use config::{BackofficeConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use services::{
    AuditService, CustomerService, PurchaseInvoiceService, SaleService, ShiftService,
    SupplierService,
};

use salon_db::Database;

/// Entry point to every service. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Backoffice {
    db: Database,
}

impl Backoffice {
    pub fn new(db: Database) -> Self {
        Backoffice { db }
    }

    /// Opens (and migrates) the configured database.
    ///
    /// The parent directory of the database file is created if missing.
    pub async fn connect(config: &BackofficeConfig) -> ApiResult<Self> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ApiError::internal(format!(
                        "Cannot create data directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let db = Database::new(config.db_config()).await?;
        info!(path = %config.database_path.display(), "Backoffice connected");
        Ok(Backoffice::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn sales(&self) -> SaleService {
        SaleService::new(self.db.clone())
    }

    pub fn purchase_invoices(&self) -> PurchaseInvoiceService {
        PurchaseInvoiceService::new(self.db.clone())
    }

    pub fn shifts(&self) -> ShiftService {
        ShiftService::new(self.db.clone())
    }

    pub fn suppliers(&self) -> SupplierService {
        SupplierService::new(self.db.clone())
    }

    pub fn customers(&self) -> CustomerService {
        CustomerService::new(self.db.clone())
    }

    pub fn audit(&self) -> AuditService {
        AuditService::new(self.db.clone())
    }
}

/// A back office on a fresh in-memory database.
#[cfg(test)]
pub(crate) async fn test_backoffice() -> Backoffice {
    let db = Database::new(salon_db::DbConfig::in_memory())
        .await
        .expect("in-memory database");
    Backoffice::new(db)
}
