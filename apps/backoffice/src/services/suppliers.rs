//! # Supplier Service
//!
//! Supplier records and manual corrections of their accounts. Invoice
//! driven changes to the totals happen in
//! [`PurchaseInvoiceService`](super::PurchaseInvoiceService).

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use salon_core::ledger::BalanceAdjustment;
use salon_core::validation;
use salon_core::{Supplier, SupplierStatus};
use salon_db::reconcile::supplier as supplier_ledger;
use salon_db::repository::new_id;
use salon_db::{Database, Reconciled, SupplierDetails};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierInput {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: Option<SupplierStatus>,
    #[serde(default)]
    pub notes: String,
}

impl SupplierInput {
    fn validate(&self) -> ApiResult<SupplierDetails> {
        let name = validation::validate_required("name", &self.name)?;
        let phone = match self.phone.trim() {
            "" => String::new(),
            phone => validation::validate_phone(phone)?,
        };
        validation::validate_notes(&self.notes)?;

        Ok(SupplierDetails {
            name,
            phone,
            address: self.address.trim().to_string(),
            status: self.status.unwrap_or_default(),
            notes: self.notes.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SupplierService {
    db: Database,
}

impl SupplierService {
    pub fn new(db: Database) -> Self {
        SupplierService { db }
    }

    pub async fn get(&self, id: &str) -> ApiResult<Supplier> {
        self.db
            .suppliers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Supplier", id))
    }

    pub async fn list(&self) -> ApiResult<Vec<Supplier>> {
        Ok(self.db.suppliers().list().await?)
    }

    /// Creates a supplier with a zero balance.
    pub async fn create(&self, input: SupplierInput) -> ApiResult<Supplier> {
        let details = input.validate()?;
        let now = Utc::now();

        let supplier = Supplier {
            id: new_id(),
            name: details.name,
            phone: details.phone,
            address: details.address,
            status: details.status,
            balance_cents: 0,
            total_purchases_cents: 0,
            total_paid_cents: 0,
            notes: details.notes,
            created_at: now,
            updated_at: now,
            sync_version: 0,
        };
        self.db.suppliers().insert(&supplier).await?;

        info!(id = %supplier.id, name = %supplier.name, "Supplier created");
        Ok(supplier)
    }

    /// Edits the descriptive fields. The account totals cannot be set here.
    pub async fn update_details(&self, id: &str, input: SupplierInput) -> ApiResult<Supplier> {
        let details = input.validate()?;
        self.db.suppliers().update_details(id, &details).await?;

        info!(id = %id, "Supplier updated");
        self.get(id).await
    }

    /// Deletes a supplier. Its invoices are kept.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.db.suppliers().delete(id).await?;
        info!(id = %id, "Supplier deleted");
        Ok(())
    }

    /// Charges or settles a supplier account outside any invoice.
    pub async fn adjust_balance(
        &self,
        id: &str,
        adjustment: BalanceAdjustment,
    ) -> ApiResult<Supplier> {
        validation::validate_positive("amount", adjustment.amount())?;

        let mut tx = self.db.begin().await?;
        let outcome = supplier_ledger::apply_adjustment(&mut tx, id, adjustment).await?;
        Database::commit(tx).await?;

        if outcome == Reconciled::Skipped {
            return Err(ApiError::not_found("Supplier", id));
        }

        info!(id = %id, ?adjustment, "Supplier balance adjusted");
        self.get(id).await
    }
}
