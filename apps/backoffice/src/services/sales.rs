//! # Sale Service
//!
//! Front-desk sales and their effect on the open shift and the customer.
//!
//! ## Create
//! ```text
//! validate ──► allocate INV number + insert sale   (one transaction)
//!                  │
//!                  ▼ committed
//!          open shift? ──yes, net > 0──► ShiftCashReconciler::add_sale
//!                  │
//!                  ▼
//!          phone given? ──yes──► CustomerRollupUpdater::apply_sale_create
//! ```
//!
//! Edits and deletions move money between shift buckets against whichever
//! shift is open at that time. They never touch the customer.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use super::non_blank;
use crate::error::{ApiError, ApiResult};
use salon_core::report::SalesSummary;
use salon_core::validation;
use salon_core::{InvoiceSequence, Money, PaymentMethod, Sale, SaleStatus};
use salon_db::repository::new_id;
use salon_db::{Database, SaleFilter};

/// Sale fields supplied by the front desk, for create and full update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleInput {
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub amount_cents: i64,
    #[serde(default)]
    pub discount_cents: i64,
    /// English or localized label. Unknown labels are cash.
    #[serde(default)]
    pub payment_method: String,
    /// English or localized label. Absent keeps the current status.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sale_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validates `input` and writes it over `sale`.
fn apply_input(sale: &mut Sale, input: &SaleInput) -> ApiResult<()> {
    let amount = Money::from_cents(input.amount_cents);
    let discount = Money::from_cents(input.discount_cents);
    validation::validate_sale_amounts(amount, discount)?;

    let customer_name = validation::validate_required("customerName", &input.customer_name)?;
    let customer_phone = match non_blank(input.customer_phone.as_deref()) {
        Some(phone) => Some(validation::validate_phone(&phone)?),
        None => None,
    };

    let status = match input.status.as_deref() {
        Some(label) => SaleStatus::from_label(label)
            .ok_or_else(|| ApiError::validation(format!("Unknown sale status: {}", label)))?,
        None => sale.status,
    };

    if let Some(notes) = &input.notes {
        validation::validate_notes(notes)?;
    }

    sale.customer_name = customer_name;
    sale.customer_phone = customer_phone;
    sale.service = non_blank(input.service.as_deref());
    sale.category = non_blank(input.category.as_deref());
    sale.amount_cents = amount.cents();
    sale.discount_cents = discount.cents();
    sale.payment_method = PaymentMethod::from_label(&input.payment_method);
    sale.status = status;
    if let Some(date) = input.sale_date {
        sale.sale_date = date;
    }
    sale.notes = non_blank(input.notes.as_deref());

    Ok(())
}

#[derive(Debug, Clone)]
pub struct SaleService {
    db: Database,
}

impl SaleService {
    pub fn new(db: Database) -> Self {
        SaleService { db }
    }

    pub async fn get(&self, id: &str) -> ApiResult<Sale> {
        self.db
            .sales()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Sale", id))
    }

    /// Sales matching the filter, newest first.
    pub async fn list(&self, filter: &SaleFilter) -> ApiResult<Vec<Sale>> {
        Ok(self.db.sales().list(filter).await?)
    }

    /// Records a sale, then credits the open shift and the customer.
    ///
    /// ## Returns
    /// The persisted sale. If a reconciliation step fails the error is
    /// returned, but the sale (and any earlier step) stays recorded.
    pub async fn create(&self, input: SaleInput) -> ApiResult<Sale> {
        let now = Utc::now();
        let mut sale = Sale {
            id: new_id(),
            invoice_number: String::new(),
            customer_name: String::new(),
            customer_phone: None,
            service: None,
            category: None,
            amount_cents: 0,
            discount_cents: 0,
            payment_method: PaymentMethod::default(),
            status: SaleStatus::default(),
            sale_date: now,
            notes: None,
            created_at: now,
            updated_at: now,
            sync_version: 0,
        };
        apply_input(&mut sale, &input)?;

        let existing = self.db.sales().count().await?;
        let seed = InvoiceSequence::SALE.next_from_count(existing.max(0) as u64);

        let mut tx = self.db.begin().await?;
        sale.invoice_number = self
            .db
            .sequences()
            .next_number(&mut tx, InvoiceSequence::SALE, seed)
            .await?;
        self.db.sales().insert(&mut tx, &sale).await?;
        Database::commit(tx).await?;

        let net = sale.net_amount();
        info!(
            id = %sale.id,
            invoice_number = %sale.invoice_number,
            net = %net,
            method = sale.payment_method.as_str(),
            "Sale created"
        );

        if net.is_positive() {
            match self.db.shifts().find_open().await? {
                Some(shift) => {
                    let outcome = self
                        .db
                        .shift_reconciler()
                        .add_sale(&shift.id, net, sale.payment_method)
                        .await?;
                    debug!(shift_id = %shift.id, ?outcome, "Sale applied to shift");
                }
                None => debug!(id = %sale.id, "No open shift, sale not added to a shift ledger"),
            }
        }

        if let Some(phone) = &sale.customer_phone {
            let outcome = self
                .db
                .customer_rollup()
                .apply_sale_create(phone, net, sale.service.as_deref(), Utc::now().date_naive())
                .await?;
            debug!(id = %sale.id, ?outcome, "Customer rollup");
        }

        Ok(sale)
    }

    /// Replaces a sale's fields and moves its amount in the open shift.
    ///
    /// The invoice number never changes. The customer rollup is not redone.
    pub async fn update(&self, id: &str, input: SaleInput) -> ApiResult<Sale> {
        let old = self.get(id).await?;
        let mut sale = old.clone();
        apply_input(&mut sale, &input)?;

        // One lookup serves both the subtract and the add.
        let open_shift = self.db.shifts().find_open().await?;

        self.db.sales().update(&sale, old.sync_version).await?;
        info!(id = %id, invoice_number = %sale.invoice_number, "Sale updated");

        if let Some(shift) = open_shift {
            let reconciler = self.db.shift_reconciler();
            let old_net = old.net_amount();
            let new_net = sale.net_amount();

            if old_net.is_positive() {
                let outcome = reconciler
                    .subtract_sale(&shift.id, old_net, old.payment_method)
                    .await?;
                debug!(shift_id = %shift.id, ?outcome, "Old sale amount removed from shift");
            }
            if new_net.is_positive() {
                let outcome = reconciler
                    .add_sale(&shift.id, new_net, sale.payment_method)
                    .await?;
                debug!(shift_id = %shift.id, ?outcome, "New sale amount added to shift");
            }
        }

        self.get(id).await
    }

    /// Deletes a sale and removes its amount from the open shift.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let sale = self.get(id).await?;

        self.db.sales().delete(id, sale.sync_version).await?;
        info!(id = %id, invoice_number = %sale.invoice_number, "Sale deleted");

        let net = sale.net_amount();
        if net.is_positive() {
            if let Some(shift) = self.db.shifts().find_open().await? {
                let outcome = self
                    .db
                    .shift_reconciler()
                    .subtract_sale(&shift.id, net, sale.payment_method)
                    .await?;
                debug!(shift_id = %shift.id, ?outcome, "Deleted sale removed from shift");
            }
        }

        Ok(())
    }

    /// Revenue, discount and payment-method breakdown of the sales between
    /// `from` and `to` (inclusive; either may be open).
    pub async fn summary(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ApiResult<SalesSummary> {
        let filter = SaleFilter {
            from,
            to,
            ..Default::default()
        };
        let sales = self.db.sales().list(&filter).await?;

        Ok(SalesSummary::from_sales(&sales))
    }
}
