//! # Purchase Invoice Service
//!
//! Stock bought from suppliers and the supplier balances it drives.
//!
//! Every write runs in one transaction together with its supplier delta, so
//! an invoice and its supplier never disagree after a failure. Derived
//! fields (item totals, total, remaining, status) are always recomputed
//! here; client values for them are never stored.
//!
//! | Operation | Supplier adjustment |
//! |---|---|
//! | create | `+base`, `+paid` |
//! | update | `-old base`, `-old paid`, then `+new base`, `+new paid` |
//! | record_payment | `+payment` to paid |
//! | delete | `-base`, `-paid` |

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use salon_core::ledger::{self, item_total};
use salon_core::validation;
use salon_core::{InvoiceSequence, Money, PaymentTerms, PurchaseInvoice, PurchaseInvoiceItem};
use salon_db::reconcile::supplier as supplier_ledger;
use salon_db::repository::new_id;
use salon_db::Database;

/// One line as entered. The line total is computed, never accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemInput {
    pub item_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseInvoice {
    pub supplier_id: String,
    #[serde(default)]
    pub invoice_date: Option<DateTime<Utc>>,
    pub items: Vec<InvoiceItemInput>,
    /// Replaces the item total as the base total when positive.
    #[serde(default)]
    pub wholesale_amount_cents: i64,
    /// Clamped into `[0, base total]`.
    #[serde(default)]
    pub paid_amount_cents: i64,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// Partial edit of an invoice. Absent fields are left as they are.
///
/// The supplier cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseInvoiceUpdate {
    #[serde(default)]
    pub items: Option<Vec<InvoiceItemInput>>,
    #[serde(default)]
    pub wholesale_amount_cents: Option<i64>,
    #[serde(default)]
    pub paid_amount_cents: Option<i64>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn build_items(inputs: &[InvoiceItemInput]) -> ApiResult<Vec<PurchaseInvoiceItem>> {
    validation::validate_item_count(inputs.len())?;

    inputs
        .iter()
        .map(|input| -> ApiResult<PurchaseInvoiceItem> {
            let unit_price = Money::from_cents(input.unit_price_cents);
            validation::validate_item(&input.item_name, input.quantity, unit_price)?;

            Ok(PurchaseInvoiceItem {
                id: new_id(),
                item_name: input.item_name.trim().to_string(),
                quantity: input.quantity,
                unit_price_cents: unit_price.cents(),
                total_price_cents: item_total(input.quantity, unit_price)?.cents(),
            })
        })
        .collect()
}

/// Recomputes total, remaining and status from items, wholesale and the
/// requested paid amount (clamped).
fn recompute(invoice: &mut PurchaseInvoice, requested_paid: Money) -> ApiResult<()> {
    invoice.total_amount_cents = ledger::invoice_total(&invoice.items)?.cents();
    let base = invoice.base_total();
    let paid = ledger::clamp_paid(requested_paid, base);
    let balance = ledger::remaining_and_status(base, paid);

    invoice.paid_amount_cents = paid.cents();
    invoice.remaining_amount_cents = balance.remaining.cents();
    invoice.status = balance.status;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PurchaseInvoiceService {
    db: Database,
}

impl PurchaseInvoiceService {
    pub fn new(db: Database) -> Self {
        PurchaseInvoiceService { db }
    }

    pub async fn get(&self, id: &str) -> ApiResult<PurchaseInvoice> {
        self.db
            .purchase_invoices()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("PurchaseInvoice", id))
    }

    /// All invoices, newest first.
    pub async fn list(&self) -> ApiResult<Vec<PurchaseInvoice>> {
        Ok(self.db.purchase_invoices().list().await?)
    }

    pub async fn list_by_supplier(&self, supplier_id: &str) -> ApiResult<Vec<PurchaseInvoice>> {
        Ok(self.db.purchase_invoices().list_by_supplier(supplier_id).await?)
    }

    /// Records an invoice against an existing supplier.
    ///
    /// ## Returns
    /// * `NOT_FOUND` - the supplier doesn't exist (nothing written)
    pub async fn create(&self, input: NewPurchaseInvoice) -> ApiResult<PurchaseInvoice> {
        let items = build_items(&input.items)?;
        let wholesale = Money::from_cents(input.wholesale_amount_cents);
        validation::validate_non_negative("wholesaleAmount", wholesale)?;
        validation::validate_notes(&input.notes)?;

        let supplier = self
            .db
            .suppliers()
            .get_by_id(&input.supplier_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Supplier", &input.supplier_id))?;

        let now = Utc::now();
        let mut invoice = PurchaseInvoice {
            id: new_id(),
            invoice_number: String::new(),
            supplier_id: supplier.id.clone(),
            supplier_name: supplier.name.clone(),
            invoice_date: input.invoice_date.unwrap_or(now),
            items,
            total_amount_cents: 0,
            wholesale_amount_cents: wholesale.cents(),
            paid_amount_cents: 0,
            remaining_amount_cents: 0,
            status: Default::default(),
            payment_terms: input
                .payment_terms
                .as_deref()
                .map(PaymentTerms::from_label)
                .unwrap_or_default(),
            notes: input.notes.trim().to_string(),
            created_at: now,
            updated_at: now,
            sync_version: 0,
        };
        recompute(&mut invoice, Money::from_cents(input.paid_amount_cents))?;

        let latest = self.db.purchase_invoices().latest_invoice_number().await?;
        let seed = InvoiceSequence::PURCHASE.next_after(latest.as_deref());

        let mut tx = self.db.begin().await?;
        invoice.invoice_number = self
            .db
            .sequences()
            .next_number(&mut tx, InvoiceSequence::PURCHASE, seed)
            .await?;
        self.db.purchase_invoices().insert(&mut tx, &invoice).await?;
        let outcome = supplier_ledger::apply_invoice_create(
            &mut tx,
            &invoice.supplier_id,
            invoice.base_total(),
            invoice.paid_amount(),
        )
        .await?;
        Database::commit(tx).await?;

        info!(
            id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            supplier_id = %invoice.supplier_id,
            base_total = %invoice.base_total(),
            paid = %invoice.paid_amount(),
            ?outcome,
            "Purchase invoice created"
        );
        Ok(invoice)
    }

    /// Edits an invoice. When its base total or paid amount changes, the old
    /// contribution is taken off the supplier and the new one applied.
    pub async fn update(
        &self,
        id: &str,
        changes: PurchaseInvoiceUpdate,
    ) -> ApiResult<PurchaseInvoice> {
        let old = self.get(id).await?;
        let mut invoice = old.clone();

        let replace_items = match &changes.items {
            Some(items) => {
                invoice.items = build_items(items)?;
                true
            }
            None => false,
        };
        if let Some(cents) = changes.wholesale_amount_cents {
            let wholesale = Money::from_cents(cents);
            validation::validate_non_negative("wholesaleAmount", wholesale)?;
            invoice.wholesale_amount_cents = wholesale.cents();
        }
        if let Some(label) = &changes.payment_terms {
            invoice.payment_terms = PaymentTerms::from_label(label);
        }
        if let Some(date) = changes.invoice_date {
            invoice.invoice_date = date;
        }
        if let Some(notes) = &changes.notes {
            validation::validate_notes(notes)?;
            invoice.notes = notes.trim().to_string();
        }

        let requested_paid = changes
            .paid_amount_cents
            .map(Money::from_cents)
            .unwrap_or_else(|| old.paid_amount());
        recompute(&mut invoice, requested_paid)?;

        let totals_changed =
            old.base_total() != invoice.base_total() || old.paid_amount() != invoice.paid_amount();

        let mut tx = self.db.begin().await?;
        self.db
            .purchase_invoices()
            .update(&mut tx, &invoice, old.sync_version, replace_items)
            .await?;
        if totals_changed {
            let outcome = supplier_ledger::apply_invoice_update(
                &mut tx,
                &old.supplier_id,
                old.base_total(),
                old.paid_amount(),
                invoice.base_total(),
                invoice.paid_amount(),
            )
            .await?;
            debug!(id = %id, ?outcome, "Supplier totals re-applied");
        }
        Database::commit(tx).await?;

        info!(
            id = %id,
            invoice_number = %invoice.invoice_number,
            totals_changed,
            "Purchase invoice updated"
        );
        self.get(id).await
    }

    /// Adds a payment to an invoice.
    ///
    /// ## Returns
    /// * `VALIDATION_ERROR` - the payment is zero, negative, or would exceed
    ///   the base total (nothing written)
    pub async fn record_payment(&self, id: &str, amount_cents: i64) -> ApiResult<PurchaseInvoice> {
        let invoice = self.get(id).await?;
        let payment = Money::from_cents(amount_cents);

        let paid = ledger::apply_payment(
            &invoice.invoice_number,
            invoice.base_total(),
            invoice.paid_amount(),
            payment,
        )?;
        let balance = ledger::remaining_and_status(invoice.base_total(), paid);

        let mut updated = invoice.clone();
        updated.paid_amount_cents = paid.cents();
        updated.remaining_amount_cents = balance.remaining.cents();
        updated.status = balance.status;

        let mut tx = self.db.begin().await?;
        self.db
            .purchase_invoices()
            .update(&mut tx, &updated, invoice.sync_version, false)
            .await?;
        let outcome = supplier_ledger::apply_payment(&mut tx, &invoice.supplier_id, payment).await?;
        Database::commit(tx).await?;

        info!(
            id = %id,
            invoice_number = %invoice.invoice_number,
            payment = %payment,
            status = ?balance.status,
            ?outcome,
            "Payment recorded"
        );
        self.get(id).await
    }

    /// Deletes an invoice and takes its contribution off the supplier.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let invoice = self.get(id).await?;

        let mut tx = self.db.begin().await?;
        let outcome = supplier_ledger::apply_invoice_delete(
            &mut tx,
            &invoice.supplier_id,
            invoice.base_total(),
            invoice.paid_amount(),
        )
        .await?;
        self.db
            .purchase_invoices()
            .delete(&mut tx, id, invoice.sync_version)
            .await?;
        Database::commit(tx).await?;

        info!(
            id = %id,
            invoice_number = %invoice.invoice_number,
            ?outcome,
            "Purchase invoice deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::SupplierInput;
    use crate::test_backoffice;
    use crate::Backoffice;
    use salon_core::{InvoiceStatus, Supplier};

    fn line(quantity: i64, unit_price_cents: i64) -> InvoiceItemInput {
        InvoiceItemInput {
            item_name: "Hair dye".to_string(),
            quantity,
            unit_price_cents,
        }
    }

    fn new_invoice(supplier_id: &str, items: Vec<InvoiceItemInput>) -> NewPurchaseInvoice {
        NewPurchaseInvoice {
            supplier_id: supplier_id.to_string(),
            invoice_date: None,
            items,
            wholesale_amount_cents: 0,
            paid_amount_cents: 0,
            payment_terms: None,
            notes: String::new(),
        }
    }

    async fn supplier(app: &Backoffice) -> Supplier {
        app.suppliers()
            .create(SupplierInput {
                name: "Nile Beauty".to_string(),
                phone: "0223456789".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    async fn reload_supplier(app: &Backoffice, id: &str) -> Supplier {
        app.suppliers().get(id).await.unwrap()
    }

    #[tokio::test]
    async fn test_payment_scenario() {
        let app = test_backoffice().await;
        let s = supplier(&app).await;

        let invoice = app
            .purchase_invoices()
            .create(new_invoice(&s.id, vec![line(2, 10_000)]))
            .await
            .unwrap();
        assert_eq!(invoice.invoice_number, "PI-0001");
        assert_eq!(invoice.total_amount_cents, 20_000);
        assert_eq!(invoice.base_total().cents(), 20_000);
        assert_eq!(invoice.items[0].total_price_cents, 20_000);
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);

        // Over-payment is rejected and changes nothing.
        let err = app
            .purchase_invoices()
            .record_payment(&invoice.id, 25_000)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.http_status(), 400);
        assert_eq!(reload_supplier(&app, &s.id).await.total_paid_cents, 0);

        let paid = app
            .purchase_invoices()
            .record_payment(&invoice.id, 20_000)
            .await
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(paid.remaining_amount_cents, 0);

        let s = reload_supplier(&app, &s.id).await;
        assert_eq!(s.total_purchases_cents, 20_000);
        assert_eq!(s.total_paid_cents, 20_000);
        assert_eq!(s.balance_cents, 0);
    }

    #[tokio::test]
    async fn test_second_invoice_number() {
        let app = test_backoffice().await;
        let s = supplier(&app).await;

        app.purchase_invoices()
            .create(new_invoice(&s.id, vec![line(1, 100)]))
            .await
            .unwrap();
        let second = app
            .purchase_invoices()
            .create(new_invoice(&s.id, vec![line(1, 100)]))
            .await
            .unwrap();

        assert_eq!(second.invoice_number, "PI-0002");
    }

    #[tokio::test]
    async fn test_missing_supplier_is_not_found() {
        let app = test_backoffice().await;

        let err = app
            .purchase_invoices()
            .create(new_invoice("missing", vec![line(1, 100)]))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(app.purchase_invoices().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wholesale_and_clamped_paid() {
        let app = test_backoffice().await;
        let s = supplier(&app).await;

        let mut input = new_invoice(&s.id, vec![line(3, 10_000)]);
        input.wholesale_amount_cents = 25_000;
        input.paid_amount_cents = 40_000;
        let invoice = app.purchase_invoices().create(input).await.unwrap();

        assert_eq!(invoice.total_amount_cents, 30_000);
        assert_eq!(invoice.base_total().cents(), 25_000);
        assert_eq!(invoice.paid_amount_cents, 25_000);
        assert_eq!(invoice.status, InvoiceStatus::Paid);

        let s = reload_supplier(&app, &s.id).await;
        assert_eq!(s.total_purchases_cents, 25_000);
        assert_eq!(s.total_paid_cents, 25_000);
    }

    #[tokio::test]
    async fn test_lifecycle_keeps_supplier_identity() {
        let app = test_backoffice().await;
        let s = supplier(&app).await;
        let invoices = app.purchase_invoices();
        let check = |s: &Supplier| {
            assert_eq!(s.balance_cents, s.total_purchases_cents - s.total_paid_cents);
        };

        let mut input = new_invoice(&s.id, vec![line(2, 10_000)]);
        input.paid_amount_cents = 5_000;
        let invoice = invoices.create(input).await.unwrap();
        check(&reload_supplier(&app, &s.id).await);

        let updated = invoices
            .update(
                &invoice.id,
                PurchaseInvoiceUpdate {
                    items: Some(vec![line(2, 10_000), line(1, 5_000)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.total_amount_cents, 25_000);
        assert_eq!(updated.items.len(), 2);
        assert_eq!(updated.status, InvoiceStatus::Partial);
        assert_eq!(updated.remaining_amount_cents, 20_000);
        let after_update = reload_supplier(&app, &s.id).await;
        assert_eq!(after_update.total_purchases_cents, 25_000);
        assert_eq!(after_update.total_paid_cents, 5_000);
        check(&after_update);

        invoices.record_payment(&invoice.id, 10_000).await.unwrap();
        let after_payment = reload_supplier(&app, &s.id).await;
        assert_eq!(after_payment.balance_cents, 10_000);
        check(&after_payment);

        invoices.delete(&invoice.id).await.unwrap();
        let after_delete = reload_supplier(&app, &s.id).await;
        assert_eq!(after_delete.total_purchases_cents, 0);
        assert_eq!(after_delete.total_paid_cents, 0);
        assert_eq!(after_delete.balance_cents, 0);
        assert_eq!(
            invoices.get(&invoice.id).await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[tokio::test]
    async fn test_update_without_total_change_leaves_supplier() {
        let app = test_backoffice().await;
        let s = supplier(&app).await;
        let invoice = app
            .purchase_invoices()
            .create(new_invoice(&s.id, vec![line(1, 1_000)]))
            .await
            .unwrap();
        let before = reload_supplier(&app, &s.id).await;

        let updated = app
            .purchase_invoices()
            .update(
                &invoice.id,
                PurchaseInvoiceUpdate {
                    notes: Some("Delivered late".to_string()),
                    payment_terms: Some("آجل".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.notes, "Delivered late");
        assert_eq!(updated.payment_terms, PaymentTerms::Credit);

        let after = reload_supplier(&app, &s.id).await;
        assert_eq!(after.sync_version, before.sync_version);
    }

    #[tokio::test]
    async fn test_invalid_items_are_rejected() {
        let app = test_backoffice().await;
        let s = supplier(&app).await;

        let err = app
            .purchase_invoices()
            .create(new_invoice(&s.id, vec![line(0, 100)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = app
            .purchase_invoices()
            .create(new_invoice(&s.id, Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_huge_amounts_are_rejected_without_writes() {
        let app = test_backoffice().await;
        let s = supplier(&app).await;

        let err = app
            .purchase_invoices()
            .create(new_invoice(&s.id, vec![line(2, i64::MAX)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(app.purchase_invoices().list().await.unwrap().is_empty());

        let invoice = app
            .purchase_invoices()
            .create(new_invoice(&s.id, vec![line(1, 10_000)]))
            .await
            .unwrap();
        app.purchase_invoices()
            .record_payment(&invoice.id, 4_000)
            .await
            .unwrap();

        let err = app
            .purchase_invoices()
            .record_payment(&invoice.id, i64::MAX)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let reloaded = app.purchase_invoices().get(&invoice.id).await.unwrap();
        assert_eq!(reloaded.paid_amount_cents, 4_000);
        let s = reload_supplier(&app, &s.id).await;
        assert_eq!(s.total_paid_cents, 4_000);
        assert_eq!(s.balance_cents, 6_000);
    }

    #[tokio::test]
    async fn test_deleted_supplier_skips_reconciliation() {
        let app = test_backoffice().await;
        let s = supplier(&app).await;
        let invoice = app
            .purchase_invoices()
            .create(new_invoice(&s.id, vec![line(1, 1_000)]))
            .await
            .unwrap();
        app.suppliers().delete(&s.id).await.unwrap();

        // The invoice is still payable; the missing supplier is skipped.
        let paid = app
            .purchase_invoices()
            .record_payment(&invoice.id, 1_000)
            .await
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
    }
}
