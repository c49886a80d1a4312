//! # Audit Service
//!
//! Re-derives every stored aggregate from its definition and reports the
//! records that disagree. Read only; nothing is repaired.

use tracing::{info, warn};

use crate::error::ApiResult;
use salon_core::audit::AuditReport;
use salon_db::Database;

#[derive(Debug, Clone)]
pub struct AuditService {
    db: Database,
}

impl AuditService {
    pub fn new(db: Database) -> Self {
        AuditService { db }
    }

    /// Checks supplier balances, invoice derived fields and shift ledgers.
    pub async fn run(&self) -> ApiResult<AuditReport> {
        let mut report = AuditReport::default();

        for supplier in self.db.suppliers().list().await? {
            report.record_supplier(&supplier);
        }
        for invoice in self.db.purchase_invoices().list().await? {
            report.record_invoice(&invoice);
        }
        for shift in self.db.shifts().list(None).await? {
            report.record_shift(&shift);
        }

        if report.is_clean() {
            info!(
                suppliers = report.suppliers_checked,
                invoices = report.invoices_checked,
                shifts = report.shifts_checked,
                "Audit clean"
            );
        } else {
            for discrepancy in &report.discrepancies {
                warn!(%discrepancy, "Audit discrepancy");
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use crate::services::{
        InvoiceItemInput, NewPurchaseInvoice, OpenShift, SaleInput, SupplierInput,
    };
    use crate::test_backoffice;
    use salon_core::audit::Discrepancy;
    use salon_core::Money;

    #[tokio::test]
    async fn test_clean_after_normal_operations() {
        let app = test_backoffice().await;

        let supplier = app
            .suppliers()
            .create(SupplierInput {
                name: "Nile Beauty".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let invoice = app
            .purchase_invoices()
            .create(NewPurchaseInvoice {
                supplier_id: supplier.id.clone(),
                invoice_date: None,
                items: vec![InvoiceItemInput {
                    item_name: "Shampoo".to_string(),
                    quantity: 4,
                    unit_price_cents: 2_500,
                }],
                wholesale_amount_cents: 0,
                paid_amount_cents: 3_000,
                payment_terms: None,
                notes: String::new(),
            })
            .await
            .unwrap();
        app.purchase_invoices()
            .record_payment(&invoice.id, 2_000)
            .await
            .unwrap();

        app.shifts()
            .open(OpenShift {
                cashier: "Mona".to_string(),
                start_time: "09:00".to_string(),
                starting_cash_cents: 0,
            })
            .await
            .unwrap();
        app.sales()
            .create(SaleInput {
                customer_name: "Hala".to_string(),
                amount_cents: 15_000,
                discount_cents: 1_000,
                payment_method: "card".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let report = app.audit().run().await.unwrap();
        assert!(report.is_clean(), "{:?}", report.discrepancies);
        assert_eq!(report.suppliers_checked, 1);
        assert_eq!(report.invoices_checked, 1);
        assert_eq!(report.shifts_checked, 1);
    }

    #[tokio::test]
    async fn test_reports_inconsistent_invoice() {
        let app = test_backoffice().await;
        let supplier = app
            .suppliers()
            .create(SupplierInput {
                name: "Nile Beauty".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let invoice = app
            .purchase_invoices()
            .create(NewPurchaseInvoice {
                supplier_id: supplier.id,
                invoice_date: None,
                items: vec![InvoiceItemInput {
                    item_name: "Shampoo".to_string(),
                    quantity: 1,
                    unit_price_cents: 10_000,
                }],
                wholesale_amount_cents: 0,
                paid_amount_cents: 0,
                payment_terms: None,
                notes: String::new(),
            })
            .await
            .unwrap();

        // Store a remaining amount that no longer matches base - paid.
        let mut tampered = invoice.clone();
        tampered.remaining_amount_cents = 1;
        let db = app.database();
        let mut tx = db.begin().await.unwrap();
        db.purchase_invoices()
            .update(&mut tx, &tampered, invoice.sync_version, false)
            .await
            .unwrap();
        salon_db::Database::commit(tx).await.unwrap();

        let report = app.audit().run().await.unwrap();
        assert_eq!(
            report.discrepancies,
            vec![Discrepancy::InvoiceRemaining {
                invoice_id: invoice.id,
                invoice_number: invoice.invoice_number,
                stored: Money::from_cents(1),
                expected: Money::from_cents(10_000),
            }]
        );
    }
}
