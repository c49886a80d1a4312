//! # Ledger Audit
//!
//! Pure consistency checks over stored aggregates.
//!
//! Every figure below is maintained incrementally and never recomputed on
//! read, so a crash between steps or a bug in a writer leaves stored values
//! that disagree with their definition. These checks find such records.
//!
//! ```text
//! Supplier         balance == total_purchases - total_paid
//! PurchaseInvoice  total_amount == Σ item totals
//!                  remaining/status == remaining_and_status(base, paid)
//! Shift            sales_details.total == cash + card + instapay
//!                  no bucket and no total_sales below zero
//! ```

use serde::Serialize;
use std::fmt;

use crate::ledger;
use crate::money::Money;
use crate::types::{InvoiceStatus, PaymentMethod, PurchaseInvoice, Shift, Supplier};

/// One stored value that disagrees with its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    SupplierBalance {
        supplier_id: String,
        supplier_name: String,
        stored: Money,
        expected: Money,
    },
    InvoiceTotal {
        invoice_id: String,
        invoice_number: String,
        stored: Money,
        expected: Money,
    },
    InvoiceItemsOverflow {
        invoice_id: String,
        invoice_number: String,
    },
    InvoiceRemaining {
        invoice_id: String,
        invoice_number: String,
        stored: Money,
        expected: Money,
    },
    InvoiceStatus {
        invoice_id: String,
        invoice_number: String,
        stored: InvoiceStatus,
        expected: InvoiceStatus,
    },
    ShiftDetailsTotal {
        shift_id: String,
        stored: Money,
        expected: Money,
    },
    ShiftNegativeBucket {
        shift_id: String,
        method: PaymentMethod,
        amount: Money,
    },
    ShiftNegativeTotal {
        shift_id: String,
        amount: Money,
    },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::SupplierBalance {
                supplier_name,
                stored,
                expected,
                ..
            } => write!(
                f,
                "supplier {supplier_name}: balance {stored}, expected {expected}"
            ),
            Discrepancy::InvoiceTotal {
                invoice_number,
                stored,
                expected,
                ..
            } => write!(
                f,
                "invoice {invoice_number}: total {stored}, items sum to {expected}"
            ),
            Discrepancy::InvoiceItemsOverflow { invoice_number, .. } => {
                write!(f, "invoice {invoice_number}: item totals overflow")
            }
            Discrepancy::InvoiceRemaining {
                invoice_number,
                stored,
                expected,
                ..
            } => write!(
                f,
                "invoice {invoice_number}: remaining {stored}, expected {expected}"
            ),
            Discrepancy::InvoiceStatus {
                invoice_number,
                stored,
                expected,
                ..
            } => write!(
                f,
                "invoice {invoice_number}: status {stored:?}, expected {expected:?}"
            ),
            Discrepancy::ShiftDetailsTotal {
                shift_id,
                stored,
                expected,
            } => write!(
                f,
                "shift {shift_id}: details total {stored}, buckets sum to {expected}"
            ),
            Discrepancy::ShiftNegativeBucket {
                shift_id,
                method,
                amount,
            } => write!(f, "shift {shift_id}: {} bucket is {amount}", method.as_str()),
            Discrepancy::ShiftNegativeTotal { shift_id, amount } => {
                write!(f, "shift {shift_id}: total sales is {amount}")
            }
        }
    }
}

pub fn check_supplier(supplier: &Supplier) -> Option<Discrepancy> {
    let expected = supplier.total_purchases() - supplier.total_paid();
    (supplier.balance() != expected).then(|| Discrepancy::SupplierBalance {
        supplier_id: supplier.id.clone(),
        supplier_name: supplier.name.clone(),
        stored: supplier.balance(),
        expected,
    })
}

pub fn check_invoice(invoice: &PurchaseInvoice) -> Vec<Discrepancy> {
    let mut found = Vec::new();

    match ledger::invoice_total(&invoice.items) {
        Ok(items_total) if items_total != invoice.total_amount() => {
            found.push(Discrepancy::InvoiceTotal {
                invoice_id: invoice.id.clone(),
                invoice_number: invoice.invoice_number.clone(),
                stored: invoice.total_amount(),
                expected: items_total,
            });
        }
        Ok(_) => {}
        Err(_) => found.push(Discrepancy::InvoiceItemsOverflow {
            invoice_id: invoice.id.clone(),
            invoice_number: invoice.invoice_number.clone(),
        }),
    }

    let expected = invoice.expected_balance();
    let stored_remaining = Money::from_cents(invoice.remaining_amount_cents);
    if stored_remaining != expected.remaining {
        found.push(Discrepancy::InvoiceRemaining {
            invoice_id: invoice.id.clone(),
            invoice_number: invoice.invoice_number.clone(),
            stored: stored_remaining,
            expected: expected.remaining,
        });
    }
    if invoice.status != expected.status {
        found.push(Discrepancy::InvoiceStatus {
            invoice_id: invoice.id.clone(),
            invoice_number: invoice.invoice_number.clone(),
            stored: invoice.status,
            expected: expected.status,
        });
    }

    found
}

pub fn check_shift(shift: &Shift) -> Vec<Discrepancy> {
    let mut found = Vec::new();
    let ledger = shift.ledger();

    let stored_total = Money::from_cents(shift.sales_details.total_cents);
    if stored_total != ledger.details_total() {
        found.push(Discrepancy::ShiftDetailsTotal {
            shift_id: shift.id.clone(),
            stored: stored_total,
            expected: ledger.details_total(),
        });
    }

    for method in PaymentMethod::ALL {
        let amount = ledger.bucket(method);
        if amount.is_negative() {
            found.push(Discrepancy::ShiftNegativeBucket {
                shift_id: shift.id.clone(),
                method,
                amount,
            });
        }
    }

    if ledger.total_sales.is_negative() {
        found.push(Discrepancy::ShiftNegativeTotal {
            shift_id: shift.id.clone(),
            amount: ledger.total_sales,
        });
    }

    found
}

/// Result of auditing every supplier, invoice and shift.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub suppliers_checked: usize,
    pub invoices_checked: usize,
    pub shifts_checked: usize,
    pub discrepancies: Vec<Discrepancy>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }

    pub fn record_supplier(&mut self, supplier: &Supplier) {
        self.suppliers_checked += 1;
        self.discrepancies.extend(check_supplier(supplier));
    }

    pub fn record_invoice(&mut self, invoice: &PurchaseInvoice) {
        self.invoices_checked += 1;
        self.discrepancies.extend(check_invoice(invoice));
    }

    pub fn record_shift(&mut self, shift: &Shift) {
        self.shifts_checked += 1;
        self.discrepancies.extend(check_shift(shift));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        PaymentTerms, PurchaseInvoiceItem, SalesDetails, ShiftStatus, SupplierStatus,
    };
    use chrono::Utc;

    fn supplier(purchases: i64, paid: i64, balance: i64) -> Supplier {
        Supplier {
            id: "sup-1".to_string(),
            name: "Nile Beauty".to_string(),
            phone: "0100000001".to_string(),
            address: String::new(),
            status: SupplierStatus::Active,
            balance_cents: balance,
            total_purchases_cents: purchases,
            total_paid_cents: paid,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            sync_version: 0,
        }
    }

    fn invoice(paid: i64, remaining: i64, status: InvoiceStatus) -> PurchaseInvoice {
        PurchaseInvoice {
            id: "pi-1".to_string(),
            invoice_number: "PI-0001".to_string(),
            supplier_id: "sup-1".to_string(),
            supplier_name: "Nile Beauty".to_string(),
            invoice_date: Utc::now(),
            items: vec![PurchaseInvoiceItem {
                id: "item-1".to_string(),
                item_name: "Hair dye".to_string(),
                quantity: 2,
                unit_price_cents: 10_000,
                total_price_cents: 20_000,
            }],
            total_amount_cents: 20_000,
            wholesale_amount_cents: 0,
            paid_amount_cents: paid,
            remaining_amount_cents: remaining,
            status,
            payment_terms: PaymentTerms::Cash,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            sync_version: 0,
        }
    }

    fn shift(details: SalesDetails, total_sales: i64) -> Shift {
        Shift {
            id: "shift-1".to_string(),
            cashier: "Mona".to_string(),
            start_time: "09:00".to_string(),
            end_time: None,
            starting_cash_cents: 0,
            total_sales_cents: total_sales,
            total_expenses_cents: 0,
            final_cash_cents: 0,
            status: ShiftStatus::Open,
            sales_details: details,
            opened_at: Utc::now(),
            closed_at: None,
            updated_at: Utc::now(),
            sync_version: 0,
        }
    }

    #[test]
    fn test_supplier_balance_identity() {
        assert!(check_supplier(&supplier(20_000, 5_000, 15_000)).is_none());

        let found = check_supplier(&supplier(20_000, 5_000, 20_000)).unwrap();
        assert!(matches!(
            found,
            Discrepancy::SupplierBalance { expected, .. } if expected.cents() == 15_000
        ));
    }

    #[test]
    fn test_consistent_invoice_passes() {
        assert!(check_invoice(&invoice(5_000, 15_000, InvoiceStatus::Partial)).is_empty());
        assert!(check_invoice(&invoice(20_000, 0, InvoiceStatus::Paid)).is_empty());
    }

    #[test]
    fn test_invoice_with_stale_derived_fields() {
        let found = check_invoice(&invoice(20_000, 15_000, InvoiceStatus::Partial));
        assert_eq!(found.len(), 2);
        assert!(found
            .iter()
            .any(|d| matches!(d, Discrepancy::InvoiceStatus { expected: InvoiceStatus::Paid, .. })));
    }

    #[test]
    fn test_invoice_total_must_match_items() {
        let mut inv = invoice(0, 20_000, InvoiceStatus::Unpaid);
        inv.total_amount_cents = 25_000;
        inv.remaining_amount_cents = 25_000;
        let found = check_invoice(&inv);
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], Discrepancy::InvoiceTotal { .. }));
    }

    #[test]
    fn test_overflowing_items_are_reported() {
        let mut inv = invoice(0, 20_000, InvoiceStatus::Unpaid);
        inv.items.push(inv.items[0].clone());
        inv.items[1].total_price_cents = i64::MAX;
        let found = check_invoice(&inv);
        assert!(found
            .iter()
            .any(|d| matches!(d, Discrepancy::InvoiceItemsOverflow { .. })));
    }

    #[test]
    fn test_shift_checks() {
        let good = SalesDetails {
            cash_cents: 10_000,
            card_cents: 5_000,
            instapay_cents: 0,
            total_cents: 15_000,
        };
        assert!(check_shift(&shift(good, 15_000)).is_empty());

        let bad = SalesDetails {
            cash_cents: -100,
            card_cents: 0,
            instapay_cents: 0,
            total_cents: 0,
        };
        let found = check_shift(&shift(bad, -100));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_report_accumulates() {
        let mut report = AuditReport::default();
        report.record_supplier(&supplier(100, 0, 100));
        report.record_invoice(&invoice(0, 20_000, InvoiceStatus::Unpaid));
        assert!(report.is_clean());

        report.record_supplier(&supplier(100, 0, 0));
        assert!(!report.is_clean());
        assert_eq!(report.suppliers_checked, 2);
        assert_eq!(report.invoices_checked, 1);
        assert_eq!(
            report.discrepancies[0].to_string(),
            "supplier Nile Beauty: balance 0.00, expected 1.00"
        );
    }
}
