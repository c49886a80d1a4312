//! Record builders shared by the unit tests.

use chrono::Utc;

use crate::repository::new_id;
use salon_core::ledger::{self, item_total};
use salon_core::{
    Customer, Money, PaymentMethod, PaymentTerms, PurchaseInvoice, PurchaseInvoiceItem, Sale,
    SaleStatus, SalesDetails, Shift, ShiftStatus, Supplier, SupplierStatus,
};

pub fn supplier(name: &str) -> Supplier {
    let now = Utc::now();
    Supplier {
        id: new_id(),
        name: name.to_string(),
        phone: "0100000001".to_string(),
        address: "Cairo".to_string(),
        status: SupplierStatus::Active,
        balance_cents: 0,
        total_purchases_cents: 0,
        total_paid_cents: 0,
        notes: String::new(),
        created_at: now,
        updated_at: now,
        sync_version: 0,
    }
}

/// An unpaid invoice whose derived fields are consistent with `lines`.
pub fn purchase_invoice(number: &str, supplier_id: &str, lines: &[(i64, i64)]) -> PurchaseInvoice {
    let now = Utc::now();
    let items: Vec<PurchaseInvoiceItem> = lines
        .iter()
        .map(|&(quantity, unit_price_cents)| PurchaseInvoiceItem {
            id: new_id(),
            item_name: "Hair dye".to_string(),
            quantity,
            unit_price_cents,
            total_price_cents: item_total(quantity, Money::from_cents(unit_price_cents))
                .expect("line total")
                .cents(),
        })
        .collect();
    let total = ledger::invoice_total(&items).expect("invoice total");
    let balance = ledger::remaining_and_status(total, Money::zero());

    PurchaseInvoice {
        id: new_id(),
        invoice_number: number.to_string(),
        supplier_id: supplier_id.to_string(),
        supplier_name: "Nile Beauty".to_string(),
        invoice_date: now,
        items,
        total_amount_cents: total.cents(),
        wholesale_amount_cents: 0,
        paid_amount_cents: 0,
        remaining_amount_cents: balance.remaining.cents(),
        status: balance.status,
        payment_terms: PaymentTerms::Cash,
        notes: String::new(),
        created_at: now,
        updated_at: now,
        sync_version: 0,
    }
}

pub fn sale(number: &str, amount: i64, discount: i64, method: PaymentMethod) -> Sale {
    let now = Utc::now();
    Sale {
        id: new_id(),
        invoice_number: number.to_string(),
        customer_name: "Salma".to_string(),
        customer_phone: None,
        service: Some("Haircut".to_string()),
        category: None,
        amount_cents: amount,
        discount_cents: discount,
        payment_method: method,
        status: SaleStatus::Completed,
        sale_date: now,
        notes: None,
        created_at: now,
        updated_at: now,
        sync_version: 0,
    }
}

/// An open shift with zero sales.
pub fn shift(cashier: &str) -> Shift {
    let now = Utc::now();
    Shift {
        id: new_id(),
        cashier: cashier.to_string(),
        start_time: "09:00".to_string(),
        end_time: None,
        starting_cash_cents: 50_000,
        total_sales_cents: 0,
        total_expenses_cents: 0,
        final_cash_cents: 0,
        status: ShiftStatus::Open,
        sales_details: SalesDetails::default(),
        opened_at: now,
        closed_at: None,
        updated_at: now,
        sync_version: 0,
    }
}

pub fn customer(name: &str, phone: &str) -> Customer {
    let now = Utc::now();
    Customer {
        id: new_id(),
        name: name.to_string(),
        email: None,
        phone: phone.to_string(),
        visits: 0,
        spending_cents: 0,
        vip: false,
        visit_history: Vec::new(),
        created_at: now,
        updated_at: now,
        sync_version: 0,
    }
}
