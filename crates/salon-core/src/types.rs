//! # Domain Types
//!
//! Records that take part in reconciliation.
//!
//! ## Detail vs Aggregate Records
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  DETAIL (mutated by requests)        AGGREGATE (mutated as side effect) │
//! │  ┌─────────────────┐                 ┌─────────────────┐                │
//! │  │ PurchaseInvoice │ ──────────────► │    Supplier     │                │
//! │  │  items[]        │  totals/paid    │  balance        │                │
//! │  │  paid/remaining │                 │  total_purchases│                │
//! │  └─────────────────┘                 │  total_paid     │                │
//! │                                      └─────────────────┘                │
//! │  ┌─────────────────┐                 ┌─────────────────┐                │
//! │  │      Sale       │ ──────────────► │      Shift      │                │
//! │  │  amount         │  net by method  │  sales_details  │                │
//! │  │  discount       │                 │  total_sales    │                │
//! │  │  payment_method │                 └─────────────────┘                │
//! │  │  customer_phone │ ──────────────► ┌─────────────────┐                │
//! │  └─────────────────┘  visit + spend  │    Customer     │                │
//! │                                      │  visit_history  │                │
//! │                                      └─────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amount fields are stored as `*_cents: i64` and exposed as [`Money`]
//! through accessor methods.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ledger::{self, InvoiceBalance, ShiftLedger};
use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a customer paid for a sale. Each method has its own shift bucket.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Instapay,
}

impl PaymentMethod {
    /// All methods, in shift-report order.
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Instapay,
    ];

    /// Maps a free-form label to a payment method.
    ///
    /// Matching is case-insensitive and accepts the English names as well as
    /// the labels the front desk uses ("نقدي", "بطاقة", "InstaPay").
    /// Anything unrecognized is treated as cash.
    ///
    /// ```rust
    /// use salon_core::PaymentMethod;
    ///
    /// assert_eq!(PaymentMethod::from_label("CARD"), PaymentMethod::Card);
    /// assert_eq!(PaymentMethod::from_label("بطاقة"), PaymentMethod::Card);
    /// assert_eq!(PaymentMethod::from_label("InstaPay"), PaymentMethod::Instapay);
    /// assert_eq!(PaymentMethod::from_label("voucher"), PaymentMethod::Cash);
    /// ```
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "card" | "بطاقة" => PaymentMethod::Card,
            "instapay" => PaymentMethod::Instapay,
            _ => PaymentMethod::Cash,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Instapay => "instapay",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// The status of a sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[default]
    Completed,
    Pending,
    Cancelled,
}

impl SaleStatus {
    /// Maps an English or localized status label; unknown labels are `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "completed" | "مكتمل" => Some(SaleStatus::Completed),
            "pending" | "قيد الانتظار" => Some(SaleStatus::Pending),
            "cancelled" | "ملغي" => Some(SaleStatus::Cancelled),
            _ => None,
        }
    }
}

/// A service sale rung up at the front desk.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,

    /// Human-readable number, `INV-0001` onwards.
    pub invoice_number: String,

    pub customer_name: String,

    /// Phone number typed at the till. Links to a customer by value only.
    pub customer_phone: Option<String>,

    /// Service label shown in the customer's visit history.
    pub service: Option<String>,

    pub category: Option<String>,

    /// Gross amount before discount.
    pub amount_cents: i64,

    pub discount_cents: i64,

    pub payment_method: PaymentMethod,

    pub status: SaleStatus,

    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Incremented on every write; used as the optimistic concurrency token.
    pub sync_version: i64,
}

impl Sale {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    /// Gross amount minus discount. See [`ledger::net_sale_amount`].
    #[inline]
    pub fn net_amount(&self) -> Money {
        ledger::net_sale_amount(self.amount(), self.discount())
    }
}

// =============================================================================
// Purchase Invoice
// =============================================================================

/// Payment state of a purchase invoice, derived from paid vs base total.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

/// Agreed settlement terms of a purchase invoice. Informational only.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTerms {
    #[default]
    Cash,
    Credit,
    Mixed,
}

impl PaymentTerms {
    /// Maps an English or localized label; unknown labels fall back to cash.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "credit" | "آجل" => PaymentTerms::Credit,
            "mixed" | "مختلط" => PaymentTerms::Mixed,
            _ => PaymentTerms::Cash,
        }
    }
}

/// A line on a purchase invoice.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseInvoiceItem {
    pub id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Always `quantity × unit_price`; never taken from the client.
    pub total_price_cents: i64,
}

impl PurchaseInvoiceItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// Stock bought from a supplier.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseInvoice {
    pub id: String,

    /// Human-readable number, `PI-0001` onwards.
    pub invoice_number: String,

    pub supplier_id: String,

    /// Supplier name at the time the invoice was recorded.
    pub supplier_name: String,

    #[ts(as = "String")]
    pub invoice_date: DateTime<Utc>,

    /// Loaded from `purchase_invoice_items` by the repository.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<PurchaseInvoiceItem>,

    /// Sum of item totals.
    pub total_amount_cents: i64,

    /// Optional negotiated amount that replaces the item total when positive.
    pub wholesale_amount_cents: i64,

    pub paid_amount_cents: i64,

    /// Derived: `max(0, base_total - paid)`.
    pub remaining_amount_cents: i64,

    /// Derived from paid vs base total.
    pub status: InvoiceStatus,

    pub payment_terms: PaymentTerms,

    pub notes: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    pub sync_version: i64,
}

impl PurchaseInvoice {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    #[inline]
    pub fn wholesale_amount(&self) -> Money {
        Money::from_cents(self.wholesale_amount_cents)
    }

    #[inline]
    pub fn paid_amount(&self) -> Money {
        Money::from_cents(self.paid_amount_cents)
    }

    /// The amount payments are judged against.
    #[inline]
    pub fn base_total(&self) -> Money {
        ledger::base_total(self.total_amount(), self.wholesale_amount())
    }

    /// Remaining amount and status as they should be stored.
    pub fn expected_balance(&self) -> InvoiceBalance {
        ledger::remaining_and_status(self.base_total(), self.paid_amount())
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    #[default]
    Active,
    Suspended,
}

/// A supplier and its running account.
///
/// `balance = total_purchases - total_paid` is maintained incrementally by
/// every purchase invoice mutation; it is never recomputed from invoices.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub status: SupplierStatus,
    pub balance_cents: i64,
    pub total_purchases_cents: i64,
    pub total_paid_cents: i64,
    pub notes: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub sync_version: i64,
}

impl Supplier {
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }

    #[inline]
    pub fn total_purchases(&self) -> Money {
        Money::from_cents(self.total_purchases_cents)
    }

    #[inline]
    pub fn total_paid(&self) -> Money {
        Money::from_cents(self.total_paid_cents)
    }
}

// =============================================================================
// Shift
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    #[default]
    Open,
    Closed,
}

/// Per-payment-method sales collected during a shift.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesDetails {
    pub cash_cents: i64,
    pub card_cents: i64,
    pub instapay_cents: i64,
    /// Always `cash + card + instapay`.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "details_total_cents"))]
    pub total_cents: i64,
}

/// A cashier's shift at the till.
///
/// Closing a shift does not reset its sales figures; they become the
/// shift's financial report.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    pub cashier: String,
    /// Wall-clock label entered by the cashier, e.g. "09:00".
    pub start_time: String,
    pub end_time: Option<String>,
    pub starting_cash_cents: i64,
    pub total_sales_cents: i64,
    pub total_expenses_cents: i64,
    pub final_cash_cents: i64,
    pub status: ShiftStatus,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub sales_details: SalesDetails,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub sync_version: i64,
}

impl Shift {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }

    /// The sales ledger in Money form.
    pub fn ledger(&self) -> ShiftLedger {
        ShiftLedger {
            total_sales: Money::from_cents(self.total_sales_cents),
            cash: Money::from_cents(self.sales_details.cash_cents),
            card: Money::from_cents(self.sales_details.card_cents),
            instapay: Money::from_cents(self.sales_details.instapay_cents),
        }
    }
}

impl From<ShiftLedger> for SalesDetails {
    fn from(ledger: ShiftLedger) -> Self {
        SalesDetails {
            cash_cents: ledger.cash.cents(),
            card_cents: ledger.card.cents(),
            instapay_cents: ledger.instapay.cents(),
            total_cents: ledger.details_total().cents(),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// One line of a customer's visit log.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VisitEntry {
    #[ts(as = "String")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "visit_date"))]
    pub date: NaiveDate,
    pub services: String,
    pub amount_cents: i64,
}

/// A salon customer, identified at the till by phone number.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub visits: i64,
    pub spending_cents: i64,
    pub vip: bool,
    /// Append-only, oldest first. Loaded from `customer_visits`.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub visit_history: Vec<VisitEntry>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub sync_version: i64,
}

impl Customer {
    #[inline]
    pub fn spending(&self) -> Money {
        Money::from_cents(self.spending_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
