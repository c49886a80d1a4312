//! # Ledger Math
//!
//! Pure functions deriving every computed money field in the back office.
//!
//! ## Where Each Function Is Used
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Purchase invoice write                                                 │
//! │  ├── item_total()            quantity × unit price, per line            │
//! │  ├── invoice_total()         Σ line totals                              │
//! │  ├── base_total()            wholesale override or item total           │
//! │  ├── clamp_paid()            paid kept within [0, base]                 │
//! │  └── remaining_and_status()  stored remaining + status                  │
//! │                                                                         │
//! │  Supplier account                                                       │
//! │  └── SupplierDelta           ± total_purchases / total_paid             │
//! │                                                                         │
//! │  Sale → shift                                                           │
//! │  ├── net_sale_amount()       amount − discount                          │
//! │  └── ShiftLedger             credit / debit per payment method          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{InvoiceStatus, PaymentMethod, PurchaseInvoiceItem};

// =============================================================================
// Purchase Invoice Totals
// =============================================================================

fn overflow(field: &str) -> CoreError {
    CoreError::AmountOverflow {
        field: field.to_string(),
    }
}

/// Line total for a purchase invoice item.
///
/// ## Errors
/// - `AmountOverflow` when `quantity × unit_price` does not fit in an i64
pub fn item_total(quantity: i64, unit_price: Money) -> CoreResult<Money> {
    unit_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| overflow("item total"))
}

/// Sum of line totals.
///
/// ## Errors
/// - `AmountOverflow` when the sum does not fit in an i64
pub fn invoice_total(items: &[PurchaseInvoiceItem]) -> CoreResult<Money> {
    items.iter().try_fold(Money::zero(), |total, item| {
        total
            .checked_add(item.total_price())
            .ok_or_else(|| overflow("invoice total"))
    })
}

/// The amount payment sufficiency and status are judged against.
///
/// A positive wholesale amount replaces the summed item total.
///
/// ```rust
/// use salon_core::ledger::base_total;
/// use salon_core::Money;
///
/// let items = Money::from_cents(20_000);
/// assert_eq!(base_total(items, Money::zero()), items);
/// assert_eq!(base_total(items, Money::from_cents(18_000)).cents(), 18_000);
/// ```
#[inline]
pub fn base_total(total_amount: Money, wholesale_amount: Money) -> Money {
    if wholesale_amount.is_positive() {
        wholesale_amount
    } else {
        total_amount
    }
}

/// Remaining amount and status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceBalance {
    pub remaining: Money,
    pub status: InvoiceStatus,
}

/// Derives what an invoice still owes and its payment status.
///
/// ## Thresholds
/// ```text
/// paid == 0          → Unpaid
/// paid >= base_total → Paid
/// otherwise          → Partial
/// ```
///
/// `remaining` never goes below zero even if the invoice is overpaid.
pub fn remaining_and_status(base_total: Money, paid: Money) -> InvoiceBalance {
    let status = if paid.is_zero() || paid.is_negative() {
        InvoiceStatus::Unpaid
    } else if paid >= base_total {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::Partial
    };

    InvoiceBalance {
        remaining: (base_total - paid).floor_zero(),
        status,
    }
}

/// Keeps a client-supplied paid amount within `[0, base_total]`.
#[inline]
pub fn clamp_paid(paid: Money, base_total: Money) -> Money {
    paid.floor_zero().min(base_total.floor_zero())
}

/// Validates a payment against an invoice and returns the new paid amount.
///
/// ## Errors
/// - `MustBePositive` when `payment <= 0`
/// - `PaymentExceedsTotal` when `paid + payment > base_total`
/// - `AmountOverflow` when `paid + payment` does not fit in an i64
pub fn apply_payment(
    invoice_number: &str,
    base_total: Money,
    paid: Money,
    payment: Money,
) -> CoreResult<Money> {
    if !payment.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into());
    }

    let new_paid = paid
        .checked_add(payment)
        .ok_or_else(|| overflow("paid amount"))?;
    if new_paid > base_total {
        return Err(CoreError::PaymentExceedsTotal {
            invoice_number: invoice_number.to_string(),
            paid,
            payment,
            base_total,
        });
    }

    Ok(new_paid)
}

// =============================================================================
// Sales
// =============================================================================

/// Gross amount minus discount.
///
/// No floor is applied; sale validation rejects discounts above the amount.
#[inline]
pub fn net_sale_amount(amount: Money, discount: Money) -> Money {
    amount - discount
}

// =============================================================================
// Supplier Deltas
// =============================================================================

/// A change to a supplier's running totals.
///
/// Suppliers are only ever adjusted by deltas. Balance follows from the two
/// totals after each adjustment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDelta {
    pub purchases: Money,
    pub paid: Money,
}

impl SupplierDelta {
    /// The contribution of one invoice to its supplier.
    #[inline]
    pub const fn for_invoice(base_total: Money, paid: Money) -> Self {
        SupplierDelta {
            purchases: base_total,
            paid,
        }
    }

    /// A payment against an existing invoice.
    #[inline]
    pub const fn payment(amount: Money) -> Self {
        SupplierDelta {
            purchases: Money::zero(),
            paid: amount,
        }
    }

    /// Undoes this delta.
    #[inline]
    pub fn reversed(self) -> Self {
        SupplierDelta {
            purchases: -self.purchases,
            paid: -self.paid,
        }
    }

    /// The two adjustments applied when an invoice is edited: the old
    /// contribution is reversed, then the new one applied.
    ///
    /// The steps are applied in order, never folded into a single diff.
    pub fn invoice_edit(
        old_base_total: Money,
        old_paid: Money,
        new_base_total: Money,
        new_paid: Money,
    ) -> [SupplierDelta; 2] {
        [
            SupplierDelta::for_invoice(old_base_total, old_paid).reversed(),
            SupplierDelta::for_invoice(new_base_total, new_paid),
        ]
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.purchases.is_zero() && self.paid.is_zero()
    }
}

/// A supplier's running totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierTotals {
    pub total_purchases: Money,
    pub total_paid: Money,
    pub balance: Money,
}

impl SupplierTotals {
    /// Applies a delta and recomputes the balance from the two totals.
    pub fn apply(self, delta: SupplierDelta) -> Self {
        let total_purchases = self.total_purchases + delta.purchases;
        let total_paid = self.total_paid + delta.paid;
        SupplierTotals {
            total_purchases,
            total_paid,
            balance: total_purchases - total_paid,
        }
    }
}

/// Manual correction of a supplier account outside any invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceAdjustment {
    /// The business owes the supplier more (adds to total purchases).
    Charge(Money),
    /// Money handed to the supplier outside an invoice (adds to total paid).
    Settle(Money),
}

impl BalanceAdjustment {
    pub fn amount(&self) -> Money {
        match *self {
            BalanceAdjustment::Charge(amount) | BalanceAdjustment::Settle(amount) => amount,
        }
    }

    pub fn delta(&self) -> SupplierDelta {
        match *self {
            BalanceAdjustment::Charge(amount) => SupplierDelta {
                purchases: amount,
                paid: Money::zero(),
            },
            BalanceAdjustment::Settle(amount) => SupplierDelta::payment(amount),
        }
    }
}

// =============================================================================
// Shift Ledger
// =============================================================================

/// Sales collected during a shift, per payment method.
///
/// ## Clamping
/// Debits floor each bucket and the running total at zero. Once a floor has
/// been hit, crediting the same amount back does not restore the previous
/// figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftLedger {
    pub total_sales: Money,
    pub cash: Money,
    pub card: Money,
    pub instapay: Money,
}

impl ShiftLedger {
    /// `cash + card + instapay`.
    #[inline]
    pub fn details_total(&self) -> Money {
        self.cash + self.card + self.instapay
    }

    pub fn bucket(&self, method: PaymentMethod) -> Money {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Card => self.card,
            PaymentMethod::Instapay => self.instapay,
        }
    }

    fn bucket_mut(&mut self, method: PaymentMethod) -> &mut Money {
        match method {
            PaymentMethod::Cash => &mut self.cash,
            PaymentMethod::Card => &mut self.card,
            PaymentMethod::Instapay => &mut self.instapay,
        }
    }

    /// Records a sale's net amount.
    ///
    /// ```rust
    /// use salon_core::ledger::ShiftLedger;
    /// use salon_core::{Money, PaymentMethod};
    ///
    /// let ledger = ShiftLedger::default()
    ///     .credit(PaymentMethod::Cash, Money::from_cents(10_000))
    ///     .credit(PaymentMethod::Card, Money::from_cents(5_000));
    ///
    /// assert_eq!(ledger.details_total().cents(), 15_000);
    /// assert_eq!(ledger.total_sales.cents(), 15_000);
    /// ```
    pub fn credit(mut self, method: PaymentMethod, amount: Money) -> Self {
        *self.bucket_mut(method) += amount;
        self.total_sales += amount;
        self
    }

    /// Removes a sale's net amount, flooring at zero.
    pub fn debit(mut self, method: PaymentMethod, amount: Money) -> Self {
        let bucket = self.bucket_mut(method);
        *bucket = (*bucket - amount).floor_zero();
        self.total_sales = (self.total_sales - amount).floor_zero();
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, unit_price_cents: i64) -> PurchaseInvoiceItem {
        PurchaseInvoiceItem {
            id: format!("item-{quantity}-{unit_price_cents}"),
            item_name: "Hair dye".to_string(),
            quantity,
            unit_price_cents,
            total_price_cents: item_total(quantity, Money::from_cents(unit_price_cents))
                .unwrap()
                .cents(),
        }
    }

    #[test]
    fn test_item_and_invoice_totals() {
        let items = vec![item(2, 10_000), item(3, 1_250)];
        assert_eq!(items[0].total_price_cents, 20_000);
        assert_eq!(invoice_total(&items).unwrap().cents(), 23_750);
        assert!(invoice_total(&[]).unwrap().is_zero());
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let err = item_total(2, Money::from_cents(i64::MAX)).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { .. }));

        let mut items = vec![item(1, 1), item(1, 1)];
        items[0].total_price_cents = i64::MAX;
        let err = invoice_total(&items).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { .. }));
    }

    #[test]
    fn test_payment_overflow_is_rejected() {
        let base = Money::from_cents(i64::MAX);
        let paid = Money::from_cents(i64::MAX - 10);

        let err = apply_payment("PI-0001", base, paid, Money::from_cents(i64::MAX)).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { .. }));

        // Still exact right up to the limit.
        let new_paid = apply_payment("PI-0001", base, paid, Money::from_cents(10)).unwrap();
        assert_eq!(new_paid, base);
    }

    #[test]
    fn test_status_thresholds() {
        let base = Money::from_cents(20_000);

        let unpaid = remaining_and_status(base, Money::zero());
        assert_eq!(unpaid.status, InvoiceStatus::Unpaid);
        assert_eq!(unpaid.remaining, base);

        let partial = remaining_and_status(base, Money::from_cents(5_000));
        assert_eq!(partial.status, InvoiceStatus::Partial);
        assert_eq!(partial.remaining.cents(), 15_000);

        let paid = remaining_and_status(base, base);
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert!(paid.remaining.is_zero());
    }

    #[test]
    fn test_overpaid_invoice_has_no_negative_remaining() {
        let balance = remaining_and_status(Money::from_cents(100), Money::from_cents(150));
        assert_eq!(balance.status, InvoiceStatus::Paid);
        assert!(balance.remaining.is_zero());
    }

    #[test]
    fn test_zero_base_unpaid_invoice() {
        let balance = remaining_and_status(Money::zero(), Money::zero());
        assert_eq!(balance.status, InvoiceStatus::Unpaid);
        assert!(balance.remaining.is_zero());
    }

    #[test]
    fn test_clamp_paid() {
        let base = Money::from_cents(1_000);
        assert_eq!(clamp_paid(Money::from_cents(-5), base), Money::zero());
        assert_eq!(clamp_paid(Money::from_cents(400), base).cents(), 400);
        assert_eq!(clamp_paid(Money::from_cents(4_000), base), base);
    }

    /// items [{2 × 100.00}], no wholesale: pay 200 → paid; pay 250 → rejected.
    #[test]
    fn test_payment_scenario() {
        let items = vec![item(2, 10_000)];
        let total = invoice_total(&items).unwrap();
        let base = base_total(total, Money::zero());
        assert_eq!(total.cents(), 20_000);
        assert_eq!(base.cents(), 20_000);

        let paid = apply_payment("PI-0001", base, Money::zero(), Money::from_cents(20_000))
            .unwrap();
        let balance = remaining_and_status(base, paid);
        assert_eq!(balance.status, InvoiceStatus::Paid);
        assert!(balance.remaining.is_zero());

        let err = apply_payment("PI-0001", base, Money::zero(), Money::from_cents(25_000))
            .unwrap_err();
        assert!(matches!(err, CoreError::PaymentExceedsTotal { .. }));
    }

    #[test]
    fn test_payment_must_be_positive() {
        let err = apply_payment("PI-0001", Money::from_cents(100), Money::zero(), Money::zero())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_supplier_balance_tracks_totals_through_lifecycle() {
        let mut totals = SupplierTotals::default();

        // create: base 200, paid 50
        totals = totals.apply(SupplierDelta::for_invoice(
            Money::from_cents(20_000),
            Money::from_cents(5_000),
        ));
        assert_eq!(totals.balance.cents(), 15_000);

        // edit: base 180, paid 50
        for step in SupplierDelta::invoice_edit(
            Money::from_cents(20_000),
            Money::from_cents(5_000),
            Money::from_cents(18_000),
            Money::from_cents(5_000),
        ) {
            totals = totals.apply(step);
            assert_eq!(totals.balance, totals.total_purchases - totals.total_paid);
        }
        assert_eq!(totals.total_purchases.cents(), 18_000);

        // payment of 30
        totals = totals.apply(SupplierDelta::payment(Money::from_cents(3_000)));
        assert_eq!(totals.total_paid.cents(), 8_000);
        assert_eq!(totals.balance.cents(), 10_000);

        // delete: base 180, paid 80
        totals = totals.apply(
            SupplierDelta::for_invoice(Money::from_cents(18_000), Money::from_cents(8_000))
                .reversed(),
        );
        assert_eq!(totals, SupplierTotals::default());
    }

    #[test]
    fn test_balance_adjustment_deltas() {
        let charge = BalanceAdjustment::Charge(Money::from_cents(700)).delta();
        assert_eq!(charge.purchases.cents(), 700);
        assert!(charge.paid.is_zero());

        let settle = BalanceAdjustment::Settle(Money::from_cents(300)).delta();
        assert!(settle.purchases.is_zero());
        assert_eq!(settle.paid.cents(), 300);
    }

    /// 100 cash + 50 card on an empty shift.
    #[test]
    fn test_shift_credit_scenario() {
        let ledger = ShiftLedger::default()
            .credit(PaymentMethod::Cash, Money::from_cents(10_000))
            .credit(PaymentMethod::Card, Money::from_cents(5_000));

        assert_eq!(ledger.cash.cents(), 10_000);
        assert_eq!(ledger.card.cents(), 5_000);
        assert!(ledger.instapay.is_zero());
        assert_eq!(ledger.details_total().cents(), 15_000);
        assert_eq!(ledger.total_sales.cents(), 15_000);
    }

    #[test]
    fn test_shift_credit_then_debit_restores() {
        let start = ShiftLedger::default().credit(PaymentMethod::Instapay, Money::from_cents(900));
        let after = start
            .credit(PaymentMethod::Cash, Money::from_cents(400))
            .debit(PaymentMethod::Cash, Money::from_cents(400));
        assert_eq!(after, start);
    }

    /// Known limitation: once a debit hits the floor, the reversal is lossy.
    #[test]
    fn test_shift_debit_clamps_and_is_not_invertible() {
        let start = ShiftLedger::default().credit(PaymentMethod::Card, Money::from_cents(100));

        let clamped = start.debit(PaymentMethod::Card, Money::from_cents(300));
        assert!(clamped.card.is_zero());
        assert!(clamped.total_sales.is_zero());
        assert_eq!(clamped.details_total(), Money::zero());

        let re_credited = clamped.credit(PaymentMethod::Card, Money::from_cents(300));
        assert_ne!(re_credited, start);
    }

    #[test]
    fn test_net_sale_amount() {
        assert_eq!(
            net_sale_amount(Money::from_cents(6_000), Money::from_cents(1_000)).cents(),
            5_000
        );
    }
}
