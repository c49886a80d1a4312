//! Sales summaries over a period.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentMethod, Sale};

/// Count and net amount of the sales taken with one payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MethodTotals {
    pub count: u64,
    pub amount_cents: i64,
}

/// Revenue, discount and payment-method breakdown of a set of sales.
///
/// Revenue is the sum of net amounts (amount minus discount).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub sale_count: u64,
    pub revenue_cents: i64,
    pub total_discount_cents: i64,
    pub cash: MethodTotals,
    pub card: MethodTotals,
    pub instapay: MethodTotals,
}

impl SalesSummary {
    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> Self {
        let mut summary = SalesSummary::default();
        for sale in sales {
            summary.add(sale);
        }
        summary
    }

    pub fn add(&mut self, sale: &Sale) {
        let net = sale.net_amount();

        self.sale_count += 1;
        self.revenue_cents += net.cents();
        self.total_discount_cents += sale.discount_cents;

        let bucket = self.method_mut(sale.payment_method);
        bucket.count += 1;
        bucket.amount_cents += net.cents();
    }

    pub fn method(&self, method: PaymentMethod) -> MethodTotals {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Card => self.card,
            PaymentMethod::Instapay => self.instapay,
        }
    }

    fn method_mut(&mut self, method: PaymentMethod) -> &mut MethodTotals {
        match method {
            PaymentMethod::Cash => &mut self.cash,
            PaymentMethod::Card => &mut self.card,
            PaymentMethod::Instapay => &mut self.instapay,
        }
    }

    #[inline]
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleStatus;
    use chrono::Utc;

    fn sale(amount: i64, discount: i64, method: PaymentMethod) -> Sale {
        Sale {
            id: format!("sale-{amount}-{discount}"),
            invoice_number: "INV-0001".to_string(),
            customer_name: "Salma".to_string(),
            customer_phone: None,
            service: None,
            category: None,
            amount_cents: amount,
            discount_cents: discount,
            payment_method: method,
            status: SaleStatus::Completed,
            sale_date: Utc::now(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            sync_version: 0,
        }
    }

    #[test]
    fn test_summary_breakdown() {
        let sales = vec![
            sale(12_000, 2_000, PaymentMethod::Cash),
            sale(5_000, 0, PaymentMethod::Card),
            sale(3_000, 500, PaymentMethod::Cash),
        ];

        let summary = SalesSummary::from_sales(&sales);
        assert_eq!(summary.sale_count, 3);
        assert_eq!(summary.revenue().cents(), 17_500);
        assert_eq!(summary.total_discount_cents, 2_500);
        assert_eq!(summary.method(PaymentMethod::Cash).count, 2);
        assert_eq!(summary.method(PaymentMethod::Cash).amount_cents, 12_500);
        assert_eq!(summary.card.amount_cents, 5_000);
        assert_eq!(summary.instapay, MethodTotals::default());
    }

    #[test]
    fn test_empty_summary() {
        let sales: Vec<Sale> = Vec::new();
        let summary = SalesSummary::from_sales(&sales);
        assert_eq!(summary, SalesSummary::default());
    }
}
