//! # Supplier Balance Reconciliation
//!
//! Applies purchase invoice effects to a supplier's running totals.
//!
//! Every adjustment is a single atomic statement:
//!
//! ```text
//! UPDATE suppliers SET
//!     total_purchases = total_purchases + Δpurchases,
//!     total_paid      = total_paid + Δpaid,
//!     balance         = (total_purchases + Δpurchases) - (total_paid + Δpaid)
//! ```
//!
//! so concurrent invoice writes against the same supplier never lose an
//! update. The functions take the caller's connection and are meant to run
//! inside the same transaction as the invoice write.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use super::Reconciled;
use crate::error::DbResult;
use salon_core::ledger::{BalanceAdjustment, SupplierDelta};
use salon_core::Money;

/// Adds a delta to the supplier's totals and recomputes its balance.
pub async fn apply_delta(
    conn: &mut SqliteConnection,
    supplier_id: &str,
    delta: SupplierDelta,
) -> DbResult<Reconciled> {
    let result = sqlx::query(
        r#"
        UPDATE suppliers SET
            total_purchases_cents = total_purchases_cents + ?2,
            total_paid_cents = total_paid_cents + ?3,
            balance_cents = (total_purchases_cents + ?2) - (total_paid_cents + ?3),
            updated_at = ?4,
            sync_version = sync_version + 1
        WHERE id = ?1
        "#,
    )
    .bind(supplier_id)
    .bind(delta.purchases.cents())
    .bind(delta.paid.cents())
    .bind(Utc::now())
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        warn!(supplier_id = %supplier_id, "Supplier not found, skipping balance reconciliation");
        return Ok(Reconciled::Skipped);
    }

    debug!(
        supplier_id = %supplier_id,
        purchases = %delta.purchases,
        paid = %delta.paid,
        "Supplier totals adjusted"
    );
    Ok(Reconciled::Applied)
}

/// A new invoice adds its base total to purchases and its paid amount to paid.
pub async fn apply_invoice_create(
    conn: &mut SqliteConnection,
    supplier_id: &str,
    base_total: Money,
    paid: Money,
) -> DbResult<Reconciled> {
    apply_delta(conn, supplier_id, SupplierDelta::for_invoice(base_total, paid)).await
}

/// An edited invoice: reverse the old contribution, then apply the new one.
///
/// The two adjustments are written as separate statements in this order.
pub async fn apply_invoice_update(
    conn: &mut SqliteConnection,
    supplier_id: &str,
    old_base_total: Money,
    old_paid: Money,
    new_base_total: Money,
    new_paid: Money,
) -> DbResult<Reconciled> {
    let [reverse, apply] =
        SupplierDelta::invoice_edit(old_base_total, old_paid, new_base_total, new_paid);

    if apply_delta(conn, supplier_id, reverse).await? == Reconciled::Skipped {
        return Ok(Reconciled::Skipped);
    }
    apply_delta(conn, supplier_id, apply).await
}

/// A deleted invoice takes its contribution back out.
pub async fn apply_invoice_delete(
    conn: &mut SqliteConnection,
    supplier_id: &str,
    base_total: Money,
    paid: Money,
) -> DbResult<Reconciled> {
    apply_delta(
        conn,
        supplier_id,
        SupplierDelta::for_invoice(base_total, paid).reversed(),
    )
    .await
}

/// A payment recorded against one of the supplier's invoices.
pub async fn apply_payment(
    conn: &mut SqliteConnection,
    supplier_id: &str,
    amount: Money,
) -> DbResult<Reconciled> {
    apply_delta(conn, supplier_id, SupplierDelta::payment(amount)).await
}

/// A manual charge or settlement outside any invoice.
pub async fn apply_adjustment(
    conn: &mut SqliteConnection,
    supplier_id: &str,
    adjustment: BalanceAdjustment,
) -> DbResult<Reconciled> {
    apply_delta(conn, supplier_id, adjustment.delta()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::test_support;
    use salon_core::Supplier;

    fn cents(value: i64) -> Money {
        Money::from_cents(value)
    }

    async fn reload(db: &Database, id: &str) -> Supplier {
        db.suppliers().get_by_id(id).await.unwrap().unwrap()
    }

    fn assert_identity(supplier: &Supplier) {
        assert_eq!(
            supplier.balance_cents,
            supplier.total_purchases_cents - supplier.total_paid_cents
        );
    }

    #[tokio::test]
    async fn test_invoice_lifecycle_keeps_balance_identity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = test_support::supplier("Nile Beauty");
        db.suppliers().insert(&supplier).await.unwrap();

        // Create: base 200, paid 50.
        let mut tx = db.begin().await.unwrap();
        let outcome = apply_invoice_create(&mut tx, &supplier.id, cents(20_000), cents(5_000))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(outcome, Reconciled::Applied);
        let s = reload(&db, &supplier.id).await;
        assert_eq!((s.total_purchases_cents, s.total_paid_cents), (20_000, 5_000));
        assert_identity(&s);

        // Edit: base 300, paid 50.
        let mut tx = db.begin().await.unwrap();
        let _ = apply_invoice_update(
            &mut tx,
            &supplier.id,
            cents(20_000),
            cents(5_000),
            cents(30_000),
            cents(5_000),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        let s = reload(&db, &supplier.id).await;
        assert_eq!((s.total_purchases_cents, s.total_paid_cents), (30_000, 5_000));
        assert_identity(&s);

        // Payment of 100.
        let mut tx = db.begin().await.unwrap();
        let _ = apply_payment(&mut tx, &supplier.id, cents(10_000)).await.unwrap();
        tx.commit().await.unwrap();
        let s = reload(&db, &supplier.id).await;
        assert_eq!(s.balance_cents, 15_000);
        assert_identity(&s);

        // Delete: base 300, paid 150.
        let mut tx = db.begin().await.unwrap();
        let _ = apply_invoice_delete(&mut tx, &supplier.id, cents(30_000), cents(15_000))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        let s = reload(&db, &supplier.id).await;
        assert_eq!((s.total_purchases_cents, s.total_paid_cents, s.balance_cents), (0, 0, 0));
        assert_eq!(s.sync_version, 5);
    }

    #[tokio::test]
    async fn test_missing_supplier_is_skipped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let outcome = apply_invoice_create(&mut conn, "missing", cents(100), cents(0))
            .await
            .unwrap();
        assert_eq!(outcome, Reconciled::Skipped);

        let outcome = apply_invoice_update(
            &mut conn,
            "missing",
            cents(100),
            cents(0),
            cents(200),
            cents(0),
        )
        .await
        .unwrap();
        assert_eq!(outcome, Reconciled::Skipped);
    }

    #[tokio::test]
    async fn test_adjustments() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = test_support::supplier("Nile Beauty");
        db.suppliers().insert(&supplier).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let _ = apply_adjustment(&mut conn, &supplier.id, BalanceAdjustment::Charge(cents(7_000)))
            .await
            .unwrap();
        let _ = apply_adjustment(&mut conn, &supplier.id, BalanceAdjustment::Settle(cents(2_000)))
            .await
            .unwrap();
        drop(conn);

        let s = reload(&db, &supplier.id).await;
        assert_eq!(s.total_purchases_cents, 7_000);
        assert_eq!(s.total_paid_cents, 2_000);
        assert_eq!(s.balance_cents, 5_000);
    }

    #[tokio::test]
    async fn test_rolled_back_adjustment_leaves_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = test_support::supplier("Nile Beauty");
        db.suppliers().insert(&supplier).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        let _ = apply_invoice_create(&mut tx, &supplier.id, cents(20_000), cents(0))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let s = reload(&db, &supplier.id).await;
        assert_eq!(s.total_purchases_cents, 0);
        assert_eq!(s.sync_version, 0);
    }
}
