//! # Purchase Invoice Repository
//!
//! Purchase invoices and their item lines.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   ├── sequences.next(PI)          → PI-0007                             │
//! │   ├── purchase_invoices.insert()  → header + items                      │
//! │   └── reconcile::supplier         → supplier totals += delta            │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes take the caller's connection so the supplier adjustment commits
//! or rolls back together with the invoice. Updates and deletes are
//! compare-and-swap on `sync_version`: a concurrent writer makes them fail
//! with [`DbError::Conflict`] instead of double-applying a supplier delta.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use salon_core::{PurchaseInvoice, PurchaseInvoiceItem};

/// Repository for purchase invoice database operations.
#[derive(Debug, Clone)]
pub struct PurchaseInvoiceRepository {
    pool: SqlitePool,
}

impl PurchaseInvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseInvoiceRepository { pool }
    }

    /// Gets an invoice with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PurchaseInvoice>> {
        let invoice = sqlx::query_as::<_, PurchaseInvoice>(
            r#"
            SELECT
                id, invoice_number, supplier_id, supplier_name, invoice_date,
                total_amount_cents, wholesale_amount_cents, paid_amount_cents,
                remaining_amount_cents, status, payment_terms, notes,
                created_at, updated_at, sync_version
            FROM purchase_invoices
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match invoice {
            Some(mut invoice) => {
                invoice.items = self.items_of(&invoice.id).await?;
                Ok(Some(invoice))
            }
            None => Ok(None),
        }
    }

    /// Lists all invoices, newest first.
    pub async fn list(&self) -> DbResult<Vec<PurchaseInvoice>> {
        let invoices = sqlx::query_as::<_, PurchaseInvoice>(
            r#"
            SELECT
                id, invoice_number, supplier_id, supplier_name, invoice_date,
                total_amount_cents, wholesale_amount_cents, paid_amount_cents,
                remaining_amount_cents, status, payment_terms, notes,
                created_at, updated_at, sync_version
            FROM purchase_invoices
            ORDER BY invoice_date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.with_items(invoices).await
    }

    /// Lists a supplier's invoices, newest first.
    pub async fn list_by_supplier(&self, supplier_id: &str) -> DbResult<Vec<PurchaseInvoice>> {
        let invoices = sqlx::query_as::<_, PurchaseInvoice>(
            r#"
            SELECT
                id, invoice_number, supplier_id, supplier_name, invoice_date,
                total_amount_cents, wholesale_amount_cents, paid_amount_cents,
                remaining_amount_cents, status, payment_terms, notes,
                created_at, updated_at, sync_version
            FROM purchase_invoices
            WHERE supplier_id = ?1
            ORDER BY invoice_date DESC, created_at DESC
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(invoices).await
    }

    /// The most recently assigned invoice number.
    ///
    /// Sorted by length first so that `PI-10000` ranks above `PI-9999`.
    pub async fn latest_invoice_number(&self) -> DbResult<Option<String>> {
        let number: Option<String> = sqlx::query_scalar(
            r#"
            SELECT invoice_number
            FROM purchase_invoices
            ORDER BY length(invoice_number) DESC, invoice_number DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(number)
    }

    async fn items_of(&self, invoice_id: &str) -> DbResult<Vec<PurchaseInvoiceItem>> {
        let items = sqlx::query_as::<_, PurchaseInvoiceItem>(
            r#"
            SELECT id, item_name, quantity, unit_price_cents, total_price_cents
            FROM purchase_invoice_items
            WHERE invoice_id = ?1
            ORDER BY position
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn with_items(
        &self,
        mut invoices: Vec<PurchaseInvoice>,
    ) -> DbResult<Vec<PurchaseInvoice>> {
        for invoice in &mut invoices {
            invoice.items = self.items_of(&invoice.id).await?;
        }
        Ok(invoices)
    }

    /// Inserts an invoice and its items on the caller's connection.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        invoice: &PurchaseInvoice,
    ) -> DbResult<()> {
        debug!(
            id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            supplier_id = %invoice.supplier_id,
            "Inserting purchase invoice"
        );

        sqlx::query(
            r#"
            INSERT INTO purchase_invoices (
                id, invoice_number, supplier_id, supplier_name, invoice_date,
                total_amount_cents, wholesale_amount_cents, paid_amount_cents,
                remaining_amount_cents, status, payment_terms, notes,
                created_at, updated_at, sync_version
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14, ?15
            )
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.supplier_id)
        .bind(&invoice.supplier_name)
        .bind(invoice.invoice_date)
        .bind(invoice.total_amount_cents)
        .bind(invoice.wholesale_amount_cents)
        .bind(invoice.paid_amount_cents)
        .bind(invoice.remaining_amount_cents)
        .bind(invoice.status)
        .bind(invoice.payment_terms)
        .bind(&invoice.notes)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .bind(invoice.sync_version)
        .execute(&mut *conn)
        .await?;

        insert_items(conn, &invoice.id, &invoice.items).await
    }

    /// Writes an edited invoice if nobody else changed it since it was read.
    ///
    /// ## Arguments
    /// * `expected_version` - `sync_version` the edit was computed from
    /// * `replace_items` - rewrite the item lines as well as the header
    ///
    /// ## Returns
    /// * `Err(DbError::Conflict)` - the invoice changed or disappeared
    pub async fn update(
        &self,
        conn: &mut SqliteConnection,
        invoice: &PurchaseInvoice,
        expected_version: i64,
        replace_items: bool,
    ) -> DbResult<()> {
        debug!(
            id = %invoice.id,
            expected_version,
            replace_items,
            "Updating purchase invoice"
        );

        let result = sqlx::query(
            r#"
            UPDATE purchase_invoices SET
                invoice_date = ?3,
                total_amount_cents = ?4,
                wholesale_amount_cents = ?5,
                paid_amount_cents = ?6,
                remaining_amount_cents = ?7,
                status = ?8,
                payment_terms = ?9,
                notes = ?10,
                updated_at = ?11,
                sync_version = sync_version + 1
            WHERE id = ?1 AND sync_version = ?2
            "#,
        )
        .bind(&invoice.id)
        .bind(expected_version)
        .bind(invoice.invoice_date)
        .bind(invoice.total_amount_cents)
        .bind(invoice.wholesale_amount_cents)
        .bind(invoice.paid_amount_cents)
        .bind(invoice.remaining_amount_cents)
        .bind(invoice.status)
        .bind(invoice.payment_terms)
        .bind(&invoice.notes)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("PurchaseInvoice", &invoice.id));
        }

        if replace_items {
            sqlx::query("DELETE FROM purchase_invoice_items WHERE invoice_id = ?1")
                .bind(&invoice.id)
                .execute(&mut *conn)
                .await?;
            insert_items(conn, &invoice.id, &invoice.items).await?;
        }

        Ok(())
    }

    /// Deletes an invoice (items cascade) if it is still at `expected_version`.
    pub async fn delete(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        expected_version: i64,
    ) -> DbResult<()> {
        debug!(id = %id, expected_version, "Deleting purchase invoice");

        let result =
            sqlx::query("DELETE FROM purchase_invoices WHERE id = ?1 AND sync_version = ?2")
                .bind(id)
                .bind(expected_version)
                .execute(&mut *conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("PurchaseInvoice", id));
        }

        Ok(())
    }
}

async fn insert_items(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    items: &[PurchaseInvoiceItem],
) -> DbResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO purchase_invoice_items (
                id, invoice_id, position, item_name,
                quantity, unit_price_cents, total_price_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(invoice_id)
        .bind(position as i64)
        .bind(&item.item_name)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.total_price_cents)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
