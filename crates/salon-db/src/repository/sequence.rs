//! # Invoice Sequences
//!
//! One counter row per invoice prefix, advanced atomically.
//!
//! ```text
//! INSERT INTO invoice_sequences (prefix, last_value) VALUES ('PI', <seed>)
//! ON CONFLICT (prefix) DO UPDATE SET last_value = last_value + 1
//! RETURNING last_value
//! ```
//!
//! The first call for a prefix stores the seed; every later call increments.
//! Two concurrent callers therefore never receive the same value, and the
//! UNIQUE index on each invoice number column backs this up.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use salon_core::InvoiceSequence;

/// Repository for invoice number counters.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: SqlitePool,
}

impl SequenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SequenceRepository { pool }
    }

    /// Allocates the next invoice number of a sequence.
    ///
    /// ## Arguments
    /// * `seed` - value to start from if this prefix has no counter yet
    ///   (derived from existing invoices, see [`InvoiceSequence::next_after`])
    pub async fn next_number(
        &self,
        conn: &mut SqliteConnection,
        sequence: InvoiceSequence,
        seed: u64,
    ) -> DbResult<String> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice_sequences (prefix, last_value)
            VALUES (?1, ?2)
            ON CONFLICT (prefix) DO UPDATE SET last_value = last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(sequence.prefix())
        .bind(seed as i64)
        .fetch_one(conn)
        .await?;

        let number = sequence.format(value as u64);
        debug!(prefix = sequence.prefix(), number = %number, "Allocated invoice number");
        Ok(number)
    }

    /// The last value handed out, if any (for diagnostics).
    pub async fn current(&self, sequence: InvoiceSequence) -> DbResult<Option<u64>> {
        let value: Option<i64> =
            sqlx::query_scalar("SELECT last_value FROM invoice_sequences WHERE prefix = ?1")
                .bind(sequence.prefix())
                .fetch_optional(&self.pool)
                .await?;

        Ok(value.map(|v| v as u64))
    }
}
