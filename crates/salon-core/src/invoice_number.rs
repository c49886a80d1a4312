//! # Invoice Numbers
//!
//! Formatting and parsing of human-readable invoice numbers.
//!
//! ## Format
//! ```text
//! <PREFIX>-<sequence, zero-padded to 4 digits>
//!
//!   PI-0001    purchase invoices
//!   INV-0042   sales
//!   PI-12345   sequences past 9999 simply grow wider
//! ```
//!
//! Allocation of the sequence value itself happens in the database (an
//! atomic per-prefix counter). This module only decides what the counter
//! starts from and how a value is rendered.

use crate::error::{CoreError, CoreResult};

/// A family of invoice numbers sharing one prefix and one counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceSequence {
    prefix: &'static str,
}

impl InvoiceSequence {
    /// Purchase invoices: `PI-0001`.
    pub const PURCHASE: InvoiceSequence = InvoiceSequence {
        prefix: crate::PURCHASE_INVOICE_PREFIX,
    };

    /// Sales: `INV-0001`.
    pub const SALE: InvoiceSequence = InvoiceSequence {
        prefix: crate::SALE_INVOICE_PREFIX,
    };

    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Renders a sequence value.
    ///
    /// ```rust
    /// use salon_core::invoice_number::InvoiceSequence;
    ///
    /// assert_eq!(InvoiceSequence::PURCHASE.format(1), "PI-0001");
    /// assert_eq!(InvoiceSequence::SALE.format(42), "INV-0042");
    /// ```
    pub fn format(&self, sequence: u64) -> String {
        format!("{}-{:04}", self.prefix, sequence)
    }

    /// Extracts the sequence value from a number of this family.
    ///
    /// ## Errors
    /// `MalformedInvoiceNumber` if the prefix differs or the suffix is not
    /// a number.
    pub fn parse(&self, number: &str) -> CoreResult<u64> {
        let malformed = || CoreError::MalformedInvoiceNumber(number.to_string());

        let (prefix, suffix) = number.trim().split_once('-').ok_or_else(malformed)?;
        if prefix != self.prefix || suffix.is_empty() {
            return Err(malformed());
        }
        if !suffix.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }

        suffix.parse::<u64>().map_err(|_| malformed())
    }

    /// The next sequence value after the most recently assigned number.
    ///
    /// No previous number means this is the first invoice. A malformed
    /// previous number is ignored; the unique index on the number column
    /// catches any collision that follows.
    ///
    /// ```rust
    /// use salon_core::invoice_number::InvoiceSequence;
    ///
    /// let seq = InvoiceSequence::PURCHASE;
    /// assert_eq!(seq.next_after(None), 1);
    /// assert_eq!(seq.next_after(Some("PI-0001")), 2);
    /// ```
    pub fn next_after(&self, last: Option<&str>) -> u64 {
        last.and_then(|number| self.parse(number).ok())
            .map_or(1, |sequence| sequence + 1)
    }

    /// The count + 1 scheme: the next value given how many records exist.
    #[inline]
    pub const fn next_from_count(&self, existing: u64) -> u64 {
        existing + 1
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_four_digits() {
        assert_eq!(InvoiceSequence::PURCHASE.format(7), "PI-0007");
        assert_eq!(InvoiceSequence::PURCHASE.format(9999), "PI-9999");
        assert_eq!(InvoiceSequence::PURCHASE.format(10_000), "PI-10000");
    }

    #[test]
    fn test_parse() {
        let seq = InvoiceSequence::PURCHASE;
        assert_eq!(seq.parse("PI-0042").unwrap(), 42);
        assert_eq!(seq.parse("PI-10000").unwrap(), 10_000);

        assert!(seq.parse("INV-0042").is_err());
        assert!(seq.parse("PI-").is_err());
        assert!(seq.parse("PI-00x1").is_err());
        assert!(seq.parse("PI0001").is_err());
    }

    #[test]
    fn test_first_then_second_number() {
        let seq = InvoiceSequence::PURCHASE;
        let first = seq.format(seq.next_after(None));
        assert_eq!(first, "PI-0001");

        let second = seq.format(seq.next_after(Some(&first)));
        assert_eq!(second, "PI-0002");
    }

    #[test]
    fn test_malformed_previous_number_restarts() {
        assert_eq!(InvoiceSequence::PURCHASE.next_after(Some("PI-NaN")), 1);
    }

    #[test]
    fn test_count_scheme() {
        let seq = InvoiceSequence::SALE;
        assert_eq!(seq.format(seq.next_from_count(0)), "INV-0001");
        assert_eq!(seq.format(seq.next_from_count(41)), "INV-0042");
    }
}
