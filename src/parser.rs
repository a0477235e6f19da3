// 🏗️ Record Parser - pipe-delimited sales lines → Transaction
//
// Record format (header already stripped by the caller):
//   TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region
//
// Lines that cannot be shaped into a Transaction are dropped here, before
// validation ever sees them. They are not data-quality failures.

use crate::transaction::{Transaction, DATE_FORMAT};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use thiserror::Error;

/// Field delimiter of the sales file
pub const DELIMITER: char = '|';

/// Number of columns in a sales record
pub const FIELD_COUNT: usize = 8;

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// Why a line could not become a Transaction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected 8 fields, found {0}")]
    FieldCount(usize),

    #[error("quantity is not an integer: {0:?}")]
    InvalidQuantity(String),

    #[error("unit price is not a number: {0:?}")]
    InvalidUnitPrice(String),

    #[error("date is not YYYY-MM-DD: {0:?}")]
    InvalidDate(String),
}

// ============================================================================
// PARSE SUMMARY
// ============================================================================

/// Output of a parse pass over a batch of lines
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseSummary {
    pub transactions: Vec<Transaction>,

    /// Lines that were empty after trimming (skipped, never counted as errors)
    pub blank_lines: usize,

    /// Non-blank lines that did not produce a Transaction
    pub unparsable: usize,
}

impl ParseSummary {
    /// Non-blank lines seen by the parser
    pub fn record_lines(&self) -> usize {
        self.transactions.len() + self.unparsable
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse one record line
pub fn parse_line(line: &str) -> Result<Transaction, ParseError> {
    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::FieldCount(fields.len()));
    }

    let date = NaiveDate::parse_from_str(fields[1], DATE_FORMAT)
        .map_err(|_| ParseError::InvalidDate(fields[1].to_string()))?;

    let quantity = strip_commas(fields[4])
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidQuantity(fields[4].to_string()))?;

    let unit_price = strip_commas(fields[5])
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .ok_or_else(|| ParseError::InvalidUnitPrice(fields[5].to_string()))?;

    Ok(Transaction {
        transaction_id: fields[0].to_string(),
        date,
        product_id: fields[2].to_string(),
        product_name: strip_commas(fields[3]),
        quantity,
        unit_price,
        customer_id: fields[6].to_string(),
        region: fields[7].to_string(),
    })
}

/// Parse a batch of lines, keeping every line that yields a Transaction.
///
/// Never fails: a bad line only bumps `unparsable`.
pub fn parse_transactions<S: AsRef<str>>(lines: &[S]) -> ParseSummary {
    let mut summary = ParseSummary::default();

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            summary.blank_lines += 1;
            continue;
        }

        match parse_line(line) {
            Ok(tx) => summary.transactions.push(tx),
            Err(e) => {
                debug!("Dropping line {}: {} ({:?})", index + 1, e, line);
                summary.unparsable += 1;
            }
        }
    }

    summary
}

/// Remove thousands separators and surrounding whitespace
fn strip_commas(raw: &str) -> String {
    raw.replace(',', "").trim().to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_line_basic() {
        let tx = parse_line("T001|2024-12-01|P101|Laptop|2|45000|C001|North").unwrap();

        assert_eq!(tx.transaction_id, "T001");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(tx.product_id, "P101");
        assert_eq!(tx.product_name, "Laptop");
        assert_eq!(tx.quantity, 2);
        assert_eq!(tx.unit_price, 45000.0);
        assert_eq!(tx.customer_id, "C001");
        assert_eq!(tx.region, "North");
    }

    #[test]
    fn test_parse_line_strips_commas_and_whitespace() {
        let tx = parse_line(" T002 | 2024-12-02 | P102 | Mouse, Wireless | 1,200 | 1,499.50 | C002 | South ")
            .unwrap();

        assert_eq!(tx.transaction_id, "T002");
        assert_eq!(tx.product_name, "Mouse Wireless");
        assert_eq!(tx.quantity, 1200);
        assert_eq!(tx.unit_price, 1499.5);
        assert_eq!(tx.region, "South");
    }

    #[test]
    fn test_parse_line_keeps_non_positive_values_for_validation() {
        let tx = parse_line("T003|2024-12-03|P103|Cable|-1|0|C003|East").unwrap();
        assert_eq!(tx.quantity, -1);
        assert_eq!(tx.unit_price, 0.0);
    }

    #[rstest]
    #[case("BADLINE", ParseError::FieldCount(1))]
    #[case("T001|2024-12-01|P101|Laptop|2|45000|C001", ParseError::FieldCount(7))]
    #[case("T001|2024-12-01|P101|Laptop|2|45000|C001|North|extra", ParseError::FieldCount(9))]
    #[case("T001|2024-12-01|P101|Laptop|two|45000|C001|North", ParseError::InvalidQuantity("two".to_string()))]
    #[case("T001|2024-12-01|P101|Laptop|2.5|45000|C001|North", ParseError::InvalidQuantity("2.5".to_string()))]
    #[case("T001|2024-12-01|P101|Laptop|2|abc|C001|North", ParseError::InvalidUnitPrice("abc".to_string()))]
    #[case("T001|2024-12-01|P101|Laptop|2|NaN|C001|North", ParseError::InvalidUnitPrice("NaN".to_string()))]
    #[case("T001|01/12/2024|P101|Laptop|2|45000|C001|North", ParseError::InvalidDate("01/12/2024".to_string()))]
    fn test_parse_line_rejects(#[case] line: &str, #[case] expected: ParseError) {
        assert_eq!(parse_line(line), Err(expected));
    }

    #[test]
    fn test_parse_transactions_drops_malformed_lines() {
        let lines = vec!["T001|2024-12-01|P101|Laptop|2|45,000|C001|North", "BADLINE"];
        let summary = parse_transactions(&lines);

        assert_eq!(summary.transactions.len(), 1);
        assert_eq!(summary.transactions[0].quantity, 2);
        assert_eq!(summary.transactions[0].unit_price, 45000.0);
        assert_eq!(summary.unparsable, 1);
        assert_eq!(summary.blank_lines, 0);
    }

    #[test]
    fn test_parse_transactions_skips_blank_lines() {
        let lines = vec![
            "",
            "   ",
            "T001|2024-12-01|P101|Laptop|2|45000|C001|North",
            "\t",
        ];
        let summary = parse_transactions(&lines);

        assert_eq!(summary.transactions.len(), 1);
        assert_eq!(summary.blank_lines, 3);
        assert_eq!(summary.unparsable, 0);
        assert_eq!(summary.record_lines(), 1);
    }

    #[test]
    fn test_parse_transactions_preserves_order() {
        let lines = vec![
            "T003|2024-12-03|P103|C|1|10|C003|East".to_string(),
            "T001|2024-12-01|P101|A|1|10|C001|North".to_string(),
            "T002|2024-12-02|P102|B|1|10|C002|South".to_string(),
        ];
        let summary = parse_transactions(&lines);
        let ids: Vec<&str> = summary
            .transactions
            .iter()
            .map(|tx| tx.transaction_id.as_str())
            .collect();

        assert_eq!(ids, vec!["T003", "T001", "T002"]);
    }

    #[test]
    fn test_parse_transactions_empty_input() {
        let lines: Vec<String> = Vec::new();
        let summary = parse_transactions(&lines);

        assert!(summary.transactions.is_empty());
        assert_eq!(summary.record_lines(), 0);
    }
}
