// 🧾 Transaction Entity - one sales record
// Typed fields are validated once at parse time; the value is never mutated afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used by the sales file and every rendered output
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Leading character of every well-formed id
pub const TRANSACTION_ID_PREFIX: char = 'T';
pub const PRODUCT_ID_PREFIX: char = 'P';
pub const CUSTOMER_ID_PREFIX: char = 'C';

/// Transaction - one parsed sales record
///
/// Field names serialize as the record column names so JSON output
/// lines up with the pipe-delimited file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,

    #[serde(rename = "Date")]
    pub date: NaiveDate,

    #[serde(rename = "ProductID")]
    pub product_id: String,

    #[serde(rename = "ProductName")]
    pub product_name: String,

    #[serde(rename = "Quantity")]
    pub quantity: i64,

    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,

    #[serde(rename = "CustomerID")]
    pub customer_id: String,

    #[serde(rename = "Region")]
    pub region: String,
}

impl Transaction {
    /// Line value: quantity * unit price
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    /// Date rendered as YYYY-MM-DD
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Names of the text fields that are empty.
    ///
    /// An empty field is what a missing column looks like once the line
    /// has been split into a fixed shape.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("TransactionID", &self.transaction_id),
            ("ProductID", &self.product_id),
            ("ProductName", &self.product_name),
            ("CustomerID", &self.customer_id),
            ("Region", &self.region),
        ];

        fields
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect()
    }
}
