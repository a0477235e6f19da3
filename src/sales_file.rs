// 🗄️ Flat record storage - sales file in, enriched file and reports out

use crate::enrichment::EnrichedTransaction;
use crate::report::SalesReport;
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Column header of the enriched output file
pub const ENRICHED_HEADER: [&str; 12] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
    "API_Category",
    "API_Brand",
    "API_Rating",
    "API_Match",
];

// ============================================================================
// READING
// ============================================================================

/// Decode file bytes as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to a char, so the fallback cannot fail.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            warn!("Sales file is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| b as char).collect()
        }
    };

    text.trim_start_matches('\u{feff}').to_string()
}

/// Record lines of a sales file body: header dropped, lines trimmed, blanks removed
pub fn sales_lines(text: &str) -> Vec<String> {
    text.lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the sales file into clean record lines
pub fn read_sales_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to open sales file: {}", path.display()))?;

    let lines = sales_lines(&decode_bytes(&bytes));
    info!("Read {} record lines from {}", lines.len(), path.display());

    Ok(lines)
}

// ============================================================================
// WRITING
// ============================================================================

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Float in the form the sales file uses: always with a fractional part
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// One enriched record as output fields; missing values are empty
pub fn enriched_record(enriched: &EnrichedTransaction) -> [String; 12] {
    let tx = &enriched.transaction;

    [
        tx.transaction_id.clone(),
        tx.date_string(),
        tx.product_id.clone(),
        tx.product_name.clone(),
        tx.quantity.to_string(),
        format_float(tx.unit_price),
        tx.customer_id.clone(),
        tx.region.clone(),
        enriched.api_category.clone().unwrap_or_default(),
        enriched.api_brand.clone().unwrap_or_default(),
        enriched.api_rating.map(format_float).unwrap_or_default(),
        format_bool(enriched.api_match).to_string(),
    ]
}

/// Write enriched transactions as a pipe-delimited file with header
pub fn write_enriched(path: &Path, enriched: &[EnrichedTransaction]) -> Result<usize> {
    ensure_parent_dir(path)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'|')
        .quote_style(csv::QuoteStyle::Never)
        .from_path(path)
        .with_context(|| format!("Failed to create enriched file: {}", path.display()))?;

    writer.write_record(ENRICHED_HEADER)?;
    for record in enriched {
        writer
            .write_record(enriched_record(record))
            .with_context(|| {
                format!("Failed to write transaction {}", record.transaction.transaction_id)
            })?;
    }
    writer.flush()?;

    info!("Saved {} enriched records to {}", enriched.len(), path.display());
    Ok(enriched.len())
}

/// Write the rendered text report
pub fn write_text_report(path: &Path, text: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, text).with_context(|| format!("Failed to write report: {}", path.display()))
}

/// Write the report data as pretty JSON
pub fn write_report_json(path: &Path, report: &SalesReport) -> Result<()> {
    ensure_parent_dir(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON report: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .context("Failed to serialize report")?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
