// 🔗 Enrichment Merger - join valid transactions with catalog metadata
//
// Enrichment never drops a transaction and never fails the batch: any problem
// (bad id, missing entry, lookup error) degrades to an unmatched record.

use crate::catalog::{ProductCatalogEntry, ProductLookup};
use crate::transaction::Transaction;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix stripped from product ids before the catalog lookup
pub use crate::transaction::PRODUCT_ID_PREFIX;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnrichmentError {
    #[error("product id {0:?} does not start with P")]
    MissingPrefix(String),

    #[error("product id {0:?} has no numeric part")]
    NonNumericId(String),
}

/// Catalog key for a product id: "P101" → 101
pub fn extract_numeric_id(product_id: &str) -> Result<u32, EnrichmentError> {
    let digits = product_id
        .strip_prefix(PRODUCT_ID_PREFIX)
        .ok_or_else(|| EnrichmentError::MissingPrefix(product_id.to_string()))?;

    digits
        .parse::<u32>()
        .map_err(|_| EnrichmentError::NonNumericId(product_id.to_string()))
}

// ============================================================================
// ENRICHED TRANSACTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,

    #[serde(rename = "API_Category")]
    pub api_category: Option<String>,

    #[serde(rename = "API_Brand")]
    pub api_brand: Option<String>,

    #[serde(rename = "API_Rating")]
    pub api_rating: Option<f64>,

    #[serde(rename = "API_Match")]
    pub api_match: bool,
}

impl EnrichedTransaction {
    pub fn matched(transaction: Transaction, entry: ProductCatalogEntry) -> Self {
        EnrichedTransaction {
            transaction,
            api_category: Some(entry.category),
            api_brand: Some(entry.brand),
            api_rating: Some(entry.rating),
            api_match: true,
        }
    }

    pub fn unmatched(transaction: Transaction) -> Self {
        EnrichedTransaction {
            transaction,
            api_category: None,
            api_brand: None,
            api_rating: None,
            api_match: false,
        }
    }
}

/// Enrich one transaction
pub fn enrich_transaction(tx: &Transaction, catalog: &dyn ProductLookup) -> EnrichedTransaction {
    let product_id = match extract_numeric_id(&tx.product_id) {
        Ok(id) => id,
        Err(e) => {
            debug!("No catalog key for {}: {}", tx.transaction_id, e);
            return EnrichedTransaction::unmatched(tx.clone());
        }
    };

    match catalog.lookup(product_id) {
        Ok(Some(entry)) => EnrichedTransaction::matched(tx.clone(), entry),
        Ok(None) => EnrichedTransaction::unmatched(tx.clone()),
        Err(e) => {
            debug!("Catalog lookup failed for product {}: {:#}", product_id, e);
            EnrichedTransaction::unmatched(tx.clone())
        }
    }
}

/// Enrich every transaction, keeping input order
pub fn enrich_transactions(
    transactions: &[Transaction],
    catalog: &dyn ProductLookup,
) -> Vec<EnrichedTransaction> {
    let enriched: Vec<EnrichedTransaction> = transactions
        .iter()
        .map(|tx| enrich_transaction(tx, catalog))
        .collect();

    info!(
        "Enriched {}/{} transactions",
        enriched.iter().filter(|e| e.api_match).count(),
        enriched.len()
    );

    enriched
}

// ============================================================================
// ENRICHMENT SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentSummary {
    pub total_transactions: usize,
    pub total_enriched: usize,
    /// Percentage of matched transactions, 0 for an empty batch
    pub success_rate: f64,
    /// Product id of every unmatched transaction, input order
    pub unmatched_product_ids: Vec<String>,
}

impl EnrichmentSummary {
    pub fn from_enriched(enriched: &[EnrichedTransaction]) -> Self {
        let total_enriched = enriched.iter().filter(|e| e.api_match).count();
        let success_rate = if enriched.is_empty() {
            0.0
        } else {
            total_enriched as f64 / enriched.len() as f64 * 100.0
        };

        EnrichmentSummary {
            total_transactions: enriched.len(),
            total_enriched,
            success_rate,
            unmatched_product_ids: enriched
                .iter()
                .filter(|e| !e.api_match)
                .map(|e| e.transaction.product_id.clone())
                .collect(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
