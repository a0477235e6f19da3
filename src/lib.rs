// Sales Analytics - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod transaction;
pub mod parser;
pub mod validation;
pub mod analytics;
pub mod catalog;
pub mod enrichment;
pub mod report;
pub mod sales_file;
pub mod pipeline;
pub mod render;
pub mod args;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use transaction::{Transaction, DATE_FORMAT};
pub use parser::{parse_line, parse_transactions, ParseError, ParseSummary};
pub use validation::{
    FilterCriteria, FilterOptions, InvalidReason, ValidationOutcome, ValidationSummary, Validator,
};
pub use analytics::{
    AnalyticsEngine, AnalyticsViews, CustomerDetail, CustomerStats, DailyStats, PeakDay,
    ProductStats, RegionStats,
};
pub use catalog::{
    load_catalog, parse_product_listing, ProductCatalog, ProductCatalogEntry, ProductLookup,
};
#[cfg(feature = "fetch")]
pub use catalog::fetch_products;
pub use enrichment::{
    enrich_transaction, enrich_transactions, extract_numeric_id, EnrichedTransaction,
    EnrichmentError, EnrichmentSummary,
};
pub use report::{assemble_report, OverallSummary, SalesReport};
pub use sales_file::{read_sales_lines, write_enriched, write_report_json, write_text_report};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineOutput, StageCounts};
pub use render::{format_currency, render_report};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
