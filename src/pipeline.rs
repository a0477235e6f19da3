// 🚀 Pipeline - parse → validate/filter → analyze + enrich → assemble
//
// Pure over its inputs: the caller reads the file and resolves the catalog.

use crate::analytics::{join, AnalyticsEngine, AnalyticsViews};
use crate::catalog::ProductLookup;
use crate::enrichment::{enrich_transactions, EnrichedTransaction, EnrichmentSummary};
use crate::parser::{parse_transactions, ParseSummary};
use crate::report::{assemble_report, SalesReport};
use crate::transaction::Transaction;
use crate::validation::{FilterCriteria, FilterOptions, ValidationOutcome, Validator};
use chrono::Utc;
use log::info;
use serde::Serialize;
use std::thread;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub criteria: FilterCriteria,
    pub top_n: usize,
    pub low_performer_threshold: i64,
    /// Run the views and enrichment on scoped threads
    pub concurrent: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            criteria: FilterCriteria::default(),
            top_n: 5,
            low_performer_threshold: 10,
            concurrent: false,
        }
    }
}

/// Where every non-blank input line ended up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub input_lines: usize,
    pub unparsable: usize,
    pub invalid: usize,
    pub filtered_out: usize,
    pub valid: usize,
}

impl StageCounts {
    /// Every input line is accounted for by exactly one stage
    pub fn is_balanced(&self) -> bool {
        self.input_lines == self.unparsable + self.invalid + self.filtered_out + self.valid
    }
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub parse: ParseSummary,
    /// Regions and amount range of the parsed batch, before any filtering
    pub filter_options: FilterOptions,
    pub validation: ValidationOutcome,
    pub enriched: Vec<EnrichedTransaction>,
    pub report: SalesReport,
    pub counts: StageCounts,
}

impl PipelineOutput {
    pub fn valid(&self) -> &[Transaction] {
        &self.validation.valid
    }
}

/// Run every stage over the record lines
pub fn run_pipeline<S: AsRef<str>>(
    lines: &[S],
    config: &PipelineConfig,
    catalog: &dyn ProductLookup,
) -> PipelineOutput {
    let parse = parse_transactions(lines);
    info!(
        "Parsed {} transactions ({} unparsable, {} blank)",
        parse.transactions.len(),
        parse.unparsable,
        parse.blank_lines
    );

    let filter_options = FilterOptions::from_transactions(&parse.transactions);
    let validation = Validator::new().validate_and_filter(&parse.transactions, &config.criteria);

    let engine = AnalyticsEngine::with_limits(config.top_n, config.low_performer_threshold);
    let (views, enriched) = if config.concurrent {
        analyze_and_enrich_concurrently(&engine, &validation.valid, catalog)
    } else {
        (
            engine.analyze(&validation.valid),
            enrich_transactions(&validation.valid, catalog),
        )
    };

    let report = assemble_report(
        &validation.valid,
        views,
        EnrichmentSummary::from_enriched(&enriched),
        Utc::now(),
    );

    let counts = StageCounts {
        input_lines: parse.record_lines(),
        unparsable: parse.unparsable,
        invalid: validation.invalid_count,
        filtered_out: validation.filtered_out(),
        valid: validation.final_count(),
    };

    PipelineOutput {
        parse,
        filter_options,
        validation,
        enriched,
        report,
        counts,
    }
}

fn analyze_and_enrich_concurrently(
    engine: &AnalyticsEngine,
    valid: &[Transaction],
    catalog: &dyn ProductLookup,
) -> (AnalyticsViews, Vec<EnrichedTransaction>) {
    thread::scope(|scope| {
        let enrichment = scope.spawn(|| enrich_transactions(valid, catalog));
        let views = engine.analyze_concurrently(valid);

        (views, join(enrichment))
    })
}
