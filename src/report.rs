// 📋 Report Data Assembler - everything the renderer and the API consume
//
// Pure composition of the analytics views and the enrichment summary, plus the
// overall totals. No view is recomputed here.

use crate::analytics::{
    grand_total, AnalyticsViews, CustomerDetail, CustomerStats, DailyStats, PeakDay,
    ProductStats, RegionStats,
};
use crate::enrichment::EnrichmentSummary;
use crate::transaction::Transaction;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportHeader {
    pub generated_at: DateTime<Utc>,
    pub records_processed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub total_revenue: f64,
    pub total_transactions: usize,
    /// 0 when there are no transactions
    pub average_order_value: f64,
    /// None when there are no transactions
    pub date_range: Option<DateRange>,
}

impl OverallSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let total_revenue = grand_total(transactions);
        let total_transactions = transactions.len();

        let average_order_value = if total_transactions > 0 {
            total_revenue / total_transactions as f64
        } else {
            0.0
        };

        let start = transactions.iter().map(|tx| tx.date).min();
        let end = transactions.iter().map(|tx| tx.date).max();
        let date_range = start.zip(end).map(|(start, end)| DateRange { start, end });

        OverallSummary {
            total_revenue,
            total_transactions,
            average_order_value,
            date_range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub header: ReportHeader,
    pub summary: OverallSummary,
    pub regions: Vec<RegionStats>,
    pub top_products: Vec<ProductStats>,
    pub top_customers: Vec<CustomerStats>,
    pub customers: Vec<CustomerDetail>,
    pub daily_trend: Vec<DailyStats>,
    pub peak_day: Option<PeakDay>,
    pub low_performers: Vec<ProductStats>,
    pub enrichment: EnrichmentSummary,
}

/// Compose the report from the stage outputs
pub fn assemble_report(
    transactions: &[Transaction],
    views: AnalyticsViews,
    enrichment: EnrichmentSummary,
    generated_at: DateTime<Utc>,
) -> SalesReport {
    SalesReport {
        header: ReportHeader {
            generated_at,
            records_processed: transactions.len(),
        },
        summary: OverallSummary::from_transactions(transactions),
        regions: views.regions,
        top_products: views.top_products,
        top_customers: views.top_customers,
        customers: views.customers,
        daily_trend: views.daily_trend,
        peak_day: views.peak_day,
        low_performers: views.low_performers,
        enrichment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsEngine;
    use crate::transaction::tests::create_test_transaction;

    fn sample_batch() -> Vec<Transaction> {
        vec![
            create_test_transaction("T001", "2024-12-03", "Laptop", 2, 45000.0, "C001", "North"),
            create_test_transaction("T002", "2024-12-01", "Mouse", 4, 500.0, "C002", "South"),
            create_test_transaction("T003", "2024-12-02", "Keyboard", 1, 1000.0, "C001", "North"),
        ]
    }

    #[test]
    fn test_overall_summary() {
        let summary = OverallSummary::from_transactions(&sample_batch());

        assert_eq!(summary.total_revenue, 93000.0);
        assert_eq!(summary.total_transactions, 3);
        assert_eq!(summary.average_order_value, 31000.0);

        let range = summary.date_range.unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 12, 3).unwrap());
    }

    #[test]
    fn test_overall_summary_empty() {
        let summary = OverallSummary::from_transactions(&[]);

        assert_eq!(summary.total_revenue, 0.0);
        assert_eq!(summary.average_order_value, 0.0);
        assert!(summary.date_range.is_none());
    }

    #[test]
    fn test_assemble_report_passes_views_through() {
        let batch = sample_batch();
        let views = AnalyticsEngine::new().analyze(&batch);
        let generated_at = Utc::now();

        let report = assemble_report(&batch, views.clone(), EnrichmentSummary::default(), generated_at);

        assert_eq!(report.header.records_processed, 3);
        assert_eq!(report.header.generated_at, generated_at);
        assert_eq!(report.regions, views.regions);
        assert_eq!(report.daily_trend, views.daily_trend);
        assert_eq!(report.peak_day, views.peak_day);
        assert_eq!(report.low_performers, views.low_performers);
    }

    #[test]
    fn test_report_serializes() {
        let batch = sample_batch();
        let report = assemble_report(
            &batch,
            AnalyticsEngine::new().analyze(&batch),
            EnrichmentSummary::default(),
            Utc::now(),
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["summary"]["total_transactions"], 3);
        assert_eq!(json["summary"]["date_range"]["start"], "2024-12-01");
        assert_eq!(json["regions"][0]["region"], "North");
    }
}
