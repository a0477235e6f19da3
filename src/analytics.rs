// 📊 Aggregation Engine - derived views over the valid transaction set
//
// Every view is computed from scratch over the same immutable slice and owns
// its own accumulator. Grouping keeps first-seen order, so every descending
// sort is stable and ties resolve to the key that appeared first.

use crate::transaction::Transaction;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::thread;

// ============================================================================
// VIEW ROWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub region: String,
    pub total_sales: f64,
    pub transaction_count: usize,
    /// Share of the grand total, 0 when the grand total is 0 or not finite
    pub percent_of_total: f64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub product_name: String,
    pub total_quantity: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerStats {
    pub customer_id: String,
    pub total_spent: f64,
    pub order_count: usize,
    pub average_order_value: f64,
}

/// Per-customer purchase detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetail {
    pub customer_id: String,
    pub total_spent: f64,
    pub purchase_count: usize,
    pub average_order_value: f64,
    /// Distinct product names, sorted
    pub products_bought: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub revenue: f64,
    pub transaction_count: usize,
    pub unique_customers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakDay {
    pub date: NaiveDate,
    pub revenue: f64,
    pub transaction_count: usize,
}

/// All views, as consumed by the report assembler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsViews {
    pub regions: Vec<RegionStats>,
    pub top_products: Vec<ProductStats>,
    pub top_customers: Vec<CustomerStats>,
    pub customers: Vec<CustomerDetail>,
    pub daily_trend: Vec<DailyStats>,
    pub peak_day: Option<PeakDay>,
    pub low_performers: Vec<ProductStats>,
}

// ============================================================================
// ORDERED GROUPING
// ============================================================================

/// Insertion-ordered accumulator map
struct Grouped<K, V> {
    index: HashMap<K, usize>,
    rows: Vec<(K, V)>,
}

impl<K: Hash + Eq + Clone, V: Default> Grouped<K, V> {
    fn new() -> Self {
        Grouped {
            index: HashMap::new(),
            rows: Vec::new(),
        }
    }

    fn entry(&mut self, key: &K) -> &mut V {
        let position = match self.index.get(key) {
            Some(&position) => position,
            None => {
                self.rows.push((key.clone(), V::default()));
                self.index.insert(key.clone(), self.rows.len() - 1);
                self.rows.len() - 1
            }
        };
        &mut self.rows[position].1
    }

    fn into_rows(self) -> Vec<(K, V)> {
        self.rows
    }
}

#[derive(Default)]
struct SalesAccumulator {
    total: f64,
    count: usize,
}

#[derive(Default)]
struct ProductAccumulator {
    quantity: i64,
    revenue: f64,
}

#[derive(Default)]
struct CustomerAccumulator {
    total: f64,
    count: usize,
    products: BTreeSet<String>,
}

#[derive(Default)]
struct DailyAccumulator<'a> {
    revenue: f64,
    count: usize,
    customers: HashSet<&'a str>,
}

fn average(total: f64, count: usize) -> f64 {
    if count > 0 {
        total / count as f64
    } else {
        0.0
    }
}

/// Sum of every transaction amount
pub fn grand_total(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(Transaction::amount).sum()
}

// ============================================================================
// ANALYTICS ENGINE
// ============================================================================

pub struct AnalyticsEngine {
    /// Length of the top products / top customers lists (default: 5)
    pub top_n: usize,

    /// Products selling strictly fewer units are low performers (default: 10)
    pub low_performer_threshold: i64,
}

impl AnalyticsEngine {
    /// Create engine with default limits
    pub fn new() -> Self {
        AnalyticsEngine {
            top_n: 5,
            low_performer_threshold: 10,
        }
    }

    pub fn with_limits(top_n: usize, low_performer_threshold: i64) -> Self {
        AnalyticsEngine {
            top_n,
            low_performer_threshold,
        }
    }

    /// Sales per region, largest first
    pub fn region_performance(&self, transactions: &[Transaction]) -> Vec<RegionStats> {
        let mut groups: Grouped<String, SalesAccumulator> = Grouped::new();
        let mut grand_total = 0.0;

        for tx in transactions {
            let amount = tx.amount();
            grand_total += amount;

            let acc = groups.entry(&tx.region);
            acc.total += amount;
            acc.count += 1;
        }

        let mut regions: Vec<RegionStats> = groups
            .into_rows()
            .into_iter()
            .map(|(region, acc)| RegionStats {
                region,
                total_sales: acc.total,
                transaction_count: acc.count,
                percent_of_total: if grand_total.is_finite() && grand_total > 0.0 {
                    acc.total / grand_total * 100.0
                } else {
                    0.0
                },
                average_order_value: average(acc.total, acc.count),
            })
            .collect();

        regions.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
        regions
    }

    /// Quantity and revenue per product name, first-seen order
    pub fn product_totals(&self, transactions: &[Transaction]) -> Vec<ProductStats> {
        let mut groups: Grouped<String, ProductAccumulator> = Grouped::new();

        for tx in transactions {
            let acc = groups.entry(&tx.product_name);
            acc.quantity = acc.quantity.saturating_add(tx.quantity);
            acc.revenue += tx.amount();
        }

        groups
            .into_rows()
            .into_iter()
            .map(|(product_name, acc)| ProductStats {
                product_name,
                total_quantity: acc.quantity,
                total_revenue: acc.revenue,
            })
            .collect()
    }

    /// Best `top_n` products by revenue
    pub fn top_products(&self, transactions: &[Transaction]) -> Vec<ProductStats> {
        let mut products = self.product_totals(transactions);
        products.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
        products.truncate(self.top_n);
        products
    }

    /// Best `top_n` customers by total spent
    pub fn top_customers(&self, transactions: &[Transaction]) -> Vec<CustomerStats> {
        let mut groups: Grouped<String, SalesAccumulator> = Grouped::new();

        for tx in transactions {
            let acc = groups.entry(&tx.customer_id);
            acc.total += tx.amount();
            acc.count += 1;
        }

        let mut customers: Vec<CustomerStats> = groups
            .into_rows()
            .into_iter()
            .map(|(customer_id, acc)| CustomerStats {
                customer_id,
                total_spent: acc.total,
                order_count: acc.count,
                average_order_value: average(acc.total, acc.count),
            })
            .collect();

        customers.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));
        customers.truncate(self.top_n);
        customers
    }

    /// Purchase detail for every customer, largest spender first
    pub fn customer_analysis(&self, transactions: &[Transaction]) -> Vec<CustomerDetail> {
        let mut groups: Grouped<String, CustomerAccumulator> = Grouped::new();

        for tx in transactions {
            let acc = groups.entry(&tx.customer_id);
            acc.total += tx.amount();
            acc.count += 1;
            acc.products.insert(tx.product_name.clone());
        }

        let mut customers: Vec<CustomerDetail> = groups
            .into_rows()
            .into_iter()
            .map(|(customer_id, acc)| CustomerDetail {
                customer_id,
                total_spent: acc.total,
                purchase_count: acc.count,
                average_order_value: average(acc.total, acc.count),
                products_bought: acc.products.into_iter().collect(),
            })
            .collect();

        customers.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));
        customers
    }

    /// Revenue, volume and distinct customers per day, oldest first
    pub fn daily_trend(&self, transactions: &[Transaction]) -> Vec<DailyStats> {
        let mut days: BTreeMap<NaiveDate, DailyAccumulator> = BTreeMap::new();

        for tx in transactions {
            let acc = days.entry(tx.date).or_default();
            acc.revenue += tx.amount();
            acc.count += 1;
            acc.customers.insert(tx.customer_id.as_str());
        }

        days.into_iter()
            .map(|(date, acc)| DailyStats {
                date,
                revenue: acc.revenue,
                transaction_count: acc.count,
                unique_customers: acc.customers.len(),
            })
            .collect()
    }

    /// Day with the highest revenue; the earliest day wins a tie
    pub fn peak_day(&self, daily_trend: &[DailyStats]) -> Option<PeakDay> {
        let mut peak: Option<&DailyStats> = None;

        for day in daily_trend {
            if peak.map_or(true, |best| day.revenue > best.revenue) {
                peak = Some(day);
            }
        }

        peak.map(|day| PeakDay {
            date: day.date,
            revenue: day.revenue,
            transaction_count: day.transaction_count,
        })
    }

    /// Products below the quantity threshold, fewest units first
    pub fn low_performers(&self, transactions: &[Transaction]) -> Vec<ProductStats> {
        let mut products: Vec<ProductStats> = self
            .product_totals(transactions)
            .into_iter()
            .filter(|p| p.total_quantity < self.low_performer_threshold)
            .collect();

        products.sort_by_key(|p| p.total_quantity);
        products
    }

    /// Compute every view sequentially
    pub fn analyze(&self, transactions: &[Transaction]) -> AnalyticsViews {
        let daily_trend = self.daily_trend(transactions);
        let peak_day = self.peak_day(&daily_trend);

        AnalyticsViews {
            regions: self.region_performance(transactions),
            top_products: self.top_products(transactions),
            top_customers: self.top_customers(transactions),
            customers: self.customer_analysis(transactions),
            daily_trend,
            peak_day,
            low_performers: self.low_performers(transactions),
        }
    }

    /// Compute every view on its own scoped thread.
    ///
    /// Views only read the shared slice, so no locking is involved.
    pub fn analyze_concurrently(&self, transactions: &[Transaction]) -> AnalyticsViews {
        thread::scope(|scope| {
            let regions = scope.spawn(|| self.region_performance(transactions));
            let top_products = scope.spawn(|| self.top_products(transactions));
            let top_customers = scope.spawn(|| self.top_customers(transactions));
            let customers = scope.spawn(|| self.customer_analysis(transactions));
            let low_performers = scope.spawn(|| self.low_performers(transactions));

            let daily_trend = self.daily_trend(transactions);
            let peak_day = self.peak_day(&daily_trend);

            AnalyticsViews {
                regions: join(regions),
                top_products: join(top_products),
                top_customers: join(top_customers),
                customers: join(customers),
                daily_trend,
                peak_day,
                low_performers: join(low_performers),
            }
        })
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Join a scoped worker, re-raising its panic on the caller
pub(crate) fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::tests::create_test_transaction;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_batch() -> Vec<Transaction> {
        vec![
            create_test_transaction("T001", "2024-12-02", "Laptop", 2, 45000.0, "C001", "North"),
            create_test_transaction("T002", "2024-12-01", "Mouse", 10, 500.0, "C002", "South"),
            create_test_transaction("T003", "2024-12-01", "Keyboard", 3, 1500.0, "C001", "North"),
            create_test_transaction("T004", "2024-12-03", "Monitor", 1, 12000.0, "C003", "East"),
            create_test_transaction("T005", "2024-12-02", "Mouse", 4, 500.0, "C002", "South"),
            create_test_transaction("T006", "2024-12-02", "Laptop", 1, 45000.0, "C004", "West"),
        ]
    }

    #[test]
    fn test_region_totals_sum_to_grand_total() {
        let engine = AnalyticsEngine::new();
        let batch = sample_batch();
        let regions = engine.region_performance(&batch);

        let total: f64 = regions.iter().map(|r| r.total_sales).sum();
        let percent: f64 = regions.iter().map(|r| r.percent_of_total).sum();

        assert!((total - grand_total(&batch)).abs() < 1e-6);
        assert!((percent - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_region_order_and_fields() {
        let regions = AnalyticsEngine::new().region_performance(&sample_batch());
        let names: Vec<&str> = regions.iter().map(|r| r.region.as_str()).collect();

        // North 94500, West 45000, East 12000, South 7000
        assert_eq!(names, vec!["North", "West", "East", "South"]);
        assert_eq!(regions[0].transaction_count, 2);
        assert_eq!(regions[0].average_order_value, 47250.0);
    }

    #[test]
    fn test_region_ties_keep_first_seen() {
        let batch = vec![
            create_test_transaction("T001", "2024-12-01", "A", 1, 100.0, "C001", "South"),
            create_test_transaction("T002", "2024-12-01", "A", 1, 100.0, "C001", "North"),
        ];
        let regions = AnalyticsEngine::new().region_performance(&batch);

        assert_eq!(regions[0].region, "South");
        assert_eq!(regions[1].region, "North");
    }

    #[test]
    fn test_region_percentages_zero_when_total_is_zero() {
        let regions = AnalyticsEngine::new().region_performance(&[]);
        assert!(regions.is_empty());

        // Non-validated input can carry a zero price; percentages must stay finite
        let batch = vec![create_test_transaction("T001", "2024-12-01", "A", 1, 0.0, "C001", "North")];
        let regions = AnalyticsEngine::new().region_performance(&batch);
        assert_eq!(regions[0].percent_of_total, 0.0);
    }

    #[test]
    fn test_top_products() {
        let top = AnalyticsEngine::new().top_products(&sample_batch());

        assert_eq!(top.len(), 4);
        assert_eq!(top[0].product_name, "Laptop");
        assert_eq!(top[0].total_quantity, 3);
        assert_eq!(top[0].total_revenue, 135000.0);
        assert_eq!(top[1].product_name, "Monitor");
        assert_eq!(top[2].product_name, "Mouse");
        assert_eq!(top[2].total_quantity, 14);
        assert_eq!(top[3].product_name, "Keyboard");
    }

    #[test]
    fn test_top_n_truncates_with_stable_ties() {
        let batch = vec![
            create_test_transaction("T001", "2024-12-01", "A", 1, 10.0, "C001", "North"),
            create_test_transaction("T002", "2024-12-01", "B", 1, 30.0, "C002", "North"),
            create_test_transaction("T003", "2024-12-01", "C", 1, 10.0, "C003", "North"),
            create_test_transaction("T004", "2024-12-01", "D", 1, 10.0, "C004", "North"),
        ];
        let engine = AnalyticsEngine::with_limits(3, 10);

        let products: Vec<String> = engine
            .top_products(&batch)
            .into_iter()
            .map(|p| p.product_name)
            .collect();
        assert_eq!(products, vec!["B", "A", "C"]);

        let customers: Vec<String> = engine
            .top_customers(&batch)
            .into_iter()
            .map(|c| c.customer_id)
            .collect();
        assert_eq!(customers, vec!["C002", "C001", "C003"]);
    }

    #[test]
    fn test_top_customers() {
        let top = AnalyticsEngine::new().top_customers(&sample_batch());

        assert_eq!(top.len(), 4);
        assert_eq!(top[0].customer_id, "C001");
        assert_eq!(top[0].order_count, 2);
        assert_eq!(top[0].total_spent, 94500.0);
        assert_eq!(top[0].average_order_value, 47250.0);
        assert!(top.windows(2).all(|w| w[0].total_spent >= w[1].total_spent));
    }

    #[test]
    fn test_customer_analysis_collapses_products() {
        let mut batch = sample_batch();
        batch.push(create_test_transaction("T007", "2024-12-04", "Laptop", 1, 100.0, "C001", "North"));

        let customers = AnalyticsEngine::new().customer_analysis(&batch);
        let c001 = customers.iter().find(|c| c.customer_id == "C001").unwrap();

        assert_eq!(c001.purchase_count, 3);
        assert_eq!(c001.products_bought, vec!["Keyboard", "Laptop"]);
        assert_eq!(customers[0].customer_id, "C001");
    }

    #[test]
    fn test_daily_trend_sorted_with_unique_customers() {
        let trend = AnalyticsEngine::new().daily_trend(&sample_batch());
        let dates: Vec<NaiveDate> = trend.iter().map(|d| d.date).collect();

        assert_eq!(dates, vec![date("2024-12-01"), date("2024-12-02"), date("2024-12-03")]);
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));

        // 2024-12-02: T001 (C001), T005 (C002), T006 (C004)
        assert_eq!(trend[1].transaction_count, 3);
        assert_eq!(trend[1].unique_customers, 3);
        assert_eq!(trend[1].revenue, 137000.0);
    }

    #[test]
    fn test_daily_trend_counts_distinct_customers() {
        let batch = vec![
            create_test_transaction("T001", "2024-12-01", "A", 1, 10.0, "C001", "North"),
            create_test_transaction("T002", "2024-12-01", "B", 1, 10.0, "C001", "North"),
            create_test_transaction("T003", "2024-12-01", "C", 1, 10.0, "C002", "North"),
        ];
        let trend = AnalyticsEngine::new().daily_trend(&batch);

        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].transaction_count, 3);
        assert_eq!(trend[0].unique_customers, 2);
    }

    #[test]
    fn test_peak_day_first_wins_tie() {
        let batch = vec![
            create_test_transaction("T001", "2024-12-01", "A", 1, 100.0, "C001", "North"),
            create_test_transaction("T002", "2024-12-02", "A", 1, 100.0, "C001", "North"),
        ];
        let engine = AnalyticsEngine::new();
        let peak = engine.peak_day(&engine.daily_trend(&batch)).unwrap();

        assert_eq!(peak.date, date("2024-12-01"));
        assert_eq!(peak.revenue, 100.0);
        assert_eq!(peak.transaction_count, 1);
    }

    #[test]
    fn test_peak_day() {
        let engine = AnalyticsEngine::new();
        let peak = engine.peak_day(&engine.daily_trend(&sample_batch())).unwrap();

        assert_eq!(peak.date, date("2024-12-02"));
        assert_eq!(peak.transaction_count, 3);
        assert!(engine.peak_day(&[]).is_none());
    }

    #[test]
    fn test_low_performers() {
        let batch = vec![
            create_test_transaction("T001", "2024-12-01", "A", 5, 20.0, "C001", "North"),
            create_test_transaction("T002", "2024-12-01", "B", 15, 10.0, "C002", "North"),
        ];
        let low = AnalyticsEngine::new().low_performers(&batch);

        assert_eq!(
            low,
            vec![ProductStats {
                product_name: "A".to_string(),
                total_quantity: 5,
                total_revenue: 100.0,
            }]
        );
    }

    #[test]
    fn test_low_performers_sorted_ascending() {
        let low = AnalyticsEngine::new().low_performers(&sample_batch());
        let names: Vec<&str> = low.iter().map(|p| p.product_name.as_str()).collect();

        // Mouse sold 14 units and is excluded
        assert_eq!(names, vec!["Monitor", "Laptop", "Keyboard"]);
    }

    #[test]
    fn test_analyze_empty_input() {
        let views = AnalyticsEngine::new().analyze(&[]);

        assert!(views.regions.is_empty());
        assert!(views.top_products.is_empty());
        assert!(views.daily_trend.is_empty());
        assert!(views.peak_day.is_none());
    }

    #[test]
    fn test_concurrent_matches_sequential() {
        let engine = AnalyticsEngine::new();
        let batch = sample_batch();

        assert_eq!(engine.analyze(&batch), engine.analyze_concurrently(&batch));
    }

    #[test]
    fn test_product_quantity_sum_saturates() {
        let lines = [
            "T001|2024-12-01|P101|Bolt|5000000000000000000|1|C001|North",
            "T002|2024-12-01|P101|Bolt|5000000000000000000|1|C001|North",
        ];
        let parsed = crate::parser::parse_transactions(&lines);
        let outcome = crate::validation::Validator::new()
            .validate_and_filter(&parsed.transactions, &Default::default());
        assert_eq!(outcome.final_count(), 2);

        let engine = AnalyticsEngine::new();
        let top = engine.top_products(&outcome.valid);

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].total_quantity, i64::MAX);
        assert!(engine.low_performers(&outcome.valid).is_empty());
    }

    #[test]
    fn test_region_percentages_zero_when_total_is_not_finite() {
        let batch = vec![
            create_test_transaction("T001", "2024-12-01", "A", 2, 1e308, "C001", "North"),
            create_test_transaction("T002", "2024-12-01", "B", 1, 1.0, "C002", "South"),
        ];
        let regions = AnalyticsEngine::new().region_performance(&batch);

        assert_eq!(regions[0].region, "North");
        assert!(regions.iter().all(|r| r.percent_of_total == 0.0));
    }

    #[test]
    #[should_panic(expected = "worker failed")]
    fn test_join_reraises_worker_panic() {
        thread::scope(|scope| {
            let handle = scope.spawn(|| -> usize { panic!("worker failed") });
            join(handle)
        });
    }
}
