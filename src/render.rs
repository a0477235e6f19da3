// 📝 Text Report - fixed-layout rendering of a SalesReport

use crate::report::SalesReport;
use std::fmt;

const WIDTH: usize = 44;
const CURRENCY: &str = "₹";

/// Amount with thousands separators and two decimals: 1545000 → "₹1,545,000.00"
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    format!("{}{}{}.{}", sign, CURRENCY, grouped, fraction)
}

/// Render the report as text
pub fn render_report(report: &SalesReport) -> String {
    TextReport(report).to_string()
}

struct TextReport<'a>(&'a SalesReport);

impl TextReport<'_> {
    fn rule(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
        writeln!(f, "{}", c.to_string().repeat(WIDTH))
    }

    fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", title)?;
        Self::rule(f, '-')
    }

    fn header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = &self.0.header;

        Self::rule(f, '=')?;
        writeln!(f, "{:^WIDTH$}", "SALES ANALYTICS REPORT")?;
        writeln!(
            f,
            "{:^WIDTH$}",
            format!("Generated: {}", header.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))
        )?;
        writeln!(
            f,
            "{:^WIDTH$}",
            format!("Records Processed: {}", header.records_processed)
        )?;
        Self::rule(f, '=')
    }

    fn overall(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.0.summary;

        Self::section(f, "OVERALL SUMMARY")?;
        writeln!(f, "{:<22}{}", "Total Revenue:", format_currency(summary.total_revenue))?;
        writeln!(f, "{:<22}{}", "Total Transactions:", summary.total_transactions)?;
        writeln!(
            f,
            "{:<22}{}",
            "Average Order Value:",
            format_currency(summary.average_order_value)
        )?;

        match &summary.date_range {
            Some(range) => writeln!(f, "{:<22}{} to {}", "Date Range:", range.start, range.end),
            None => writeln!(f, "{:<22}N/A", "Date Range:"),
        }
    }

    fn regions(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::section(f, "REGION-WISE PERFORMANCE")?;
        writeln!(f, "{:<10} {:<16} {:<12} {}", "Region", "Sales", "% of Total", "Transactions")?;

        for region in &self.0.regions {
            writeln!(
                f,
                "{:<10} {:<16} {:<12} {}",
                region.region,
                format_currency(region.total_sales),
                format!("{:.2}%", region.percent_of_total),
                region.transaction_count
            )?;
        }
        Ok(())
    }

    fn top_products(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::section(f, &format!("TOP {} PRODUCTS", self.0.top_products.len()))?;
        writeln!(f, "{:<5} {:<20} {:<14} {}", "Rank", "Product Name", "Quantity Sold", "Revenue")?;

        for (rank, product) in self.0.top_products.iter().enumerate() {
            writeln!(
                f,
                "{:<5} {:<20} {:<14} {}",
                rank + 1,
                product.product_name,
                product.total_quantity,
                format_currency(product.total_revenue)
            )?;
        }
        Ok(())
    }

    fn top_customers(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::section(f, &format!("TOP {} CUSTOMERS", self.0.top_customers.len()))?;
        writeln!(f, "{:<5} {:<12} {:<16} {}", "Rank", "Customer ID", "Total Spent", "Orders")?;

        for (rank, customer) in self.0.top_customers.iter().enumerate() {
            writeln!(
                f,
                "{:<5} {:<12} {:<16} {}",
                rank + 1,
                customer.customer_id,
                format_currency(customer.total_spent),
                customer.order_count
            )?;
        }
        Ok(())
    }

    fn daily_trend(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::section(f, "DAILY SALES TREND")?;
        writeln!(f, "{:<12} {:<16} {:<14} {}", "Date", "Revenue", "Transactions", "Customers")?;

        for day in &self.0.daily_trend {
            writeln!(
                f,
                "{:<12} {:<16} {:<14} {}",
                day.date.to_string(),
                format_currency(day.revenue),
                day.transaction_count,
                day.unique_customers
            )?;
        }
        Ok(())
    }

    fn product_performance(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        Self::section(f, "PRODUCT PERFORMANCE ANALYSIS")?;
        match &report.peak_day {
            Some(peak) => writeln!(
                f,
                "Best Selling Day: {} ({}, {} transactions)",
                peak.date,
                format_currency(peak.revenue),
                peak.transaction_count
            )?,
            None => writeln!(f, "Best Selling Day: N/A")?,
        }

        writeln!(f)?;
        writeln!(f, "Low Performing Products:")?;
        if report.low_performers.is_empty() {
            writeln!(f, "  - None")?;
        }
        for product in &report.low_performers {
            writeln!(
                f,
                "  - {}: {} units, {}",
                product.product_name,
                product.total_quantity,
                format_currency(product.total_revenue)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Average Transaction Value per Region:")?;
        for region in &report.regions {
            writeln!(
                f,
                "  - {}: {}",
                region.region,
                format_currency(region.average_order_value)
            )?;
        }
        Ok(())
    }

    fn enrichment(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let enrichment = &self.0.enrichment;

        Self::section(f, "API ENRICHMENT SUMMARY")?;
        writeln!(
            f,
            "Total Products Enriched: {}/{}",
            enrichment.total_enriched, enrichment.total_transactions
        )?;
        writeln!(f, "Success Rate: {:.2}%", enrichment.success_rate)?;

        // Distinct ids, first-seen order
        let mut unmatched: Vec<&str> = Vec::new();
        for id in &enrichment.unmatched_product_ids {
            if !unmatched.contains(&id.as_str()) {
                unmatched.push(id);
            }
        }

        if !unmatched.is_empty() {
            writeln!(f, "Products that couldn't be enriched:")?;
            for id in unmatched {
                writeln!(f, "  - {}", id)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.header(f)?;
        self.overall(f)?;
        self.regions(f)?;
        self.top_products(f)?;
        self.top_customers(f)?;
        self.daily_trend(f)?;
        self.product_performance(f)?;
        self.enrichment(f)?;
        writeln!(f)?;
        Self::rule(f, '=')
    }
}
