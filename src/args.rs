use crate::pipeline::PipelineConfig;
use crate::validation::FilterCriteria;
use clap::Parser;
use std::path::PathBuf;

/// Parse a sales file, validate and analyze it, enrich it from a product catalog and write the reports.
#[derive(Parser, Debug)]
#[clap(name = "sales-analytics", version)]
pub struct Args {
    /// Pipe-delimited sales file, header line first
    #[clap(short, long, default_value = "data/sales_data.txt")]
    pub input: PathBuf,

    /// JSON product listing used for enrichment
    #[clap(short, long)]
    pub catalog: Option<PathBuf>,

    /// Products endpoint to fetch the catalog from (needs the "fetch" feature)
    #[clap(long)]
    pub catalog_url: Option<String>,

    /// Keep only transactions from this region
    #[clap(long)]
    pub region: Option<String>,

    /// Keep only transactions with amount >= this value
    #[clap(long)]
    pub min_amount: Option<f64>,

    /// Keep only transactions with amount <= this value
    #[clap(long)]
    pub max_amount: Option<f64>,

    /// Length of the top products and top customers lists
    #[clap(long, default_value_t = 5)]
    pub top_n: usize,

    /// Products with total quantity below this are low performers
    #[clap(long, default_value_t = 10)]
    pub low_stock_threshold: i64,

    /// Where to write the enriched transactions
    #[clap(long, default_value = "data/enriched_sales_data.txt")]
    pub enriched_output: PathBuf,

    /// Where to write the text report
    #[clap(long, default_value = "output/sales_report.txt")]
    pub report_output: PathBuf,

    /// Also write the report data as JSON
    #[clap(long)]
    pub json_output: Option<PathBuf>,

    /// Compute the views and enrichment on separate threads
    #[clap(long)]
    pub concurrent: bool,
}

impl Args {
    pub fn filter_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            region: self.region.clone(),
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            criteria: self.filter_criteria(),
            top_n: self.top_n,
            low_performer_threshold: self.low_stock_threshold,
            concurrent: self.concurrent,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

/// Serve the sales report over HTTP
#[derive(Parser, Debug)]
#[clap(name = "sales-server", version)]
pub struct ServerArgs {
    /// Pipe-delimited sales file, header line first
    #[clap(short, long, default_value = "data/sales_data.txt")]
    pub input: PathBuf,

    /// JSON product listing used for enrichment
    #[clap(short, long)]
    pub catalog: Option<PathBuf>,

    /// Address to listen on
    #[clap(short, long, default_value = "0.0.0.0:3000")]
    pub bind: String,
}

pub fn parse_server() -> ServerArgs {
    ServerArgs::parse()
}
