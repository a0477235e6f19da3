use anyhow::Result;
use log::warn;
use sales_analytics::args::{self, Args};
use sales_analytics::{
    format_currency, load_catalog, read_sales_lines, render_report, run_pipeline, write_enriched,
    write_report_json, write_text_report, ProductCatalog,
};

fn main() -> Result<()> {
    env_logger::init();

    let args = args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    println!("📊 Sales Analytics System");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Read sales file
    println!("\n📂 Reading sales data...");
    let lines = read_sales_lines(&args.input)?;
    println!("✓ Read {} records from {}", lines.len(), args.input.display());

    // 2. Resolve catalog
    println!("\n📚 Loading product catalog...");
    let catalog = resolve_catalog(args);
    println!("✓ Catalog has {} products", catalog.len());

    // 3. Run every stage
    println!("\n🔍 Parsing, validating and analyzing...");
    let output = run_pipeline(&lines, &args.pipeline_config(), &catalog);
    let counts = output.counts;

    println!("✓ Parsed {} transactions", output.parse.transactions.len());
    if counts.unparsable > 0 {
        println!("⚠️  Skipped {} unparsable lines", counts.unparsable);
    }
    println!(
        "   Regions: {}",
        output.filter_options.regions.join(", ")
    );
    if let (Some(min), Some(max)) = (output.filter_options.min_amount, output.filter_options.max_amount) {
        println!("   Amounts: {} - {}", format_currency(min), format_currency(max));
    }
    println!("✓ Invalid: {}", counts.invalid);
    println!("✓ Filtered out: {}", counts.filtered_out);
    println!("✓ Valid: {}", counts.valid);

    if let Some(peak) = &output.report.peak_day {
        println!(
            "✓ Peak day: {} ({})",
            peak.date,
            format_currency(peak.revenue)
        );
    }

    let enrichment = &output.report.enrichment;
    println!(
        "✓ Enriched {}/{} transactions ({:.2}%)",
        enrichment.total_enriched, enrichment.total_transactions, enrichment.success_rate
    );

    // 4. Save outputs
    println!("\n💾 Saving enriched data...");
    let written = write_enriched(&args.enriched_output, &output.enriched)?;
    println!("✓ Saved {} records to {}", written, args.enriched_output.display());

    println!("\n📋 Writing report...");
    write_text_report(&args.report_output, &render_report(&output.report))?;
    println!("✓ Report saved to {}", args.report_output.display());

    if let Some(json_path) = &args.json_output {
        write_report_json(json_path, &output.report)?;
        println!("✓ Report data saved to {}", json_path.display());
    }

    // 5. Reconcile counts
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if counts.is_balanced() {
        println!("🎉 Pipeline COMPLETE!");
        println!(
            "✅ {} input = {} unparsable + {} invalid + {} filtered + {} valid",
            counts.input_lines, counts.unparsable, counts.invalid, counts.filtered_out, counts.valid
        );
    } else {
        warn!("Stage counts do not add up: {:?}", counts);
        println!("⚠️  Pipeline finished but stage counts do not add up");
    }

    Ok(())
}

/// Local listing first, then the products endpoint; an empty catalog when neither works
fn resolve_catalog(args: &Args) -> ProductCatalog {
    if let Some(path) = &args.catalog {
        match load_catalog(path) {
            Ok(catalog) => return catalog,
            Err(e) => {
                warn!("{:#}", e);
                println!("⚠️  Could not load catalog from {}", path.display());
            }
        }
    }

    fetch_catalog(args.catalog_url.as_deref(), args.catalog.is_some())
}

#[cfg(feature = "fetch")]
fn fetch_catalog(url: Option<&str>, tried_file: bool) -> ProductCatalog {
    use sales_analytics::catalog::{fetch_products, DEFAULT_CATALOG_URL};

    // An explicit file wins over the default endpoint
    let url = match (url, tried_file) {
        (Some(url), _) => url,
        (None, false) => DEFAULT_CATALOG_URL,
        (None, true) => return ProductCatalog::new(),
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            warn!("Failed to start async runtime: {}", e);
            return ProductCatalog::new();
        }
    };

    match runtime.block_on(fetch_products(url)) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("{:#}", e);
            println!("⚠️  Could not fetch catalog, continuing without enrichment");
            ProductCatalog::new()
        }
    }
}

#[cfg(not(feature = "fetch"))]
fn fetch_catalog(url: Option<&str>, _tried_file: bool) -> ProductCatalog {
    if url.is_some() {
        eprintln!("❌ Catalog fetch not available!");
        eprintln!("   Rebuild with: cargo build --features fetch");
        eprintln!("   Or pass a local listing with --catalog");
    }
    ProductCatalog::new()
}
