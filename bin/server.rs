// Sales Analytics - Web Server
// REST API over the report computed at startup

use anyhow::{Context, Result};
use log::warn;
use sales_analytics::args;
use sales_analytics::server::router;
use sales_analytics::{load_catalog, read_sales_lines, run_pipeline, PipelineConfig, ProductCatalog};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = args::parse_server();

    println!("🌐 Sales Analytics - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let lines = read_sales_lines(&args.input)?;
    println!("✓ Read {} records from {}", lines.len(), args.input.display());

    let catalog = match &args.catalog {
        Some(path) => load_catalog(path).unwrap_or_else(|e| {
            warn!("{:#}", e);
            ProductCatalog::new()
        }),
        None => ProductCatalog::new(),
    };
    println!("✓ Catalog has {} products", catalog.len());

    let output = run_pipeline(&lines, &PipelineConfig::default(), &catalog);
    println!(
        "✓ Report ready: {} valid of {} input lines",
        output.counts.valid, output.counts.input_lines
    );

    let app = router(Arc::new(output.report), Arc::new(output.enriched));

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", args.bind))?;

    println!("\n🚀 Server running on http://{}", args.bind);
    println!("   API: http://{}/api/report", args.bind);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
