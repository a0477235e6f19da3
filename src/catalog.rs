// 📚 Product Catalog - numeric product id → {title, category, brand, rating}
//
// The catalog is read-only to the engine. It is built from a JSON product
// listing, either a local file or (feature "fetch") the products endpoint.

use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Products endpoint used when no URL is configured
pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com/products";

/// Brand recorded for products whose listing has none
pub const UNKNOWN_BRAND: &str = "N/A";

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCatalogEntry {
    pub title: String,
    pub category: String,
    pub brand: String,
    pub rating: f64,
}

/// One product as it appears in the listing; unknown fields are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct ApiProduct {
    pub id: u32,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub rating: f64,
}

/// Catalog lookup seam.
///
/// An `Err` and an `Ok(None)` mean the same thing to enrichment: no match.
pub trait ProductLookup: Send + Sync {
    fn lookup(&self, product_id: u32) -> Result<Option<ProductCatalogEntry>>;
}

// ============================================================================
// IN-MEMORY CATALOG
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductCatalog {
    entries: BTreeMap<u32, ProductCatalogEntry>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the id → entry mapping from listing products
    pub fn from_products(products: Vec<ApiProduct>) -> Self {
        let mut catalog = ProductCatalog::new();

        for product in products {
            catalog.insert(
                product.id,
                ProductCatalogEntry {
                    title: product.title,
                    category: product.category,
                    brand: product.brand.unwrap_or_else(|| UNKNOWN_BRAND.to_string()),
                    rating: product.rating,
                },
            );
        }

        catalog
    }

    pub fn insert(&mut self, product_id: u32, entry: ProductCatalogEntry) {
        self.entries.insert(product_id, entry);
    }

    pub fn get(&self, product_id: u32) -> Option<&ProductCatalogEntry> {
        self.entries.get(&product_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProductLookup for ProductCatalog {
    fn lookup(&self, product_id: u32) -> Result<Option<ProductCatalogEntry>> {
        Ok(self.get(product_id).cloned())
    }
}

// ============================================================================
// LISTING PARSING
// ============================================================================

/// Build a catalog from a listing value: `{"products": [...]}` or a bare array.
///
/// Products missing a required field are skipped.
pub fn products_from_value(value: Value) -> Result<ProductCatalog> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("products") {
            Some(Value::Array(items)) => items,
            _ => bail!("Catalog listing has no \"products\" array"),
        },
        _ => bail!("Catalog listing must be an object or an array"),
    };

    let mut products = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<ApiProduct>(item) {
            Ok(product) => products.push(product),
            Err(e) => warn!("Skipping catalog product: {}", e),
        }
    }

    Ok(ProductCatalog::from_products(products))
}

pub fn parse_product_listing(json: &str) -> Result<ProductCatalog> {
    let value: Value = serde_json::from_str(json).context("Catalog listing is not valid JSON")?;
    products_from_value(value)
}

/// Load a catalog from a JSON listing file
pub fn load_catalog(path: &Path) -> Result<ProductCatalog> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
    let catalog = parse_product_listing(&json)
        .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;

    info!("Loaded {} catalog products from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Fetch up to 100 products from the listing endpoint
#[cfg(feature = "fetch")]
pub async fn fetch_products(base_url: &str) -> Result<ProductCatalog> {
    let url = format!("{}?limit=100", base_url.trim_end_matches('/'));

    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("Failed to reach catalog endpoint: {}", url))?;

    if !response.status().is_success() {
        bail!("Catalog endpoint {} returned {}", url, response.status());
    }

    let value: Value = response
        .json()
        .await
        .context("Catalog response is not valid JSON")?;
    let catalog = products_from_value(value)?;

    info!("Fetched {} catalog products from {}", catalog.len(), url);
    Ok(catalog)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LISTING: &str = r#"{
        "products": [
            {"id": 1, "title": "iPhone 9", "category": "smartphones", "brand": "Apple", "rating": 4.69, "price": 549},
            {"id": 2, "title": "Essence Mascara", "category": "beauty", "rating": 4.94},
            {"id": 3, "category": "broken"}
        ],
        "total": 3
    }"#;

    #[test]
    fn test_parse_product_listing() {
        let catalog = parse_product_listing(LISTING).unwrap();

        assert_eq!(catalog.len(), 2);
        let iphone = catalog.get(1).unwrap();
        assert_eq!(iphone.title, "iPhone 9");
        assert_eq!(iphone.category, "smartphones");
        assert_eq!(iphone.brand, "Apple");
        assert_eq!(iphone.rating, 4.69);
    }

    #[test]
    fn test_missing_brand_defaults() {
        let catalog = parse_product_listing(LISTING).unwrap();
        assert_eq!(catalog.get(2).unwrap().brand, UNKNOWN_BRAND);
    }

    #[test]
    fn test_incomplete_products_are_skipped() {
        let catalog = parse_product_listing(LISTING).unwrap();
        assert!(catalog.get(3).is_none());
    }

    #[test]
    fn test_bare_array_listing() {
        let catalog =
            parse_product_listing(r#"[{"id": 7, "title": "Lamp", "category": "home", "rating": 3.5}]"#)
                .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(7).unwrap().title, "Lamp");
    }

    #[test]
    fn test_invalid_listing() {
        assert!(parse_product_listing("not json").is_err());
        assert!(parse_product_listing(r#"{"items": []}"#).is_err());
        assert!(parse_product_listing("42").is_err());
    }

    #[test]
    fn test_lookup() {
        let catalog = parse_product_listing(LISTING).unwrap();

        assert_eq!(catalog.lookup(1).unwrap().unwrap().brand, "Apple");
        assert!(catalog.lookup(999).unwrap().is_none());
    }

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LISTING.as_bytes()).unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let result = load_catalog(Path::new("does/not/exist.json"));
        assert!(result.is_err());
    }
}
