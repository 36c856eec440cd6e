//! # Application State
//!
//! Shared state for the Axum application.
//! Contains configuration, the product catalog, session carts and the
//! checkout collaborators.

use crate::sessions::CartSessions;
use anyhow::Context;
use shop_core::{
    BoxedOrderProcessor, CartStore, MemoryCartStore, ProductCatalog, RequiredFieldsValidator,
    ShippingValidator,
};
use std::sync::Arc;

const DEFAULT_ITEMS_PER_PAGE: i64 = 4;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Products per catalog page
    pub items_per_page: i64,
    /// Explicit catalog file; searched for under `config/` when unset
    pub catalog_path: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let items_per_page = match std::env::var("ITEMS_PER_PAGE") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 1)
                .with_context(|| format!("ITEMS_PER_PAGE must be a positive integer, got {raw:?}"))?,
            Err(_) => DEFAULT_ITEMS_PER_PAGE,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            items_per_page,
            catalog_path: std::env::var("CATALOG_PATH").ok(),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            catalog_path: None,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Product catalog
    pub catalog: Arc<ProductCatalog>,
    /// Session-scoped carts
    pub carts: Arc<CartSessions>,
    /// Order processor used at checkout
    pub processor: BoxedOrderProcessor,
    /// Shipping details validator used at checkout
    pub validator: Arc<dyn ShippingValidator>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let catalog = load_product_catalog(config.catalog_path.as_deref())?;

        let processor = shop_orders::processor_from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize order processor: {}", e))?;

        Ok(Self::from_parts(config, catalog, processor))
    }

    /// Assemble state from already-built parts, with in-memory carts
    pub fn from_parts(
        config: AppConfig,
        catalog: ProductCatalog,
        processor: BoxedOrderProcessor,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            carts: Arc::new(CartSessions::new(Arc::new(MemoryCartStore::new()))),
            processor,
            validator: Arc::new(RequiredFieldsValidator),
            config,
        }
    }

    /// Builder: keep carts in `store` instead of process memory
    pub fn with_cart_store(mut self, store: Arc<dyn CartStore>) -> Self {
        self.carts = Arc::new(CartSessions::new(store));
        self
    }
}

/// Load product catalog from config file
fn load_product_catalog(explicit: Option<&str>) -> anyhow::Result<ProductCatalog> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path))?;
        return parse_catalog(&content, path);
    }

    let config_paths = [
        "config/products.toml",
        "../config/products.toml",
        "../../config/products.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_catalog(&content, path);
        }
    }

    // Return empty catalog if no config found
    tracing::warn!("No product catalog found, using empty catalog");
    Ok(ProductCatalog::new())
}

fn parse_catalog(content: &str, path: &str) -> anyhow::Result<ProductCatalog> {
    let catalog = ProductCatalog::from_toml(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
    tracing::info!("Loaded {} products from {}", catalog.len(), path);
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test touching the process env so parallel tests cannot race on it
    #[test]
    fn test_app_config_from_env() {
        std::env::remove_var("HOST");
        std::env::remove_var("PORT");
        std::env::remove_var("ITEMS_PER_PAGE");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.items_per_page, 4);

        std::env::set_var("ITEMS_PER_PAGE", "0");
        assert!(AppConfig::from_env().is_err());

        std::env::set_var("ITEMS_PER_PAGE", "12");
        assert_eq!(AppConfig::from_env().unwrap().items_per_page, 12);

        std::env::remove_var("ITEMS_PER_PAGE");
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..AppConfig::default()
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");

        let bad = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_parse_catalog() {
        let catalog = parse_catalog(
            r#"
            [[products]]
            id = 1
            name = "Kayak"
            price = "275.00"
            category = "Watersports"
            "#,
            "inline",
        )
        .unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(parse_catalog("products = 3", "inline").is_err());
    }
}
