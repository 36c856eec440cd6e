//! # Product Types
//!
//! Product catalog types for the storefront.
//! Products are loaded from `config/products.toml` and are read-only from
//! the core's point of view.

use crate::error::{ShopError, ShopResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: u32,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Unit price in the store currency (never negative)
    pub price: Decimal,

    /// Navigation category; `None` or blank means uncategorized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Product {
    /// Create an uncategorized product with an empty description
    pub fn new(id: u32, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            price,
            category: None,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Category name if the product is categorized.
    ///
    /// A blank category string is treated the same as no category.
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// Read-only snapshot of every product the store sells
pub trait ProductSource {
    /// All products, in catalog order
    fn products(&self) -> &[Product];
}

/// Product catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Build a catalog from an ordered list of products
    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Add a product to the end of the catalog
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Find a product by ID
    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Load catalog from TOML string.
    ///
    /// # Errors
    /// `Configuration` if the TOML does not parse or a product has a
    /// negative price.
    pub fn from_toml(toml_str: &str) -> ShopResult<Self> {
        let catalog: Self = toml::from_str(toml_str)
            .map_err(|e| ShopError::Configuration(format!("Invalid catalog: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check catalog-wide invariants
    pub fn validate(&self) -> ShopResult<()> {
        match self.products.iter().find(|p| p.price.is_sign_negative() && !p.price.is_zero()) {
            Some(product) => Err(ShopError::Configuration(format!(
                "Product {} has a negative price: {}",
                product.id, product.price
            ))),
            None => Ok(()),
        }
    }
}

impl ProductSource for ProductCatalog {
    fn products(&self) -> &[Product] {
        &self.products
    }
}

impl ProductSource for [Product] {
    fn products(&self) -> &[Product] {
        self
    }
}

impl ProductSource for Vec<Product> {
    fn products(&self) -> &[Product] {
        self
    }
}
