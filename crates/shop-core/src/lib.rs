//! # shop-core
//!
//! Core types and logic for the product-site storefront.
//!
//! This crate provides:
//! - `Product` and `ProductCatalog` for the product catalog
//! - `list_products` / `list_categories` for paged, filtered browsing
//! - `Cart` and `CartLine` with quantity merging and exact decimal totals
//! - `checkout` coordinating a `ShippingValidator` and an `OrderProcessor`
//! - `CartStore` for session-scoped cart persistence
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{add_to_cart, checkout, list_products, Cart, CatalogQuery};
//!
//! let page = list_products(&catalog, &CatalogQuery::new(4).with_category("Chess"))?;
//!
//! let mut cart = store.load_or_default(&session_id)?;
//! add_to_cart(&mut cart, &catalog, product_id, 1)?;
//! store.save(&session_id, &cart)?;
//!
//! let confirmation = checkout(&mut cart, &shipping, &RequiredFieldsValidator, processor.as_ref()).await?;
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod order;
pub mod product;
pub mod store;

// Re-exports for convenience
pub use cart::{add_to_cart, Cart, CartLine};
pub use catalog::{
    category_menu, list_categories, list_products, CatalogQuery, CategoryMenu, PageLink,
    PagingInfo, ProductPage,
};
pub use checkout::{
    checkout, BoxedOrderProcessor, OrderProcessor, RequiredFieldsValidator, ShippingValidator,
};
pub use error::{FieldError, ShopError, ShopResult};
pub use order::{Order, OrderConfirmation, OrderLine, ShippingDetails};
pub use product::{Product, ProductCatalog, ProductSource};
pub use store::{CartStore, MemoryCartStore};
