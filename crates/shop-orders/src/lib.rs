//! # shop-orders
//!
//! Order processors for the product-site storefront.
//!
//! This crate provides two implementations of `shop_core::OrderProcessor`:
//!
//! 1. **LoggingOrderProcessor** - accepts every order and logs it
//!    - No external dependencies
//!    - Best for: local development, demos
//!
//! 2. **WebhookOrderProcessor** - POSTs the order to a fulfilment service
//!    - JSON body, idempotency key per order
//!    - Optional HMAC-SHA256 body signature
//!    - Best for: production, handing orders to a warehouse or ERP
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_orders::processor_from_env;
//!
//! // Webhook processor if ORDER_WEBHOOK_URL is set, logging otherwise
//! let processor = processor_from_env()?;
//!
//! let confirmation = shop_core::checkout(
//!     &mut cart,
//!     &shipping,
//!     &RequiredFieldsValidator,
//!     processor.as_ref(),
//! ).await?;
//! ```

pub mod config;
pub mod logging;
pub mod webhook;

// Re-exports
pub use config::OrderWebhookConfig;
pub use logging::LoggingOrderProcessor;
pub use webhook::{signature_header, WebhookOrderProcessor, SIGNATURE_HEADER};

use shop_core::{BoxedOrderProcessor, ShopResult};
use std::sync::Arc;

/// Pick the processor configured in the environment.
///
/// `WebhookOrderProcessor` when `ORDER_WEBHOOK_URL` is set, otherwise
/// `LoggingOrderProcessor`.
pub fn processor_from_env() -> ShopResult<BoxedOrderProcessor> {
    Ok(match WebhookOrderProcessor::from_env()? {
        Some(webhook) => Arc::new(webhook),
        None => Arc::new(LoggingOrderProcessor),
    })
}
