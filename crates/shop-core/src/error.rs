//! # Storefront Error Types
//!
//! Typed error handling for the storefront core.
//! Every cart, catalog and checkout operation returns `Result<T, ShopError>`;
//! nothing in the core logs or swallows a failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level failure reported by a shipping validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field (e.g., "city")
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Core error type for all storefront operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Quantity added to a cart was below one
    #[error("Invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: i64 },

    /// Adding to the cart would push a quantity or the cart total out of range
    #[error("Cart limit exceeded: quantity {quantity} is too large for this cart")]
    CartLimitExceeded { quantity: i64 },

    /// Page size supplied to the catalog query was below one
    #[error("Invalid page size: {items_per_page} (must be at least 1)")]
    InvalidPageSize { items_per_page: i64 },

    /// Checkout attempted with no lines in the cart
    #[error("Sorry, your cart is empty!")]
    EmptyCart,

    /// Shipping details rejected by the validator
    #[error("Invalid shipping details: {} field error(s)", .errors.len())]
    InvalidShippingDetails { errors: Vec<FieldError> },

    /// Order processor refused or failed to take the order
    #[error("Order processing failed: {0}")]
    OrderProcessingFailed(String),

    /// Configuration errors (missing catalog, bad env values)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Product not found in catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: u32 },

    /// Network/HTTP error talking to an external collaborator
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Returns true if the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ShopError::NetworkError(_) | ShopError::OrderProcessingFailed(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::InvalidQuantity { .. } => 400,
            ShopError::CartLimitExceeded { .. } => 400,
            ShopError::InvalidPageSize { .. } => 400,
            ShopError::EmptyCart => 400,
            ShopError::InvalidShippingDetails { .. } => 422,
            ShopError::OrderProcessingFailed(_) => 502,
            ShopError::Configuration(_) => 500,
            ShopError::ProductNotFound { .. } => 404,
            ShopError::NetworkError(_) => 503,
            ShopError::Serialization(_) => 500,
            ShopError::Internal(_) => 500,
        }
    }

    /// Field errors carried by an `InvalidShippingDetails` failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ShopError::InvalidShippingDetails { errors } => errors,
            _ => &[],
        }
    }
}

/// Result type alias for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;
