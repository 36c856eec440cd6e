//! # Checkout
//!
//! The checkout gate and the two collaborators it coordinates.
//!
//! ```text
//! checkout(cart, shipping)
//!   │
//!   ├── cart empty?            ──► Err(EmptyCart)
//!   ├── validator.validate()   ──► Err(InvalidShippingDetails { errors })
//!   ├── processor.process_order()
//!   │        └── failure       ──► Err(OrderProcessingFailed), cart untouched
//!   └── cart.clear()           ──► Ok(OrderConfirmation)
//! ```
//!
//! The gate holds no state of its own. Order processors are swappable
//! behind the `OrderProcessor` trait the same way the API swaps any other
//! provider: an `Arc<dyn OrderProcessor>` chosen at startup.

use crate::cart::Cart;
use crate::error::{FieldError, ShopError, ShopResult};
use crate::order::{OrderConfirmation, ShippingDetails};
use async_trait::async_trait;
use std::sync::Arc;

/// Decides whether shipping details are complete enough to ship to
pub trait ShippingValidator: Send + Sync {
    /// # Errors
    /// One `FieldError` per rejected field.
    fn validate(&self, details: &ShippingDetails) -> Result<(), Vec<FieldError>>;
}

/// Requires a name, first address line, city, state and country.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFieldsValidator;

impl ShippingValidator for RequiredFieldsValidator {
    fn validate(&self, details: &ShippingDetails) -> Result<(), Vec<FieldError>> {
        let required = [
            ("name", &details.name, "Please enter a name"),
            ("line1", &details.line1, "Please enter the first address line"),
            ("city", &details.city, "Please enter a city name"),
            ("state", &details.state, "Please enter a state name"),
            ("country", &details.country, "Please enter a country name"),
        ];

        let errors: Vec<_> = required
            .into_iter()
            .filter(|(_, value, _)| value.trim().is_empty())
            .map(|(field, _, message)| FieldError::new(field, message))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Takes a validated cart and turns it into an order.
///
/// Implementations: logging (development), webhook (fulfilment service).
#[async_trait]
pub trait OrderProcessor: Send + Sync {
    /// Submit the order.
    ///
    /// # Returns
    /// An `OrderConfirmation` once the order has been accepted. Any error
    /// means the order was not taken.
    async fn process_order(
        &self,
        cart: &Cart,
        shipping: &ShippingDetails,
    ) -> ShopResult<OrderConfirmation>;

    /// Get the processor name (for logging).
    fn processor_name(&self) -> &'static str;
}

/// Type alias for a shared order processor (dynamic dispatch)
pub type BoxedOrderProcessor = Arc<dyn OrderProcessor>;

/// Validate `cart` and `shipping`, submit the order, then empty the cart.
///
/// The cart is cleared only after the processor has accepted the order; on
/// every failure path its lines are returned to the caller unchanged. Before
/// submitting, the cart reserves an order id which survives a processor
/// failure, so retrying the same cart resubmits under the same id.
///
/// # Errors
/// - `EmptyCart` if the cart has no lines (processor not called)
/// - `InvalidShippingDetails` if the validator rejects `shipping` (processor not called)
/// - `OrderProcessingFailed` if the processor fails
pub async fn checkout(
    cart: &mut Cart,
    shipping: &ShippingDetails,
    validator: &dyn ShippingValidator,
    processor: &dyn OrderProcessor,
) -> ShopResult<OrderConfirmation> {
    if cart.is_empty() {
        return Err(ShopError::EmptyCart);
    }

    validator
        .validate(shipping)
        .map_err(|errors| ShopError::InvalidShippingDetails { errors })?;

    cart.reserve_order_id();

    let confirmation = processor
        .process_order(cart, shipping)
        .await
        .map_err(|e| match e {
            ShopError::OrderProcessingFailed(_) => e,
            other => ShopError::OrderProcessingFailed(other.to_string()),
        })?;

    cart.clear();
    Ok(confirmation)
}
