//! # Logging Order Processor
//!
//! Accepts every order and records it in the log. Used when no fulfilment
//! webhook is configured (local development, demos).

use async_trait::async_trait;
use shop_core::{Cart, Order, OrderConfirmation, OrderProcessor, ShippingDetails, ShopResult};
use tracing::{info, instrument};

/// Order processor that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingOrderProcessor;

#[async_trait]
impl OrderProcessor for LoggingOrderProcessor {
    #[instrument(skip(self, cart, shipping))]
    async fn process_order(
        &self,
        cart: &Cart,
        shipping: &ShippingDetails,
    ) -> ShopResult<OrderConfirmation> {
        let order = Order::from_cart(cart, shipping);

        info!(
            "Order received: id={}, {} items, total={}, ship_to={}, {}, gift_wrap={}",
            order.id,
            order.item_count(),
            order.total,
            order.shipping.city,
            order.shipping.country,
            order.shipping.gift_wrap
        );
        for line in &order.lines {
            info!(
                "  {} x {} (product {}) = {}",
                line.quantity,
                line.name,
                line.product_id,
                line.total()
            );
        }

        Ok(OrderConfirmation::from(&order))
    }

    fn processor_name(&self) -> &'static str {
        "logging"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shop_core::Product;

    #[tokio::test]
    async fn test_accepts_every_order() {
        let mut cart = Cart::new();
        cart.add_item(&Product::new(1, "Thinking Cap", Decimal::new(16, 0)), 2)
            .unwrap();

        let confirmation = LoggingOrderProcessor
            .process_order(&cart, &ShippingDetails::default())
            .await
            .unwrap();

        assert_eq!(confirmation.total, Decimal::new(32, 0));
        assert_eq!(cart.line_count(), 1);
    }
}
