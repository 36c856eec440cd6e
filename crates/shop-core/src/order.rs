//! # Order Types
//!
//! Shipping details and the order snapshot handed to order processors.

use crate::cart::{Cart, CartLine};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where and how to ship an order.
///
/// The core treats this as an opaque value; only a `ShippingValidator`
/// inspects the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line3: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub gift_wrap: bool,
}

/// A line item in an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: u32,

    /// Product name (denormalized for display)
    pub name: String,

    pub unit_price: Decimal,

    pub quantity: u32,
}

impl OrderLine {
    /// Create an order line from a cart line
    pub fn from_cart_line(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            name: line.product.name.clone(),
            unit_price: line.product.price,
            quantity: line.quantity,
        }
    }

    /// Calculate the total price for this line
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Immutable snapshot of a cart at the moment it is submitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID (generated)
    pub id: String,

    pub lines: Vec<OrderLine>,

    pub total: Decimal,

    pub shipping: ShippingDetails,

    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Snapshot `cart` together with `shipping`.
    ///
    /// The id is the one the cart has reserved, or a fresh one if none is.
    pub fn from_cart(cart: &Cart, shipping: &ShippingDetails) -> Self {
        Self {
            id: cart
                .order_id()
                .map_or_else(|| Uuid::new_v4().to_string(), String::from),
            lines: cart.lines().iter().map(OrderLine::from_cart_line).collect(),
            total: cart.total(),
            shipping: shipping.clone(),
            placed_at: Utc::now(),
        }
    }

    /// Number of units across all lines
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

/// What a processor reports back once it has accepted an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
}

impl From<&Order> for OrderConfirmation {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            total: order.total,
            placed_at: order.placed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;

    #[test]
    fn test_order_line_total() {
        let mut cart = Cart::new();
        cart.add_item(&Product::new(1, "Ball", Decimal::new(1995, 2)), 3)
            .unwrap();

        let line = OrderLine::from_cart_line(&cart.lines()[0]);

        assert_eq!(line.total(), Decimal::new(5985, 2));
    }

    #[test]
    fn test_order_snapshots_cart() {
        let mut cart = Cart::new();
        cart.add_item(&Product::new(1, "Kayak", Decimal::new(275, 0)), 1)
            .unwrap();
        cart.add_item(&Product::new(2, "Lifejacket", Decimal::new(4895, 2)), 2)
            .unwrap();
        let shipping = ShippingDetails {
            name: "Joe".into(),
            ..Default::default()
        };

        let order = Order::from_cart(&cart, &shipping);
        cart.clear();

        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[1].name, "Lifejacket");
        assert_eq!(order.total, Decimal::new(37290, 2));
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.shipping.name, "Joe");
        assert!(!order.id.is_empty());
    }

    #[test]
    fn test_order_uses_reserved_id() {
        let mut cart = Cart::new();
        cart.add_item(&Product::new(1, "Kayak", Decimal::new(275, 0)), 1)
            .unwrap();
        let reserved = cart.reserve_order_id().to_string();

        let first = Order::from_cart(&cart, &ShippingDetails::default());
        let second = Order::from_cart(&cart, &ShippingDetails::default());

        assert_eq!(first.id, reserved);
        assert_eq!(second.id, reserved);
    }

    #[test]
    fn test_confirmation_from_order() {
        let order = Order::from_cart(&Cart::new(), &ShippingDetails::default());
        let confirmation = OrderConfirmation::from(&order);

        assert_eq!(confirmation.order_id, order.id);
        assert_eq!(confirmation.total, Decimal::ZERO);
    }

    #[test]
    fn test_shipping_details_deserialize_with_defaults() {
        let details: ShippingDetails =
            serde_json::from_str(r#"{"name":"Joe","city":"Springfield"}"#).unwrap();

        assert_eq!(details.name, "Joe");
        assert_eq!(details.line1, "");
        assert_eq!(details.line2, None);
        assert!(!details.gift_wrap);
    }
}
