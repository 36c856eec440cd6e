//! # Shopping Cart
//!
//! Per-session cart aggregate. A cart holds at most one line per product;
//! adding a product that is already present merges the quantities into the
//! existing line, which keeps its original position.

use crate::error::{ShopError, ShopResult};
use crate::product::{Product, ProductSource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product and how many of it the shopper wants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    /// Always at least 1
    pub quantity: u32,
}

impl CartLine {
    /// `price * quantity`
    ///
    /// Lines added through [`Cart::add_item`] are checked to fit, so this
    /// cannot overflow for them.
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }

    fn checked_line_total(&self) -> Option<Decimal> {
        self.product.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Ordered collection of cart lines for one shopping session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,

    /// Id reserved by the last checkout attempt; dropped whenever the lines change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order_id: Option<String>,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Add `quantity` of `product`, merging into an existing line for the
    /// same product id.
    ///
    /// # Errors
    /// - `InvalidQuantity` when `quantity` is below 1
    /// - `CartLimitExceeded` when the merged quantity or the cart total would
    ///   overflow
    ///
    /// On error the cart is unchanged.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> ShopResult<()> {
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or(ShopError::InvalidQuantity { quantity })?;

        let index = self.lines.iter().position(|l| l.product.id == product.id);
        let existing = index.map_or(0, |i| self.lines[i].quantity);
        let merged = existing
            .checked_add(quantity)
            .ok_or(ShopError::CartLimitExceeded {
                quantity: i64::from(existing) + i64::from(quantity),
            })?;

        let candidate = CartLine {
            product: index.map_or_else(|| product.clone(), |i| self.lines[i].product.clone()),
            quantity: merged,
        };

        let fits = candidate
            .checked_line_total()
            .and_then(|line_total| {
                self.lines
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| Some(*i) != index)
                    .try_fold(line_total, |total, (_, line)| {
                        total.checked_add(line.checked_line_total()?)
                    })
            })
            .is_some();
        if !fits {
            return Err(ShopError::CartLimitExceeded {
                quantity: i64::from(merged),
            });
        }

        match index {
            Some(i) => self.lines[i].quantity = merged,
            None => self.lines.push(candidate),
        }
        self.order_id = None;
        Ok(())
    }

    /// Remove the line for `product_id`. Absent products are ignored.
    ///
    /// Removal goes by id alone, so a line whose product has since left the
    /// catalog can still be removed.
    pub fn remove_line(&mut self, product_id: u32) {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        if self.lines.len() != before {
            self.order_id = None;
        }
    }

    /// Remove every line
    pub fn clear(&mut self) {
        self.lines.clear();
        self.order_id = None;
    }

    /// Order id reserved for the current contents, if a checkout was attempted
    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    /// Order id for submitting the current contents.
    ///
    /// Repeated checkout attempts on an unchanged cart get the same id, so an
    /// order processor can use it to recognise a resubmission. Any change to
    /// the lines releases the id.
    pub fn reserve_order_id(&mut self) -> &str {
        self.order_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
    }

    /// Sum of `price * quantity` over all lines, exact to the cent
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Number of distinct products
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of units across all lines
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity held for `product_id`, zero if absent
    pub fn quantity_of(&self, product_id: u32) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product.id == product_id)
            .map_or(0, |l| l.quantity)
    }
}

/// Look up `product_id` in the catalog and add it to the cart.
///
/// An unknown product id leaves the cart unchanged and is not an error.
pub fn add_to_cart<S>(cart: &mut Cart, source: &S, product_id: u32, quantity: i64) -> ShopResult<()>
where
    S: ProductSource + ?Sized,
{
    match source.products().iter().find(|p| p.id == product_id) {
        Some(product) => cart.add_item(product, quantity),
        None => Ok(()),
    }
}
