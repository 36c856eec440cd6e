//! # Cart Storage
//!
//! Load/save contract for session-scoped carts. The core never keeps a cart
//! between calls; callers load one, mutate it and save it back.

use crate::cart::Cart;
use crate::error::{ShopError, ShopResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// Persists carts by session key
pub trait CartStore: Send + Sync {
    /// Cart saved under `session_key`, if any
    fn load(&self, session_key: &str) -> ShopResult<Option<Cart>>;

    /// Save `cart` under `session_key`, replacing any previous cart
    fn save(&self, session_key: &str, cart: &Cart) -> ShopResult<()>;

    /// Forget the cart for `session_key` (session ended)
    fn remove(&self, session_key: &str) -> ShopResult<()>;

    /// Saved cart or a fresh empty one
    fn load_or_default(&self, session_key: &str) -> ShopResult<Cart> {
        Ok(self.load(session_key)?.unwrap_or_default())
    }
}

/// Process-local cart store
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    carts: RwLock<HashMap<String, Cart>>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions holding a cart
    pub fn len(&self) -> usize {
        self.carts.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> ShopError {
    ShopError::Internal("cart store lock poisoned".to_string())
}

impl CartStore for MemoryCartStore {
    fn load(&self, session_key: &str) -> ShopResult<Option<Cart>> {
        let carts = self.carts.read().map_err(poisoned)?;
        Ok(carts.get(session_key).cloned())
    }

    fn save(&self, session_key: &str, cart: &Cart) -> ShopResult<()> {
        let mut carts = self.carts.write().map_err(poisoned)?;
        carts.insert(session_key.to_string(), cart.clone());
        Ok(())
    }

    fn remove(&self, session_key: &str) -> ShopResult<()> {
        let mut carts = self.carts.write().map_err(poisoned)?;
        carts.remove(session_key);
        Ok(())
    }
}
