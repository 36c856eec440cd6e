//! # Session Carts
//!
//! Wraps a `CartStore` so that requests for the same session never
//! interleave their cart mutations. A request opens the session, which
//! takes the session's lock and loads its cart; the lock is held until the
//! `CartSession` is saved or dropped. Different sessions proceed in parallel.

use shop_core::{Cart, CartStore, ShopError, ShopResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Longest accepted session key
pub const MAX_SESSION_KEY_LEN: usize = 128;

type LockTable = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

/// Per-session serialized access to carts
pub struct CartSessions {
    store: Arc<dyn CartStore>,
    locks: Arc<LockTable>,
}

impl CartSessions {
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Lock `session_key` and load its cart (empty on first use)
    pub async fn open(&self, session_key: &str) -> ShopResult<CartSession> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|_| ShopError::Internal("session lock table poisoned".to_string()))?;
            Arc::clone(locks.entry(session_key.to_string()).or_default())
        };

        // Built before the store call so a failed load still releases the entry
        let mut session = CartSession {
            key: session_key.to_string(),
            cart: Cart::new(),
            store: Arc::clone(&self.store),
            guard: Some(Arc::clone(&lock).lock_owned().await),
            lock,
            locks: Arc::clone(&self.locks),
        };
        session.cart = self.store.load_or_default(session_key)?;

        Ok(session)
    }

    /// Sessions currently open or waiting to open
    pub fn active_sessions(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// A loaded cart plus the exclusive right to save it back.
///
/// Dropping the session releases its lock; the last holder also removes the
/// key from the lock table.
pub struct CartSession {
    key: String,
    cart: Cart,
    store: Arc<dyn CartStore>,
    guard: Option<OwnedMutexGuard<()>>,
    lock: Arc<AsyncMutex<()>>,
    locks: Arc<LockTable>,
}

impl CartSession {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Persist the cart and release the session lock.
    ///
    /// Returns the saved cart.
    pub fn save(mut self) -> ShopResult<Cart> {
        self.store.save(&self.key, &self.cart)?;
        Ok(std::mem::take(&mut self.cart))
    }
}

impl Drop for CartSession {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Waiters clone the Arc while holding the table lock, so a count of two
        // (table entry plus ours) under that lock means nobody else wants it.
        if let Ok(mut locks) = self.locks.lock() {
            if Arc::strong_count(&self.lock) == 2 {
                locks.remove(&self.key);
            }
        }
    }
}

/// True if `key` is usable as a session key: 1..=128 chars of
/// ASCII letters, digits, `-` or `_`
pub fn is_valid_session_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_SESSION_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shop_core::{MemoryCartStore, Product};

    fn sessions() -> Arc<CartSessions> {
        Arc::new(CartSessions::new(Arc::new(MemoryCartStore::new())))
    }

    #[tokio::test]
    async fn test_saved_cart_is_reloaded() {
        let sessions = sessions();
        let product = Product::new(1, "P1", Decimal::ONE);

        let mut session = sessions.open("alice").await.unwrap();
        session.cart_mut().add_item(&product, 2).unwrap();
        session.save().unwrap();

        let session = sessions.open("alice").await.unwrap();
        assert_eq!(session.cart().quantity_of(1), 2);
        assert_eq!(session.key(), "alice");
    }

    #[tokio::test]
    async fn test_dropped_session_discards_changes() {
        let sessions = sessions();
        let product = Product::new(1, "P1", Decimal::ONE);

        {
            let mut session = sessions.open("alice").await.unwrap();
            session.cart_mut().add_item(&product, 2).unwrap();
        }

        assert!(sessions.open("alice").await.unwrap().cart().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_session_requests_do_not_interleave() {
        let sessions = sessions();
        let product = Product::new(1, "P1", Decimal::ONE);

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let sessions = Arc::clone(&sessions);
                let product = product.clone();
                tokio::spawn(async move {
                    let mut session = sessions.open("shared").await.unwrap();
                    tokio::task::yield_now().await;
                    session.cart_mut().add_item(&product, 1).unwrap();
                    session.save().unwrap();
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        let session = sessions.open("shared").await.unwrap();
        assert_eq!(session.cart().quantity_of(1), 50);
        drop(session);
        assert_eq!(sessions.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_closed_sessions_leave_no_lock_entries() {
        let sessions = sessions();

        for n in 0..1_000 {
            let session = sessions.open(&format!("visitor-{n}")).await.unwrap();
            if n % 2 == 0 {
                session.save().unwrap();
            }
        }

        assert_eq!(sessions.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_lock_entry_kept_while_open() {
        let sessions = sessions();

        let alice = sessions.open("alice").await.unwrap();
        let bob = sessions.open("bob").await.unwrap();
        assert_eq!(sessions.active_sessions(), 2);

        drop(alice);
        assert_eq!(sessions.active_sessions(), 1);
        drop(bob);
        assert_eq!(sessions.active_sessions(), 0);
    }

    #[test]
    fn test_session_key_validation() {
        assert!(is_valid_session_key("5f1c2b9e-8d7a-4c3b-9e2f-1a2b3c4d5e6f"));
        assert!(is_valid_session_key("user_42"));
        assert!(!is_valid_session_key(""));
        assert!(!is_valid_session_key("has space"));
        assert!(!is_valid_session_key(&"a".repeat(MAX_SESSION_KEY_LEN + 1)));
    }
}
