//! # shop-api
//!
//! HTTP API layer for the product-site storefront.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Paginated catalog and category menu endpoints
//! - Session carts with serialized per-session access
//! - Checkout through the configured order processor
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/products?category=&page=` | One page of products |
//! | GET | `/api/v1/products/{product_id}` | Get product |
//! | GET | `/api/v1/categories?selected=` | Category menu |
//! | POST | `/api/v1/carts` | Start a cart session |
//! | GET | `/api/v1/carts/{session_id}` | Cart summary |
//! | DELETE | `/api/v1/carts/{session_id}` | Clear cart |
//! | POST | `/api/v1/carts/{session_id}/items` | Add to cart |
//! | DELETE | `/api/v1/carts/{session_id}/items/{product_id}` | Remove line |
//! | POST | `/api/v1/carts/{session_id}/checkout` | Place order |

pub mod handlers;
pub mod routes;
pub mod sessions;
pub mod state;

pub use routes::create_router;
pub use sessions::{CartSession, CartSessions};
pub use state::{AppConfig, AppState};
