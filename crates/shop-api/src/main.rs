//! # Storefront
//!
//! HTTP server for the product-site storefront.
//!
//! ## Usage
//!
//! ```bash
//! # Optional settings
//! export ITEMS_PER_PAGE=4
//! export CATALOG_PATH=config/products.toml
//! export ORDER_WEBHOOK_URL=https://fulfilment.example.com/orders
//! export ORDER_WEBHOOK_SECRET=...
//! export LOG_FORMAT=json
//!
//! # Run the server
//! storefront
//! ```

use shop_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let (json_layer, text_layer) = if json_logs {
        (Some(fmt::layer().json()), None)
    } else {
        (None, Some(fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(json_layer)
        .with(text_layer)
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Products loaded: {}", state.catalog.len());
    info!("Items per page: {}", state.config.items_per_page);
    info!("Order processor: {}", state.processor.processor_name());

    let app = routes::create_router(state);

    info!("Storefront starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Catalog: GET http://{}/api/v1/products?page=1", addr);
        info!("Checkout: POST http://{}/api/v1/carts/{{session_id}}/checkout", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  Storefront
  ━━━━━━━━━━━━━━━━━━━━━━━
  Catalog, carts and checkout
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
