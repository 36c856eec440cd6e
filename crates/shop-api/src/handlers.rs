//! # Request Handlers
//!
//! Axum request handlers for the storefront API: catalog browsing, the
//! category menu, session carts and checkout.

use crate::sessions::{is_valid_session_key, CartSession};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shop_core::{
    add_to_cart, category_menu, checkout, list_products, Cart, CatalogQuery, CategoryMenu,
    FieldError, OrderConfirmation, PageLink, ProductPage, ShippingDetails, ShopError,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Catalog listing query string
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
}

/// Catalog listing response
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    #[serde(flatten)]
    pub page: ProductPage,
    pub page_links: Vec<PageLink>,
}

/// Category menu query string
#[derive(Debug, Deserialize)]
pub struct CategoryMenuQuery {
    #[serde(default)]
    pub selected: Option<String>,
}

/// Add-to-cart request body
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: u32,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// One cart line as shown to the shopper
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product_id: u32,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Cart summary response
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub session_id: String,
    pub lines: Vec<CartLineView>,
    pub line_count: usize,
    pub item_count: u64,
    pub total: Decimal,
}

impl CartResponse {
    fn new(session_id: &str, cart: &Cart) -> Self {
        Self {
            session_id: session_id.to_string(),
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    product_id: line.product.id,
                    name: line.product.name.clone(),
                    unit_price: line.product.price,
                    quantity: line.quantity,
                    line_total: line.line_total(),
                })
                .collect(),
            line_count: cart.line_count(),
            item_count: cart.item_count(),
            total: cart.total(),
        }
    }
}

/// New session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
}

/// Checkout response
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    #[serde(flatten)]
    pub confirmation: OrderConfirmation,
    pub processor: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
            field_errors: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

fn shop_error_to_response(err: ShopError) -> ApiError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if let ShopError::InvalidShippingDetails { errors } = err {
        response.field_errors = errors;
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn bad_session_key(session_id: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(
            ErrorResponse::new("Invalid session id", 400)
                .with_details(format!("{session_id:?} must be 1-128 letters, digits, '-' or '_'")),
        ),
    )
}

async fn open_session(state: &AppState, session_id: &str) -> ApiResult<CartSession> {
    if !is_valid_session_key(session_id) {
        return Err(bad_session_key(session_id));
    }
    state.carts.open(session_id).await.map_err(|e| {
        error!("Failed to open cart session: {}", e);
        shop_error_to_response(e)
    })
}

fn save_session(session: CartSession) -> ApiResult<Json<CartResponse>> {
    let key = session.key().to_string();
    let cart = session.save().map_err(|e| {
        error!("Failed to save cart: {}", e);
        shop_error_to_response(e)
    })?;
    Ok(Json(CartResponse::new(&key, &cart)))
}

fn products_url(category: Option<&str>, page: usize) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(category) = category {
        query.append_pair("category", category);
    }
    query.append_pair("page", &page.to_string());
    format!("/api/v1/products?{}", query.finish())
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "storefront",
        "version": env!("CARGO_PKG_VERSION"),
        "products": state.catalog.len(),
        "order_processor": state.processor.processor_name(),
    }))
}

/// One page of products, optionally filtered by category
#[instrument(skip(state))]
pub async fn list_product_page(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<ProductListResponse>> {
    let catalog_query = CatalogQuery {
        category: query.category,
        page: query.page.unwrap_or(1),
        items_per_page: state.config.items_per_page,
    };

    let page = list_products(state.catalog.as_ref(), &catalog_query).map_err(|e| {
        error!("Catalog query failed: {}", e);
        shop_error_to_response(e)
    })?;

    let category = page.current_category.clone();
    let page_links = page
        .paging_info
        .page_links(|n| products_url(category.as_deref(), n));

    Ok(Json(ProductListResponse { page, page_links }))
}

/// Get single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<u32>,
) -> ApiResult<impl IntoResponse> {
    let product = state
        .catalog
        .get(product_id)
        .ok_or_else(|| shop_error_to_response(ShopError::ProductNotFound { product_id }))?;

    Ok(Json(product.clone()))
}

/// Category navigation menu
pub async fn category_menu_handler(
    State(state): State<AppState>,
    Query(query): Query<CategoryMenuQuery>,
) -> Json<CategoryMenu> {
    Json(category_menu(state.catalog.as_ref(), query.selected.as_deref()))
}

/// Start a new cart session
pub async fn create_cart_session() -> (StatusCode, Json<NewSessionResponse>) {
    (
        StatusCode::CREATED,
        Json(NewSessionResponse {
            session_id: Uuid::new_v4().to_string(),
        }),
    )
}

/// Cart summary
#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<CartResponse>> {
    let session = open_session(&state, &session_id).await?;
    Ok(Json(CartResponse::new(&session_id, session.cart())))
}

/// Add a product to the cart; unknown product ids leave the cart unchanged
#[instrument(skip(state, request), fields(product_id = request.product_id, quantity = request.quantity))]
pub async fn add_cart_item(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<AddToCartRequest>,
) -> ApiResult<Json<CartResponse>> {
    let mut session = open_session(&state, &session_id).await?;

    add_to_cart(
        session.cart_mut(),
        state.catalog.as_ref(),
        request.product_id,
        request.quantity,
    )
    .map_err(|e| {
        warn!("Rejected add to cart: {}", e);
        shop_error_to_response(e)
    })?;

    save_session(session)
}

/// Remove a product's line from the cart
#[instrument(skip(state))]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path((session_id, product_id)): Path<(String, u32)>,
) -> ApiResult<Json<CartResponse>> {
    let mut session = open_session(&state, &session_id).await?;
    session.cart_mut().remove_line(product_id);
    save_session(session)
}

/// Empty the cart
#[instrument(skip(state))]
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<CartResponse>> {
    let mut session = open_session(&state, &session_id).await?;
    session.cart_mut().clear();
    save_session(session)
}

/// Submit the cart as an order
#[instrument(skip(state, shipping))]
pub async fn checkout_cart(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(shipping): Json<ShippingDetails>,
) -> ApiResult<(StatusCode, Json<CheckoutResponse>)> {
    let mut session = open_session(&state, &session_id).await?;

    info!(
        "Checkout: {} lines, total={}, processor={}",
        session.cart().line_count(),
        session.cart().total(),
        state.processor.processor_name()
    );

    let result = checkout(
        session.cart_mut(),
        &shipping,
        state.validator.as_ref(),
        state.processor.as_ref(),
    )
    .await;

    // Saved on every outcome: a failed attempt keeps its reserved order id
    // for the retry, a successful one leaves the cart empty.
    let placed_order = result.as_ref().ok().map(|c| c.order_id.clone());
    if let Err(e) = session.save() {
        match &placed_order {
            Some(order_id) => error!("Order {} placed but cart not cleared: {}", order_id, e),
            None => error!("Failed to save cart after checkout attempt: {}", e),
        }
    }

    let confirmation = result.map_err(|e| {
        if e.is_retryable() {
            error!("Checkout failed: {}", e);
        } else {
            warn!("Checkout rejected: {}", e);
        }
        shop_error_to_response(e)
    })?;

    info!("Order placed: {}", confirmation.order_id);

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            confirmation,
            processor: state.processor.processor_name(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400).with_details("more");
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
        assert_eq!(err.details.as_deref(), Some("more"));
    }

    #[test]
    fn test_shop_error_conversion() {
        let (status, _json) = shop_error_to_response(ShopError::EmptyCart);
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, Json(body)) = shop_error_to_response(ShopError::InvalidShippingDetails {
            errors: vec![FieldError::new("name", "Please enter a name")],
        });
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.field_errors.len(), 1);
    }

    #[test]
    fn test_products_url_encodes_category() {
        assert_eq!(products_url(None, 2), "/api/v1/products?page=2");
        assert_eq!(
            products_url(Some("Water sports"), 1),
            "/api/v1/products?category=Water+sports&page=1"
        );
    }
}
