//! # Webhook Order Processor
//!
//! Forwards each order as JSON to a fulfilment service.
//!
//! When a signing secret is configured every request carries an
//! `X-Order-Signature: t=<unix>,v1=<hex hmac-sha256>` header computed over
//! `"<t>.<body>"`.
//!
//! The `Idempotency-Key` header carries the order id. A cart keeps its
//! reserved order id across failed checkout attempts, so a retry after a
//! timeout is recognisable as the same order.

use crate::config::OrderWebhookConfig;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use shop_core::{
    Cart, Order, OrderConfirmation, OrderProcessor, ShippingDetails, ShopError, ShopResult,
};
use tracing::{debug, error, info, instrument};

pub const SIGNATURE_HEADER: &str = "X-Order-Signature";

/// Order processor that POSTs orders to a fulfilment endpoint
pub struct WebhookOrderProcessor {
    config: OrderWebhookConfig,
    client: Client,
}

impl WebhookOrderProcessor {
    /// Create a new webhook processor
    pub fn new(config: OrderWebhookConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ShopError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables, `None` if no webhook is configured
    pub fn from_env() -> ShopResult<Option<Self>> {
        OrderWebhookConfig::from_env()?.map(Self::new).transpose()
    }

    pub fn config(&self) -> &OrderWebhookConfig {
        &self.config
    }
}

#[async_trait]
impl OrderProcessor for WebhookOrderProcessor {
    #[instrument(skip(self, cart, shipping), fields(lines = cart.line_count()))]
    async fn process_order(
        &self,
        cart: &Cart,
        shipping: &ShippingDetails,
    ) -> ShopResult<OrderConfirmation> {
        let order = Order::from_cart(cart, shipping);
        let body = serde_json::to_string(&order)
            .map_err(|e| ShopError::Serialization(format!("Failed to encode order: {e}")))?;

        debug!("Forwarding order {} to {}", order.id, self.config.url);

        let mut request = self
            .client
            .post(&self.config.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("Idempotency-Key", &order.id);

        if let Some(secret) = &self.config.signing_secret {
            let timestamp = Utc::now().timestamp();
            request = request.header(SIGNATURE_HEADER, signature_header(secret, timestamp, &body));
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| ShopError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Fulfilment webhook error: status={}, body={}", status, body);
            return Err(ShopError::OrderProcessingFailed(format!(
                "HTTP {status}: {body}"
            )));
        }

        info!(
            "Order {} accepted: {} lines, total={}",
            order.id,
            order.lines.len(),
            order.total
        );

        Ok(OrderConfirmation::from(&order))
    }

    fn processor_name(&self) -> &'static str {
        "webhook"
    }
}

// =============================================================================
// Payload Signing
// =============================================================================

/// `t=<timestamp>,v1=<signature>` header value for `body`
pub fn signature_header(secret: &str, timestamp: i64, body: &str) -> String {
    let signed_payload = format!("{timestamp}.{body}");
    format!("t={},v1={}", timestamp, compute_hmac_sha256(secret, &signed_payload))
}

fn compute_hmac_sha256(secret: &str, message: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shop_core::{checkout, Product, RequiredFieldsValidator};
    use std::time::Duration;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(&Product::new(7, "Stadium", Decimal::new(7950000, 2)), 1)
            .unwrap();
        cart
    }

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            name: "Joe".into(),
            line1: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            country: "USA".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_posts_order_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(header("content-type", "application/json"))
            .and(header_exists("idempotency-key"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let processor =
            WebhookOrderProcessor::new(OrderWebhookConfig::new(format!("{}/orders", server.uri())))
                .unwrap();

        let confirmation = processor.process_order(&cart(), &shipping()).await.unwrap();
        assert_eq!(confirmation.total, Decimal::new(7950000, 2));

        let requests = server.received_requests().await.unwrap();
        let order: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(order["id"], confirmation.order_id.as_str());
        assert_eq!(order["lines"][0]["product_id"], 7);
        assert_eq!(order["shipping"]["city"], "Springfield");
        assert!(requests[0].headers.get("x-order-signature").is_none());
    }

    #[tokio::test]
    async fn test_signs_body_when_secret_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header_exists("x-order-signature"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let config = OrderWebhookConfig::new(server.uri()).with_signing_secret("whsec_test");
        let processor = WebhookOrderProcessor::new(config).unwrap();
        processor.process_order(&cart(), &shipping()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let signature = requests[0]
            .headers
            .get("x-order-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        let timestamp: i64 = signature
            .strip_prefix("t=")
            .and_then(|rest| rest.split(',').next())
            .and_then(|t| t.parse().ok())
            .unwrap();
        let body = String::from_utf8(requests[0].body.clone()).unwrap();

        assert_eq!(signature, signature_header("whsec_test", timestamp, &body));
    }

    #[tokio::test]
    async fn test_rejected_order_is_processing_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate order"))
            .mount(&server)
            .await;

        let processor = WebhookOrderProcessor::new(OrderWebhookConfig::new(server.uri())).unwrap();
        let err = processor.process_order(&cart(), &shipping()).await.unwrap_err();

        assert!(matches!(err, ShopError::OrderProcessingFailed(ref msg) if msg.contains("duplicate order")));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        // Port 9 (discard) is not listening in test environments
        let config = OrderWebhookConfig::new("http://127.0.0.1:9/orders").with_timeout_secs(2);
        let processor = WebhookOrderProcessor::new(config).unwrap();

        let err = processor.process_order(&cart(), &shipping()).await.unwrap_err();
        assert!(matches!(err, ShopError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_retry_after_timeout_reuses_idempotency_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_delay(Duration::from_secs(3)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let config = OrderWebhookConfig::new(server.uri()).with_timeout_secs(1);
        let processor = WebhookOrderProcessor::new(config).unwrap();
        let mut cart = cart();

        let err = checkout(&mut cart, &shipping(), &RequiredFieldsValidator, &processor)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(cart.line_count(), 1);

        let confirmation = checkout(&mut cart, &shipping(), &RequiredFieldsValidator, &processor)
            .await
            .unwrap();
        assert!(cart.is_empty());

        let keys: Vec<_> = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter_map(|r| r.headers.get("idempotency-key"))
            .filter_map(|v| v.to_str().ok().map(String::from))
            .collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], keys[1]);
        assert_eq!(keys[0], confirmation.order_id);
    }

    #[test]
    fn test_signature_header_format() {
        let header = signature_header("whsec_test", 1234567890, "{}");
        let (t, v1) = header.split_once(',').unwrap();

        assert_eq!(t, "t=1234567890");
        // 64 hex chars for SHA-256
        assert_eq!(v1.trim_start_matches("v1=").len(), 64);
        assert_eq!(header, signature_header("whsec_test", 1234567890, "{}"));
        assert_ne!(header, signature_header("whsec_other", 1234567890, "{}"));
    }
}
