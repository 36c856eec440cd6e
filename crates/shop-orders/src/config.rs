//! # Order Webhook Configuration
//!
//! Configuration for forwarding orders to a fulfilment service.
//! Values are loaded from environment variables.

use shop_core::ShopError;
use std::env;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fulfilment webhook configuration
#[derive(Debug, Clone)]
pub struct OrderWebhookConfig {
    /// Endpoint that receives order submissions (POST, JSON body)
    pub url: String,

    /// Shared secret used to sign each body; unsigned when `None`
    pub signing_secret: Option<String>,

    /// Request timeout
    pub timeout_secs: u64,
}

impl OrderWebhookConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `Ok(None)` when `ORDER_WEBHOOK_URL` is unset, meaning no
    /// fulfilment service is configured.
    ///
    /// Env vars:
    /// - `ORDER_WEBHOOK_URL` (http:// or https://)
    /// - `ORDER_WEBHOOK_SECRET` (optional)
    /// - `ORDER_WEBHOOK_TIMEOUT_SECS` (optional, default 30)
    pub fn from_env() -> Result<Option<Self>, ShopError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let Ok(url) = env::var("ORDER_WEBHOOK_URL") else {
            return Ok(None);
        };

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ShopError::Configuration(
                "ORDER_WEBHOOK_URL must start with http:// or https://".to_string(),
            ));
        }

        let signing_secret = env::var("ORDER_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let timeout_secs = match env::var("ORDER_WEBHOOK_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                ShopError::Configuration(format!(
                    "ORDER_WEBHOOK_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                ))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Some(Self {
            url,
            signing_secret,
            timeout_secs,
        }))
    }

    /// Create config with explicit values (for testing)
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            signing_secret: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Builder: sign request bodies with `secret`
    pub fn with_signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.signing_secret = Some(secret.into());
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn is_signed(&self) -> bool {
        self.signing_secret.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = OrderWebhookConfig::new("https://fulfil.example.com/orders")
            .with_signing_secret("s3cret")
            .with_timeout_secs(5);

        assert!(config.is_signed());
        assert_eq!(config.timeout_secs, 5);
        assert!(!OrderWebhookConfig::new("http://localhost").is_signed());
    }

    // Single test touching the process env so parallel tests cannot race on it
    #[test]
    fn test_from_env() {
        env::remove_var("ORDER_WEBHOOK_URL");
        assert!(OrderWebhookConfig::from_env().unwrap().is_none());

        env::set_var("ORDER_WEBHOOK_URL", "ftp://nope");
        assert!(OrderWebhookConfig::from_env().is_err());

        env::set_var("ORDER_WEBHOOK_URL", "https://fulfil.example.com/orders");
        env::set_var("ORDER_WEBHOOK_TIMEOUT_SECS", "10");
        let config = OrderWebhookConfig::from_env().unwrap().unwrap();
        assert_eq!(config.url, "https://fulfil.example.com/orders");
        assert_eq!(config.timeout_secs, 10);

        env::remove_var("ORDER_WEBHOOK_URL");
        env::remove_var("ORDER_WEBHOOK_TIMEOUT_SECS");
    }
}
