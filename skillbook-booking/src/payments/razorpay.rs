use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use skillbook_shared::errors::{AppError, AppResult, ErrorCode};

type HmacSha256 = Hmac<Sha256>;

/// Razorpay-style payment gateway client.
///
/// Order creation goes over HTTP with Basic auth; checkout happens in the
/// client widget; the resulting `{order_id, payment_id, signature}` triple
/// is verified server-side with [`PaymentGateway::verify_signature`] before
/// any booking is written.
#[derive(Clone)]
pub struct PaymentGateway {
    client: Client,
    key_id: String,
    key_secret: String,
    api_base: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
}

impl PaymentGateway {
    pub fn new(key_id: &str, key_secret: &str, api_base: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a gateway order for `amount_minor` minor currency units.
    pub async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
        notes: serde_json::Value,
    ) -> AppResult<String> {
        if amount_minor <= 0 {
            return Err(AppError::new(
                ErrorCode::PaymentOrderFailed,
                "order amount must be positive",
            ));
        }

        let body = CreateOrderBody {
            amount: amount_minor,
            currency,
            receipt,
            notes,
        };

        let response = self
            .client
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::upstream(e, "payment gateway"))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, detail = %detail, "order creation rejected");
            return Err(AppError::new(
                ErrorCode::PaymentOrderFailed,
                format!("gateway rejected order: {status}"),
            ));
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(e, "payment gateway"))?;

        tracing::info!(order_id = %order.id, amount_minor, "payment order created");
        Ok(order.id)
    }

    /// Verify the checkout callback signature:
    /// `HMAC-SHA256(secret, "{order_id}|{payment_id}")`, hex-encoded.
    /// Constant-time comparison.
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify(&self.key_secret, order_id, payment_id, signature)
    }
}

fn expected_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn verify(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    use subtle::ConstantTimeEq;
    let expected = expected_signature(secret, order_id, payment_id);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_roundtrip() {
        let secret = "test_secret";
        let sig = expected_signature(secret, "order_123", "pay_456");

        assert!(verify(secret, "order_123", "pay_456", &sig));
        assert!(!verify("wrong_secret", "order_123", "pay_456", &sig));
        assert!(!verify(secret, "order_123", "pay_457", &sig));
        assert!(!verify(secret, "order_124", "pay_456", &sig));
    }

    #[test]
    fn signature_covers_the_separator() {
        // "ab|c" and "a|bc" must not collide.
        let secret = "s";
        let sig = expected_signature(secret, "ab", "c");
        assert!(!verify(secret, "a", "bc", &sig));
    }

    #[test]
    fn rejects_malformed_signature() {
        assert!(!verify("s", "o", "p", ""));
        assert!(!verify("s", "o", "p", "not-hex-and-wrong-length"));
    }
}
