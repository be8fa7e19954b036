//! Hosted checkout sessions through a third-party payment API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::dto::{CheckoutRequest, CheckoutResponse};

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment provider is not configured")]
    NotConfigured,
    #[error("payment provider rejected the request: {0}")]
    Rejected(String),
    #[error("payment provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, PaymentError>;
}

/// Stripe-compatible `POST /v1/checkout/sessions`.
pub struct StripeGateway {
    client: Client,
    base_url: String,
    secret_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionCreated {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(client: Client, base_url: impl Into<String>, secret_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key,
        }
    }
}

/// Form fields in the provider's bracketed notation.
pub fn session_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];
    if let Some(email) = &request.customer_email {
        form.push(("customer_email".to_string(), email.clone()));
    }

    if let Some(price_id) = &request.price_id {
        form.push(("line_items[0][price]".to_string(), price_id.clone()));
        form.push((
            "line_items[0][quantity]".to_string(),
            request.quantity.to_string(),
        ));
        return form;
    }

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            item.currency.to_lowercase(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }
    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, PaymentError> {
        let secret_key = self
            .secret_key
            .as_deref()
            .ok_or(PaymentError::NotConfigured)?;

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(secret_key)
            .form(&session_form(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ProviderError>()
                .await
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| status.to_string());
            error!("Checkout session creation failed ({}): {}", status, message);
            return Err(PaymentError::Rejected(message));
        }

        let created: SessionCreated = response.json().await?;
        let url = created
            .url
            .ok_or_else(|| PaymentError::Rejected("session has no redirect url".into()))?;

        info!("Checkout session created: {}", created.id);
        Ok(CheckoutResponse {
            session_id: created.id,
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::LineItem;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            price_id: None,
            quantity: 1,
            line_items: vec![LineItem {
                name: "Meetup ticket".into(),
                unit_amount: 1500,
                quantity: 2,
                currency: "EUR".into(),
            }],
            success_url: "https://example.com/ok".into(),
            cancel_url: "https://example.com/cancel".into(),
            customer_email: Some("a@example.com".into()),
        }
    }

    fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn line_items_use_bracketed_price_data() {
        let form = session_form(&request());

        assert_eq!(field(&form, "mode"), Some("payment"));
        assert_eq!(field(&form, "customer_email"), Some("a@example.com"));
        assert_eq!(
            field(&form, "line_items[0][price_data][currency]"),
            Some("eur")
        );
        assert_eq!(
            field(&form, "line_items[0][price_data][unit_amount]"),
            Some("1500")
        );
        assert_eq!(field(&form, "line_items[0][quantity]"), Some("2"));
    }

    #[test]
    fn price_id_becomes_a_single_line_item() {
        let mut req = request();
        req.line_items.clear();
        req.price_id = Some("price_123".into());
        req.quantity = 3;

        let form = session_form(&req);

        assert_eq!(field(&form, "line_items[0][price]"), Some("price_123"));
        assert_eq!(field(&form, "line_items[0][quantity]"), Some("3"));
        assert_eq!(field(&form, "line_items[0][price_data][currency]"), None);
    }

    #[tokio::test]
    async fn missing_secret_key_is_reported_before_any_request() {
        let gateway = StripeGateway::new(Client::new(), "http://127.0.0.1:9", None);
        let result = gateway.create_session(&request()).await;
        assert!(matches!(result, Err(PaymentError::NotConfigured)));
    }
}
