use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{Target, TargetType};
use crate::remote::{Order, ToggleFilter};

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 3, max = 20, message = "Username must be 3-20 characters"))]
    pub username: String,
    #[validate(length(min = 8, max = 100, message = "Password must be 8-100 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Body of `POST /tables/{table}/rows`. The owner comes from the token.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateToggleRequest {
    pub target_type: TargetType,
    #[validate(length(min = 1, max = 200, message = "targetId must be 1-200 characters"))]
    pub target_id: String,
}

impl From<Target> for CreateToggleRequest {
    fn from(target: Target) -> Self {
        Self {
            target_type: target.target_type,
            target_id: target.target_id,
        }
    }
}

/// Query-string form of [`ToggleFilter`]. `target_ids` is a repeated
/// parameter (`target_ids=a&target_ids=b`), so ids may contain any
/// character.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ToggleQuery {
    pub user_id: Option<Uuid>,
    pub target_type: Option<TargetType>,
    pub target_id: Option<String>,
    #[serde(default)]
    pub target_ids: Vec<String>,
    pub search: Option<String>,
    pub order: Option<Order>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl ToggleQuery {
    /// Encoded parameter pairs, one pair per target id.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(user_id) = self.user_id {
            pairs.push(("user_id", user_id.to_string()));
        }
        if let Some(target_type) = self.target_type {
            pairs.push(("target_type", target_type.as_str().to_string()));
        }
        if let Some(target_id) = &self.target_id {
            pairs.push(("target_id", target_id.clone()));
        }
        for id in &self.target_ids {
            pairs.push(("target_ids", id.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.as_str().to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

impl From<&ToggleFilter> for ToggleQuery {
    fn from(filter: &ToggleFilter) -> Self {
        Self {
            user_id: filter.user_id,
            target_type: filter.target_type,
            target_id: filter.target_id.clone(),
            target_ids: filter.target_ids.clone().unwrap_or_default(),
            search: filter.search.clone(),
            order: Some(filter.order),
            offset: filter.offset,
            limit: filter.limit,
        }
    }
}

impl From<ToggleQuery> for ToggleFilter {
    fn from(query: ToggleQuery) -> Self {
        ToggleFilter {
            user_id: query.user_id,
            target_type: query.target_type,
            target_id: query.target_id,
            target_ids: (!query.target_ids.is_empty()).then_some(query.target_ids),
            search: query.search,
            order: query.order.unwrap_or_default(),
            offset: query.offset,
            limit: query.limit,
        }
    }
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[validate(length(min = 1, max = 250, message = "Item name must be 1-250 characters"))]
    pub name: String,
    /// Smallest currency unit (cents).
    #[validate(range(min = 1, message = "unitAmount must be positive"))]
    pub unit_amount: i64,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 999))]
    pub quantity: u32,
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3, message = "currency must be an ISO 4217 code"))]
    pub currency: String,
}

/// Body of `POST /checkout`: either a catalogue `priceId` or ad-hoc line
/// items, plus the redirect targets.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_price_descriptor"))]
pub struct CheckoutRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub price_id: Option<String>,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 999))]
    pub quantity: u32,
    #[serde(default)]
    #[validate(length(max = 100), nested)]
    pub line_items: Vec<LineItem>,
    #[validate(url(message = "successUrl must be a URL"))]
    pub success_url: String,
    #[validate(url(message = "cancelUrl must be a URL"))]
    pub cancel_url: String,
    #[serde(default)]
    #[validate(email)]
    pub customer_email: Option<String>,
}

fn validate_price_descriptor(req: &CheckoutRequest) -> Result<(), ValidationError> {
    match (&req.price_id, req.line_items.is_empty()) {
        (None, true) => Err(ValidationError::new("price")
            .with_message(Cow::Borrowed("Either priceId or lineItems is required"))),
        (Some(_), false) => Err(ValidationError::new("price")
            .with_message(Cow::Borrowed("priceId and lineItems are mutually exclusive"))),
        _ => Ok(()),
    }
}
