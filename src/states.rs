use crate::config::Config;
use crate::models::User;
use crate::payments::{PaymentGateway, StripeGateway};
use crate::remote::MemoryStore;
use dashmap::DashMap;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// APPLICATION STATE - Shared data across all requests
// ============================================================================
/// Cloned into every handler; all members are `Arc`s.
///
/// `store` is the toggle/activity store the REST surface exposes, the same
/// one in-process clients would talk to directly.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<DashMap<Uuid, User>>,
    pub email_index: Arc<DashMap<String, Uuid>>, // Quick Lookup by Email
    pub store: Arc<MemoryStore>,
    pub payments: Arc<dyn PaymentGateway>,
    pub checkout_limiter: Arc<DefaultDirectRateLimiter>,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let payments = StripeGateway::new(
            reqwest::Client::new(),
            config.payment_api_base.clone(),
            config.payment_secret_key.clone(),
        );
        Self::with_gateway(
            config.jwt_secret.clone(),
            Arc::new(payments),
            config.checkout_rate_per_minute,
        )
    }

    pub fn with_gateway(
        jwt_secret: String,
        payments: Arc<dyn PaymentGateway>,
        checkout_rate_per_minute: u32,
    ) -> Self {
        let rate = NonZeroU32::new(checkout_rate_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            users: Arc::new(DashMap::new()),
            email_index: Arc::new(DashMap::new()),
            store: Arc::new(MemoryStore::new()),
            payments,
            checkout_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(rate))),
            jwt_secret,
        }
    }
}
