use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Service configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub bind_addr: String,
    pub payment_api_base: String,
    pub payment_secret_key: Option<String>,
    pub checkout_rate_per_minute: u32,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            jwt_secret: var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            payment_api_base: var("PAYMENT_API_BASE")
                .unwrap_or_else(|| "https://api.stripe.com".to_string()),
            payment_secret_key: var("PAYMENT_SECRET_KEY"),
            checkout_rate_per_minute: parse(
                "CHECKOUT_RATE_PER_MINUTE",
                var("CHECKOUT_RATE_PER_MINUTE"),
                30,
            )?,
            request_timeout_secs: parse("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS"), 15)?,
        })
    }
}

fn parse<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
