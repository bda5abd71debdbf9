use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_HOLD_TTL_MINUTES: i64 = 15;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
const DEFAULT_CURRENCY: &str = "INR";

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// How long a seat hold survives without payment before the sweep
    /// releases it.
    pub hold_ttl_minutes: i64,
    pub sweep_interval_secs: u64,
    pub payment_key_secret: String,
    pub currency: String,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: parse_env("PORT", DEFAULT_PORT),
            hold_ttl_minutes: parse_env("HOLD_TTL_MINUTES", DEFAULT_HOLD_TTL_MINUTES),
            sweep_interval_secs: parse_env("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS),
            payment_key_secret: env::var("PAYMENT_KEY_SECRET")
                .unwrap_or_else(|_| "boxoffice_test_secret".to_string()),
            currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| DEFAULT_CURRENCY.to_string()),
            seed_demo_data: env::var("SEED_DEMO_DATA")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Config: invalid value for {}, using default", key);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        std::env::remove_var("HOLD_TTL_MINUTES");
        std::env::remove_var("SWEEP_INTERVAL_SECS");
        let config = Config::from_env();
        assert_eq!(config.hold_ttl_minutes, DEFAULT_HOLD_TTL_MINUTES);
        assert_eq!(config.sweep_interval_secs, DEFAULT_SWEEP_INTERVAL_SECS);
    }

    #[test]
    fn test_invalid_value_falls_back_to_default() {
        std::env::set_var("HOLD_TTL_MINUTES", "not-a-number");
        let config = Config::from_env();
        assert_eq!(config.hold_ttl_minutes, DEFAULT_HOLD_TTL_MINUTES);
        std::env::remove_var("HOLD_TTL_MINUTES");
    }
}
