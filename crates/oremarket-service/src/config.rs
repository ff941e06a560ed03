//! Marketplace configuration

use std::time::Duration;

/// Tunables for the marketplace service
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// TTL stamped onto newly submitted offers; an external timer calls
    /// `expire` for offers past this deadline
    pub offer_ttl: chrono::Duration,
    /// Upper bound on a single payment-gateway call
    pub payment_timeout: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            offer_ttl: chrono::Duration::hours(48),
            payment_timeout: Duration::from_secs(30),
        }
    }
}

impl MarketConfig {
    /// Create config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            offer_ttl: std::env::var("OREMARKET_OFFER_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(chrono::Duration::seconds)
                .unwrap_or(defaults.offer_ttl),
            payment_timeout: std::env::var("OREMARKET_PAYMENT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.payment_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarketConfig::default();
        assert_eq!(config.offer_ttl, chrono::Duration::hours(48));
        assert_eq!(config.payment_timeout, Duration::from_secs(30));
    }
}
