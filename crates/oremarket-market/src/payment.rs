//! Payment gateway boundary
//!
//! The gateway itself is an external collaborator; only success/failure and
//! an opaque confirmation token matter to the marketplace.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use oremarket_types::{Currency, MarketError, OfferId, PaymentId, Result};

/// Proof that an external payment settled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub payment_id: PaymentId,
    pub offer_id: OfferId,
    pub amount: Decimal,
    pub currency: Currency,
    /// Opaque token issued by the gateway
    pub token: String,
    pub confirmed_at: DateTime<Utc>,
}

impl PaymentConfirmation {
    /// Whether this confirmation actually settles the given offer
    pub fn settles(&self, offer_id: &OfferId, amount: Decimal, currency: Currency) -> bool {
        !self.token.trim().is_empty()
            && &self.offer_id == offer_id
            && self.amount == amount
            && self.currency == currency
    }
}

/// External payment collaborator
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Execute a payment for the offer, returning the confirmation on
    /// success. Failure modes are `Payment` (declined) and, for transport
    /// problems, `Unavailable`.
    async fn confirm_payment(
        &self,
        offer_id: &OfferId,
        amount: Decimal,
        currency: Currency,
    ) -> Result<PaymentConfirmation>;
}

/// Deterministic gateway for tests and the demo binary
pub struct StaticGateway {
    decline: bool,
    delay: Option<std::time::Duration>,
}

impl StaticGateway {
    /// Gateway that confirms every payment
    pub fn accepting() -> Self {
        Self {
            decline: false,
            delay: None,
        }
    }

    /// Gateway that declines every payment
    pub fn declining() -> Self {
        Self {
            decline: true,
            delay: None,
        }
    }

    /// Delay each call; lets callers exercise their timeout handling
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl PaymentGateway for StaticGateway {
    async fn confirm_payment(
        &self,
        offer_id: &OfferId,
        amount: Decimal,
        currency: Currency,
    ) -> Result<PaymentConfirmation> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.decline {
            return Err(MarketError::Payment {
                reason: "declined by gateway".to_string(),
            });
        }
        let payment_id = PaymentId::new();
        Ok(PaymentConfirmation {
            payment_id,
            offer_id: *offer_id,
            amount,
            currency,
            token: format!("static_{payment_id}"),
            confirmed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_accepting_gateway_issues_matching_confirmation() {
        let offer_id = OfferId::new();
        let confirmation = StaticGateway::accepting()
            .confirm_payment(&offer_id, dec!(950), Currency::USD)
            .await
            .unwrap();
        assert!(confirmation.settles(&offer_id, dec!(950), Currency::USD));
        assert!(!confirmation.settles(&OfferId::new(), dec!(950), Currency::USD));
        assert!(!confirmation.settles(&offer_id, dec!(949), Currency::USD));
    }

    #[tokio::test]
    async fn test_declining_gateway_fails_with_payment_error() {
        let err = StaticGateway::declining()
            .confirm_payment(&OfferId::new(), dec!(1), Currency::USD)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PAYMENT_ERROR");
    }
}
