//! Transaction records for settled purchases

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Currency, ListingId, OfferId, TransactionId, UserId};

/// Outcome of a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record of a completed purchase, written when an offer settles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub listing_id: ListingId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub offer_id: OfferId,
    pub final_price: Decimal,
    pub final_quantity: Decimal,
    pub currency: Currency,
    pub status: TransactionStatus,
    /// Opaque confirmation token from the payment gateway
    pub payment_ref: Option<String>,
    pub executed_at: DateTime<Utc>,
}

impl Transaction {
    /// Total amount that changed hands
    pub fn total(&self) -> Decimal {
        self.final_price * self.final_quantity
    }

    /// Whether this transaction touches the given user as buyer or seller
    pub fn involves(&self, user_id: &UserId) -> bool {
        &self.buyer_id == user_id || &self.seller_id == user_id
    }
}
