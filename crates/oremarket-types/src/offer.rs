//! Purchase offers and their status state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Currency, ListingId, OfferId, UserId};

/// Status of a purchase offer
///
/// Transitions: `Pending → Accepted | Rejected | Expired`,
/// `Accepted → Completed`. `Rejected`, `Expired` and `Completed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    /// Awaiting the seller's decision
    Pending,
    /// Seller accepted; listing reserved; awaiting payment
    Accepted,
    /// Seller declined
    Rejected,
    /// TTL elapsed before a decision
    Expired,
    /// Payment confirmed
    Completed,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
            Self::Completed => "completed",
        }
    }

    /// Whether the state machine permits moving from `self` to `next`
    pub fn can_transition_to(&self, next: OfferStatus) -> bool {
        matches!(
            (*self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Expired)
                | (Self::Accepted, Self::Completed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Expired | Self::Completed)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A buyer's proposal to purchase some or all of a listing's quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub listing_id: ListingId,
    pub buyer_id: UserId,
    pub offer_price: Decimal,
    pub offer_quantity: Decimal,
    pub message: Option<String>,
    pub status: OfferStatus,
    /// Always the listing's currency, never caller input
    pub currency: Currency,
    /// Deadline after which an external timer may expire a pending offer
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    pub fn is_pending(&self) -> bool {
        self.status == OfferStatus::Pending
    }

    /// Total amount payable on completion
    pub fn total(&self) -> Decimal {
        self.offer_price * self.offer_quantity
    }
}
