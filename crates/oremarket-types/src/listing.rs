//! Mineral listings and their status state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Currency, ListingId, UserId};

/// Status of a mineral listing
///
/// Transitions: `Available → Pending → Sold`, `Available → Canceled`,
/// `Pending → Available` (reserving offer rejected), `Pending → Canceled`.
/// `Sold` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Open for offers
    Available,
    /// Reserved by an accepted offer
    Pending,
    /// Payment confirmed, inventory gone
    Sold,
    /// Withdrawn by the seller
    Canceled,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Sold => "sold",
            Self::Canceled => "canceled",
        }
    }

    /// Whether the state machine permits moving from `self` to `next`
    pub fn can_transition_to(&self, next: ListingStatus) -> bool {
        matches!(
            (*self, next),
            (Self::Available, Self::Pending)
                | (Self::Available, Self::Canceled)
                | (Self::Pending, Self::Available)
                | (Self::Pending, Self::Sold)
                | (Self::Pending, Self::Canceled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sold | Self::Canceled)
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A seller's advertised quantity of a mineral at a price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub seller_id: UserId,
    pub mineral_type: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub price_per_unit: Decimal,
    pub currency: Currency,
    pub location: String,
    pub status: ListingStatus,
    pub listed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_available(&self) -> bool {
        self.status == ListingStatus::Available
    }
}

/// Fields for creating a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDraft {
    pub mineral_type: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub price_per_unit: Decimal,
    pub currency: Currency,
    pub location: String,
}

/// Partial update for a listing; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingPatch {
    pub mineral_type: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub price_per_unit: Option<Decimal>,
    pub location: Option<String>,
    /// Explicit status override; must be a legally reachable state
    pub status: Option<ListingStatus>,
}
