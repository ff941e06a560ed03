//! Read models
//!
//! Aggregated views joining listing/offer rows with the display fields the
//! client renders, so callers never need a second fetch to show a row.

use serde::{Deserialize, Serialize};

use oremarket_types::{ComplianceStatus, Currency, Listing, Offer, Transaction, User};
use rust_decimal::Decimal;

/// Listing with seller display fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    pub seller_company_name: Option<String>,
    pub seller_location: Option<String>,
    pub seller_compliance_status: ComplianceStatus,
}

impl ListingView {
    pub fn join(listing: Listing, seller: &User) -> Self {
        Self {
            listing,
            seller_company_name: seller.company_name.clone(),
            seller_location: seller.location.clone(),
            seller_compliance_status: seller.compliance_status,
        }
    }
}

/// Offer with buyer and listing display fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferView {
    #[serde(flatten)]
    pub offer: Offer,
    pub buyer_first_name: String,
    pub buyer_last_name: String,
    pub listing_mineral_type: String,
    pub listing_location: String,
    pub listing_price_per_unit: Decimal,
    pub listing_quantity: Decimal,
    pub listing_currency: Currency,
}

impl OfferView {
    pub fn join(offer: Offer, buyer: &User, listing: &Listing) -> Self {
        Self {
            offer,
            buyer_first_name: buyer.first_name.clone(),
            buyer_last_name: buyer.last_name.clone(),
            listing_mineral_type: listing.mineral_type.clone(),
            listing_location: listing.location.clone(),
            listing_price_per_unit: listing.price_per_unit,
            listing_quantity: listing.quantity,
            listing_currency: listing.currency,
        }
    }
}

/// Result of settling an offer: the completed offer plus its transaction
/// record, returned together so the caller sees the whole outcome at once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub offer: Offer,
    pub transaction: Transaction,
}
