//! Offer lifecycle
//!
//! Owns offer state transitions, cross-references listing availability,
//! and enforces the single-accepted-offer invariant through the listing
//! reservation swap.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use oremarket_compliance::ComplianceRegistry;
use oremarket_store::{ListingStore, OfferStore, UserStore};
use oremarket_types::{
    Listing, MarketError, Offer, OfferId, OfferStatus, ListingId, ListingStatus, Result, Role,
    User, UserId,
};

use crate::listing::ListingLifecycle;
use crate::payment::PaymentConfirmation;

/// Owns offer state transitions and authorization rules
#[derive(Clone)]
pub struct OfferLifecycle {
    users: Arc<dyn UserStore>,
    listings: Arc<dyn ListingStore>,
    offers: Arc<dyn OfferStore>,
    compliance: ComplianceRegistry,
    listing_lifecycle: ListingLifecycle,
    /// TTL stamped onto new offers; expiry itself is externally triggered
    offer_ttl: Duration,
}

fn authorize_seller_or_admin(actor: &User, listing: &Listing, action: &'static str) -> Result<()> {
    if actor.id != listing.seller_id && !actor.is_admin() {
        return Err(MarketError::forbidden(
            action,
            "only the listing's seller or an admin may decide offers",
        ));
    }
    Ok(())
}

impl OfferLifecycle {
    pub fn new(
        users: Arc<dyn UserStore>,
        listings: Arc<dyn ListingStore>,
        offers: Arc<dyn OfferStore>,
        compliance: ComplianceRegistry,
        listing_lifecycle: ListingLifecycle,
        offer_ttl: Duration,
    ) -> Self {
        Self {
            users,
            listings,
            offers,
            compliance,
            listing_lifecycle,
            offer_ttl,
        }
    }

    /// Submit a purchase offer against an available listing.
    ///
    /// The offer's currency is copied from the listing, never taken from
    /// the caller, so a listing/offer currency mismatch cannot exist.
    pub async fn submit(
        &self,
        buyer_id: &UserId,
        listing_id: &ListingId,
        offer_price: Decimal,
        offer_quantity: Decimal,
        message: Option<String>,
    ) -> Result<Offer> {
        self.compliance
            .require_compliant(buyer_id, "submit_offer")
            .await?;

        let buyer = self.users.get_user(buyer_id).await?;
        if buyer.role != Role::Buyer {
            return Err(MarketError::forbidden(
                "submit_offer",
                format!("offers are submitted by buyers, actor is {}", buyer.role),
            ));
        }

        let listing = self.listings.get_listing(listing_id).await?;
        if listing.status != ListingStatus::Available {
            return Err(MarketError::InvalidOperation {
                reason: format!("listing is {}, not open for offers", listing.status),
            });
        }

        if offer_price <= Decimal::ZERO {
            return Err(MarketError::validation("offer_price", "must be positive"));
        }
        if offer_quantity <= Decimal::ZERO {
            return Err(MarketError::validation("offer_quantity", "must be positive"));
        }
        if offer_quantity > listing.quantity {
            return Err(MarketError::validation(
                "offer_quantity",
                format!(
                    "exceeds the {} {} available on the listing",
                    listing.quantity, listing.unit
                ),
            ));
        }

        let now = Utc::now();
        let offer = Offer {
            id: OfferId::new(),
            listing_id: *listing_id,
            buyer_id: *buyer_id,
            offer_price,
            offer_quantity,
            message,
            status: OfferStatus::Pending,
            currency: listing.currency,
            expires_at: Some(now + self.offer_ttl),
            created_at: now,
            updated_at: now,
        };

        info!(offer = %offer.id, listing = %listing_id, buyer = %buyer_id, "offer submitted");
        self.offers.put_offer(offer).await
    }

    /// Accept a pending offer, reserving the listing.
    ///
    /// Reservation is the gating side effect: if the listing is no longer
    /// `available` (a race with another accepted offer), the whole call
    /// fails with `Conflict` and the offer remains `pending`.
    pub async fn accept(&self, actor_id: &UserId, offer_id: &OfferId) -> Result<Offer> {
        let actor = self.users.get_user(actor_id).await?;
        let offer = self.offers.get_offer(offer_id).await?;
        let listing = self.listings.get_listing(&offer.listing_id).await?;
        authorize_seller_or_admin(&actor, &listing, "accept_offer")?;

        if offer.status != OfferStatus::Pending {
            return Err(MarketError::invalid_transition(
                "offer",
                offer.status,
                OfferStatus::Accepted,
            ));
        }

        if self.listing_lifecycle.reserve(&offer.listing_id).await.is_err() {
            return Err(MarketError::conflict(
                "listing",
                "no longer available, another offer won the reservation",
            ));
        }

        match self
            .offers
            .swap_offer_status(offer_id, OfferStatus::Pending, OfferStatus::Accepted)
            .await
        {
            Ok(accepted) => {
                info!(offer = %offer_id, listing = %offer.listing_id, "offer accepted");
                Ok(accepted)
            }
            Err(err) => {
                // The offer left `pending` between our read and the swap;
                // hand the reservation back so the listing is not stranded.
                warn!(offer = %offer_id, listing = %offer.listing_id, "acceptance raced, releasing reservation");
                if let Err(release_err) = self.listing_lifecycle.release(&offer.listing_id).await {
                    warn!(listing = %offer.listing_id, error = %release_err, "reservation release failed");
                }
                Err(err)
            }
        }
    }

    /// Reject a pending offer
    pub async fn reject(&self, actor_id: &UserId, offer_id: &OfferId) -> Result<Offer> {
        let actor = self.users.get_user(actor_id).await?;
        let offer = self.offers.get_offer(offer_id).await?;
        let listing = self.listings.get_listing(&offer.listing_id).await?;
        authorize_seller_or_admin(&actor, &listing, "reject_offer")?;

        let rejected = self
            .offers
            .swap_offer_status(offer_id, OfferStatus::Pending, OfferStatus::Rejected)
            .await?;

        // A still-pending offer should never hold the reservation; release
        // defensively if the listing is parked `pending` with no accepted
        // offer left to claim it.
        if listing.status == ListingStatus::Pending {
            let has_accepted = self
                .offers
                .offers_for_listing(&offer.listing_id)
                .await?
                .iter()
                .any(|o| o.status == OfferStatus::Accepted);
            if !has_accepted {
                warn!(listing = %offer.listing_id, "releasing orphaned reservation on reject");
                if let Err(release_err) = self.listing_lifecycle.release(&offer.listing_id).await {
                    warn!(listing = %offer.listing_id, error = %release_err, "reservation release failed");
                }
            }
        }

        info!(offer = %offer_id, "offer rejected");
        Ok(rejected)
    }

    /// Expire a pending offer. System-triggered by an external timer; no
    /// authorization check.
    pub async fn expire(&self, offer_id: &OfferId) -> Result<Offer> {
        let expired = self
            .offers
            .swap_offer_status(offer_id, OfferStatus::Pending, OfferStatus::Expired)
            .await?;
        info!(offer = %offer_id, "offer expired");
        Ok(expired)
    }

    /// Complete an accepted offer after a successful external payment.
    ///
    /// The payment call itself happens upstream; this method validates the
    /// confirmation against the offer, closes out the listing and marks
    /// the offer `completed`.
    pub async fn complete(
        &self,
        buyer_id: &UserId,
        offer_id: &OfferId,
        confirmation: &PaymentConfirmation,
    ) -> Result<Offer> {
        self.compliance
            .require_compliant(buyer_id, "complete_payment")
            .await?;

        let offer = self.offers.get_offer(offer_id).await?;
        if &offer.buyer_id != buyer_id {
            return Err(MarketError::forbidden(
                "complete_payment",
                "only the offer's buyer may complete it",
            ));
        }
        if offer.status != OfferStatus::Accepted {
            return Err(MarketError::invalid_transition(
                "offer",
                offer.status,
                OfferStatus::Completed,
            ));
        }
        if !confirmation.settles(offer_id, offer.total(), offer.currency) {
            return Err(MarketError::Payment {
                reason: "confirmation does not settle this offer".to_string(),
            });
        }

        // Close the listing first: if it was canceled while the offer sat
        // accepted, the buyer gets a clean error and the offer is untouched.
        self.listing_lifecycle.finalize(&offer.listing_id).await?;

        let completed = self
            .offers
            .swap_offer_status(offer_id, OfferStatus::Accepted, OfferStatus::Completed)
            .await?;
        info!(offer = %offer_id, listing = %offer.listing_id, "offer completed");
        Ok(completed)
    }

    /// Fetch one offer
    pub async fn get(&self, offer_id: &OfferId) -> Result<Offer> {
        self.offers.get_offer(offer_id).await
    }

    /// Offers awaiting the given listing's seller
    pub async fn for_listing(&self, listing_id: &ListingId) -> Result<Vec<Offer>> {
        self.offers.offers_for_listing(listing_id).await
    }

    /// A buyer's own offers
    pub async fn for_buyer(&self, buyer_id: &UserId) -> Result<Vec<Offer>> {
        self.offers.offers_for_buyer(buyer_id).await
    }
}
