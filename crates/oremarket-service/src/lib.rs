//! Oremarket Service - Marketplace orchestration
//!
//! [`MarketplaceService`] wraps the compliance registry and the two
//! lifecycle components into the exact use cases a client needs: register,
//! gate, list, offer, decide, settle. It is pure composition; every rule
//! lives in the component that owns it, and errors pass through untouched
//! apart from tracing context.
//!
//! Reads reflect the latest committed state of all stores within one call
//! (read-your-writes), and every mutation returns the authoritative
//! post-mutation entity so callers never need a second round trip.

pub mod config;
pub mod views;

use std::sync::Arc;

use tracing::{error, info};

use oremarket_compliance::ComplianceRegistry;
use oremarket_market::{ListingLifecycle, OfferLifecycle, PaymentGateway};
use oremarket_store::{MarketStore, TransactionStore, UserStore};
use oremarket_types::{
    ComplianceStatus, Listing, ListingDraft, ListingId, ListingPatch, MarketError, NewUser, Offer,
    OfferId, OfferStatus, Result, Transaction, TransactionId, TransactionStatus, User, UserId,
};
use rust_decimal::Decimal;

pub use config::MarketConfig;
pub use views::{ListingView, OfferView, Settlement};

/// Facade over the marketplace components
#[derive(Clone)]
pub struct MarketplaceService {
    compliance: ComplianceRegistry,
    listings: ListingLifecycle,
    offers: OfferLifecycle,
    users: Arc<dyn UserStore>,
    transactions: Arc<dyn TransactionStore>,
    gateway: Arc<dyn PaymentGateway>,
    config: MarketConfig,
}

impl MarketplaceService {
    /// Wire the service over one store and one payment gateway
    pub fn new<S>(store: Arc<S>, gateway: Arc<dyn PaymentGateway>, config: MarketConfig) -> Self
    where
        S: MarketStore + 'static,
    {
        let users: Arc<dyn UserStore> = store.clone();
        let compliance = ComplianceRegistry::new(users.clone());
        let listings = ListingLifecycle::new(
            store.clone(),
            store.clone(),
            store.clone(),
            compliance.clone(),
        );
        let offers = OfferLifecycle::new(
            store.clone(),
            store.clone(),
            store.clone(),
            compliance.clone(),
            listings.clone(),
            config.offer_ttl,
        );
        Self {
            compliance,
            listings,
            offers,
            users,
            transactions: store,
            gateway,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Users & compliance
    // ------------------------------------------------------------------

    /// Register a new buyer or miner (compliance starts `pending`)
    pub async fn register_user(&self, new_user: NewUser) -> Result<User> {
        self.compliance.register(new_user).await
    }

    /// Admin-initiated compliance status change
    pub async fn set_compliance_status(
        &self,
        admin_id: &UserId,
        target_user_id: &UserId,
        new_status: ComplianceStatus,
    ) -> Result<User> {
        self.compliance
            .set_status(admin_id, target_user_id, new_status)
            .await
    }

    /// Current compliance status for a user
    pub async fn compliance_status(&self, user_id: &UserId) -> Result<ComplianceStatus> {
        self.compliance.get_status(user_id).await
    }

    /// All registered users (admin oversight)
    pub async fn list_users(&self, actor_id: &UserId) -> Result<Vec<User>> {
        self.require_admin(actor_id, "list_users").await?;
        self.users.list_users().await
    }

    // ------------------------------------------------------------------
    // Listings
    // ------------------------------------------------------------------

    pub async fn create_listing(&self, seller_id: &UserId, draft: ListingDraft) -> Result<Listing> {
        self.listings.create(seller_id, draft).await
    }

    pub async fn update_listing(
        &self,
        actor_id: &UserId,
        listing_id: &ListingId,
        patch: ListingPatch,
    ) -> Result<Listing> {
        self.listings.update(actor_id, listing_id, patch).await
    }

    pub async fn delete_listing(&self, actor_id: &UserId, listing_id: &ListingId) -> Result<()> {
        self.listings.delete(actor_id, listing_id).await
    }

    pub async fn get_listing(&self, listing_id: &ListingId) -> Result<Listing> {
        self.listings.get(listing_id).await
    }

    /// Available listings joined with seller display fields
    pub async fn browse_listings(&self) -> Result<Vec<ListingView>> {
        let mut views = Vec::new();
        for listing in self.listings.available().await? {
            let seller = self.users.get_user(&listing.seller_id).await?;
            views.push(ListingView::join(listing, &seller));
        }
        Ok(views)
    }

    /// A seller's own listings
    pub async fn my_listings(&self, seller_id: &UserId) -> Result<Vec<Listing>> {
        self.listings.for_seller(seller_id).await
    }

    /// Every listing regardless of status (admin oversight)
    pub async fn all_listings(&self, actor_id: &UserId) -> Result<Vec<Listing>> {
        self.require_admin(actor_id, "all_listings").await?;
        self.listings.all().await
    }

    // ------------------------------------------------------------------
    // Offers
    // ------------------------------------------------------------------

    pub async fn submit_offer(
        &self,
        buyer_id: &UserId,
        listing_id: &ListingId,
        offer_price: Decimal,
        offer_quantity: Decimal,
        message: Option<String>,
    ) -> Result<Offer> {
        self.offers
            .submit(buyer_id, listing_id, offer_price, offer_quantity, message)
            .await
    }

    pub async fn accept_offer(&self, actor_id: &UserId, offer_id: &OfferId) -> Result<Offer> {
        self.offers.accept(actor_id, offer_id).await
    }

    pub async fn reject_offer(&self, actor_id: &UserId, offer_id: &OfferId) -> Result<Offer> {
        self.offers.reject(actor_id, offer_id).await
    }

    /// Called by the external timer for offers past their TTL
    pub async fn expire_offer(&self, offer_id: &OfferId) -> Result<Offer> {
        self.offers.expire(offer_id).await
    }

    pub async fn get_offer(&self, offer_id: &OfferId) -> Result<Offer> {
        self.offers.get(offer_id).await
    }

    /// A buyer's offers joined with listing display fields
    pub async fn my_offers(&self, buyer_id: &UserId) -> Result<Vec<OfferView>> {
        let buyer = self.users.get_user(buyer_id).await?;
        let mut views = Vec::new();
        for offer in self.offers.for_buyer(buyer_id).await? {
            let listing = self.listings.get(&offer.listing_id).await?;
            views.push(OfferView::join(offer, &buyer, &listing));
        }
        Ok(views)
    }

    /// Offers on a listing joined with buyer display fields
    pub async fn offers_for_listing(&self, listing_id: &ListingId) -> Result<Vec<OfferView>> {
        let listing = self.listings.get(listing_id).await?;
        let mut views = Vec::new();
        for offer in self.offers.for_listing(listing_id).await? {
            let buyer = self.users.get_user(&offer.buyer_id).await?;
            views.push(OfferView::join(offer, &buyer, &listing));
        }
        Ok(views)
    }

    // ------------------------------------------------------------------
    // Settlement
    // ------------------------------------------------------------------

    /// Drive the payment gateway for an accepted offer and settle it.
    ///
    /// The gateway call runs under the configured timeout; elapsing it
    /// surfaces as retryable `Unavailable`, never as success. On a
    /// confirmed payment the offer completes, the listing finalizes, and a
    /// transaction record is written; the caller gets all of it back as a
    /// [`Settlement`].
    pub async fn complete_offer(&self, buyer_id: &UserId, offer_id: &OfferId) -> Result<Settlement> {
        self.compliance
            .require_compliant(buyer_id, "complete_payment")
            .await?;

        // Pre-flight the same checks the lifecycle enforces, so an invalid
        // call never reaches the gateway.
        let offer = self.offers.get(offer_id).await?;
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

        let confirmation = tokio::time::timeout(
            self.config.payment_timeout,
            self.gateway
                .confirm_payment(offer_id, offer.total(), offer.currency),
        )
        .await
        .map_err(|_| {
            error!(offer = %offer_id, "payment gateway timed out");
            MarketError::Unavailable {
                operation: "payment_gateway",
            }
        })??;

        let completed = self.offers.complete(buyer_id, offer_id, &confirmation).await?;
        let listing = self.listings.get(&completed.listing_id).await?;

        let transaction = self
            .transactions
            .put_transaction(Transaction {
                id: TransactionId::new(),
                listing_id: completed.listing_id,
                buyer_id: completed.buyer_id,
                seller_id: listing.seller_id,
                offer_id: completed.id,
                final_price: completed.offer_price,
                final_quantity: completed.offer_quantity,
                currency: completed.currency,
                status: TransactionStatus::Completed,
                payment_ref: Some(confirmation.token.clone()),
                executed_at: confirmation.confirmed_at,
            })
            .await?;

        info!(
            offer = %offer_id,
            transaction = %transaction.id,
            total = %transaction.total(),
            "offer settled"
        );
        Ok(Settlement {
            offer: completed,
            transaction,
        })
    }

    /// Transactions where the user is buyer or seller
    pub async fn transactions_for_user(&self, user_id: &UserId) -> Result<Vec<Transaction>> {
        self.transactions.transactions_for_user(user_id).await
    }

    // ------------------------------------------------------------------

    async fn require_admin(&self, actor_id: &UserId, action: &'static str) -> Result<()> {
        let actor = self.users.get_user(actor_id).await?;
        if !actor.is_admin() {
            return Err(MarketError::forbidden(action, "requires the admin role"));
        }
        Ok(())
    }
}
