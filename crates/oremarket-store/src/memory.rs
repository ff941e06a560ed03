//! In-memory store
//!
//! A single `RwLock` guards all entity maps, so every read-modify-write,
//! including the conditional updates, is atomic with respect to other
//! store calls. Suitable for tests, the demo binary and single-process
//! deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use oremarket_types::{
    Listing, ListingId, ListingStatus, MarketError, Offer, OfferId, OfferStatus, Result,
    Transaction, TransactionId, User, UserId,
};

use crate::{ListingStore, OfferStore, TransactionStore, UserStore};

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    listings: HashMap<ListingId, Listing>,
    offers: HashMap<OfferId, Offer>,
    transactions: HashMap<TransactionId, Transaction>,
}

/// In-memory implementation of all store traits
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: &UserId) -> Result<User> {
        self.inner
            .read()
            .await
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| MarketError::not_found("user", id))
    }

    async fn put_user(&self, user: User) -> Result<User> {
        self.inner.write().await.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn get_listing(&self, id: &ListingId) -> Result<Listing> {
        self.inner
            .read()
            .await
            .listings
            .get(id)
            .cloned()
            .ok_or_else(|| MarketError::not_found("listing", id))
    }

    async fn put_listing(&self, listing: Listing) -> Result<Listing> {
        self.inner
            .write()
            .await
            .listings
            .insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn delete_listing(&self, id: &ListingId) -> Result<()> {
        self.inner
            .write()
            .await
            .listings
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MarketError::not_found("listing", id))
    }

    async fn list_listings(&self) -> Result<Vec<Listing>> {
        Ok(self.inner.read().await.listings.values().cloned().collect())
    }

    async fn put_listing_if_status(
        &self,
        listing: Listing,
        expected: ListingStatus,
    ) -> Result<Listing> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .listings
            .get_mut(&listing.id)
            .ok_or_else(|| MarketError::not_found("listing", listing.id))?;

        if stored.status != expected {
            return Err(MarketError::invalid_transition(
                "listing",
                stored.status,
                listing.status,
            ));
        }

        *stored = listing.clone();
        Ok(listing)
    }

    async fn swap_listing_status(
        &self,
        id: &ListingId,
        expected: ListingStatus,
        next: ListingStatus,
    ) -> Result<Listing> {
        let mut inner = self.inner.write().await;
        let listing = inner
            .listings
            .get_mut(id)
            .ok_or_else(|| MarketError::not_found("listing", id))?;

        if listing.status != expected {
            return Err(MarketError::invalid_transition(
                "listing",
                listing.status,
                next,
            ));
        }

        listing.status = next;
        listing.updated_at = Utc::now();
        debug!(listing = %id, from = %expected, to = %next, "listing status swapped");
        Ok(listing.clone())
    }
}

#[async_trait]
impl OfferStore for MemoryStore {
    async fn get_offer(&self, id: &OfferId) -> Result<Offer> {
        self.inner
            .read()
            .await
            .offers
            .get(id)
            .cloned()
            .ok_or_else(|| MarketError::not_found("offer", id))
    }

    async fn put_offer(&self, offer: Offer) -> Result<Offer> {
        self.inner.write().await.offers.insert(offer.id, offer.clone());
        Ok(offer)
    }

    async fn offers_for_listing(&self, listing_id: &ListingId) -> Result<Vec<Offer>> {
        Ok(self
            .inner
            .read()
            .await
            .offers
            .values()
            .filter(|o| &o.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn offers_for_buyer(&self, buyer_id: &UserId) -> Result<Vec<Offer>> {
        Ok(self
            .inner
            .read()
            .await
            .offers
            .values()
            .filter(|o| &o.buyer_id == buyer_id)
            .cloned()
            .collect())
    }

    async fn swap_offer_status(
        &self,
        id: &OfferId,
        expected: OfferStatus,
        next: OfferStatus,
    ) -> Result<Offer> {
        let mut inner = self.inner.write().await;
        let offer = inner
            .offers
            .get_mut(id)
            .ok_or_else(|| MarketError::not_found("offer", id))?;

        if offer.status != expected {
            return Err(MarketError::invalid_transition("offer", offer.status, next));
        }

        offer.status = next;
        offer.updated_at = Utc::now();
        debug!(offer = %id, from = %expected, to = %next, "offer status swapped");
        Ok(offer.clone())
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn put_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        self.inner
            .write()
            .await
            .transactions
            .insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn transactions_for_user(&self, user_id: &UserId) -> Result<Vec<Transaction>> {
        Ok(self
            .inner
            .read()
            .await
            .transactions
            .values()
            .filter(|t| t.involves(user_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use oremarket_types::Currency;
    use rust_decimal_macros::dec;

    fn test_listing(status: ListingStatus) -> Listing {
        Listing {
            id: ListingId::new(),
            seller_id: UserId::new(),
            mineral_type: "copper".to_string(),
            description: "Grade A cathodes".to_string(),
            quantity: dec!(500),
            unit: "t".to_string(),
            price_per_unit: dec!(10),
            currency: Currency::USD,
            location: "Ndola".to_string(),
            status,
            listed_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_swap_succeeds_on_expected_status() {
        let store = MemoryStore::new();
        let listing = store
            .put_listing(test_listing(ListingStatus::Available))
            .await
            .unwrap();

        let updated = store
            .swap_listing_status(&listing.id, ListingStatus::Available, ListingStatus::Pending)
            .await
            .unwrap();

        assert_eq!(updated.status, ListingStatus::Pending);
        assert!(updated.updated_at >= listing.updated_at);
    }

    #[tokio::test]
    async fn test_swap_rejects_stale_expectation() {
        let store = MemoryStore::new();
        let listing = store
            .put_listing(test_listing(ListingStatus::Pending))
            .await
            .unwrap();

        let err = store
            .swap_listing_status(&listing.id, ListingStatus::Available, ListingStatus::Pending)
            .await
            .unwrap_err();

        assert!(matches!(err, MarketError::InvalidTransition { .. }));
        // The failed swap left the listing untouched
        let unchanged = store.get_listing(&listing.id).await.unwrap();
        assert_eq!(unchanged.status, ListingStatus::Pending);
    }

    #[tokio::test]
    async fn test_conditional_put_guards_racing_transition() {
        let store = MemoryStore::new();
        let listing = store
            .put_listing(test_listing(ListingStatus::Available))
            .await
            .unwrap();

        // Someone reserves the listing between our read and our write
        store
            .swap_listing_status(&listing.id, ListingStatus::Available, ListingStatus::Pending)
            .await
            .unwrap();

        let mut edited = listing.clone();
        edited.description = "lower grade than advertised".to_string();
        let err = store
            .put_listing_if_status(edited, ListingStatus::Available)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidTransition { .. }));

        let stored = store.get_listing(&listing.id).await.unwrap();
        assert_eq!(stored.description, listing.description);
        assert_eq!(stored.status, ListingStatus::Pending);
    }

    #[tokio::test]
    async fn test_only_one_concurrent_swap_wins() {
        let store = MemoryStore::new();
        let listing = store
            .put_listing(test_listing(ListingStatus::Available))
            .await
            .unwrap();

        let a = store.swap_listing_status(&listing.id, ListingStatus::Available, ListingStatus::Pending);
        let b = store.swap_listing_status(&listing.id, ListingStatus::Available, ListingStatus::Pending);
        let (ra, rb) = tokio::join!(a, b);

        assert_eq!(ra.is_ok() as u8 + rb.is_ok() as u8, 1);
    }

    #[tokio::test]
    async fn test_offer_queries_filter_by_owner() {
        let store = MemoryStore::new();
        let listing_id = ListingId::new();
        let buyer = UserId::new();
        let other_buyer = UserId::new();

        for (b, l) in [(buyer, listing_id), (buyer, ListingId::new()), (other_buyer, listing_id)] {
            store
                .put_offer(Offer {
                    id: OfferId::new(),
                    listing_id: l,
                    buyer_id: b,
                    offer_price: dec!(9),
                    offer_quantity: dec!(10),
                    message: None,
                    status: OfferStatus::Pending,
                    currency: Currency::USD,
                    expires_at: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.offers_for_buyer(&buyer).await.unwrap().len(), 2);
        assert_eq!(store.offers_for_listing(&listing_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get_listing(&ListingId::new()).await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }
}
