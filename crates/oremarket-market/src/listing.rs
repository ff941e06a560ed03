//! Listing lifecycle
//!
//! Owns listing state transitions and the authorization rules around them.
//! A listing is mutable only by its seller or an admin; miners must pass
//! the compliance gate before listing.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use oremarket_compliance::ComplianceRegistry;
use oremarket_store::{ListingStore, OfferStore, UserStore};
use oremarket_types::{
    Listing, ListingDraft, ListingId, ListingPatch, ListingStatus, MarketError, Result, Role,
    User, UserId,
};

/// Owns listing state transitions and authorization rules
#[derive(Clone)]
pub struct ListingLifecycle {
    users: Arc<dyn UserStore>,
    listings: Arc<dyn ListingStore>,
    offers: Arc<dyn OfferStore>,
    compliance: ComplianceRegistry,
}

fn require_positive(field: &'static str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(MarketError::validation(field, "must be positive"));
    }
    Ok(())
}

fn authorize_seller_or_admin(actor: &User, listing: &Listing, action: &'static str) -> Result<()> {
    if actor.id != listing.seller_id && !actor.is_admin() {
        return Err(MarketError::forbidden(
            action,
            "only the listing's seller or an admin may do this",
        ));
    }
    Ok(())
}

impl ListingLifecycle {
    pub fn new(
        users: Arc<dyn UserStore>,
        listings: Arc<dyn ListingStore>,
        offers: Arc<dyn OfferStore>,
        compliance: ComplianceRegistry,
    ) -> Self {
        Self {
            users,
            listings,
            offers,
            compliance,
        }
    }

    /// Create a listing with initial status `available`.
    ///
    /// Miners must be compliant; admins are exempt; buyers cannot sell.
    pub async fn create(&self, seller_id: &UserId, draft: ListingDraft) -> Result<Listing> {
        let seller = self.users.get_user(seller_id).await?;
        match seller.role {
            Role::Buyer => {
                return Err(MarketError::forbidden(
                    "create_listing",
                    "buyers cannot create listings",
                ))
            }
            Role::Miner => {
                self.compliance
                    .require_compliant(seller_id, "create_listing")
                    .await?
            }
            Role::Admin => {}
        }

        require_positive("quantity", draft.quantity)?;
        require_positive("price_per_unit", draft.price_per_unit)?;
        if draft.mineral_type.trim().is_empty() {
            return Err(MarketError::validation("mineral_type", "must not be empty"));
        }

        let now = Utc::now();
        let listing = Listing {
            id: ListingId::new(),
            seller_id: *seller_id,
            mineral_type: draft.mineral_type,
            description: draft.description,
            quantity: draft.quantity,
            unit: draft.unit,
            price_per_unit: draft.price_per_unit,
            currency: draft.currency,
            location: draft.location,
            status: ListingStatus::Available,
            listed_at: now,
            updated_at: now,
        };

        info!(listing = %listing.id, seller = %seller_id, mineral = %listing.mineral_type, "listing created");
        self.listings.put_listing(listing).await
    }

    /// Update a listing's fields.
    ///
    /// A status override in the patch must be a legally reachable state.
    /// The write is conditional on the status we read, so a racing
    /// transition surfaces as `InvalidTransition` rather than being
    /// clobbered.
    pub async fn update(
        &self,
        actor_id: &UserId,
        listing_id: &ListingId,
        patch: ListingPatch,
    ) -> Result<Listing> {
        let actor = self.users.get_user(actor_id).await?;
        let current = self.listings.get_listing(listing_id).await?;
        authorize_seller_or_admin(&actor, &current, "update_listing")?;

        let mut listing = current.clone();
        if let Some(mineral_type) = patch.mineral_type {
            if mineral_type.trim().is_empty() {
                return Err(MarketError::validation("mineral_type", "must not be empty"));
            }
            listing.mineral_type = mineral_type;
        }
        if let Some(description) = patch.description {
            listing.description = description;
        }
        if let Some(quantity) = patch.quantity {
            require_positive("quantity", quantity)?;
            listing.quantity = quantity;
        }
        if let Some(unit) = patch.unit {
            listing.unit = unit;
        }
        if let Some(price) = patch.price_per_unit {
            require_positive("price_per_unit", price)?;
            listing.price_per_unit = price;
        }
        if let Some(location) = patch.location {
            listing.location = location;
        }

        if let Some(next) = patch.status {
            if next != current.status {
                if !current.status.can_transition_to(next) {
                    return Err(MarketError::invalid_transition(
                        "listing",
                        current.status,
                        next,
                    ));
                }
                listing.status = next;
                info!(listing = %listing_id, from = %current.status, to = %next, "listing status overridden");
            }
        }

        listing.updated_at = Utc::now();
        self.listings
            .put_listing_if_status(listing, current.status)
            .await
    }

    /// Hard-delete a listing.
    ///
    /// Refuses with `Conflict` while any offer on the listing is still
    /// `pending`, so an in-flight negotiation is never orphaned.
    pub async fn delete(&self, actor_id: &UserId, listing_id: &ListingId) -> Result<()> {
        let actor = self.users.get_user(actor_id).await?;
        let listing = self.listings.get_listing(listing_id).await?;
        authorize_seller_or_admin(&actor, &listing, "delete_listing")?;

        let outstanding = self
            .offers
            .offers_for_listing(listing_id)
            .await?
            .into_iter()
            .filter(|o| o.is_pending())
            .count();
        if outstanding > 0 {
            return Err(MarketError::conflict(
                "listing",
                format!("{outstanding} pending offer(s) outstanding, resolve them first"),
            ));
        }

        info!(listing = %listing_id, actor = %actor_id, "listing deleted");
        self.listings.delete_listing(listing_id).await
    }

    /// Reserve the listing for an accepted offer (`available → pending`).
    ///
    /// Called by the offer lifecycle on acceptance; the conditional swap is
    /// what makes double-accept impossible.
    pub(crate) async fn reserve(&self, listing_id: &ListingId) -> Result<Listing> {
        self.listings
            .swap_listing_status(listing_id, ListingStatus::Available, ListingStatus::Pending)
            .await
    }

    /// Release a reservation (`pending → available`)
    pub(crate) async fn release(&self, listing_id: &ListingId) -> Result<Listing> {
        self.listings
            .swap_listing_status(listing_id, ListingStatus::Pending, ListingStatus::Available)
            .await
    }

    /// Close out a sold listing (`pending → sold`)
    pub(crate) async fn finalize(&self, listing_id: &ListingId) -> Result<Listing> {
        self.listings
            .swap_listing_status(listing_id, ListingStatus::Pending, ListingStatus::Sold)
            .await
    }

    /// Fetch one listing
    pub async fn get(&self, listing_id: &ListingId) -> Result<Listing> {
        self.listings.get_listing(listing_id).await
    }

    /// Every listing, regardless of status (admin oversight)
    pub async fn all(&self) -> Result<Vec<Listing>> {
        self.listings.list_listings().await
    }

    /// Listings currently open for offers
    pub async fn available(&self) -> Result<Vec<Listing>> {
        Ok(self
            .listings
            .list_listings()
            .await?
            .into_iter()
            .filter(Listing::is_available)
            .collect())
    }

    /// A seller's own listings
    pub async fn for_seller(&self, seller_id: &UserId) -> Result<Vec<Listing>> {
        Ok(self
            .listings
            .list_listings()
            .await?
            .into_iter()
            .filter(|l| &l.seller_id == seller_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use oremarket_store::MemoryStore;
    use oremarket_types::{ComplianceStatus, Currency, NewUser};
    use rust_decimal_macros::dec;

    struct Fixture {
        lifecycle: ListingLifecycle,
        registry: ComplianceRegistry,
        admin: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let registry = ComplianceRegistry::new(store.clone());
        let lifecycle = ListingLifecycle::new(
            store.clone(),
            store.clone(),
            store.clone(),
            registry.clone(),
        );
        let admin = store
            .put_user(User {
                id: UserId::new(),
                first_name: "Root".to_string(),
                last_name: "Admin".to_string(),
                email: "admin@example.com".to_string(),
                role: Role::Admin,
                compliance_status: ComplianceStatus::Pending,
                email_verified: true,
                company_name: None,
                phone_number: None,
                location: None,
                member_since: Utc::now(),
            })
            .await
            .unwrap();
        Fixture {
            lifecycle,
            registry,
            admin,
        }
    }

    async fn compliant_miner(fx: &Fixture) -> User {
        let miner = fx
            .registry
            .register(NewUser {
                first_name: "Kefilwe".to_string(),
                last_name: "Dube".to_string(),
                email: "kefilwe@example.com".to_string(),
                role: Role::Miner,
                company_name: Some("Dube Mining".to_string()),
                location: Some("Gaborone".to_string()),
            })
            .await
            .unwrap();
        fx.registry
            .set_status(&fx.admin.id, &miner.id, ComplianceStatus::Compliant)
            .await
            .unwrap()
    }

    fn draft() -> ListingDraft {
        ListingDraft {
            mineral_type: "cobalt".to_string(),
            description: "Battery-grade hydroxide".to_string(),
            quantity: dec!(500),
            unit: "t".to_string(),
            price_per_unit: dec!(10),
            currency: Currency::USD,
            location: "Kolwezi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_requires_compliance_for_miner() {
        let fx = fixture().await;
        let miner = fx
            .registry
            .register(NewUser {
                first_name: "Sipho".to_string(),
                last_name: "M".to_string(),
                email: "sipho@example.com".to_string(),
                role: Role::Miner,
                company_name: None,
                location: None,
            })
            .await
            .unwrap();

        let err = fx.lifecycle.create(&miner.id, draft()).await.unwrap_err();
        assert_eq!(
            err,
            MarketError::Compliance {
                action: "create_listing",
                status: ComplianceStatus::Pending,
            }
        );
    }

    #[tokio::test]
    async fn test_admin_creates_without_compliance() {
        let fx = fixture().await;
        let listing = fx.lifecycle.create(&fx.admin.id, draft()).await.unwrap();
        assert_eq!(listing.status, ListingStatus::Available);
    }

    #[tokio::test]
    async fn test_create_rejects_nonpositive_numbers() {
        let fx = fixture().await;
        let miner = compliant_miner(&fx).await;

        let mut bad = draft();
        bad.quantity = dec!(0);
        let err = fx.lifecycle.create(&miner.id, bad).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let mut bad = draft();
        bad.price_per_unit = dec!(-1);
        let err = fx.lifecycle.create(&miner.id, bad).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_changes_price() {
        let fx = fixture().await;
        let miner = compliant_miner(&fx).await;
        let listing = fx.lifecycle.create(&miner.id, draft()).await.unwrap();

        let updated = fx
            .lifecycle
            .update(
                &miner.id,
                &listing.id,
                ListingPatch {
                    price_per_unit: Some(dec!(12.50)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, listing.id);
        assert_eq!(updated.seller_id, listing.seller_id);
        assert_eq!(updated.price_per_unit, dec!(12.50));
    }

    #[tokio::test]
    async fn test_update_by_stranger_is_forbidden() {
        let fx = fixture().await;
        let miner = compliant_miner(&fx).await;
        let listing = fx.lifecycle.create(&miner.id, draft()).await.unwrap();

        let stranger = fx
            .registry
            .register(NewUser {
                first_name: "Nosy".to_string(),
                last_name: "Neighbor".to_string(),
                email: "nosy@example.com".to_string(),
                role: Role::Miner,
                company_name: None,
                location: None,
            })
            .await
            .unwrap();

        let err = fx
            .lifecycle
            .update(
                &stranger.id,
                &listing.id,
                ListingPatch {
                    description: Some("mine now".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_status_override_must_be_reachable() {
        let fx = fixture().await;
        let miner = compliant_miner(&fx).await;
        let listing = fx.lifecycle.create(&miner.id, draft()).await.unwrap();

        // available -> sold skips the pending reservation
        let err = fx
            .lifecycle
            .update(
                &miner.id,
                &listing.id,
                ListingPatch {
                    status: Some(ListingStatus::Sold),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidTransition { .. }));

        // available -> canceled is legal
        let canceled = fx
            .lifecycle
            .update(
                &miner.id,
                &listing.id,
                ListingPatch {
                    status: Some(ListingStatus::Canceled),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(canceled.status, ListingStatus::Canceled);
    }

    #[tokio::test]
    async fn test_reserve_release_finalize_chain() {
        let fx = fixture().await;
        let miner = compliant_miner(&fx).await;
        let listing = fx.lifecycle.create(&miner.id, draft()).await.unwrap();

        let reserved = fx.lifecycle.reserve(&listing.id).await.unwrap();
        assert_eq!(reserved.status, ListingStatus::Pending);

        // A second reservation loses
        assert!(fx.lifecycle.reserve(&listing.id).await.is_err());

        let released = fx.lifecycle.release(&listing.id).await.unwrap();
        assert_eq!(released.status, ListingStatus::Available);

        fx.lifecycle.reserve(&listing.id).await.unwrap();
        let sold = fx.lifecycle.finalize(&listing.id).await.unwrap();
        assert_eq!(sold.status, ListingStatus::Sold);
    }
}
