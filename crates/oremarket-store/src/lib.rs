//! Oremarket Persistence Layer
//!
//! Repository traits for users, listings, offers and transactions, plus the
//! bundled in-memory store. The wire/storage engine behind a production
//! implementation is out of scope here; what matters to the domain is the
//! contract:
//!
//! - `get`/`put`/`delete` by id per entity
//! - an atomic conditional update (`swap_*_status`) that compares the
//!   current status before writing, so lifecycle components can close
//!   check-then-act races without a separate lock
//!
//! # Repository Pattern
//!
//! Each domain entity has its own trait; `MarketStore` bundles them for
//! components that need more than one.

pub mod memory;

use async_trait::async_trait;

use oremarket_types::{
    Listing, ListingId, ListingStatus, Offer, OfferId, OfferStatus, Result, Transaction, User,
    UserId,
};

pub use memory::MemoryStore;

/// Repository for marketplace users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a user; `NotFound` if unknown
    async fn get_user(&self, id: &UserId) -> Result<User>;

    /// Insert or replace a user, returning the stored snapshot
    async fn put_user(&self, user: User) -> Result<User>;

    /// All registered users
    async fn list_users(&self) -> Result<Vec<User>>;
}

/// Repository for mineral listings
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Fetch a listing; `NotFound` if unknown
    async fn get_listing(&self, id: &ListingId) -> Result<Listing>;

    /// Insert or replace a listing, returning the stored snapshot
    async fn put_listing(&self, listing: Listing) -> Result<Listing>;

    /// Hard-delete a listing; `NotFound` if unknown
    async fn delete_listing(&self, id: &ListingId) -> Result<()>;

    /// All listings
    async fn list_listings(&self) -> Result<Vec<Listing>>;

    /// Replace the full row iff the stored status equals `expected`.
    ///
    /// Closes the read-modify-write window for field edits: a listing
    /// whose status moved since the caller's read is left untouched and
    /// the call fails with `InvalidTransition` carrying the status
    /// actually observed.
    async fn put_listing_if_status(
        &self,
        listing: Listing,
        expected: ListingStatus,
    ) -> Result<Listing>;

    /// Atomically set `next` iff the current status equals `expected`,
    /// touching nothing but the status and `updated_at`.
    ///
    /// Returns the updated listing, or `InvalidTransition` carrying the
    /// status actually observed. Callers decide whether a mismatch is a
    /// state-machine violation or a lost race.
    async fn swap_listing_status(
        &self,
        id: &ListingId,
        expected: ListingStatus,
        next: ListingStatus,
    ) -> Result<Listing>;
}

/// Repository for purchase offers
#[async_trait]
pub trait OfferStore: Send + Sync {
    /// Fetch an offer; `NotFound` if unknown
    async fn get_offer(&self, id: &OfferId) -> Result<Offer>;

    /// Insert or replace an offer, returning the stored snapshot
    async fn put_offer(&self, offer: Offer) -> Result<Offer>;

    /// All offers referencing the given listing
    async fn offers_for_listing(&self, listing_id: &ListingId) -> Result<Vec<Offer>>;

    /// All offers submitted by the given buyer
    async fn offers_for_buyer(&self, buyer_id: &UserId) -> Result<Vec<Offer>>;

    /// Atomically set `next` iff the current status equals `expected`.
    ///
    /// Same contract as [`ListingStore::swap_listing_status`].
    async fn swap_offer_status(
        &self,
        id: &OfferId,
        expected: OfferStatus,
        next: OfferStatus,
    ) -> Result<Offer>;
}

/// Repository for settled transactions
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Append a transaction record, returning the stored snapshot
    async fn put_transaction(&self, transaction: Transaction) -> Result<Transaction>;

    /// All transactions where the user is buyer or seller
    async fn transactions_for_user(&self, user_id: &UserId) -> Result<Vec<Transaction>>;
}

/// Everything the orchestration layer needs from persistence
pub trait MarketStore: UserStore + ListingStore + OfferStore + TransactionStore {}

impl<T: UserStore + ListingStore + OfferStore + TransactionStore> MarketStore for T {}
