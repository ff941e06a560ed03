//! Oremarket Market - Listing and offer lifecycles
//!
//! This crate owns the two state machines at the heart of the marketplace:
//!
//! - [`ListingLifecycle`]: `available → pending → sold`, with cancellation
//! - [`OfferLifecycle`]: `pending → accepted → completed`, with rejection
//!   and expiry
//!
//! # Key Principle
//!
//! At most one offer per listing may ever be concurrently `accepted`. The
//! invariant is enforced by making listing reservation the gating side
//! effect of acceptance (an atomic status swap in the store), not a
//! separately checked precondition. Two racing accepts on one listing:
//! exactly one reservation wins, the loser surfaces `Conflict` and its
//! offer stays `pending`.

pub mod listing;
pub mod offer;
pub mod payment;

pub use listing::ListingLifecycle;
pub use offer::OfferLifecycle;
pub use payment::{PaymentConfirmation, PaymentGateway, StaticGateway};
