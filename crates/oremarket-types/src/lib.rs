//! Oremarket Types - Canonical domain types for the mineral marketplace
//!
//! This crate contains all foundational types for Oremarket with zero
//! dependencies on other oremarket crates. It defines:
//!
//! - Identity types (UserId, ListingId, OfferId, etc.)
//! - Users, roles and compliance status
//! - Listings and offers with their status state machines
//! - Transaction records for settled purchases
//! - The error taxonomy shared by every layer
//!
//! # Core Invariants
//!
//! The types encode the marketplace's structural rules:
//!
//! 1. Buyers and miners are compliance-gated; admins are exempt
//! 2. Listing and offer statuses only move along their transition tables
//! 3. An offer's currency is always the listing's currency
//! 4. `Sold`, `Canceled`, `Rejected`, `Expired` and `Completed` are terminal

pub mod currency;
pub mod error;
pub mod identity;
pub mod listing;
pub mod offer;
pub mod transaction;
pub mod user;

pub use currency::*;
pub use error::*;
pub use identity::*;
pub use listing::*;
pub use offer::*;
pub use transaction::*;
pub use user::*;
