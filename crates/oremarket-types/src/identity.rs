//! Identity types for Oremarket
//!
//! All identity types are strongly typed wrappers around UUIDs to prevent
//! accidental mixing of different ID types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from a string (with or without prefix)
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Get the inner UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }
    };
}

define_id_type!(UserId, "user", "Unique identifier for a marketplace user");
define_id_type!(ListingId, "listing", "Unique identifier for a mineral listing");
define_id_type!(OfferId, "offer", "Unique identifier for a purchase offer");
define_id_type!(TransactionId, "tx", "Unique identifier for a settled transaction");
define_id_type!(PaymentId, "pay", "Unique identifier for a payment confirmation");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_prefix() {
        let id = ListingId::new();
        assert!(id.to_string().starts_with("listing_"));
    }

    #[test]
    fn test_parse_accepts_both_forms() {
        let id = UserId::new();
        let bare = id.0.to_string();
        let prefixed = id.to_string();
        assert_eq!(UserId::parse(&bare).unwrap(), id);
        assert_eq!(UserId::parse(&prefixed).unwrap(), id);
    }

    #[test]
    fn test_ids_do_not_collide() {
        assert_ne!(OfferId::new(), OfferId::new());
    }
}
