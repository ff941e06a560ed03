//! Oremarket Compliance Registry
//!
//! Single source of truth for "is this user allowed to transact".
//!
//! Buyers and miners carry a compliance status (`pending` at registration)
//! and may only mutate marketplace state once an admin has set them
//! `compliant`. Admins pass the gate implicitly but cannot change their own
//! status through [`ComplianceRegistry::set_status`].
//!
//! Every state-mutating marketplace action funnels through
//! [`ComplianceRegistry::require_compliant`]; there is deliberately no
//! second copy of this rule anywhere else.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use oremarket_store::UserStore;
use oremarket_types::{
    ComplianceStatus, MarketError, NewUser, Result, Role, User, UserId,
};

/// Tracks each user's compliance status and exposes the gating checks
#[derive(Clone)]
pub struct ComplianceRegistry {
    users: Arc<dyn UserStore>,
}

impl ComplianceRegistry {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Register a new buyer or miner.
    ///
    /// New users always start `pending`; admin accounts are provisioned
    /// out of band, not through registration.
    pub async fn register(&self, new_user: NewUser) -> Result<User> {
        if new_user.role == Role::Admin {
            return Err(MarketError::validation(
                "role",
                "admin accounts cannot be self-registered",
            ));
        }
        if new_user.first_name.trim().is_empty() || new_user.last_name.trim().is_empty() {
            return Err(MarketError::validation("name", "must not be empty"));
        }
        if !new_user.email.contains('@') {
            return Err(MarketError::validation("email", "not a valid address"));
        }

        let user = User {
            id: UserId::new(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            role: new_user.role,
            compliance_status: ComplianceStatus::Pending,
            email_verified: false,
            company_name: new_user.company_name,
            phone_number: None,
            location: new_user.location,
            member_since: Utc::now(),
        };

        info!(user = %user.id, role = %user.role, "registered user");
        self.users.put_user(user).await
    }

    /// Current compliance status of a user
    pub async fn get_status(&self, user_id: &UserId) -> Result<ComplianceStatus> {
        Ok(self.users.get_user(user_id).await?.compliance_status)
    }

    /// Admin-initiated status change.
    ///
    /// Admins cannot self-approve: changing your own status fails with
    /// `InvalidOperation` no matter the target value.
    pub async fn set_status(
        &self,
        admin_id: &UserId,
        target_user_id: &UserId,
        new_status: ComplianceStatus,
    ) -> Result<User> {
        let actor = self.users.get_user(admin_id).await?;
        if actor.role != Role::Admin {
            return Err(MarketError::forbidden(
                "set_compliance_status",
                format!("requires the admin role, actor is {}", actor.role),
            ));
        }
        if target_user_id == admin_id {
            return Err(MarketError::InvalidOperation {
                reason: "admins cannot change their own compliance status".to_string(),
            });
        }

        let mut target = self.users.get_user(target_user_id).await?;
        let previous = target.compliance_status;
        target.compliance_status = new_status;
        let updated = self.users.put_user(target).await?;

        info!(
            admin = %admin_id,
            user = %target_user_id,
            from = %previous,
            to = %new_status,
            "compliance status changed"
        );
        Ok(updated)
    }

    /// Guard used before any state-mutating marketplace action.
    ///
    /// Admin role always passes. For buyers and miners the current status
    /// must be `compliant`; anything else fails with a `Compliance` error
    /// carrying the action name and the status observed.
    pub async fn require_compliant(&self, user_id: &UserId, action: &'static str) -> Result<()> {
        let user = self.users.get_user(user_id).await?;
        if user.is_admin() {
            return Ok(());
        }
        if user.compliance_status != ComplianceStatus::Compliant {
            warn!(user = %user_id, action, status = %user.compliance_status, "compliance gate blocked action");
            return Err(MarketError::Compliance {
                action,
                status: user.compliance_status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oremarket_store::MemoryStore;

    fn new_user(role: Role) -> NewUser {
        NewUser {
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            email: "ada@example.com".to_string(),
            role,
            company_name: None,
            location: None,
        }
    }

    async fn seed_admin(store: &MemoryStore) -> User {
        store
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
            .unwrap()
    }

    #[tokio::test]
    async fn test_registration_starts_pending() {
        let store = Arc::new(MemoryStore::new());
        let registry = ComplianceRegistry::new(store);

        let user = registry.register(new_user(Role::Buyer)).await.unwrap();
        assert_eq!(user.compliance_status, ComplianceStatus::Pending);
        assert_eq!(
            registry.get_status(&user.id).await.unwrap(),
            ComplianceStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_admin_registration_rejected() {
        let store = Arc::new(MemoryStore::new());
        let registry = ComplianceRegistry::new(store);

        let err = registry.register(new_user(Role::Admin)).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_set_status_requires_admin() {
        let store = Arc::new(MemoryStore::new());
        let registry = ComplianceRegistry::new(store.clone());

        let buyer = registry.register(new_user(Role::Buyer)).await.unwrap();
        let miner = registry.register(new_user(Role::Miner)).await.unwrap();

        let err = registry
            .set_status(&buyer.id, &miner.id, ComplianceStatus::Compliant)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_admin_cannot_self_approve() {
        let store = Arc::new(MemoryStore::new());
        let admin = seed_admin(&store).await;
        let registry = ComplianceRegistry::new(store);

        let err = registry
            .set_status(&admin.id, &admin.id, ComplianceStatus::Compliant)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidOperation { .. }));
    }

    #[tokio::test]
    async fn test_gate_carries_action_and_status() {
        let store = Arc::new(MemoryStore::new());
        let registry = ComplianceRegistry::new(store);

        let buyer = registry.register(new_user(Role::Buyer)).await.unwrap();
        let err = registry
            .require_compliant(&buyer.id, "submit_offer")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            MarketError::Compliance {
                action: "submit_offer",
                status: ComplianceStatus::Pending,
            }
        );
    }

    #[tokio::test]
    async fn test_gate_opens_after_admin_approval() {
        let store = Arc::new(MemoryStore::new());
        let admin = seed_admin(&store).await;
        let registry = ComplianceRegistry::new(store);

        let buyer = registry.register(new_user(Role::Buyer)).await.unwrap();
        assert!(registry
            .require_compliant(&buyer.id, "submit_offer")
            .await
            .is_err());

        registry
            .set_status(&admin.id, &buyer.id, ComplianceStatus::Compliant)
            .await
            .unwrap();
        assert!(registry
            .require_compliant(&buyer.id, "submit_offer")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_admin_passes_gate_regardless_of_status() {
        let store = Arc::new(MemoryStore::new());
        let admin = seed_admin(&store).await;
        let registry = ComplianceRegistry::new(store);

        assert!(registry
            .require_compliant(&admin.id, "create_listing")
            .await
            .is_ok());
    }
}
