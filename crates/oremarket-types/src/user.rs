//! Users, roles and compliance status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::UserId;

/// Marketplace role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Submits purchase offers
    Buyer,
    /// Lists minerals for sale
    Miner,
    /// Gates participation and oversees listings
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Miner => "miner",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Regulatory/KYC-style flag gating marketplace participation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// Awaiting review; may not transact
    Pending,
    /// Cleared to transact
    Compliant,
    /// Failed review; may not transact
    NonCompliant,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Compliant => "compliant",
            Self::NonCompliant => "non_compliant",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered marketplace participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub compliance_status: ComplianceStatus,
    pub email_verified: bool,
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub member_since: DateTime<Utc>,
}

impl User {
    /// Full display name
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this user passes the compliance gate.
    ///
    /// Admins always pass; buyers and miners must be `Compliant`.
    pub fn may_transact(&self) -> bool {
        self.is_admin() || self.compliance_status == ComplianceStatus::Compliant
    }
}

/// Registration input for a new buyer or miner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub company_name: Option<String>,
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, status: ComplianceStatus) -> User {
        User {
            id: UserId::new(),
            first_name: "Thandi".to_string(),
            last_name: "Nkosi".to_string(),
            email: "thandi@example.com".to_string(),
            role,
            compliance_status: status,
            email_verified: true,
            company_name: None,
            phone_number: None,
            location: None,
            member_since: Utc::now(),
        }
    }

    #[test]
    fn test_admin_always_may_transact() {
        assert!(user(Role::Admin, ComplianceStatus::Pending).may_transact());
        assert!(user(Role::Admin, ComplianceStatus::NonCompliant).may_transact());
    }

    #[test]
    fn test_gated_roles_require_compliant() {
        assert!(user(Role::Buyer, ComplianceStatus::Compliant).may_transact());
        assert!(!user(Role::Buyer, ComplianceStatus::Pending).may_transact());
        assert!(!user(Role::Miner, ComplianceStatus::NonCompliant).may_transact());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ComplianceStatus::NonCompliant).unwrap();
        assert_eq!(json, "\"non_compliant\"");
    }
}
