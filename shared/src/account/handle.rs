use serde::{Deserialize, Serialize};

use super::Role;
use crate::membership::MembershipStatus;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterDescriptor {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterResult {
    pub account_id: String,
    pub role: Role,
    pub membership_status: MembershipStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginDescriptor {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResult {
    pub account_id: String,
    pub token: String,
    /// Unix timestamp in seconds, `None` if the token never expires.
    pub expire_at: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PasswordChange {
    pub old: String,
    pub new: String,
}

/// Self-service profile edit. Absent fields are left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AccountEditDescriptor {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub password: Option<PasswordChange>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccountDeleteDescriptor {
    pub password: String,
}

/// Manage accounts for committee members.
pub mod manage {
    use serde::{Deserialize, Serialize};

    use crate::account::CommitteeRole;

    /// Targets a single account.
    #[derive(Serialize, Deserialize, Debug, Clone)]
    pub struct AccountTargetDescriptor {
        pub account_id: String,
    }

    #[derive(Serialize, Deserialize, Debug, Clone)]
    pub struct SetCommitteeRolesDescriptor {
        pub account_id: String,
        pub roles: Vec<CommitteeRole>,
    }
}
