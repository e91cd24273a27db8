pub mod handle;

use serde::{Deserialize, Serialize};

use crate::membership::{MembershipRow, MembershipStatus};

/// Privilege level of an account.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Member,
    /// Can manage members, sessions, gear and elections.
    Committee,
}

crate::str_enum!(Role {
    Member => "member",
    Committee => "committee",
});

/// Named committee positions.
///
/// A committee member can hold any number of these at once.
/// Declaration order is the precedence used to derive a single
/// "primary" role for older readers.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CommitteeRole {
    President,
    VicePresident,
    Treasurer,
    Secretary,
    /// Looks after the lendable equipment.
    KitSecretary,
    SocialSecretary,
    CompetitionsSecretary,
    WelfareOfficer,
    Webmaster,
}

crate::str_enum!(CommitteeRole {
    President => "president",
    VicePresident => "vice_president",
    Treasurer => "treasurer",
    Secretary => "secretary",
    KitSecretary => "kit_secretary",
    SocialSecretary => "social_secretary",
    CompetitionsSecretary => "competitions_secretary",
    WelfareOfficer => "welfare_officer",
    Webmaster => "webmaster",
});

/// An account as seen through the API. The password hash never leaves the backend.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub committee_roles: Vec<CommitteeRole>,
    pub membership_status: MembershipStatus,
    /// Academic year of the top-level status, ex. `2026/2027`.
    pub membership_year: String,
    pub memberships: Vec<MembershipRow>,
}

impl UserView {
    /// The single committee role older views display.
    pub fn primary_committee_role(&self) -> Option<CommitteeRole> {
        self.committee_roles.iter().min().copied()
    }
}
