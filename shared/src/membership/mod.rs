pub mod handle;

use serde::{Deserialize, Serialize};

/// Approval state of a membership, either the per-type row or the
/// top-level summary on the account.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MembershipStatus {
    Pending,
    Active,
    Rejected,
}

crate::str_enum!(MembershipStatus {
    Pending => "pending",
    Active => "active",
    Rejected => "rejected",
});

impl MembershipStatus {
    /// Rank used when two writers race on the same membership row:
    /// `active` outranks `pending` outranks `rejected`.
    #[inline]
    pub fn priority(self) -> u8 {
        match self {
            MembershipStatus::Active => 2,
            MembershipStatus::Pending => 1,
            MembershipStatus::Rejected => 0,
        }
    }

    /// Whether a stored status should be replaced by `incoming`.
    #[inline]
    pub fn yields_to(self, incoming: Self) -> bool {
        self == MembershipStatus::Rejected || incoming.priority() > self.priority()
    }
}

/// One membership of one type for one academic year.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MembershipRow {
    pub id: i64,
    pub user_id: String,
    pub membership_type: String,
    pub status: MembershipStatus,
    pub membership_year: String,
}

/// An entry of a catalog, ex. membership types or session types.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CatalogEntry {
    pub id: String,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::MembershipStatus::*;

    #[test]
    fn priority_rule() {
        assert!(Pending.yields_to(Active));
        assert!(!Active.yields_to(Pending));
        assert!(!Pending.yields_to(Pending));
        assert!(Rejected.yields_to(Pending));
        assert!(Rejected.yields_to(Rejected));
        assert!(!Active.yields_to(Rejected));
    }
}
