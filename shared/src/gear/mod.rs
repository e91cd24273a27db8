pub mod handle;

use serde::{Deserialize, Serialize};

/// A lendable equipment unit type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct GearItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub total_quantity: i64,
    pub available_quantity: i64,
}

/// State of a gear request.
///
/// `pending -> approved -> returned`, or `pending -> rejected`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum GearRequestStatus {
    Pending,
    Approved,
    Rejected,
    Returned,
}

crate::str_enum!(GearRequestStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Returned => "returned",
});

/// One member's claim against a gear item.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct GearRequest {
    pub id: i64,
    pub user_id: String,
    pub gear_id: i64,
    pub status: GearRequestStatus,
    /// RFC 3339.
    pub request_date: String,
    pub return_date: Option<String>,
}
