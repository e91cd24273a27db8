pub mod handle;

use serde::{Deserialize, Serialize};

/// A bookable scheduled event.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    #[serde(rename = "type")]
    pub session_type: String,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`, UTC.
    pub time: String,
    pub capacity: i64,
    pub booked_slots: i64,
    /// Membership type a member must hold to book.
    pub required_membership: String,
}

impl Session {
    #[inline]
    pub fn is_full(&self) -> bool {
        self.booked_slots >= self.capacity
    }
}
