use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionDescriptor {
    #[serde(rename = "type")]
    pub session_type: String,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub capacity: i64,
    /// Defaults to `basic`.
    #[serde(default)]
    pub required_membership: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateSessionDescriptor {
    pub id: i64,
    #[serde(flatten)]
    pub session: SessionDescriptor,
    /// Overrides the booked slot counter as entered by the editor.
    #[serde(default)]
    pub booked_slots: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionTargetDescriptor {
    pub session_id: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateSessionResult {
    pub id: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MyBookingsResult {
    pub session_ids: Vec<i64>,
}
