use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApplyDescriptor {
    pub role: String,
    pub manifesto: String,
    #[serde(default)]
    pub presentation_link: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VoteDescriptor {
    pub candidate_id: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReferendumDescriptor {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// The choice is sent as text and validated by the backend.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReferendumVoteDescriptor {
    pub referendum_id: i64,
    pub choice: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct SetElectionsOpenDescriptor {
    pub open: bool,
}
