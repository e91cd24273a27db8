pub mod handle;

use serde::{Deserialize, Serialize};

/// A referendum answer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Choice {
    Yes,
    No,
    Abstain,
}

crate::str_enum!(Choice {
    Yes => "yes",
    No => "no",
    Abstain => "abstain",
});

/// A declared candidacy together with its current tally.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Candidate {
    pub id: i64,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub manifesto: String,
    pub presentation_link: Option<String>,
    pub votes: i64,
}

/// A referendum with its tallies and the caller's own answer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Referendum {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub yes: i64,
    pub no: i64,
    pub abstain: i64,
    pub my_choice: Option<Choice>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectionStatus {
    pub elections_open: bool,
}
