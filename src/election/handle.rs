use axum::{extract::State, Json};
use cragclub_shared::{
    election::{handle::*, Candidate, ElectionStatus, Referendum},
    gear::handle::CreatedResult,
};

use crate::{Auth, Error, Global};

pub async fn status(
    State(Global { db, .. }): State<Global>,
    _auth: Auth,
) -> Result<Json<ElectionStatus>, Error> {
    super::status(&db).await.map(Json)
}

pub async fn candidates(
    State(Global { db, .. }): State<Global>,
    _auth: Auth,
) -> Result<Json<Vec<Candidate>>, Error> {
    super::candidates(&db).await.map(Json)
}

pub async fn apply(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
    Json(desc): Json<ApplyDescriptor>,
) -> Result<Json<CreatedResult>, Error> {
    Ok(Json(CreatedResult {
        id: super::apply(&db, &auth.account, desc).await?,
    }))
}

pub async fn withdraw(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
) -> Result<(), Error> {
    super::withdraw(&db, &auth.account).await
}

pub async fn vote(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
    Json(VoteDescriptor { candidate_id }): Json<VoteDescriptor>,
) -> Result<(), Error> {
    super::cast_vote(&db, &auth.account, candidate_id).await
}

pub async fn referendums(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
) -> Result<Json<Vec<Referendum>>, Error> {
    super::referendums(&db, &auth.account).await.map(Json)
}

pub async fn vote_referendum(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
    Json(ReferendumVoteDescriptor {
        referendum_id,
        choice,
    }): Json<ReferendumVoteDescriptor>,
) -> Result<(), Error> {
    super::vote_referendum(&db, &auth.account, referendum_id, &choice).await
}

/// Manage elections for committee members.
pub mod manage {
    use axum::{extract::State, Json};
    use cragclub_shared::{election::handle::*, gear::handle::CreatedResult};

    use crate::{Auth, Error, Global};

    pub async fn set_open(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(SetElectionsOpenDescriptor { open }): Json<SetElectionsOpenDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::election::set_open(&db, open).await
    }

    pub async fn create_referendum(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(ReferendumDescriptor { title, description }): Json<ReferendumDescriptor>,
    ) -> Result<Json<CreatedResult>, Error> {
        auth.require_committee()?;
        Ok(Json(CreatedResult {
            id: crate::election::create_referendum(&db, &title, &description).await?,
        }))
    }

    /// Start a new election cycle.
    pub async fn reset(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::election::reset(&db).await
    }
}
