use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use cragclub_shared::{
    membership::CatalogEntry,
    session::{handle::*, Session},
};

use crate::{catalog::Catalog, Auth, Error, Global};

pub async fn list(
    State(Global { db, .. }): State<Global>,
    _auth: Auth,
) -> Result<Json<Vec<Session>>, Error> {
    super::list(&db).await.map(Json)
}

pub async fn types(
    State(Global { db, .. }): State<Global>,
) -> Result<Json<Vec<CatalogEntry>>, Error> {
    Catalog::Session.list(&db).await.map(Json)
}

pub async fn book(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
    Json(SessionTargetDescriptor { session_id }): Json<SessionTargetDescriptor>,
) -> Result<(), Error> {
    super::book(&db, &auth.account, session_id).await
}

pub async fn cancel(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
    Json(SessionTargetDescriptor { session_id }): Json<SessionTargetDescriptor>,
) -> Result<(), Error> {
    super::cancel(&db, &auth.account, session_id).await
}

/// Ids of the sessions booked by this account.
pub async fn mine(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
) -> Result<Json<MyBookingsResult>, Error> {
    Ok(Json(MyBookingsResult {
        session_ids: super::my_bookings(&db, &auth.account).await?,
    }))
}

/// Download the booked sessions as an iCalendar file.
pub async fn calendar(
    State(Global { db, config, .. }): State<Global>,
    auth: Auth,
) -> Result<impl IntoResponse, Error> {
    let sessions = super::booked_sessions(&db, &auth.account).await?;
    Ok((
        [
            (header::CONTENT_TYPE, super::calendar::CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                super::calendar::CONTENT_DISPOSITION,
            ),
        ],
        super::calendar::render(
            &sessions,
            &auth.account,
            &config.calendar_domain,
            chrono::Utc::now(),
        ),
    ))
}

/// Manage sessions for committee members.
pub mod manage {
    use axum::{extract::State, Json};
    use cragclub_shared::{
        membership::handle::manage::{AddTypeDescriptor, RemoveTypeDescriptor},
        session::handle::*,
    };

    use crate::{catalog::Catalog, Auth, Error, Global};

    pub async fn create(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(desc): Json<SessionDescriptor>,
    ) -> Result<Json<CreateSessionResult>, Error> {
        auth.require_committee()?;
        Ok(Json(CreateSessionResult {
            id: crate::session::create(&db, desc).await?,
        }))
    }

    pub async fn update(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(UpdateSessionDescriptor {
            id,
            session,
            booked_slots,
        }): Json<UpdateSessionDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::session::update(&db, id, session, booked_slots).await
    }

    pub async fn delete(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(SessionTargetDescriptor { session_id }): Json<SessionTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::session::delete(&db, session_id).await
    }

    pub async fn add_type(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(AddTypeDescriptor { id, label }): Json<AddTypeDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        Catalog::Session.add(&db, &id, &label).await
    }

    pub async fn remove_type(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(RemoveTypeDescriptor { id }): Json<RemoveTypeDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        Catalog::Session.remove(&db, &id).await
    }
}
