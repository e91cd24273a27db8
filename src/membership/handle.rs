use axum::{extract::State, Json};
use cragclub_shared::membership::{handle::*, CatalogEntry, MembershipRow};

use crate::{catalog::Catalog, Auth, Error, Global};

/// Request a membership of another type.
pub async fn request(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
    Json(desc): Json<MembershipRequestDescriptor>,
) -> Result<Json<MembershipRow>, Error> {
    super::request_additional(
        &db,
        &auth.account,
        auth.role,
        &desc.membership_type,
        desc.year,
    )
    .await
    .map(Json)
}

pub async fn renew(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
    Json(desc): Json<RenewDescriptor>,
) -> Result<Json<Vec<MembershipRow>>, Error> {
    super::renew(&db, &auth.account, auth.role, desc.year, desc.types)
        .await
        .map(Json)
}

/// Ask for the membership again after being rejected.
pub async fn re_request(
    State(Global { db, config, .. }): State<Global>,
    auth: Auth,
) -> Result<(), Error> {
    super::re_request(&db, &config, &auth.account).await
}

/// List membership types. Open to anyone, the registration form needs it.
pub async fn types(
    State(Global { db, .. }): State<Global>,
) -> Result<Json<Vec<CatalogEntry>>, Error> {
    Catalog::Membership.list(&db).await.map(Json)
}

/// Manage memberships for committee members.
pub mod manage {
    use axum::{extract::State, Json};
    use cragclub_shared::membership::handle::manage::*;

    use crate::{catalog::Catalog, Auth, Error, Global};

    pub async fn approve(
        State(Global {
            db,
            config,
            notifier,
            ..
        }): State<Global>,
        auth: Auth,
        Json(MembershipTargetDescriptor { row_id }): Json<MembershipTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::membership::approve_row(&db, &config, &notifier, row_id).await
    }

    pub async fn reject(
        State(Global {
            db,
            config,
            notifier,
            ..
        }): State<Global>,
        auth: Auth,
        Json(MembershipTargetDescriptor { row_id }): Json<MembershipTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::membership::reject_row(&db, &config, &notifier, row_id).await
    }

    pub async fn delete(
        State(Global { db, config, .. }): State<Global>,
        auth: Auth,
        Json(MembershipTargetDescriptor { row_id }): Json<MembershipTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::membership::delete_row(&db, &config, row_id).await
    }

    pub async fn add_type(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(AddTypeDescriptor { id, label }): Json<AddTypeDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        Catalog::Membership.add(&db, &id, &label).await
    }

    pub async fn remove_type(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(RemoveTypeDescriptor { id }): Json<RemoveTypeDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        Catalog::Membership.remove(&db, &id).await
    }
}
