use axum::{extract::State, Json};
use cragclub_shared::gear::{handle::*, GearItem, GearRequest};

use crate::{Auth, Error, Global};

pub async fn list(
    State(Global { db, .. }): State<Global>,
    _auth: Auth,
) -> Result<Json<Vec<GearItem>>, Error> {
    super::list(&db).await.map(Json)
}

pub async fn request(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
    Json(GearTargetDescriptor { gear_id }): Json<GearTargetDescriptor>,
) -> Result<Json<CreatedResult>, Error> {
    Ok(Json(CreatedResult {
        id: super::request(&db, &auth.account, gear_id).await?,
    }))
}

/// Kit managers see every request, others only their own.
pub async fn requests(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
) -> Result<Json<Vec<GearRequest>>, Error> {
    let owner = (!auth.is_kit_privileged()).then_some(auth.account.as_str());
    super::requests(&db, owner).await.map(Json)
}

/// Manage gear for kit managers.
pub mod manage {
    use axum::{extract::State, Json};
    use cragclub_shared::gear::handle::*;

    use crate::{Auth, Error, Global};

    pub async fn create(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(desc): Json<GearDescriptor>,
    ) -> Result<Json<CreatedResult>, Error> {
        auth.require_kit_privileged()?;
        Ok(Json(CreatedResult {
            id: crate::gear::create(&db, desc).await?,
        }))
    }

    pub async fn update(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(UpdateGearDescriptor {
            id,
            gear,
            available_quantity,
        }): Json<UpdateGearDescriptor>,
    ) -> Result<(), Error> {
        auth.require_kit_privileged()?;
        crate::gear::update(&db, id, gear, available_quantity).await
    }

    pub async fn delete(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(GearTargetDescriptor { gear_id }): Json<GearTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_kit_privileged()?;
        crate::gear::delete(&db, gear_id).await
    }

    pub async fn approve(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(GearRequestTargetDescriptor { request_id }): Json<GearRequestTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_kit_privileged()?;
        crate::gear::approve(&db, request_id).await
    }

    pub async fn reject(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(GearRequestTargetDescriptor { request_id }): Json<GearRequestTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_kit_privileged()?;
        crate::gear::reject(&db, request_id).await
    }

    pub async fn return_gear(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(GearRequestTargetDescriptor { request_id }): Json<GearRequestTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_kit_privileged()?;
        crate::gear::return_gear(&db, request_id).await
    }
}
