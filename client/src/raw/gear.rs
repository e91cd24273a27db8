use cragclub_shared::gear::{handle::*, GearItem, GearRequest};
use serde::Serialize;

pub struct List;

/// Requests of the logged in account, or all of them for kit managers.
pub struct Requests;

#[derive(Serialize)]
#[serde(transparent)]
pub struct Borrow(pub GearTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct Delete(pub GearTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct Approve(pub GearRequestTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct Reject(pub GearRequestTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct Return(pub GearRequestTargetDescriptor);

requests! {
    empty List => "/api/gear/list": Vec<GearItem>,
    json Borrow => "/api/gear/request": CreatedResult,
    empty Requests => "/api/gear/requests": Vec<GearRequest>,
    json GearDescriptor => "/api/gear/manage/create": CreatedResult,
    json UpdateGearDescriptor => "/api/gear/manage/update": (),
    json Delete => "/api/gear/manage/delete": (),
    json Approve => "/api/gear/manage/approve": (),
    json Reject => "/api/gear/manage/reject": (),
    json Return => "/api/gear/manage/return": (),
}
