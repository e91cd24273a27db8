use cragclub_shared::membership::{
    handle::{manage::*, *},
    CatalogEntry, MembershipRow,
};
use serde::Serialize;

pub struct ReRequest;

pub struct Types;

#[derive(Serialize)]
#[serde(transparent)]
pub struct ApproveRow(pub MembershipTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct RejectRow(pub MembershipTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct DeleteRow(pub MembershipTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct AddType(pub AddTypeDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct RemoveType(pub RemoveTypeDescriptor);

requests! {
    json MembershipRequestDescriptor => "/api/membership/request": MembershipRow,
    json RenewDescriptor => "/api/membership/renew": Vec<MembershipRow>,
    empty ReRequest => "/api/membership/re-request": (),
    empty Types => "/api/membership/types": Vec<CatalogEntry>,
    json ApproveRow => "/api/membership/manage/approve": (),
    json RejectRow => "/api/membership/manage/reject": (),
    json DeleteRow => "/api/membership/manage/delete": (),
    json AddType => "/api/membership/manage/add-type": (),
    json RemoveType => "/api/membership/manage/remove-type": (),
}
