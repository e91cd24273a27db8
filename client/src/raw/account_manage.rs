use cragclub_shared::account::{handle::manage::*, UserView};
use serde::Serialize;

pub struct List;

/// Approves the basic membership of an account.
#[derive(Serialize)]
#[serde(transparent)]
pub struct Approve(pub AccountTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct Reject(pub AccountTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct Promote(pub AccountTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct Demote(pub AccountTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct Delete(pub AccountTargetDescriptor);

requests! {
    empty List => "/api/account/manage/list": Vec<UserView>,
    json Approve => "/api/account/manage/approve": (),
    json Reject => "/api/account/manage/reject": (),
    json Promote => "/api/account/manage/promote": (),
    json Demote => "/api/account/manage/demote": (),
    json SetCommitteeRolesDescriptor => "/api/account/manage/set-roles": (),
    json Delete => "/api/account/manage/delete": (),
}
