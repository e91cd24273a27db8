use cragclub_shared::{
    membership::{
        handle::manage::{AddTypeDescriptor, RemoveTypeDescriptor},
        CatalogEntry,
    },
    session::{handle::*, Session},
};
use reqwest::{RequestBuilder, Response};
use serde::Serialize;

pub struct List;

pub struct Types;

/// Bookings of the logged in account.
pub struct Mine;

#[derive(Serialize)]
#[serde(transparent)]
pub struct Book(pub SessionTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct Cancel(pub SessionTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct Delete(pub SessionTargetDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct AddType(pub AddTypeDescriptor);

#[derive(Serialize)]
#[serde(transparent)]
pub struct RemoveType(pub RemoveTypeDescriptor);

requests! {
    empty List => "/api/session/list": Vec<Session>,
    empty Types => "/api/session/types": Vec<CatalogEntry>,
    json Book => "/api/session/book": (),
    json Cancel => "/api/session/cancel": (),
    empty Mine => "/api/session/mine": MyBookingsResult,
    json SessionDescriptor => "/api/session/manage/create": CreateSessionResult,
    json UpdateSessionDescriptor => "/api/session/manage/update": (),
    json Delete => "/api/session/manage/delete": (),
    json AddType => "/api/session/manage/add-type": (),
    json RemoveType => "/api/session/manage/remove-type": (),
}

/// Downloads the iCalendar file of the booked sessions.
pub struct Calendar;

#[async_trait::async_trait]
impl super::Request for Calendar {
    type Output = bytes::Bytes;
    const URL_SUFFIX: &'static str = "/api/session/calendar";
    const METHOD: reqwest::Method = reqwest::Method::GET;

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req)
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.bytes().await?)
    }
}
