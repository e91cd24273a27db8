use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use cragclub_shared::account::{CommitteeRole, Role};
use lettre::transport::smtp;
use serde::Serialize;
use sqlx::SqlitePool;

pub mod account;
pub mod catalog;
pub mod config;
pub mod election;
pub mod gear;
pub mod membership;
pub mod notify;
pub mod session;
pub mod settings;
pub mod store;

/// The module for unit testing, will only be availabled in dev env.
#[cfg(test)]
mod tests;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("unknown type \"{0}\"")]
    InvalidType(String),
    #[error("type already exists")]
    TypeExists,
    #[error("the basic membership type cannot be removed")]
    ProtectedType,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("session already booked")]
    AlreadyBooked,
    #[error("session is full")]
    SessionFull,
    #[error("session not booked")]
    NotBooked,
    #[error("an active \"{0}\" membership is required")]
    MembershipRequired(String),
    #[error("gear out of stock")]
    OutOfStock,
    #[error("request is not pending")]
    NotPending,
    #[error("request is not approved")]
    NotApproved,
    #[error("membership is not rejected")]
    NotRejected,
    #[error("already standing as a candidate")]
    AlreadyCandidate,
    #[error("already voted")]
    AlreadyVoted,
    #[error("invalid choice \"{0}\"")]
    InvalidChoice(String),
    #[error("elections are closed")]
    ElectionsClosed,
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("permission denied")]
    PermissionDenied,
    #[error("username or password incorrect")]
    UsernameOrPasswordIncorrect,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("non-ascii header value: {0}")]
    HeaderNonAscii(axum::http::header::ToStrError),
    #[error("auth header is not in {{account}}:{{token}} syntax")]
    InvalidAuthHeader,

    #[error("address error: {0}")]
    EmailAddress(lettre::address::AddressError),
    #[error("email message error: {0}")]
    Lettre(lettre::error::Error),
    #[error("failed to send email")]
    Smtp(smtp::Error),

    #[error("config error: {0}")]
    Config(String),
    /// Details are logged where the failure happens and never returned.
    #[error("store failure")]
    Store,
}

impl Error {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateEmail
            | Error::TypeExists
            | Error::AlreadyBooked
            | Error::SessionFull
            | Error::NotBooked
            | Error::OutOfStock
            | Error::NotPending
            | Error::NotApproved
            | Error::NotRejected
            | Error::AlreadyCandidate
            | Error::AlreadyVoted => StatusCode::CONFLICT,
            Error::InvalidType(_)
            | Error::InvalidChoice(_)
            | Error::InvalidInput(_)
            | Error::EmailAddress(_)
            | Error::HeaderNonAscii(_)
            | Error::InvalidAuthHeader => StatusCode::BAD_REQUEST,
            Error::NotLoggedIn | Error::UsernameOrPasswordIncorrect => StatusCode::UNAUTHORIZED,
            Error::Lettre(_) | Error::Smtp(_) | Error::Config(_) | Error::Store => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for Error {
    #[inline]
    fn into_response(self) -> axum::response::Response {
        #[derive(Serialize)]
        struct ErrorInfo {
            error: String,
        }
        (
            self.to_status_code(),
            axum::Json(ErrorInfo {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Implements `From<T>` for [`Error`].
macro_rules! impl_from {
    ($($t:ty => $v:ident),* $(,)?) => {
        $(
            impl From<$t> for $crate::Error {
                #[inline]
                fn from(err: $t) -> Self {
                    Self::$v(err)
                }
            }
        )*
    };
}

impl_from! {
    lettre::address::AddressError => EmailAddress,
    lettre::error::Error => Lettre,
    smtp::Error => Smtp,
    axum::http::header::ToStrError => HeaderNonAscii,
}

/// Unique violations on known keys become the matching domain error,
/// everything else is logged and reported as [`Error::Store`].
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let Some(err) = store::unique_violation(&err) {
            return err;
        }
        tracing::error!("store error: {err}");
        Error::Store
    }
}

/// State shared by every handler.
#[derive(Clone)]
pub struct Global {
    pub db: SqlitePool,
    pub config: Arc<config::Config>,
    pub tokens: Arc<account::token::Tokens>,
    pub notifier: Arc<notify::Notifier>,
}

impl Global {
    pub fn new(db: SqlitePool, config: config::Config, notifier: notify::Notifier) -> Self {
        Self {
            db,
            config: Arc::new(config),
            tokens: Arc::new(account::token::Tokens::new()),
            notifier: Arc::new(notifier),
        }
    }
}

/// The verified principal of a request.
///
/// Extracted from an `Authorization: {account}:{token}` header.
#[derive(Debug, Clone)]
pub struct Auth {
    pub account: String,
    pub token: String,
    pub role: Role,
    pub committee_roles: Vec<CommitteeRole>,
    pub is_root: bool,
}

impl Auth {
    #[inline]
    pub fn is_committee(&self) -> bool {
        self.is_root || self.role == Role::Committee
    }

    /// Whether this account may manage gear and its requests.
    pub fn is_kit_privileged(&self) -> bool {
        self.is_root
            || (self.role == Role::Committee
                && self.committee_roles.iter().any(|r| {
                    matches!(r, CommitteeRole::KitSecretary | CommitteeRole::President)
                }))
    }

    pub fn require_committee(&self) -> Result<(), Error> {
        if self.is_committee() {
            Ok(())
        } else {
            Err(Error::PermissionDenied)
        }
    }

    pub fn require_kit_privileged(&self) -> Result<(), Error> {
        if self.is_kit_privileged() {
            Ok(())
        } else {
            Err(Error::PermissionDenied)
        }
    }
}

#[async_trait]
impl FromRequestParts<Global> for Auth {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &Global) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(Error::NotLoggedIn)?
            .to_str()?;
        let (account, token) = value.split_once(':').ok_or(Error::InvalidAuthHeader)?;
        if !state.tokens.usable(account, token) {
            return Err(Error::NotLoggedIn);
        }
        account::principal(&state.db, &state.config, account, token)
            .await?
            .ok_or(Error::NotLoggedIn)
    }
}

/// Construct a router.
pub fn router(global: Global) -> axum::Router {
    axum::Router::new()
        // account
        .route("/api/account/register", post(account::handle::register))
        .route("/api/account/login", post(account::handle::login))
        .route("/api/account/logout", post(account::handle::logout))
        .route("/api/account/view", post(account::handle::view))
        .route("/api/account/edit", post(account::handle::edit))
        .route("/api/account/delete", post(account::handle::delete))
        // account management
        .route(
            "/api/account/manage/list",
            post(account::handle::manage::list),
        )
        .route(
            "/api/account/manage/approve",
            post(account::handle::manage::approve),
        )
        .route(
            "/api/account/manage/reject",
            post(account::handle::manage::reject),
        )
        .route(
            "/api/account/manage/promote",
            post(account::handle::manage::promote),
        )
        .route(
            "/api/account/manage/demote",
            post(account::handle::manage::demote),
        )
        .route(
            "/api/account/manage/set-roles",
            post(account::handle::manage::set_committee_roles),
        )
        .route(
            "/api/account/manage/delete",
            post(account::handle::manage::delete),
        )
        // membership
        .route("/api/membership/request", post(membership::handle::request))
        .route("/api/membership/renew", post(membership::handle::renew))
        .route(
            "/api/membership/re-request",
            post(membership::handle::re_request),
        )
        .route("/api/membership/types", post(membership::handle::types))
        .route(
            "/api/membership/manage/approve",
            post(membership::handle::manage::approve),
        )
        .route(
            "/api/membership/manage/reject",
            post(membership::handle::manage::reject),
        )
        .route(
            "/api/membership/manage/delete",
            post(membership::handle::manage::delete),
        )
        .route(
            "/api/membership/manage/add-type",
            post(membership::handle::manage::add_type),
        )
        .route(
            "/api/membership/manage/remove-type",
            post(membership::handle::manage::remove_type),
        )
        // sessions
        .route("/api/session/list", post(session::handle::list))
        .route("/api/session/types", post(session::handle::types))
        .route("/api/session/book", post(session::handle::book))
        .route("/api/session/cancel", post(session::handle::cancel))
        .route("/api/session/mine", post(session::handle::mine))
        .route("/api/session/calendar", get(session::handle::calendar))
        .route(
            "/api/session/manage/create",
            post(session::handle::manage::create),
        )
        .route(
            "/api/session/manage/update",
            post(session::handle::manage::update),
        )
        .route(
            "/api/session/manage/delete",
            post(session::handle::manage::delete),
        )
        .route(
            "/api/session/manage/add-type",
            post(session::handle::manage::add_type),
        )
        .route(
            "/api/session/manage/remove-type",
            post(session::handle::manage::remove_type),
        )
        // gear
        .route("/api/gear/list", post(gear::handle::list))
        .route("/api/gear/request", post(gear::handle::request))
        .route("/api/gear/requests", post(gear::handle::requests))
        .route("/api/gear/manage/create", post(gear::handle::manage::create))
        .route("/api/gear/manage/update", post(gear::handle::manage::update))
        .route("/api/gear/manage/delete", post(gear::handle::manage::delete))
        .route(
            "/api/gear/manage/approve",
            post(gear::handle::manage::approve),
        )
        .route("/api/gear/manage/reject", post(gear::handle::manage::reject))
        .route(
            "/api/gear/manage/return",
            post(gear::handle::manage::return_gear),
        )
        // elections
        .route("/api/election/status", post(election::handle::status))
        .route(
            "/api/election/candidates",
            post(election::handle::candidates),
        )
        .route("/api/election/apply", post(election::handle::apply))
        .route("/api/election/withdraw", post(election::handle::withdraw))
        .route("/api/election/vote", post(election::handle::vote))
        .route(
            "/api/election/referendums",
            post(election::handle::referendums),
        )
        .route(
            "/api/election/referendum/vote",
            post(election::handle::vote_referendum),
        )
        .route(
            "/api/election/manage/set-open",
            post(election::handle::manage::set_open),
        )
        .route(
            "/api/election/manage/referendum",
            post(election::handle::manage::create_referendum),
        )
        .route(
            "/api/election/manage/reset",
            post(election::handle::manage::reset),
        )
        .with_state(global)
}
