//! Typed HTTP client of the club backend.

pub mod raw;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;

pub use cragclub_shared as shared;

/// A logged in account.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    pub account_id: String,
    pub token: String,
    /// `None` if the token never expires.
    pub expire_at: Option<DateTime<Utc>>,
}

impl AccountInfo {
    /// Value of the `Authorization` header.
    #[inline]
    pub fn auth_header(&self) -> String {
        format!("{}:{}", self.account_id, self.token)
    }

    pub fn is_expired(&self) -> bool {
        self.expire_at.map_or(false, |e| e <= Utc::now())
    }
}

impl From<shared::account::handle::LoginResult> for AccountInfo {
    fn from(res: shared::account::handle::LoginResult) -> Self {
        Self {
            expire_at: res
                .expire_at
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
            account_id: res.account_id,
            token: res.token,
        }
    }
}

pub struct Context {
    req_client: reqwest::Client,
    /// Ex. `http://127.0.0.1:8080`.
    url_prefix: String,
    account: RwLock<Option<AccountInfo>>,
}

impl Context {
    pub fn new(url_prefix: impl Into<String>) -> Self {
        Self {
            req_client: reqwest::Client::new(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_owned(),
            account: RwLock::new(None),
        }
    }

    #[inline]
    pub fn account(&self) -> Option<AccountInfo> {
        self.account.read().clone()
    }

    /// Logs in and keeps the token for later calls.
    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<AccountInfo> {
        let info: AccountInfo = raw::call(
            shared::account::handle::LoginDescriptor {
                email: email.to_owned(),
                password: password.to_owned(),
            },
            self,
        )
        .await?
        .into();
        *self.account.write() = Some(info.clone());
        Ok(info)
    }

    /// Revokes the kept token.
    pub async fn logout(&self) -> anyhow::Result<()> {
        raw::call(raw::account::Logout, self).await?;
        *self.account.write() = None;
        Ok(())
    }
}
