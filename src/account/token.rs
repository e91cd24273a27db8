use chrono::{DateTime, Days, Utc};
use dashmap::DashMap;
use rand::Rng;

struct TokenEntry {
    account: String,
    /// `None` if the token never expires.
    expire_at: Option<DateTime<Utc>>,
}

/// Login tokens of every account, kept in memory.
#[derive(Default)]
pub struct Tokens {
    inner: DashMap<String, TokenEntry>,
}

impl Tokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new token for `account`.
    ///
    /// `expire_days` of `0` means the token never expires.
    #[must_use]
    pub fn issue(&self, account: &str, expire_days: u16) -> (String, Option<DateTime<Utc>>) {
        self.refresh();

        let now = Utc::now();
        let expire_at = if expire_days == 0 {
            None
        } else {
            now.checked_add_days(Days::new(expire_days as u64))
        };
        let salt: u64 = rand::thread_rng().gen();
        let token = sha256::digest(format!("{account}-{}-{salt}", now.timestamp_micros()));
        self.inner.insert(
            token.clone(),
            TokenEntry {
                account: account.to_owned(),
                expire_at,
            },
        );
        (token, expire_at)
    }

    /// Check if a token belongs to `account` and has not expired.
    pub fn usable(&self, account: &str, token: &str) -> bool {
        self.inner.get(token).map_or(false, |entry| {
            entry.account == account && entry.expire_at.map_or(true, |e| e > Utc::now())
        })
    }

    /// Remove a target token and return whether it was removed.
    pub fn revoke(&self, token: &str) -> bool {
        self.inner.remove(token).is_some()
    }

    /// Remove every token of an account.
    pub fn revoke_account(&self, account: &str) {
        self.inner.retain(|_, entry| entry.account != account);
    }

    /// Remove expired tokens.
    pub fn refresh(&self) {
        let now = Utc::now();
        self.inner
            .retain(|_, entry| entry.expire_at.map_or(true, |e| e > now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_revoke() {
        let tokens = Tokens::new();
        let (token, expire_at) = tokens.issue("a", 7);
        assert!(expire_at.is_some());
        assert!(tokens.usable("a", &token));
        assert!(!tokens.usable("b", &token));

        let (forever, expire_at) = tokens.issue("a", 0);
        assert!(expire_at.is_none());
        assert_ne!(token, forever);

        assert!(tokens.revoke(&token));
        assert!(!tokens.revoke(&token));
        assert!(!tokens.usable("a", &token));

        tokens.revoke_account("a");
        assert!(!tokens.usable("a", &forever));
    }
}
