use std::{net::SocketAddr, path::Path};

use serde::Deserialize;

use crate::Error;

/// Environment variable naming the config file.
pub const PATH_VAR: &str = "CRAGCLUB_CONFIG";

/// Config file used when [`PATH_VAR`] is unset.
pub const DEFAULT_PATH: &str = "./data/config.toml";

/// Describing the server configuration.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    pub listen: SocketAddr,
    pub database_url: String,
    pub max_connections: u32,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,

    /// The root account. Always active and never demoted.
    pub root_email: String,
    /// Password of the root account when it's seeded.
    pub root_password: String,
    /// Email domains whose registrations become active committee members.
    pub committee_domains: Vec<String>,

    /// Suffix of calendar event UIDs.
    pub calendar_domain: String,
    /// The expiration time of a token in days.
    /// `0` means never expire.
    pub token_expire_days: u16,

    /// Mails are kept in an in-process outbox when absent.
    pub mail_smtp: Option<MailSmtp>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_url: "sqlite://./data/cragclub.db".to_owned(),
            max_connections: 8,
            log_level: "info".to_owned(),
            root_email: "root@localhost".to_owned(),
            root_password: "change-me".to_owned(),
            committee_domains: Vec::new(),
            calendar_domain: "localhost".to_owned(),
            token_expire_days: 7,
            mail_smtp: None,
        }
    }
}

impl Config {
    /// Reads the config at `path`.
    ///
    /// Returns `None` if there is no such file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Option<Self>, Error> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).map(Some),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Config(err.to_string())),
        }
    }

    /// The config file path, honouring [`PATH_VAR`].
    pub fn path() -> String {
        std::env::var(PATH_VAR).unwrap_or_else(|_| DEFAULT_PATH.to_owned())
    }

    #[inline]
    pub fn parse(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|err| Error::Config(err.to_string()))
    }

    /// Whether registrations from this address join the committee directly.
    pub fn is_committee_email(&self, email: &str) -> bool {
        email.rsplit_once('@').map_or(false, |(_, domain)| {
            self.committee_domains
                .iter()
                .any(|d| d.eq_ignore_ascii_case(domain))
        })
    }

    #[inline]
    pub fn is_root_email(&self, email: &str) -> bool {
        self.root_email.eq_ignore_ascii_case(email)
    }
}

/// Describing mailing configuration.
#[derive(Deserialize, Clone, Debug)]
pub struct MailSmtp {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub address: lettre::Address,
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            committee_domains = ["committee.climb.test"]
            token_expire_days = 0

            [mail_smtp]
            server = "smtp.climb.test"
            port = 465
            username = "club"
            password = "secret"
            address = "club@climb.test"
            "#,
        )
        .unwrap();

        assert_eq!(config.token_expire_days, 0);
        assert_eq!(config.max_connections, 8);
        assert!(config.is_committee_email("alex@Committee.Climb.Test"));
        assert!(!config.is_committee_email("alex@climb.test"));
        assert_eq!(config.mail_smtp.unwrap().port, 465);
    }

    #[test]
    fn bad_file_is_an_error() {
        assert!(matches!(
            Config::parse("listen = 12"),
            Err(Error::Config(_))
        ));
    }

    #[serial]
    #[test]
    fn missing_file() {
        std::env::set_var(PATH_VAR, "./does/not/exist.toml");
        assert_eq!(Config::path(), "./does/not/exist.toml");
        assert!(Config::load_from(Config::path()).unwrap().is_none());
        std::env::remove_var(PATH_VAR);
        assert_eq!(Config::path(), DEFAULT_PATH);
    }
}
