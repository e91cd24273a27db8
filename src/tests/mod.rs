mod account;
mod election;

use axum::{
    body::Body,
    http::{self, Request, StatusCode},
    Router,
};
use cragclub_shared::account::handle::{LoginDescriptor, LoginResult, RegisterDescriptor};
use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;
use tower::util::ServiceExt;

use crate::{config::Config, notify::Notifier, store, Global};

pub const ROOT_EMAIL: &str = "root@climb.test";
pub const ROOT_PASSWORD: &str = "root-password";
pub const COMMITTEE_DOMAIN: &str = "committee.climb.test";
pub const PASSWORD: &str = "password123456";

/// Opens an empty store in a fresh temporary file.
pub async fn open_store() -> SqlitePool {
    let path = std::env::temp_dir().join(format!(
        "cragclub-test-{:016x}.db",
        rand::thread_rng().gen::<u64>()
    ));
    store::connect(&format!("sqlite://{}", path.display()), 8)
        .await
        .unwrap()
}

pub async fn migrated_store() -> SqlitePool {
    let db = open_store().await;
    store::migrate(&db).await.unwrap();
    db
}

pub fn config() -> Config {
    Config {
        root_email: ROOT_EMAIL.to_owned(),
        root_password: ROOT_PASSWORD.to_owned(),
        committee_domains: vec![COMMITTEE_DOMAIN.to_owned()],
        calendar_domain: "climb.test".to_owned(),
        ..Default::default()
    }
}

/// A migrated store with the root account, and an outbox notifier.
pub async fn global() -> Global {
    let db = migrated_store().await;
    let config = config();
    crate::account::ensure_root(&db, &config).await.unwrap();
    Global::new(db, config, Notifier::outbox())
}

/// Posts `body` as JSON and returns the status with the parsed response.
pub async fn post<T: Serialize>(
    app: &Router,
    uri: &str,
    auth: Option<&str>,
    body: &T,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .uri(uri)
        .method("POST")
        .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
    if let Some(auth) = auth {
        builder = builder.header(http::header::AUTHORIZATION, auth);
    }
    let response = app
        .clone()
        .oneshot(
            builder
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Like [`post`], expecting success and parsing the response as `R`.
pub async fn post_ok<T: Serialize, R: DeserializeOwned>(
    app: &Router,
    uri: &str,
    auth: Option<&str>,
    body: &T,
) -> R {
    let (status, value) = post(app, uri, auth, body).await;
    assert_eq!(status, StatusCode::OK, "{uri}: {value}");
    serde_json::from_value(value).unwrap()
}

/// A logged in account.
pub struct Client {
    pub id: String,
    /// Value of the `Authorization` header.
    pub auth: String,
}

impl Client {
    #[inline]
    pub fn auth(&self) -> Option<&str> {
        Some(self.auth.as_str())
    }
}

pub async fn login(app: &Router, email: &str, password: &str) -> Client {
    let result: LoginResult = post_ok(
        app,
        "/api/account/login",
        None,
        &LoginDescriptor {
            email: email.to_owned(),
            password: password.to_owned(),
        },
    )
    .await;
    Client {
        auth: format!("{}:{}", result.account_id, result.token),
        id: result.account_id,
    }
}

pub async fn root(app: &Router) -> Client {
    login(app, ROOT_EMAIL, ROOT_PASSWORD).await
}

/// Registers an account and logs in, leaving its membership pending.
pub async fn register(app: &Router, email: &str) -> Client {
    let (status, value) = post(
        app,
        "/api/account/register",
        None,
        &RegisterDescriptor {
            email: email.to_owned(),
            password: PASSWORD.to_owned(),
            first_name: "Alex".to_owned(),
            last_name: "Honnold".to_owned(),
        },
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{value}");
    login(app, email, PASSWORD).await
}

/// Registers an account whose basic membership is approved.
pub async fn member(global: &Global, app: &Router, email: &str) -> Client {
    let client = register(app, email).await;
    crate::membership::approve_user(&global.db, &global.config, &global.notifier, &client.id)
        .await
        .unwrap();
    client
}

/// Registers an account on the committee domain.
pub async fn committee(app: &Router, name: &str) -> Client {
    register(app, &format!("{name}@{COMMITTEE_DOMAIN}")).await
}
