use std::fmt::{Formatter, Write};

use reqwest::{RequestBuilder, Response};

/// Implements [`Request`] for each type.
///
/// `json` types are sent as the request body, `empty` ones send nothing.
macro_rules! requests {
    (@body json, $self:ident, $req:ident) => {
        $req.json($self)
    };
    (@body empty, $self:ident, $req:ident) => {
        $req
    };
    ($($kind:ident $t:ty => $url:literal : $out:ty),* $(,)?) => {
        $(
            #[async_trait::async_trait]
            impl $crate::raw::Request for $t {
                type Output = $out;
                const URL_SUFFIX: &'static str = $url;

                fn make_req(
                    &self,
                    req: reqwest::RequestBuilder,
                ) -> anyhow::Result<reqwest::RequestBuilder> {
                    Ok(requests!(@body $kind, self, req))
                }

                async fn parse_res(
                    &mut self,
                    response: reqwest::Response,
                ) -> anyhow::Result<Self::Output> {
                    $crate::raw::parse_json(response).await
                }
            }
        )*
    };
}

pub mod account;
pub mod account_manage;
pub mod election;
pub mod gear;
pub mod membership;
pub mod session;

#[async_trait::async_trait]
pub trait Request {
    type Output;

    const URL_SUFFIX: &'static str;
    const METHOD: reqwest::Method = reqwest::Method::POST;

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder>;

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output>;
}

/// Parses a JSON response. An empty body reads as `null`.
pub async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    let bytes = response.bytes().await?;
    let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    Ok(serde_json::from_slice(body)?)
}

/// Builds the HTTP request of a [`Request`], authorized as the logged in
/// account if any.
pub fn build<T: Request>(req: &T, cx: &crate::Context) -> anyhow::Result<reqwest::Request> {
    let mut builder = cx
        .req_client
        .request(T::METHOD, format!("{}{}", cx.url_prefix, T::URL_SUFFIX));
    if let Some(account) = cx.account.read().as_ref() {
        builder = builder.header(reqwest::header::AUTHORIZATION, account.auth_header());
    }
    Ok(req.make_req(builder)?.build()?)
}

/// Calls a [`Request`] and return its output.
pub async fn call<T: Request>(
    mut req: T,
    cx: &crate::Context,
) -> anyhow::Result<<T as Request>::Output> {
    let response = cx.req_client.execute(build(&req, cx)?).await?;
    let status = response.status();

    if !status.is_success() {
        #[derive(Debug)]
        struct ResponseError {
            status_code: reqwest::StatusCode,
            error: Option<String>,
        }

        impl std::fmt::Display for ResponseError {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.status_code.as_str())?;

                if let Some(msg) = self.status_code.canonical_reason() {
                    f.write_char(' ')?;
                    f.write_str(msg)?;
                }

                if let Some(ref msg) = self.error {
                    f.write_str(": ")?;
                    f.write_str(msg)?;
                }

                Ok(())
            }
        }

        impl std::error::Error for ResponseError {}

        #[derive(serde::Deserialize)]
        struct ThrownError {
            error: String,
        }

        let err_msg = response
            .json::<ThrownError>()
            .await
            .ok()
            .map(|msg| msg.error);

        return Err(anyhow::Error::new(ResponseError {
            status_code: status,
            error: err_msg,
        }));
    }

    req.parse_res(response).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::session::handle::SessionTargetDescriptor;

    #[test]
    fn build_authorized_request() {
        let cx = crate::Context::new("http://127.0.0.1:8080/");
        let req = session::Book(SessionTargetDescriptor { session_id: 7 });

        let anonymous = build(&req, &cx).unwrap();
        assert_eq!(anonymous.url().as_str(), "http://127.0.0.1:8080/api/session/book");
        assert!(anonymous.headers().get(reqwest::header::AUTHORIZATION).is_none());

        *cx.account.write() = Some(crate::AccountInfo {
            account_id: "a1".to_owned(),
            token: "t".to_owned(),
            expire_at: None,
        });
        let request = build(&req, &cx).unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.headers()[reqwest::header::AUTHORIZATION], "a1:t");
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()).unwrap(),
            br#"{"session_id":7}"#
        );
    }

    #[test]
    fn calendar_is_a_get() {
        let cx = crate::Context::new("http://127.0.0.1:8080");
        let request = build(&session::Calendar, &cx).unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert!(request.body().is_none());
    }

    #[tokio::test]
    async fn unreachable_backend() {
        let cx = crate::Context::new("http://127.0.0.1:9");
        assert!(call(account::View, &cx).await.is_err());
    }
}
