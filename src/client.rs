//! HTTP client for the demo endpoints, used by `reqtrace-cli` and the
//! socket-level tests.

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::api::handlers::{PingRequest, Reply};
use crate::api::registry::Borg;
use crate::http::middleware::X_REQUEST_ID;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A response body together with the request ID the server assigned.
#[derive(Debug, Clone)]
pub struct Traced<T> {
    pub request_id: Option<String>,
    pub body: T,
}

pub struct ReqtraceClient {
    client: Client,
    base_url: String,
}

impl ReqtraceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /`
    pub async fn index(&self) -> Result<Traced<Reply>, ClientError> {
        let resp = self.client.get(self.url("/")).send().await?;
        json(resp).await
    }

    /// `GET /headers`
    pub async fn headers(&self) -> Result<Traced<String>, ClientError> {
        let resp = self.client.get(self.url("/headers")).send().await?;
        text(resp).await
    }

    /// `POST /echo`
    pub async fn echo(&self, body: impl Into<String>) -> Result<Traced<String>, ClientError> {
        let resp = self
            .client
            .post(self.url("/echo"))
            .body(body.into())
            .send()
            .await?;
        text(resp).await
    }

    /// `GET /borgs`
    pub async fn borgs(&self) -> Result<Traced<Vec<Borg>>, ClientError> {
        let resp = self.client.get(self.url("/borgs")).send().await?;
        json(resp).await
    }

    /// `POST /ping`
    pub async fn ping(&self, borgid: &str, addr: &str) -> Result<Traced<Reply>, ClientError> {
        let req = PingRequest {
            borgid: borgid.to_string(),
            addr: addr.to_string(),
        };
        let resp = self.client.post(self.url("/ping")).json(&req).send().await?;
        json(resp).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn text(resp: reqwest::Response) -> Result<Traced<String>, ClientError> {
    let status = resp.status();
    let request_id = resp
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(ClientError::Status { status, body });
    }
    Ok(Traced { request_id, body })
}

async fn json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<Traced<T>, ClientError> {
    let Traced { request_id, body } = text(resp).await?;
    Ok(Traced {
        request_id,
        body: serde_json::from_str(&body)?,
    })
}
