//! JSON request and response helpers.

use std::error::Error as StdError;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::context::RequestContext;
use crate::http::response::ResponseWriter;

/// Failure reading or decoding a request body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("failed to read request body: {0}")]
    Read(axum::Error),

    #[error("request body exceeds the configured limit")]
    TooLarge,

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    #[error("request deadline exceeded while reading body")]
    DeadlineExceeded,
}

impl BodyError {
    /// Status reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            BodyError::Read(_) | BodyError::Decode(_) => StatusCode::BAD_REQUEST,
            BodyError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            BodyError::DeadlineExceeded => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl From<axum::Error> for BodyError {
    fn from(err: axum::Error) -> Self {
        if exceeds_limit(&err) {
            BodyError::TooLarge
        } else {
            BodyError::Read(err)
        }
    }
}

/// Whether the body limit layer cut the stream short. The limit error can
/// be wrapped more than once on its way up.
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// Collect the body, bounded by the context deadline if one is set.
pub async fn read_body(ctx: &RequestContext, body: Body) -> Result<Bytes, BodyError> {
    let read = axum::body::to_bytes(body, usize::MAX);
    let bytes = match ctx.deadline() {
        Some(deadline) => tokio::time::timeout_at(deadline, read)
            .await
            .map_err(|_| BodyError::DeadlineExceeded)??,
        None => read.await?,
    };
    Ok(bytes)
}

/// Read and decode a JSON body.
pub async fn decode_json<T: DeserializeOwned>(
    ctx: &RequestContext,
    body: Body,
) -> Result<T, BodyError> {
    let bytes = read_body(ctx, body).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Write `payload` as JSON with `status`; 500 with the error text if it
/// cannot be encoded.
pub fn respond_json<T: Serialize + ?Sized>(
    w: &mut dyn ResponseWriter,
    status: StatusCode,
    payload: &T,
) {
    match serde_json::to_vec(payload) {
        Ok(body) => {
            w.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            w.write_status(status);
            write_body(w, &body);
        }
        Err(e) => {
            w.write_status(StatusCode::INTERNAL_SERVER_ERROR);
            write_body(w, e.to_string().as_bytes());
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Write `{"error": message}` with `status`.
pub fn respond_error(w: &mut dyn ResponseWriter, status: StatusCode, message: &str) {
    respond_json(w, status, &ErrorBody { error: message });
}

fn write_body(w: &mut dyn ResponseWriter, body: &[u8]) {
    if let Err(e) = w.write_all(body) {
        tracing::warn!(error = %e, "Failed to write response body");
    }
}
