//! Business handlers for the demo endpoints.

use std::io;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::api::json::{decode_json, read_body, respond_error, respond_json};
use crate::api::registry::{Borg, BorgRegistry};
use crate::context::RequestContext;
use crate::http::handler::Handler;
use crate::http::response::ResponseWriter;

/// Body of `POST /ping`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PingRequest {
    #[serde(default, alias = "borgId")]
    pub borgid: String,
    #[serde(default)]
    pub addr: String,
}

/// Success body shared by `GET /` and `POST /ping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borgid: Option<String>,
    pub message: String,
}

fn text_plain() -> HeaderValue {
    HeaderValue::from_static("text/plain; charset=utf-8")
}

/// `GET /`
pub fn get_index(
    _ctx: RequestContext,
    _req: Request,
    w: &mut dyn ResponseWriter,
) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let reply = Reply {
            borgid: None,
            message: "Welcome!".to_owned(),
        };
        respond_json(w, StatusCode::OK, &reply);
    })
}

/// `GET /headers`: one `name: value` line per received header.
pub fn get_headers(
    ctx: RequestContext,
    req: Request,
    w: &mut dyn ResponseWriter,
) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        w.headers_mut().insert(header::CONTENT_TYPE, text_plain());
        if let Err(e) = write_headers(w, req.headers(), b"\n") {
            ctx.logger().warn(format_args!("Failed to echo headers: {e}"));
        }
    })
}

/// `POST /echo`: the request re-serialized in HTTP/1.1 wire form.
pub fn post_echo(
    ctx: RequestContext,
    req: Request,
    w: &mut dyn ResponseWriter,
) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let (parts, body) = req.into_parts();
        let body = match read_body(&ctx, body).await {
            Ok(body) => body,
            Err(e) => return respond_error(w, e.status(), &e.to_string()),
        };

        w.headers_mut().insert(header::CONTENT_TYPE, text_plain());
        if let Err(e) = write_request(w, &parts, &body) {
            ctx.logger().warn(format_args!("Failed to echo request: {e}"));
        }
    })
}

fn write_request(w: &mut dyn ResponseWriter, parts: &Parts, body: &Bytes) -> io::Result<()> {
    write!(w, "{} {} {:?}\r\n", parts.method, parts.uri, parts.version)?;
    write_headers(w, &parts.headers, b"\r\n")?;
    w.write_all(b"\r\n")?;
    w.write_all(body)
}

fn write_headers(w: &mut dyn ResponseWriter, headers: &HeaderMap, eol: &[u8]) -> io::Result<()> {
    for (name, value) in headers {
        w.write_all(name.as_str().as_bytes())?;
        w.write_all(b": ")?;
        w.write_all(value.as_bytes())?;
        w.write_all(eol)?;
    }
    Ok(())
}

/// `GET /borgs`: the registry as a JSON array, streamed into the sink.
pub struct GetBorgs {
    registry: Arc<BorgRegistry>,
}

impl GetBorgs {
    pub fn new(registry: Arc<BorgRegistry>) -> Self {
        Self { registry }
    }
}

impl Handler for GetBorgs {
    fn call<'a>(
        &'a self,
        ctx: RequestContext,
        _req: Request,
        w: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let borgs = self.registry.list();
            w.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            );
            w.write_status(StatusCode::OK);

            // The status is already out, so an encoding failure can only be logged.
            let encoded = serde_json::to_writer(&mut *w, &borgs)
                .map_err(io::Error::from)
                .and_then(|()| w.write_all(b"\n"));
            if let Err(e) = encoded {
                ctx.logger().error(format_args!("Failed to encode borgs: {e}"));
            }
        })
    }
}

/// `POST /ping`: register a borg and answer with a pong.
pub struct PostPing {
    registry: Arc<BorgRegistry>,
}

impl PostPing {
    pub fn new(registry: Arc<BorgRegistry>) -> Self {
        Self { registry }
    }
}

impl Handler for PostPing {
    fn call<'a>(
        &'a self,
        ctx: RequestContext,
        req: Request,
        w: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            // `null` carries no fields, so it fails the checks below.
            let ping: PingRequest = match decode_json::<Option<_>>(&ctx, req.into_body()).await {
                Ok(ping) => ping.unwrap_or_default(),
                Err(e) => return respond_error(w, e.status(), &e.to_string()),
            };

            if ping.borgid.is_empty() {
                return respond_error(w, StatusCode::BAD_REQUEST, "borgId in passed json is missing");
            }
            if ping.addr.is_empty() {
                return respond_error(w, StatusCode::BAD_REQUEST, "addr in passed json is missing");
            }

            self.registry
                .upsert(&ctx, Borg::new(ping.borgid.clone(), ping.addr));

            let reply = Reply {
                borgid: Some(ping.borgid),
                message: "pong".to_owned(),
            };
            respond_json(w, StatusCode::CREATED, &reply);
        })
    }
}
