//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{Response, StatusCode};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use reqtrace::observability::{Logger, TraceRecord, TraceSink};
use reqtrace::{HttpServer, ServerConfig, Shutdown};

/// Trace sink keeping every record in memory.
#[derive(Default)]
pub struct CollectingSink {
    records: Mutex<Vec<TraceRecord>>,
}

impl CollectingSink {
    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl TraceSink for CollectingSink {
    fn emit(&self, _logger: &Logger, record: &TraceRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

/// A server with default routes whose trace records land in the returned sink.
pub fn test_server() -> (HttpServer, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::default());
    let server = HttpServer::with_trace_sink(&ServerConfig::default(), sink.clone()).unwrap();
    (server, sink)
}

/// A server listening on an ephemeral loopback port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub sink: Arc<CollectingSink>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

impl RunningServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

pub async fn start_server() -> RunningServer {
    let (server, sink) = test_server();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    let handle = tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    RunningServer {
        addr,
        sink,
        shutdown,
        handle,
    }
}

pub async fn body_string(response: Response<Body>) -> (StatusCode, String) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
