//! Shared helpers for driving the relay router in-process
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::ConnectInfo;
use axum::Router;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use service::clock::ManualClock;
use service::{http as relay_http, Config, Limits, ServiceState};

pub const KEY: &str = "11112222333344445555666677778888";
pub const OTHER_KEY: &str = "aaaabbbbccccddddeeeeffff00001111";

pub fn loopback() -> SocketAddr {
    "127.0.0.1:50000".parse().unwrap()
}

pub fn remote() -> SocketAddr {
    "203.0.113.7:50000".parse().unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }
}

/// A relay router with a manually driven clock
pub struct TestRelay {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub state: ServiceState,
}

impl TestRelay {
    pub fn new(limits: Limits) -> Self {
        Self::with_config(Config {
            limits,
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> Self {
        let clock = Arc::new(ManualClock::new());
        let state = ServiceState::with_clock(&config, clock.clone());
        let http_config = relay_http::Config::new(config.listen_addr, false);
        let router = relay_http::router(&http_config, state.clone());
        Self {
            router,
            clock,
            state,
        }
    }

    pub async fn request(
        &self,
        peer: SocketAddr,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let body = match body {
            Some(bytes) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(bytes)
            }
            None => Body::empty(),
        };
        let mut request = builder.body(body).unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn upload(&self, peer: SocketAddr, key: Option<&str>, payload: &Value) -> TestResponse {
        let headers: Vec<(&str, &str)> = key.map(|k| ("x-api-key", k)).into_iter().collect();
        self.request(
            peer,
            Method::POST,
            "/api/v1/upload",
            &headers,
            Some(serde_json::to_vec(payload).unwrap()),
        )
        .await
    }

    pub async fn get(&self, peer: SocketAddr, key: Option<&str>, path: &str) -> TestResponse {
        let headers: Vec<(&str, &str)> = key.map(|k| ("x-api-key", k)).into_iter().collect();
        self.request(peer, Method::GET, path, &headers, None).await
    }
}
