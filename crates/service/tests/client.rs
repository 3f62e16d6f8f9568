//! End-to-end tests: the typed client against a relay bound to a real socket

use std::net::SocketAddr;

use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::watch;
use url::Url;

use common::api_key::ApiKey;
use service::http::api::client::{ApiClient, ApiError};
use service::http::api::v1::{SampleRequest, StateRequest, StatusRequest, UploadRequest};
use service::{http as relay_http, Config, ServiceState};

const KEY: &str = "11112222333344445555666677778888";

async fn serve() -> (Url, watch::Sender<()>, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let config = Config {
        listen_addr: addr,
        ..Config::default()
    };
    let state = ServiceState::from_config(&config);
    let (shutdown_tx, shutdown_rx) = watch::channel(());

    let handle = tokio::spawn(async move {
        relay_http::run_api(
            listener,
            relay_http::Config::new(addr, false),
            state,
            shutdown_rx,
        )
        .await
        .unwrap();
    });

    let url = Url::parse(&format!("http://{}", addr)).unwrap();
    (url, shutdown_tx, handle)
}

#[tokio::test]
async fn test_client_round_trip() {
    let (url, shutdown_tx, handle) = serve().await;
    let key = ApiKey::parse(KEY).unwrap();
    let client = ApiClient::new(&url, Some(&key)).unwrap();

    assert_eq!(client.health().await.unwrap(), "OK");

    let receipt = client
        .call(UploadRequest {
            payload: json!({"a": 1}),
        })
        .await
        .unwrap();

    let state = client.call(StateRequest).await.unwrap();
    assert_eq!(state.state, Some(receipt.state));

    let status = client.call(StatusRequest).await.unwrap();
    assert_eq!(status.sessions.current, 1);

    let sample = client.call(SampleRequest).await.unwrap();
    assert_eq!(sample, Some(json!({"a": 1})));
    assert_eq!(client.call(SampleRequest).await.unwrap(), None);

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_client_surfaces_http_errors() {
    let (url, shutdown_tx, handle) = serve().await;
    let client = ApiClient::new(&url, None).unwrap();

    // the client connects over loopback, so a missing key still succeeds
    client
        .call(UploadRequest {
            payload: json!([1, 2]),
        })
        .await
        .unwrap();

    let err = client
        .call(UploadRequest {
            payload: json!("scalar"),
        })
        .await
        .unwrap_err();
    match err {
        ApiError::HttpStatus(status, body) => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("invalid_json"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();
}
