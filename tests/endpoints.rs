//! End-to-end tests against a running server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message};

mod common;

#[tokio::test]
async fn test_healthcheck_envelope() {
    let server = common::start_server().await;

    let res = common::client()
        .get(server.url("/healthcheck"))
        .header("content-type", "application/json")
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/json"
    );

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["message"], json!("OK"));
    assert!(body["data"]["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(body["error"], Value::Null);
    assert_eq!(body["meta"], json!({"status_code": 200, "version": "v0.1.0"}));

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_paths_hit_catchall() {
    let server = common::start_server().await;
    let client = common::client();

    for (path, message) in [
        ("/invalid-route", "Endpoint /invalid-route not found."),
        ("/api/v1/users", "Endpoint /api/v1/users not found."),
        ("/", "Endpoint / not found."),
    ] {
        let res = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "path {path}");

        let body: Value = res.json().await.unwrap();
        assert_eq!(
            body,
            json!({
                "data": null,
                "error": {"message": message},
                "meta": {"status_code": 404, "version": "v0.1.0"}
            })
        );
    }

    let res = client.delete(server.url("/whatever")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["message"], json!("Method DELETE not allowed on /whatever."));

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_wrong_method_is_enveloped() {
    let server = common::start_server().await;

    let res = common::client()
        .post(server.url("/healthcheck"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"]["message"], json!("Method POST not allowed on /healthcheck."));
    assert_eq!(body["meta"]["status_code"], json!(405));

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_websocket_echo() {
    let server = common::start_server().await;

    let (mut socket, _) = connect_async(format!("ws://{}/ws", server.addr))
        .await
        .expect("websocket handshake failed");

    socket.send(Message::Text("Hello World".into())).await.unwrap();
    let reply = socket.next().await.unwrap().unwrap();
    assert_eq!(reply.into_text().unwrap().as_str(), "Hello World");

    socket.send(Message::Binary(vec![1u8, 2, 3].into())).await.unwrap();
    let reply = socket.next().await.unwrap().unwrap();
    assert_eq!(&reply.into_data()[..], &[1u8, 2, 3]);

    socket.close(None).await.unwrap();
    server.shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown_stops_server() {
    let server = common::start_server().await;
    let url = server.url("/healthcheck");

    let res = common::client().get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    drop(res);

    server.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());

    assert!(common::client().get(&url).send().await.is_err());
}
