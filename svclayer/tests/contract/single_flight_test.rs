//! Contract Test: 単一実行ガード
//!
//! 同一エンドポイントの実行中に届いた呼び出しは破棄され、
//! 完了後（成功・失敗とも）は次の呼び出しが受け付けられる。

use crate::support;
use serde_json::json;
use std::time::Duration;
use svclayer::HttpMethod;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 実行中の再呼び出しは破棄されNoneを返す
#[tokio::test]
async fn test_duplicate_call_is_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"done": true}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let endpoint = support::endpoint_for(&server, "/slow", HttpMethod::Post);
    let (first, second) = tokio::join!(endpoint.dispatch(json!({})), endpoint.dispatch(json!({})));

    // 先に開始した側だけが実行され、後続は黙って破棄される
    assert_eq!(first.unwrap().unwrap(), json!({"done": true}));
    assert!(second.is_none());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

/// 成功完了後は次の呼び出しが受け付けられる
#[tokio::test]
async fn test_guard_resets_after_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"n": 1})))
        .expect(2)
        .mount(&server)
        .await;

    let endpoint = support::endpoint_for(&server, "/fast", HttpMethod::Post);

    let first = endpoint.dispatch(json!({})).await;
    assert!(first.is_some());
    assert!(!endpoint.is_in_flight());

    let second = endpoint.dispatch(json!({})).await;
    assert_eq!(second.unwrap().unwrap(), json!({"n": 1}));
}

/// 失敗完了後もガードは解除される
#[tokio::test]
async fn test_guard_resets_after_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let endpoint = support::endpoint_for(&server, "/broken", HttpMethod::Post);

    let first = endpoint.dispatch(json!({})).await.unwrap();
    assert_eq!(first.unwrap_err().status_code, Some(500));
    assert!(!endpoint.is_in_flight());

    // 失敗後も呼び出しは破棄されず実行される
    let second = endpoint.dispatch(json!({})).await.unwrap();
    assert_eq!(second.unwrap_err().status_code, Some(500));
}

/// 別エンドポイント同士のガードは独立している
#[tokio::test]
async fn test_endpoints_are_independent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"from": "a"}))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"from": "b"}))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let endpoint_a = support::endpoint_for(&server, "/a", HttpMethod::Post);
    let endpoint_b = support::endpoint_for(&server, "/b", HttpMethod::Post);

    let (a, b) = tokio::join!(endpoint_a.dispatch(json!({})), endpoint_b.dispatch(json!({})));

    assert_eq!(a.unwrap().unwrap(), json!({"from": "a"}));
    assert_eq!(b.unwrap().unwrap(), json!({"from": "b"}));
}
