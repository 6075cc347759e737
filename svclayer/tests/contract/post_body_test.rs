//! Contract Test: POSTペイロード配置
//!
//! POST（およびGET以外）のdataはJSONボディに載り、
//! URLやクエリ文字列には現れない。

use crate::support;
use serde_json::json;
use svclayer::HttpMethod;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// POST: dataはボディへ、クエリは生成しない
#[tokio::test]
async fn test_post_places_data_in_body() {
    let server = MockServer::start().await;
    let payload = json!({"name": "alice", "age": 30});

    Mock::given(method("POST"))
        .and(path("/user/save"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = support::endpoint_for(&server, "/user/save", HttpMethod::Post);
    let result = endpoint
        .dispatch(payload)
        .await
        .expect("call accepted")
        .expect("call succeeded");

    assert_eq!(result, json!({"ok": true}));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), None);
}

/// PUT等のGET以外のメソッドでもdataはボディに載る
#[tokio::test]
async fn test_put_places_data_in_body() {
    let server = MockServer::start().await;
    let payload = json!({"id": 7, "name": "bob"});

    Mock::given(method("PUT"))
        .and(path("/user/update"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updated": true})))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = support::endpoint_for(&server, "/user/update", HttpMethod::Put);
    let result = endpoint.dispatch(payload).await.unwrap().unwrap();

    assert_eq!(result, json!({"updated": true}));
}

/// JSONでない成功ボディは文字列値として返る
#[tokio::test]
async fn test_non_json_body_is_returned_as_string() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let endpoint = support::endpoint_for(&server, "/ping", HttpMethod::Post);
    let result = endpoint.dispatch(json!({})).await.unwrap().unwrap();

    assert_eq!(result, json!("pong"));
}
