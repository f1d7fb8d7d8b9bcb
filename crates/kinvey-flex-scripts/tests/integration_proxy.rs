//! Relay behavior against a mock flex service.

use httpmock::prelude::*;
use kinvey_flex_scripts::config::FlexEnvironment;
use kinvey_flex_scripts::dev::{relay_client, router, FlexHeaders, ProxyState};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

fn environment() -> FlexEnvironment {
    FlexEnvironment {
        app_id: Some("kid_orders".into()),
        app_secret: Some("app-secret".into()),
        master_secret: Some("master-secret".into()),
        baas_url: Some("https://baas.kinvey.com".into()),
        user_name: Some("alice".into()),
        user_id: Some("user-1".into()),
        ..Default::default()
    }
}

/// Serves the relay on an ephemeral port and returns its base URL.
async fn spawn_relay(flex_url: String) -> String {
    let headers = FlexHeaders::new(&environment(), Some("2.0.0")).unwrap();
    let state = Arc::new(ProxyState::new(relay_client().unwrap(), flex_url, headers));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn data_request_is_relayed_with_platform_headers() {
    let service = MockServer::start_async().await;
    let mock = service
        .mock_async(|when, then| {
            when.method(GET)
                .path("/widgets/42")
                .header("x-kinvey-username", "alice")
                .header("x-kinvey-user-id", "user-1")
                .header("content-type", "application/json")
                .header_exists("x-kinvey-app-metadata")
                .header_exists("x-kinvey-original-request-headers");
            then.status(200).json_body(json!({"_id": "42"}));
        })
        .await;

    let relay = spawn_relay(service.base_url()).await;
    let response = reqwest::get(format!("{}/widgets/42", relay)).await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"_id": "42"}));
    mock.assert_async().await;
}

#[tokio::test]
async fn count_request_keeps_query_string() {
    let service = MockServer::start_async().await;
    let mock = service
        .mock_async(|when, then| {
            when.method(GET)
                .path("/widgets/_count")
                .query_param("query", r#"{"color":"red"}"#);
            then.status(200).json_body(json!({"count": 3}));
        })
        .await;

    let relay = spawn_relay(service.base_url()).await;
    let response = reqwest::Client::new()
        .get(format!("{}/widgets/_count", relay))
        .query(&[("query", r#"{"color":"red"}"#)])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    mock.assert_async().await;
}

#[tokio::test]
async fn function_get_becomes_post_with_query_body() {
    let service = MockServer::start_async().await;
    let mock = service
        .mock_async(|when, then| {
            when.method(POST)
                .path("/_flexFunctions/hello")
                .json_body(json!({"query": {"name": "bob", "tag": ["a", "b"]}}));
            then.status(200).json_body(json!({"greeting": "hi bob"}));
        })
        .await;

    let relay = spawn_relay(service.base_url()).await;
    let response = reqwest::get(format!(
        "{}/_flexFunctions/hello?name=bob&tag=a&tag=b",
        relay
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), 200);
    mock.assert_async().await;
}

#[tokio::test]
async fn function_post_forwards_body_unchanged() {
    let service = MockServer::start_async().await;
    let mock = service
        .mock_async(|when, then| {
            when.method(POST)
                .path("/_flexFunctions/orders/submit")
                .json_body(json!({"items": [1, 2]}));
            then.status(201).body("created");
        })
        .await;

    let relay = spawn_relay(service.base_url()).await;
    let response = reqwest::Client::new()
        .post(format!("{}/_flexFunctions/orders/submit", relay))
        .body(r#"{"items":[1,2]}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    assert_eq!(response.text().await.unwrap(), "created");
    mock.assert_async().await;
}

#[tokio::test]
async fn auth_get_posts_body_param() {
    let service = MockServer::start_async().await;
    let mock = service
        .mock_async(|when, then| {
            when.method(POST)
                .path("/_auth/login")
                .json_body(json!({"username": "u", "password": "p"}));
            then.status(200).json_body(json!({"token": "t"}));
        })
        .await;

    let relay = spawn_relay(service.base_url()).await;
    let response = reqwest::Client::new()
        .get(format!("{}/_auth/login", relay))
        .query(&[("body", r#"{"username":"u","password":"p"}"#)])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    mock.assert_async().await;
}

#[tokio::test]
async fn upstream_errors_pass_through() {
    let service = MockServer::start_async().await;
    service
        .mock_async(|when, then| {
            when.method(GET).path("/widgets/missing");
            then.status(404)
                .header("x-request-id", "abc")
                .json_body(json!({"error": "EntityNotFound"}));
        })
        .await;

    let relay = spawn_relay(service.base_url()).await;
    let response = reqwest::get(format!("{}/widgets/missing", relay)).await.unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(response.headers()["x-request-id"], "abc");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "EntityNotFound");
}

#[tokio::test]
async fn redirects_are_returned_not_followed() {
    let service = MockServer::start_async().await;
    service
        .mock_async(|when, then| {
            when.method(GET).path("/widgets/42");
            then.status(302).header("location", "/widgets/other");
        })
        .await;
    let followed = service
        .mock_async(|when, then| {
            when.method(GET).path("/widgets/other");
            then.status(200).body("followed");
        })
        .await;

    let relay = spawn_relay(service.base_url()).await;
    let caller = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let response = caller
        .get(format!("{}/widgets/42", relay))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 302);
    assert_eq!(response.headers()["location"], "/widgets/other");
    followed.assert_hits_async(0).await;
}

#[tokio::test]
async fn unreachable_service_is_bad_gateway() {
    // Grab a free port, then release it so nothing is listening there.
    let addr: SocketAddr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let relay = spawn_relay(format!("http://{}", addr)).await;
    let response = reqwest::get(format!("{}/widgets/1", relay)).await.unwrap();

    assert_eq!(response.status(), 502);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Could not reach the local flex service"));
}
