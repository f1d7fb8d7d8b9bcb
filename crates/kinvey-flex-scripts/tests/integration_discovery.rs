//! Service discovery against a mock flex service.

use httpmock::prelude::*;
use kinvey_flex_scripts::dev::{discover, discover_with_retry, relay_client, RetryPolicy};
use kinvey_flex_scripts::CliError;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn discover_lists_registered_endpoints() {
    let service = MockServer::start_async().await;
    let mock = service
        .mock_async(|when, then| {
            when.method(POST).path("/_command/discover");
            then.status(200).json_body(json!({
                "dataLink": {"serviceObjects": ["widgets"]},
                "businessLogic": {"handlers": ["f"]},
                "auth": {"handlers": []}
            }));
        })
        .await;

    let client = relay_client().unwrap();
    let discovery = discover(&client, &service.base_url()).await.unwrap();

    assert_eq!(
        discovery.endpoints("http://localhost:10001"),
        vec![
            "http://localhost:10001/widgets",
            "http://localhost:10001/_flexFunctions/f",
        ]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_answer_is_discovery_error() {
    let service = MockServer::start_async().await;
    service
        .mock_async(|when, then| {
            when.method(POST).path("/_command/discover");
            then.status(500).body("boom");
        })
        .await;

    let client = relay_client().unwrap();
    let err = discover(&client, &service.base_url()).await.unwrap_err();

    assert!(matches!(err, CliError::Discovery(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn retry_gives_up_after_attempts() {
    let service = MockServer::start_async().await;
    let mock = service
        .mock_async(|when, then| {
            when.method(POST).path("/_command/discover");
            then.status(503);
        })
        .await;

    let client = relay_client().unwrap();
    let policy = RetryPolicy::new(3, Duration::from_millis(10));
    let err = discover_with_retry(&client, &service.base_url(), policy)
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Discovery(_)));
    mock.assert_hits_async(3).await;
}

#[tokio::test]
async fn retry_succeeds_once_service_is_up() {
    let service = MockServer::start_async().await;
    let mut booting = service
        .mock_async(|when, then| {
            when.method(POST).path("/_command/discover");
            then.status(503);
        })
        .await;

    let client = relay_client().unwrap();
    let policy = RetryPolicy::new(50, Duration::from_millis(20));

    let bring_up = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let early_hits = booting.hits_async().await;
        booting.delete_async().await;
        service
            .mock_async(|when, then| {
                when.method(POST).path("/_command/discover");
                then.status(200)
                    .json_body(json!({"businessLogic": {"handlers": ["hello"]}}));
            })
            .await;
        early_hits
    };

    let base_url = service.base_url();
    let (result, early_hits) =
        tokio::join!(discover_with_retry(&client, &base_url, policy), bring_up);

    let discovery = result.unwrap();
    assert!(early_hits >= 1);
    assert_eq!(discovery.business_logic.handlers, vec!["hello"]);
}
