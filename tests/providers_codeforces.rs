// tests/providers_codeforces.rs
use std::time::Duration;

use recent_actions_ingest::ingest::providers::codeforces::CodeforcesClient;
use recent_actions_ingest::{FeedClient, FeedError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base: &str) -> CodeforcesClient {
    CodeforcesClient::new(base, Duration::from_secs(5)).expect("client builds")
}

#[tokio::test]
async fn requests_max_count_and_returns_result_in_feed_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recentActions"))
        .and(query_param("maxCount", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "result": [
                {
                    "timeSeconds": 1700000100,
                    "blogEntry": {
                        "id": 1, "creationTimeSeconds": 1690000000,
                        "authorHandle": "MikeMirzayanov", "title": "Codeforces Round",
                        "locale": "en", "tags": [], "rating": 10
                    },
                    "comment": {
                        "id": 77, "creationTimeSeconds": 1700000100,
                        "commentatorHandle": "jiangly", "locale": "en",
                        "text": "orz", "parentCommentId": 70, "rating": 1
                    }
                },
                {
                    "timeSeconds": 1700000050,
                    "blogEntry": {
                        "id": 2, "creationTimeSeconds": 1700000050,
                        "authorHandle": "tourist", "title": "Editorial",
                        "locale": "en", "tags": ["editorial"], "rating": 0
                    }
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let actions = client(&server.uri()).fetch_recent(30).await.expect("fetch ok");
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].time_seconds, 1_700_000_100);
    assert_eq!(
        actions[0].comment.as_ref().map(|c| c.parent_comment_id),
        Some(Some(70))
    );
    assert_eq!(actions[1].time_seconds, 1_700_000_050);
    assert!(actions[1].comment.is_none());
    assert_eq!(actions[1].blog_entry.as_ref().unwrap().title, "Editorial");
}

#[tokio::test]
async fn failed_status_is_mapped_even_with_http_400() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recentActions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "FAILED",
            "comment": "maxCount: maxCount should be between 1 and 100"
        })))
        .mount(&server)
        .await;

    match client(&server.uri()).fetch_recent(1000).await {
        Err(FeedError::RemoteStatus { comment }) => {
            assert_eq!(comment, "maxCount: maxCount should be between 1 and 100");
        }
        other => panic!("expected RemoteStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recentActions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server.uri()).fetch_recent(10).await.unwrap_err();
    assert!(matches!(err, FeedError::ResponseParse(_)), "{err:?}");
}

#[tokio::test]
async fn result_items_missing_time_are_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recentActions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "result": [{ "comment": { "id": 1, "creationTimeSeconds": 1 } }]
        })))
        .mount(&server)
        .await;

    let err = client(&server.uri()).fetch_recent(10).await.unwrap_err();
    assert!(matches!(err, FeedError::ResponseParse(_)), "{err:?}");
}

#[tokio::test]
async fn slow_server_hits_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recentActions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "OK", "result": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let c = CodeforcesClient::new(server.uri(), Duration::from_millis(200)).unwrap();
    let err = c.fetch_recent(10).await.unwrap_err();
    assert!(matches!(err, FeedError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let err = client("http://127.0.0.1:1").fetch_recent(10).await.unwrap_err();
    assert!(matches!(err, FeedError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn unparsable_base_url_fails_request_construction() {
    let err = client("not a url").fetch_recent(10).await.unwrap_err();
    assert!(matches!(err, FeedError::RequestConstruction(_)), "{err:?}");
}
