use remixitt::{Config, RedditClient, RedditError};
use wiremock::matchers::{bearer_token, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn get_test_config(api_base_url: String) -> Config {
    Config {
        client_id: "test_client_id".to_string(),
        client_secret: "test_client_secret".to_string(),
        redirect_uri: "http://localhost:3000/auth/redirect".to_string(),
        encryption_key: [0u8; 32],
        port: 3000,
        auth_base_url: "http://127.0.0.1:1".to_string(),
        api_base_url,
        secure_cookies: true,
    }
}

fn post_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "kind": "t3",
        "data": {
            "id": id,
            "author": "someone",
            "author_fullname": "t2_someone",
            "title": format!("Post {}", id),
            "selftext": "",
            "selftext_html": null,
            "subreddit": "rust",
            "url": format!("https://example.com/{}", id),
            "thumbnail": "default",
            "created_utc": 1700000000.0
        }
    })
}

fn listing(children: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({ "kind": "Listing", "data": { "after": null, "children": children } })
}

/// First page: Bearer auth, show=all, no cursor
#[tokio::test]
async fn test_fetch_first_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/best"))
        .and(query_param("show", "all"))
        .and(bearer_token("valid_token"))
        .and(header("user-agent", "Remixitt/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![post_json("1")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RedditClient::new(&get_test_config(mock_server.uri())).unwrap();
    let posts = client.fetch_page("valid_token", None).await.unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "1");
    assert_eq!(posts[0].subreddit, "rust");
}

/// The cursor is sent as a t3_ fullname
#[tokio::test]
async fn test_fetch_page_with_cursor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/best"))
        .and(query_param("show", "all"))
        .and(query_param("after", "t3_abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing(vec![post_json("def"), post_json("ghi")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RedditClient::new(&get_test_config(mock_server.uri())).unwrap();
    let posts = client.fetch_page("valid_token", Some("abc")).await.unwrap();

    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["def", "ghi"]);
}

/// End of feed is an empty list, not an error
#[tokio::test]
async fn test_fetch_page_end_of_feed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/best"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![])))
        .mount(&mock_server)
        .await;

    let client = RedditClient::new(&get_test_config(mock_server.uri())).unwrap();
    let posts = client.fetch_page("valid_token", Some("last")).await.unwrap();

    assert!(posts.is_empty());
}

/// Expired token surfaces as Unauthorized, once
#[tokio::test]
async fn test_fetch_page_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/best"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Unauthorized",
            "error": 401
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RedditClient::new(&get_test_config(mock_server.uri())).unwrap();
    let result = client.fetch_page("expired_token", None).await;

    match result {
        Err(RedditError::Unauthorized) => {}
        other => panic!("Expected Unauthorized, got {:?}", other),
    }
}

/// Other statuses carry status and body
#[tokio::test]
async fn test_fetch_page_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/best"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RedditClient::new(&get_test_config(mock_server.uri())).unwrap();

    match client.fetch_page("token", None).await {
        Err(RedditError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

/// Undecodable bodies are wrapped in a single descriptive error
#[tokio::test]
async fn test_fetch_page_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/best"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = RedditClient::new(&get_test_config(mock_server.uri())).unwrap();
    let err = client.fetch_page("token", None).await.unwrap_err();

    assert!(matches!(err, RedditError::Decode(_)));
    assert!(err.to_string().starts_with("Failed to fetch home page"));
}

/// Transport failures are errors too
#[tokio::test]
async fn test_fetch_page_connection_refused() {
    let client = RedditClient::new(&get_test_config("http://127.0.0.1:1".to_string())).unwrap();

    assert!(matches!(
        client.fetch_page("token", None).await,
        Err(RedditError::Http(_))
    ));
}
