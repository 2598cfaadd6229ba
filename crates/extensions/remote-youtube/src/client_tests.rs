use super::*;

fn update(remote_id: &str, video_id: Option<&str>, position: u32) -> PositionUpdate {
    PositionUpdate {
        collection_id: "PL123".to_string(),
        remote_id: remote_id.to_string(),
        video_id: video_id.map(str::to_string),
        position,
    }
}

#[test]
fn test_default_api_url() {
    let client = YouTubePlaylistClient::new("token".to_string());
    assert_eq!(client.api_url, DEFAULT_API_URL);
    assert_eq!(client.page_size, 50);
    assert!(!client.fetch_all_pages);
}

#[test]
fn test_custom_url_trailing_slash() {
    let client = YouTubePlaylistClient::with_url(None, "http://localhost:9000/v3/".to_string());
    assert_eq!(client.endpoint(), "http://localhost:9000/v3/playlistItems");
}

#[test]
fn test_page_size_clamped() {
    let client = YouTubePlaylistClient::with_url(None, DEFAULT_API_URL.to_string()).with_page_size(500);
    assert_eq!(client.page_size, 50);
    let client = YouTubePlaylistClient::with_url(None, DEFAULT_API_URL.to_string()).with_page_size(0);
    assert_eq!(client.page_size, 1);
}

#[test]
fn test_from_config() {
    let config = RemoteConfig {
        base_url: "http://localhost:9000".to_string(),
        playlist_id: Some("PL123".to_string()),
        access_token: Some("token".to_string()),
        api_key: Some("key".to_string()),
        page_size: 25,
        fetch_all_pages: true,
        timeout_secs: 5,
    };
    let client = YouTubePlaylistClient::from_config(&config).unwrap();
    assert_eq!(client.api_url, "http://localhost:9000");
    assert_eq!(client.access_token.as_deref(), Some("token"));
    assert_eq!(client.api_key.as_deref(), Some("key"));
    assert_eq!(client.page_size, 25);
    assert!(client.fetch_all_pages);
}

#[test]
fn test_classify_error() {
    let envelope = |reason: &str| {
        format!(r#"{{"error": {{"message": "failed", "errors": [{{"reason": "{reason}"}}]}}}}"#)
    };

    assert!(matches!(
        classify_error(401, &envelope("authError")),
        RemoteError::AuthenticationFailed(_)
    ));
    assert!(matches!(
        classify_error(403, &envelope("forbidden")),
        RemoteError::AuthenticationFailed(_)
    ));
    assert!(matches!(
        classify_error(403, &envelope("quotaExceeded")),
        RemoteError::Api { status: 403, .. }
    ));
    assert!(matches!(
        classify_error(404, &envelope("playlistNotFound")),
        RemoteError::CollectionNotFound(_)
    ));
    assert!(matches!(
        classify_error(404, &envelope("playlistItemNotFound")),
        RemoteError::Api { status: 404, .. }
    ));
    assert!(matches!(classify_error(502, "Bad Gateway"), RemoteError::Api { status: 502, .. }));
}

// Wiremock-based tests for actual HTTP calls
mod http_tests {
    use super::*;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn page(items: &[(&str, &str, &str)], next: Option<&str>) -> serde_json::Value {
        let items: Vec<serde_json::Value> = items
            .iter()
            .enumerate()
            .map(|(i, (id, title, video))| {
                serde_json::json!({
                    "id": id,
                    "snippet": {
                        "title": title,
                        "position": i,
                        "resourceId": { "kind": "youtube#video", "videoId": video }
                    }
                })
            })
            .collect();
        match next {
            Some(token) => serde_json::json!({ "items": items, "nextPageToken": token }),
            None => serde_json::json!({ "items": items }),
        }
    }

    #[tokio::test]
    async fn test_fetch_items_single_page() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/playlistItems"))
            .and(matchers::query_param("part", "snippet"))
            .and(matchers::query_param("maxResults", "50"))
            .and(matchers::query_param("playlistId", "PL123"))
            .and(matchers::header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                &[("i1", "2024 1 1 10 0 0", "v1"), ("i2", "2023 5 6 9 30 0", "v2")],
                Some("NEXT"),
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            YouTubePlaylistClient::with_url(Some("test-token".to_string()), mock_server.uri());
        let items = client.fetch_items("PL123").await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].remote_id, "i1");
        assert_eq!(items[0].label, "2024 1 1 10 0 0");
        assert_eq!(items[1].video_id.as_deref(), Some("v2"));
        assert_eq!(items[1].position, Some(1));
    }

    #[tokio::test]
    async fn test_fetch_items_all_pages() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/playlistItems"))
            .and(matchers::query_param("pageToken", "PAGE2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(page(&[("i3", "third", "v3")], None)),
            )
            .with_priority(1)
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/playlistItems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                &[("i1", "first", "v1"), ("i2", "second", "v2")],
                Some("PAGE2"),
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = YouTubePlaylistClient::with_url(None, mock_server.uri())
            .with_fetch_all_pages(true);
        let items = client.fetch_items("PL123").await.unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.remote_id.as_str()).collect();
        assert_eq!(ids, vec!["i1", "i2", "i3"]);
    }

    #[tokio::test]
    async fn test_fetch_items_with_api_key() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/playlistItems"))
            .and(matchers::query_param("key", "api-key"))
            .and(matchers::query_param("maxResults", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(&[], None)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = YouTubePlaylistClient::with_url(None, mock_server.uri())
            .with_api_key("api-key".to_string())
            .with_page_size(10);
        let items = client.fetch_items("PL123").await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_items_api_error() {
        let mock_server = MockServer::start().await;

        let error_body = r#"{"error": {"code": 403, "message": "The request is not properly authorized.",
            "errors": [{"reason": "forbidden"}]}}"#;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/playlistItems"))
            .respond_with(ResponseTemplate::new(403).set_body_string(error_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = YouTubePlaylistClient::with_url(Some("expired".to_string()), mock_server.uri());
        let err = client.fetch_items("PL123").await.unwrap_err();

        assert!(err.is_auth_failure());
        match err {
            RemoteError::AuthenticationFailed(message) => {
                assert!(message.contains("not properly authorized"));
                assert!(message.contains("forbidden"));
            }
            other => panic!("Expected AuthenticationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_items_playlist_not_found() {
        let mock_server = MockServer::start().await;

        let error_body = r#"{"error": {"code": 404, "message": "Playlist not found.",
            "errors": [{"reason": "playlistNotFound"}]}}"#;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/playlistItems"))
            .respond_with(ResponseTemplate::new(404).set_body_string(error_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = YouTubePlaylistClient::with_url(Some("token".to_string()), mock_server.uri());
        let err = client.fetch_items("PL-missing").await.unwrap_err();

        assert!(matches!(err, RemoteError::CollectionNotFound(ref m) if m.contains("Playlist not found")));
        assert!(!err.is_auth_failure());
    }

    #[tokio::test]
    async fn test_set_position_quota_exceeded_is_api_error() {
        let mock_server = MockServer::start().await;

        let error_body = r#"{"error": {"code": 403, "message": "Quota exceeded.",
            "errors": [{"reason": "quotaExceeded"}]}}"#;

        Mock::given(matchers::method("PUT"))
            .and(matchers::path("/playlistItems"))
            .respond_with(ResponseTemplate::new(403).set_body_string(error_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = YouTubePlaylistClient::with_url(Some("token".to_string()), mock_server.uri());
        let err = client
            .set_position(update("PLI-1", Some("vid1"), 0))
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Api { status: 403, .. }));
        assert!(!err.is_auth_failure());
    }

    #[tokio::test]
    async fn test_fetch_items_invalid_body() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/playlistItems"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = YouTubePlaylistClient::with_url(None, mock_server.uri());
        let err = client.fetch_items("PL123").await.unwrap_err();
        assert!(matches!(err, RemoteError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_items_network_error() {
        let client = YouTubePlaylistClient::with_url(None, "http://127.0.0.1:1".to_string());
        let err = client.fetch_items("PL123").await.unwrap_err();
        assert!(matches!(err, RemoteError::Network(_)));
    }

    #[tokio::test]
    async fn test_set_position_sends_update() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("PUT"))
            .and(matchers::path("/playlistItems"))
            .and(matchers::query_param("part", "snippet"))
            .and(matchers::header("Authorization", "Bearer test-token"))
            .and(matchers::body_json(serde_json::json!({
                "id": "i2",
                "snippet": {
                    "playlistId": "PL123",
                    "position": 0,
                    "resourceId": { "kind": "youtube#video", "videoId": "v2" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "i2" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            YouTubePlaylistClient::with_url(Some("test-token".to_string()), mock_server.uri());
        client.set_position(update("i2", Some("v2"), 0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_position_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("PUT"))
            .and(matchers::path("/playlistItems"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Backend Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = YouTubePlaylistClient::with_url(None, mock_server.uri());
        let err = client.set_position(update("i2", Some("v2"), 4)).await.unwrap_err();
        match err {
            RemoteError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Backend Error");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_set_position_requires_video_id() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = YouTubePlaylistClient::with_url(None, mock_server.uri());
        let err = client.set_position(update("i2", None, 0)).await.unwrap_err();
        assert!(matches!(err, RemoteError::InvalidResponse(_)));
    }
}
