use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::error::{Error, ProviderError};
use crate::providers::{DebridProvider, RealDebridClient};

fn client(server: &MockServer) -> RealDebridClient {
    RealDebridClient::new(&real_debrid_config(server), selector()).unwrap()
}

#[tokio::test]
async fn test_validate_sends_bearer_token_and_accepts_premium_account() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("Authorization", "Bearer rd-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "premium",
            "expiration": "2099-01-01T00:00:00.000Z",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client.validate().await);
    assert!(
        client.entitlement_expiry().is_some(),
        "validation records the entitlement expiry"
    );
}

#[tokio::test]
async fn test_validate_disabled_provider_makes_no_remote_calls() {
    let server = MockServer::start().await;
    forbid_all_requests(&server).await;

    let config = RealDebridConfig {
        enabled: false,
        ..real_debrid_config(&server)
    };
    let client = RealDebridClient::new(&config, selector()).unwrap();
    assert!(!client.validate().await);
}

#[tokio::test]
async fn test_validate_missing_api_key_makes_no_remote_calls() {
    let server = MockServer::start().await;
    forbid_all_requests(&server).await;

    let config = RealDebridConfig {
        api_key: String::new(),
        ..real_debrid_config(&server)
    };
    let client = RealDebridClient::new(&config, selector()).unwrap();
    assert!(!client.validate().await);
}

#[tokio::test]
async fn test_validate_rejects_expired_entitlement() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "premium",
            "expiration": "2020-01-01T00:00:00.000Z",
        })))
        .mount(&server)
        .await;

    assert!(!client(&server).validate().await);
}

#[tokio::test]
async fn test_validate_treats_server_error_as_not_usable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    // Transient entitlement failures must not escape validation.
    assert!(!client(&server).validate().await);
}

#[tokio::test]
async fn test_resolve_creates_torrent_and_sets_placement() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/torrents/instantAvailability/{HASH_ONE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            HASH_ONE: { "rd": [ { "1": { "filename": "Fight.Club.1999.1080p.mkv", "filesize": 1_400_000_000_u64 } } ] },
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/torrents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/torrents/addMagnet"))
        .and(body_string_contains(HASH_ONE))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "RDID1",
            "uri": "https://api.real-debrid.com/rest/1.0/torrents/info/RDID1",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/torrents/selectFiles/RDID1"))
        .and(body_string_contains("files=all"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/torrents/info/RDID1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "RDID1",
            "hash": HASH_ONE,
            "files": [
                { "path": "/Fight.Club.1999/sample.mkv", "bytes": 512 },
                { "path": "/Fight.Club.1999/Fight.Club.1999.1080p.mkv", "bytes": 1_400_000_000_u64 },
            ],
        })))
        .mount(&server)
        .await;

    let mut item = movie_item();
    client(&server).resolve(&mut item).await.unwrap();

    assert!(item.is_resolved());
    assert_eq!(item.file.as_deref(), Some("Fight.Club.1999.1080p.mkv"));
    assert_eq!(item.folder.as_deref(), Some("."));
    assert_eq!(item.alternative_folder.as_deref(), Some("."));
    assert_eq!(
        item.active_stream.as_ref().map(|s| s.infohash.as_str()),
        Some(HASH_ONE)
    );
}

#[tokio::test]
async fn test_resolve_without_cached_hash_leaves_item_unresolved() {
    let server = MockServer::start().await;

    // Real-Debrid reports uncached hashes as empty arrays.
    Mock::given(method("GET"))
        .and(path(format!("/torrents/instantAvailability/{HASH_ONE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            HASH_ONE: [],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/torrents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut item = movie_item();
    client(&server).resolve(&mut item).await.unwrap();

    assert!(!item.is_resolved());
    assert!(item.active_stream.is_none(), "no hash was adopted");
    assert!(item.file.is_none());
}

#[tokio::test]
async fn test_resolve_adopts_first_cached_hash_in_stream_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/torrents/instantAvailability/{HASH_ONE}/{HASH_TWO}"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            HASH_ONE: [],
            HASH_TWO: { "rd": [ { "1": { "filename": "Fight.Club.1999.mkv", "filesize": 900_000_000_u64 } } ] },
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/torrents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "RD99", "hash": HASH_TWO, "status": "downloaded" },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/torrents/addMagnet"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/torrents/info/RD99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "RD99",
            "files": [ { "path": "/Fight.Club.1999.mkv", "bytes": 900_000_000_u64 } ],
        })))
        .mount(&server)
        .await;

    let mut item = movie_item().with_stream(Stream::new(HASH_TWO, "Fight.Club.1999.720p"));
    client(&server).resolve(&mut item).await.unwrap();

    // Only the second hash was cached, so it is adopted; the existing
    // remote torrent is reused instead of adding the magnet again.
    assert_eq!(
        item.active_stream.as_ref().map(|s| s.infohash.as_str()),
        Some(HASH_TWO)
    );
    assert_eq!(item.file.as_deref(), Some("Fight.Club.1999.mkv"));
}

#[tokio::test]
async fn test_resolve_adopts_cached_hash_regardless_of_casing() {
    let server = MockServer::start().await;
    let upper = HASH_ONE.to_uppercase();

    // Availability keys come back lowercase even when the queried hash
    // is not.
    Mock::given(method("GET"))
        .and(path(format!("/torrents/instantAvailability/{upper}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            HASH_ONE: { "rd": [ { "1": { "filename": "Fight.Club.1999.1080p.mkv", "filesize": 1_400_000_000_u64 } } ] },
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/torrents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "RD1", "hash": HASH_ONE },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/torrents/info/RD1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "RD1",
            "files": [ { "path": "/Fight.Club.1999.1080p.mkv", "bytes": 1_400_000_000_u64 } ],
        })))
        .mount(&server)
        .await;

    // Built literally, bypassing Stream::new, so the item carries the
    // producer's own casing.
    let stream = Stream {
        infohash: upper,
        raw_title: "Fight.Club.1999.1080p.BluRay.x264".to_string(),
    };
    let mut item = MediaItem::new("tt0137523", "Fight Club", MediaKind::Movie).with_stream(stream);
    client(&server).resolve(&mut item).await.unwrap();

    assert!(
        item.active_stream.is_some(),
        "a hash reported cached must be adopted regardless of its casing"
    );
    assert_eq!(item.file.as_deref(), Some("Fight.Club.1999.1080p.mkv"));
}

#[tokio::test]
async fn test_resolve_surfaces_listing_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/torrents/instantAvailability/{HASH_ONE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            HASH_ONE: { "rd": [ { "1": { "filename": "Fight.Club.1999.mkv", "filesize": 900_000_000_u64 } } ] },
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/torrents"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut item = movie_item();
    let err = client(&server).resolve(&mut item).await.unwrap_err();
    match err {
        Error::Provider(ProviderError::Api {
            provider, status, ..
        }) => {
            assert_eq!(provider, "real-debrid");
            assert_eq!(status, 503);
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_resolve_with_no_matching_file_leaves_file_unset() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/torrents/instantAvailability/{HASH_ONE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            HASH_ONE: { "rd": [ { "1": { "filename": "sample.mkv", "filesize": 512 } } ] },
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/torrents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "RD7", "hash": HASH_ONE },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/torrents/info/RD7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "RD7",
            "files": [ { "path": "/sample.mkv", "bytes": 512 } ],
        })))
        .mount(&server)
        .await;

    let mut item = movie_item();
    client(&server).resolve(&mut item).await.unwrap();

    // The hash was adopted but nothing passed selection; not an error.
    assert!(item.active_stream.is_some());
    assert!(!item.is_resolved());
}
