//! HTTP-level tests for the provider clients and the resolver facade,
//! backed by wiremock servers.

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::{HashCacheConfig, RealDebridConfig, SelectionConfig, TorBoxConfig};
use crate::hash_cache::HashCache;
use crate::selection::FileSelector;
use crate::types::{MediaItem, MediaKind, Stream};

mod real_debrid;

const HASH_ONE: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const HASH_TWO: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

fn real_debrid_config(server: &MockServer) -> RealDebridConfig {
    RealDebridConfig {
        enabled: true,
        api_key: "rd-test-key".to_string(),
        base_url: server.uri(),
        proxy_url: None,
    }
}

fn torbox_config(server: &MockServer) -> TorBoxConfig {
    TorBoxConfig {
        enabled: true,
        api_key: "tb-test-key".to_string(),
        base_url: server.uri(),
        usenet_enabled: false,
    }
}

fn selector() -> FileSelector {
    FileSelector::new(&SelectionConfig::default())
}

fn hash_cache() -> Arc<HashCache> {
    Arc::new(HashCache::new(HashCacheConfig::default()))
}

fn movie_item() -> MediaItem {
    MediaItem::new("tt0137523", "Fight Club", MediaKind::Movie)
        .with_stream(Stream::new(HASH_ONE, "Fight.Club.1999.1080p.BluRay.x264"))
}

async fn mount_real_debrid_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 42,
            "username": "tester",
            "type": "premium",
            "expiration": "2099-01-01T00:00:00.000Z",
        })))
        .mount(server)
        .await;
}

async fn mount_torbox_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "detail": "user retrieved",
            "data": { "premium_expires_at": "2099-01-01T00:00:00Z" },
        })))
        .mount(server)
        .await;
}

/// Reject every request; mounts with `.expect(0)` assert a path is never hit.
async fn forbid_all_requests(server: &MockServer) {
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

#[test]
fn magnet_link_urlencodes_the_display_name() {
    let link = super::magnet_link(HASH_ONE, "Fight Club (1999)");
    assert_eq!(
        link,
        format!("magnet:?xt=urn:btih:{HASH_ONE}&dn=Fight%20Club%20%281999%29&tr=")
    );
}

#[test]
fn parse_base_url_accepts_http_and_rejects_garbage() {
    assert!(super::parse_base_url("https://api.example.com/v1", "torbox.base_url").is_ok());
    assert!(super::parse_base_url("not a url", "real_debrid.base_url").is_err());
    assert!(
        super::parse_base_url("mailto:user@example.com", "torbox.base_url").is_err(),
        "path-less schemes cannot carry endpoints"
    );
}
