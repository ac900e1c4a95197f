//! Media passthrough path (`?target=`).

use axum::http::{header, StatusCode};
use music_proxy::HttpServer;

mod common;

use common::{body_bytes, body_json, config_for, send, send_with_headers, MockResponse};

fn encode(url: &str) -> String {
    urlencoding::encode(url).into_owned()
}

#[tokio::test]
async fn test_range_request_is_relayed() {
    let upstream = common::start_mock_backend(
        MockResponse::ok("0123456789")
            .status(206, "Partial Content")
            .header("Content-Type", "audio/mpeg")
            .header("Content-Range", "bytes 0-9/100")
            .header("Accept-Ranges", "bytes")
            .header("Set-Cookie", "cdn=1")
            .header("X-Cache", "HIT"),
    )
    .await;
    let server = HttpServer::new(config_for(&upstream)).unwrap();
    let target = upstream.url("/song/a.mp3?token=abc");

    let response = send_with_headers(
        server.router(),
        "GET",
        &format!("/?target={}", encode(&target)),
        &[("Range", "bytes=0-9"), ("Cookie", "mine=1")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let headers = response.headers().clone();
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "audio/mpeg");
    assert_eq!(headers.get(header::CONTENT_RANGE).unwrap(), "bytes 0-9/100");
    assert_eq!(headers.get(header::ACCEPT_RANGES).unwrap(), "bytes");
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "public, max-age=3600");
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    assert!(headers.get(header::SET_COOKIE).is_none());
    assert!(headers.get("x-cache").is_none());
    assert_eq!(body_bytes(response).await, b"0123456789".to_vec());

    let seen = upstream.last_request();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.target, "/song/a.mp3?token=abc");
    assert_eq!(seen.header("range"), Some("bytes=0-9"));
    assert_eq!(seen.header("referer"), Some("https://music-api.gdstudio.xyz/"));
    assert_eq!(seen.header("user-agent"), Some("Mozilla/5.0"));
    assert_eq!(seen.header("cookie"), None);
}

#[tokio::test]
async fn test_double_encoded_target() {
    let upstream = common::start_mock_backend(MockResponse::ok("img")).await;
    let server = HttpServer::new(config_for(&upstream)).unwrap();
    let target = upstream.url("/cover.jpg?size=300");

    let response = send(
        server.router(),
        "GET",
        &format!("/?target={}", encode(&encode(&target))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.last_request().target, "/cover.jpg?size=300");
}

#[tokio::test]
async fn test_upstream_cache_control_wins() {
    let upstream = common::start_mock_backend(
        MockResponse::ok("x").header("Cache-Control", "private, max-age=5"),
    )
    .await;
    let server = HttpServer::new(config_for(&upstream)).unwrap();

    let response = send(
        server.router(),
        "GET",
        &format!("/?target={}", encode(&upstream.url("/a.mp3"))),
    )
    .await;
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "private, max-age=5"
    );
}

#[tokio::test]
async fn test_head_is_forwarded_as_head() {
    let upstream = common::start_mock_backend(
        MockResponse::ok("0123456789").header("Content-Type", "audio/flac"),
    )
    .await;
    let server = HttpServer::new(config_for(&upstream)).unwrap();

    let response = send_with_headers(
        server.router(),
        "HEAD",
        &format!("/?target={}", encode(&upstream.url("/b.flac"))),
        &[("User-Agent", "player/1")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let seen = upstream.last_request();
    assert_eq!(seen.method, "HEAD");
    assert_eq!(seen.header("user-agent"), Some("player/1"));
}

#[tokio::test]
async fn test_upstream_error_status_is_preserved() {
    let upstream =
        common::start_mock_backend(MockResponse::ok("gone").status(404, "Not Found")).await;
    let server = HttpServer::new(config_for(&upstream)).unwrap();

    let response = send(
        server.router(),
        "GET",
        &format!("/?target={}", encode(&upstream.url("/missing.mp3"))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(response).await, b"gone".to_vec());
}

#[tokio::test]
async fn test_non_http_schemes_are_rejected() {
    let upstream = common::start_mock_backend(MockResponse::ok("")).await;
    let server = HttpServer::new(config_for(&upstream)).unwrap();

    for target in ["ftp://files.example/a.mp3", "file:///etc/passwd", "javascript:alert(1)", "not a url"] {
        let response = send(
            server.router(),
            "GET",
            &format!("/?target={}", encode(target)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{target}");
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        assert_eq!(body_bytes(response).await, b"Invalid protocol".to_vec());
    }
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_unreachable_target_is_bad_gateway() {
    let server = HttpServer::new(music_proxy::ProxyConfig::default()).unwrap();
    let target = format!("http://{}/a.mp3", common::closed_addr().await);

    let response = send(
        server.router(),
        "GET",
        &format!("/?target={}", encode(&target)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert!(json["error"].as_str().is_some_and(|m| !m.is_empty()));
    assert!(json.get("timestamp").is_none());
}

#[tokio::test]
async fn test_target_wins_over_types() {
    let upstream = common::start_mock_backend(MockResponse::ok("audio")).await;
    let server = HttpServer::new(config_for(&upstream)).unwrap();

    let response = send(
        server.router(),
        "GET",
        &format!("/?types=search&name=x&target={}", encode(&upstream.url("/t.mp3"))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.last_request().target, "/t.mp3");
}
