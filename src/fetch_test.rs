use std::path::PathBuf;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::*;

// =============================================================================
// Helpers
// =============================================================================

fn fetcher(max_bytes: usize) -> HttpFetcher {
    let config = SessionConfig { max_image_bytes: max_bytes, ..SessionConfig::default() };
    HttpFetcher::new(&config).unwrap()
}

async fn temp_file(contents: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("emojiart-fetch-{}.bin", uuid::Uuid::new_v4()));
    tokio::fs::write(&path, contents).await.unwrap();
    path
}

fn file_url(path: &std::path::Path) -> String {
    Url::from_file_path(path).unwrap().to_string()
}

/// Serve exactly one HTTP response on an ephemeral port and return its URL.
async fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        let head = format!("HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n", body.len());
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(body).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}/bg.png")
}

// =============================================================================
// URL handling
// =============================================================================

#[tokio::test]
async fn unparseable_url_is_invalid() {
    let err = fetcher(1024).fetch("not a url").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl(_)));
}

#[tokio::test]
async fn unsupported_scheme_is_rejected() {
    let err = fetcher(1024).fetch("ftp://example.test/a.png").await.unwrap_err();
    assert!(matches!(err, FetchError::UnsupportedScheme(ref s) if s == "ftp"));
}

// =============================================================================
// file://
// =============================================================================

#[tokio::test]
async fn file_url_reads_bytes() {
    let path = temp_file(b"local image").await;
    let bytes = fetcher(1024).fetch(&file_url(&path)).await.unwrap();
    assert_eq!(bytes, b"local image");
    tokio::fs::remove_file(&path).await.unwrap();
}

#[tokio::test]
async fn file_over_cap_is_too_large() {
    let path = temp_file(&[0u8; 64]).await;
    let err = fetcher(16).fetch(&file_url(&path)).await.unwrap_err();
    assert!(matches!(err, FetchError::TooLarge { limit: 16 }));
    tokio::fs::remove_file(&path).await.unwrap();
}

#[tokio::test]
async fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join(format!("emojiart-missing-{}.png", uuid::Uuid::new_v4()));
    let err = fetcher(1024).fetch(&file_url(&path)).await.unwrap_err();
    assert!(matches!(err, FetchError::Io(_)));
}

// =============================================================================
// http://
// =============================================================================

#[tokio::test]
async fn http_success_returns_body() {
    let url = serve_once("200 OK", b"png-bytes").await;
    let bytes = fetcher(1024).fetch(&url).await.unwrap();
    assert_eq!(bytes, b"png-bytes");
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let url = serve_once("404 Not Found", b"nope").await;
    let err = fetcher(1024).fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Status(404)));
}

#[tokio::test]
async fn http_body_over_cap_is_too_large() {
    let url = serve_once("200 OK", b"0123456789abcdef0123").await;
    let err = fetcher(8).fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::TooLarge { limit: 8 }));
}

#[test]
fn exceeds_compares_against_cap() {
    assert!(!exceeds(8, 8));
    assert!(exceeds(9, 8));
}
