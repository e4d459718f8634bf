/// HTTP API tests
///
/// Drive the full router in-process against a temporary storage directory.
use aelia_id::{config::ServerConfig, context::AppContext, server::build_router};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const BASE_URL: &str = "http://cards.test";
const BOUNDARY: &str = "aelia-test-boundary";
const MIB: usize = 1024 * 1024;

async fn test_app() -> (TempDir, Router) {
    let dir = tempdir().unwrap();
    let root = dir.path().to_string_lossy().into_owned();

    let config = ServerConfig::from_lookup(|key| match key {
        "AELIA_STORAGE_DIR" => Some(root.clone()),
        "BASE_URL" => Some(BASE_URL.to_string()),
        _ => None,
    })
    .unwrap();

    let ctx = AppContext::new(config).await.unwrap();
    (dir, build_router(ctx))
}

fn multipart_body(texts: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in texts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (name, file_name, data) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(texts: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/cards")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(texts, files)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_liveness() {
    let (_dir, app) = test_app().await;
    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "Aelia backend running ✔");
}

#[tokio::test]
async fn test_create_without_files() {
    let (_dir, app) = test_app().await;

    let request = multipart_request(&[("name", "Ada Lovelace"), ("idnum", "AEL-001")], &[]);
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["card"]["idnum"], "AEL-001");
    assert_eq!(body["card"]["name"], "Ada Lovelace");
    assert_eq!(body["card"]["photo"], "");
    assert_eq!(body["card"]["position"], "");
    assert!(body["card"]["createdAt"].is_string());

    let barcode_url = body["urls"]["barcode"].as_str().unwrap();
    assert!(barcode_url.starts_with(BASE_URL));
    assert!(barcode_url.ends_with(".png"));
    assert_eq!(body["urls"]["photo"], "");
    assert_eq!(body["urls"]["scanner"], "");
}

#[tokio::test]
async fn test_create_from_json_body() {
    let (_dir, app) = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/cards")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Grace Hopper","position":"Admiral"}"#))
        .unwrap();
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"]["position"], "Admiral");
    assert_eq!(body["card"]["idnum"], "");
    assert!(body["card"]["barcode"]
        .as_str()
        .unwrap()
        .starts_with("/static/uploads/"));
}

#[tokio::test]
async fn test_uploaded_assets_are_served() {
    let (_dir, app) = test_app().await;

    let photo: &[u8] = b"not really a jpeg";
    let request = multipart_request(&[("name", "Ada")], &[("photo", "face.jpg", photo)]);
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let photo_path = body["card"]["photo"].as_str().unwrap();
    assert!(photo_path.starts_with("/static/uploads/"));
    assert!(photo_path.ends_with(".jpg"));
    assert_eq!(body["urls"]["photo"], format!("{}{}", BASE_URL, photo_path));

    let (status, served) = send(&app, get(photo_path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, photo);

    let barcode_path = body["card"]["barcode"].as_str().unwrap();
    let (status, png) = send(&app, get(barcode_path)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[tokio::test]
async fn test_get_rewrites_urls_and_list_does_not() {
    let (_dir, app) = test_app().await;

    let request = multipart_request(&[("name", "Ada"), ("email", "ada@example.org")], &[]);
    let (_, created) = send_json(&app, request).await;
    let id = created["card"]["id"].as_str().unwrap();

    let (status, card) = send_json(&app, get(&format!("/api/cards/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["email"], "ada@example.org");
    assert_eq!(card["photo"], "");
    assert_eq!(card["barcode"], created["urls"]["barcode"]);

    let (status, list) = send_json(&app, get("/api/cards")).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["barcode"], created["card"]["barcode"]);
}

#[tokio::test]
async fn test_get_unknown_card() {
    let (_dir, app) = test_app().await;
    let (status, body) = send_json(&app, get("/api/cards/doesnotexist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Card not found" }));
}

#[tokio::test]
async fn test_delete_card() {
    let (_dir, app) = test_app().await;

    let (_, created) = send_json(&app, multipart_request(&[("name", "Ada")], &[])).await;
    let id = created["card"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/cards/{}", id);

    let (status, body) = send_json(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["deleted"]["id"], id.as_str());

    let (status, _) = send_json(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send_json(&app, get("/api/cards")).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, body) = send_json(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "ok": false, "error": "Card not found" }));
}

#[tokio::test]
async fn test_upload_size_boundary() {
    let (dir, app) = test_app().await;

    let exact = vec![7u8; 8 * MIB];
    let request = multipart_request(&[("name", "Exact")], &[("scanner", "scan.png", exact.as_slice())]);
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["card"]["scanner"].as_str().unwrap().ends_with(".png"));

    let over = vec![7u8; 8 * MIB + 1];
    let request = multipart_request(&[("name", "Over")], &[("scanner", "scan.png", over.as_slice())]);
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("scanner"));

    // Only the first card and its two blobs exist
    let (_, list) = send_json(&app, get("/api/cards")).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let stored = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
    assert_eq!(stored, 2);
}

#[tokio::test]
async fn test_duplicate_file_field_rejected() {
    let (_dir, app) = test_app().await;

    let request = multipart_request(
        &[("name", "Twice")],
        &[("photo", "a.png", &b"one"[..]), ("photo", "b.png", &b"two"[..])],
    );
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));

    let (_, list) = send_json(&app, get("/api/cards")).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_ascii_idnum_fails_generation() {
    let (_dir, app) = test_app().await;

    let request = multipart_request(&[("name", "Zoë"), ("idnum", "ZÖË-1")], &[]);
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("Barcode"));

    let (_, list) = send_json(&app, get("/api/cards")).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_route() {
    let (_dir, app) = test_app().await;
    let (status, body) = send_json(&app, get("/api/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["ok"], json!(false));
}

#[tokio::test]
async fn test_create_from_urlencoded_body() {
    let (_dir, app) = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/cards")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("name=Ada+L&idnum=X-9&email=ada%40example.org"))
        .unwrap();
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"]["name"], "Ada L");
    assert_eq!(body["card"]["idnum"], "X-9");
    assert_eq!(body["card"]["email"], "ada@example.org");
    assert_eq!(body["card"]["photo"], "");
}

#[tokio::test]
async fn test_empty_file_part_is_skipped() {
    let (_dir, app) = test_app().await;

    let empty: &[u8] = &[];
    let request = multipart_request(
        &[("name", "Ada")],
        &[("photo", "", empty), ("logo", "logo.png", &b"logo"[..])],
    );
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"]["photo"], "");
    assert_eq!(body["urls"]["photo"], "");
    assert!(body["card"]["logo"].as_str().unwrap().ends_with(".png"));
}

#[tokio::test]
async fn test_unknown_form_fields_are_ignored() {
    let (_dir, app) = test_app().await;

    let request = multipart_request(
        &[("name", "Ada"), ("nickname", "Countess")],
        &[("avatar", "a.png", &b"avatar"[..])],
    );
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"]["name"], "Ada");
    assert!(body["card"].get("nickname").is_none());
    assert!(body["card"].get("avatar").is_none());
}

#[tokio::test]
async fn test_overlong_idnum_fails_generation() {
    let (_dir, app) = test_app().await;

    let idnum = "A".repeat(12_000);
    let request = multipart_request(&[("name", "Ada"), ("idnum", idnum.as_str())], &[]);
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("Barcode"));

    let (_, list) = send_json(&app, get("/api/cards")).await;
    assert!(list.as_array().unwrap().is_empty());
}
