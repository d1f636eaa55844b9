//! End-to-end scenarios against the assembled router.
//!
//! The media CDN is replaced by an in-process fake that records how often it
//! was called, so tests can assert that rejected uploads never reach it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use platefeed_server::api::{build_router, AppState};
use platefeed_server::config::ServerConfig;
use platefeed_server::error::ApiError;
use platefeed_server::media::{media_kind_for, MediaStorage, MediaUpload};
use platefeed_server::token::{PrincipalKind, TokenAuthority};
use platefeed_store::Database;

struct FakeMedia {
    uploads: AtomicUsize,
}

#[async_trait]
impl MediaStorage for FakeMedia {
    async fn upload(&self, content_type: &str, _data: Vec<u8>) -> Result<MediaUpload, ApiError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(MediaUpload {
            url: format!("https://cdn.test/food_items/{}", Uuid::new_v4()),
            kind: media_kind_for(content_type).expect("fake only sees allowed types"),
        })
    }
}

fn test_config() -> ServerConfig {
    ServerConfig {
        http_addr: ([127, 0, 0, 1], 0).into(),
        database_path: "unused".into(),
        token_secret: [9u8; 32],
        storage_public_key: "pk_test".into(),
        storage_private_key: "sk_test".into(),
        storage_url_endpoint: "https://cdn.test".into(),
        max_media_size: 50 * 1024 * 1024,
    }
}

fn test_app() -> (Router, AppState, Arc<FakeMedia>) {
    let media = Arc::new(FakeMedia {
        uploads: AtomicUsize::new(0),
    });
    let state = AppState {
        db: Arc::new(Database::open_in_memory().unwrap()),
        tokens: TokenAuthority::new([9u8; 32]),
        media: media.clone(),
        config: Arc::new(test_config()),
    };
    (build_router(state.clone()), state, media)
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(COOKIE, c);
    }
    let request = match body {
        Some(v) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(';').next().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json, set_cookie)
}

async fn register_partner(app: &Router, email: &str) -> String {
    let (status, _, cookie) = send_json(
        app,
        "POST",
        "/auth/foodPartner/register",
        Some(json!({
            "email": email,
            "password": "s3cret!",
            "restaurantName": "Noodle Bar",
            "contactName": "Kim",
            "phone": "555-0142",
            "address": "3 Canal St",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    cookie.expect("partner registration sets a session cookie")
}

async fn register_user(app: &Router, email: &str) -> String {
    let (status, body, cookie) = send_json(
        app,
        "POST",
        "/auth/user/register",
        Some(json!({
            "fullName": "Pat Doe",
            "email": email,
            "password": "hunter2",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], email);
    assert!(body["user"].get("passwordHash").is_none());
    cookie.expect("user registration sets a session cookie")
}

fn multipart_food_request(cookie: &str, content_type: &str, filename: &str) -> Request<Body> {
    let boundary = "testboundary7b3f";
    let mut body = String::new();
    for (name, value) in [
        ("name", "Margherita"),
        ("description", "wood-fired"),
        ("price", "12.50"),
        ("category", "pizza"),
    ] {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"media\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\r\nnot-really-pixels\r\n--{boundary}--\r\n"
    ));

    Request::builder()
        .method("POST")
        .uri("/food/")
        .header(COOKIE, cookie)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn full_like_lifecycle() {
    let (app, _, media) = test_app();

    // Partner publishes an item.
    let partner_cookie = register_partner(&app, "bar@example.com").await;
    let response = app
        .clone()
        .oneshot(multipart_food_request(&partner_cookie, "image/jpeg", "m.jpg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let created: Value = serde_json::from_slice(&bytes).unwrap();
    let food_id = created["foodinstance"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["foodinstance"]["like_count"], 0);
    assert_eq!(media.uploads.load(Ordering::SeqCst), 1);

    // Feed is public and includes the new item.
    let (status, feed, _) = send_json(&app, "GET", "/food/getAll", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["fooditems"][0]["id"], food_id.as_str());
    assert_eq!(feed["fooditems"][0]["like_count"], 0);

    // User likes, feed reflects it, second like un-likes.
    let user_cookie = register_user(&app, "pat@example.com").await;
    let (status, body, _) = send_json(
        &app,
        "POST",
        "/food/like",
        Some(json!({ "foodId": food_id })),
        Some(&user_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Liked");

    let (_, feed, _) = send_json(&app, "GET", "/food/getAll", None, None).await;
    assert_eq!(feed["fooditems"][0]["like_count"], 1);

    let (status, body, _) = send_json(
        &app,
        "POST",
        "/food/like",
        Some(json!({ "foodId": food_id })),
        Some(&user_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Unliked");

    let (_, feed, _) = send_json(&app, "GET", "/food/getAll", None, None).await;
    assert_eq!(feed["fooditems"][0]["like_count"], 0);
}

#[tokio::test]
async fn save_roundtrip_shows_in_saved_list() {
    let (app, _, _) = test_app();
    let partner_cookie = register_partner(&app, "bar@example.com").await;
    let response = app
        .clone()
        .oneshot(multipart_food_request(&partner_cookie, "video/mp4", "m.mp4"))
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let created: Value = serde_json::from_slice(&bytes).unwrap();
    let food_id = created["foodinstance"]["id"].as_str().unwrap().to_string();

    let user_cookie = register_user(&app, "pat@example.com").await;

    let (status, body, _) = send_json(
        &app,
        "POST",
        "/food/save",
        Some(json!({ "foodId": food_id })),
        Some(&user_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Saved");

    let (_, body, _) = send_json(&app, "GET", "/food/savedfood", None, Some(&user_cookie)).await;
    assert_eq!(body["foodInstances"][0]["id"], food_id.as_str());
    assert_eq!(body["foodInstances"][0]["media_kind"], "video");

    let (_, body, _) = send_json(
        &app,
        "POST",
        "/food/save",
        Some(json!({ "foodId": food_id })),
        Some(&user_cookie),
    )
    .await;
    assert_eq!(body["message"], "Unsaved");

    let (_, body, _) = send_json(&app, "GET", "/food/savedfood", None, Some(&user_cookie)).await;
    assert_eq!(body["foodInstances"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unauthenticated_create_food_is_401() {
    let (app, _, media) = test_app();
    // Clients post the create endpoint with and without the trailing
    // slash; both must resolve to the handler (401, not a routing 404).
    for uri in ["/food", "/food/"] {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "multipart/form-data; boundary=x")
            .body(Body::from("--x--\r\n"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {uri}");
    }
    assert_eq!(media.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn disallowed_mime_type_is_rejected_before_upload() {
    let (app, _, media) = test_app();
    let partner_cookie = register_partner(&app, "bar@example.com").await;

    let response = app
        .clone()
        .oneshot(multipart_food_request(
            &partner_cookie,
            "application/x-msdownload",
            "setup.exe",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body["message"],
        "Invalid file type. Only images and videos allowed."
    );
    assert_eq!(body["success"], false);

    // The CDN was never contacted and no item was created.
    assert_eq!(media.uploads.load(Ordering::SeqCst), 0);
    let (_, feed, _) = send_json(&app, "GET", "/food/getAll", None, None).await;
    assert_eq!(feed["fooditems"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn principal_kinds_do_not_cross_authorize() {
    let (app, _, _) = test_app();
    let partner_cookie = register_partner(&app, "bar@example.com").await;
    let user_cookie = register_user(&app, "pat@example.com").await;

    // A user session cannot create food.
    let response = app
        .clone()
        .oneshot(multipart_food_request(&user_cookie, "image/jpeg", "m.jpg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A partner session cannot like.
    let (status, _, _) = send_json(
        &app,
        "POST",
        "/food/like",
        Some(json!({ "foodId": Uuid::new_v4() })),
        Some(&partner_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A partner session cannot read the user-gated partner feed route.
    let (status, _, _) = send_json(
        &app,
        "GET",
        &format!("/food/bypartner/{}", Uuid::new_v4()),
        None,
        Some(&partner_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials_with_one_message() {
    let (app, _, _) = test_app();
    register_user(&app, "pat@example.com").await;

    for body in [
        json!({ "email": "pat@example.com", "password": "wrong" }),
        json!({ "email": "nobody@example.com", "password": "hunter2" }),
    ] {
        let (status, resp, cookie) =
            send_json(&app, "POST", "/auth/user/login", Some(body), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["message"], "Invalid credentials");
        assert!(cookie.is_none());
    }

    let (status, _, cookie) = send_json(
        &app,
        "POST",
        "/auth/user/login",
        Some(json!({ "email": "pat@example.com", "password": "hunter2" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.unwrap();

    let (status, _, _) = send_json(&app, "GET", "/food/savedfood", None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_registration_is_400() {
    let (app, _, _) = test_app();
    register_user(&app, "pat@example.com").await;

    let (status, body, _) = send_json(
        &app,
        "POST",
        "/auth/user/register",
        Some(json!({
            "fullName": "Pat Again",
            "email": "pat@example.com",
            "password": "other",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn expired_session_is_401() {
    let (app, state, _) = test_app();
    let user_cookie = register_user(&app, "pat@example.com").await;
    let user_token = user_cookie.split_once('=').unwrap().1.to_string();
    let claims = state.tokens.verify(&user_token).unwrap();

    let expired = state.tokens.issue_with_ttl(
        claims.principal_id,
        PrincipalKind::User,
        chrono::Duration::seconds(-10),
    );

    let (status, _, _) = send_json(
        &app,
        "GET",
        "/food/savedfood",
        None,
        Some(&format!("token={expired}")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The unexpired cookie still works.
    let (status, _, _) = send_json(&app, "GET", "/food/savedfood", None, Some(&user_cookie)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn partner_me_and_lookup_by_id() {
    let (app, _, _) = test_app();
    let partner_cookie = register_partner(&app, "bar@example.com").await;

    let (status, body, _) = send_json(
        &app,
        "GET",
        "/auth/foodPartner/me",
        None,
        Some(&partner_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["foodPartner"]["restaurantName"], "Noodle Bar");
    assert!(body["foodPartner"].get("passwordHash").is_none());
    let partner_id = body["foodPartner"]["id"].as_str().unwrap().to_string();

    let (status, body, _) = send_json(
        &app,
        "GET",
        &format!("/auth/foodPartner/{partner_id}"),
        None,
        Some(&partner_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["foodPartner"]["id"], partner_id.as_str());

    let (status, _, _) = send_json(
        &app,
        "GET",
        &format!("/auth/foodPartner/{}", Uuid::new_v4()),
        None,
        Some(&partner_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // No session at all: gated.
    let (status, _, _) = send_json(&app, "GET", "/auth/foodPartner/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn feed_by_partner_requires_user_session() {
    let (app, _, _) = test_app();
    let partner_cookie = register_partner(&app, "bar@example.com").await;
    let response = app
        .clone()
        .oneshot(multipart_food_request(&partner_cookie, "image/png", "m.png"))
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let created: Value = serde_json::from_slice(&bytes).unwrap();
    let partner_id = created["foodinstance"]["partner_id"].as_str().unwrap().to_string();

    let (status, _, _) = send_json(
        &app,
        "GET",
        &format!("/food/bypartner/{partner_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user_cookie = register_user(&app, "pat@example.com").await;
    let (status, body, _) = send_json(
        &app,
        "GET",
        &format!("/food/bypartner/{partner_id}"),
        None,
        Some(&user_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fooditems"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn logout_clears_the_right_cookie() {
    let (app, _, _) = test_app();

    let (status, _, cookie) = send_json(&app, "GET", "/auth/user/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cookie.unwrap(), "token=deleted");

    let (status, _, cookie) = send_json(&app, "GET", "/auth/foodPartner/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cookie.unwrap(), "foodPartnerToken=deleted");
}

#[tokio::test]
async fn liking_unknown_food_is_404() {
    let (app, _, _) = test_app();
    let user_cookie = register_user(&app, "pat@example.com").await;

    let (status, body, _) = send_json(
        &app,
        "POST",
        "/food/like",
        Some(json!({ "foodId": Uuid::new_v4() })),
        Some(&user_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Food not found");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_multipart_fields_are_400() {
    let (app, _, media) = test_app();
    let partner_cookie = register_partner(&app, "bar@example.com").await;

    let boundary = "testboundary7b3f";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nPizza\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/food/")
        .header(COOKIE, &partner_cookie)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let parsed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["message"], "All fields are required");
    assert_eq!(media.uploads.load(Ordering::SeqCst), 0);
}
