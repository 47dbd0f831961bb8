//! Integration tests for stylemate-server API endpoints
//!
//! Tests cover:
//! - Authentication (missing, forged, expired tokens)
//! - Per-user isolation of items
//! - Item creation validation
//! - Image blob upload / download / ownership
//! - Outfits and profile collections
//! - AI gateway endpoints (scripted model)
//! - Health and build info

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use stylemate_ai::{GenerationRequest, GenerativeModel, ModelError, StyleGateway};
use stylemate_common::auth::TokenVerifier;
use stylemate_server::{build_router, db, AppState};
use tower::util::ServiceExt; // for `oneshot` method

const SECRET: &str = "integration-secret";

/// Test helper: app over a fresh in-memory database, no AI gateway
async fn setup_app() -> Router {
    let pool = db::init_in_memory().await.expect("Should create test database");
    build_router(AppState::new(pool, TokenVerifier::hs256(SECRET, None)))
}

/// Test helper: app whose gateway always answers `reply`
async fn setup_app_with_model(reply: &str) -> Router {
    let pool = db::init_in_memory().await.expect("Should create test database");
    let gateway = StyleGateway::new(Arc::new(FixedModel(reply.to_string())));
    build_router(AppState::new(pool, TokenVerifier::hs256(SECRET, None)).with_gateway(gateway))
}

struct FixedModel(String);

#[async_trait]
impl GenerativeModel for FixedModel {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, ModelError> {
        Ok(self.0.clone())
    }
}

fn token_with(sub: &str, exp_offset_secs: i64, secret: &str) -> String {
    let exp = stylemate_common::time::now().timestamp() + exp_offset_secs;
    encode(
        &Header::default(),
        &json!({"sub": sub, "email": format!("{}@example.com", sub), "exp": exp}),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn token(sub: &str) -> String {
    token_with(sub, 3600, SECRET)
}

/// Test helper: request with optional bearer token and JSON body
fn request(method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Should read body")
        .to_bytes()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Should parse JSON")
}

async fn create_item(app: &Router, user: &str, description: &str) -> Value {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/items",
            Some(&token(user)),
            Some(json!({
                "fileUrl": "https://cdn.example.com/a.jpg",
                "category": "Tops",
                "description": description,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_missing_token_is_401_before_data_access() {
    let app = setup_app().await;

    for (method, uri) in [
        ("GET", "/api/items"),
        ("POST", "/api/items"),
        ("DELETE", "/api/items?id=x"),
        ("GET", "/api/outfits"),
        ("GET", "/api/profile"),
        ("POST", "/api/images"),
        ("DELETE", "/api/images/x"),
        ("POST", "/api/classify"),
    ] {
        let response = app.clone().oneshot(request(method, uri, None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_forged_and_expired_tokens_rejected() {
    let app = setup_app().await;

    let forged = token_with("u1", 3600, "not-the-secret");
    let response = app
        .clone()
        .oneshot(request("GET", "/api/items", Some(&forged), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let expired = token_with("u1", -3600, SECRET);
    let response = app
        .clone()
        .oneshot(request("GET", "/api/items", Some(&expired), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_decode_only_mode_accepts_unsigned_identity() {
    let pool = db::init_in_memory().await.unwrap();
    let app = build_router(AppState::new(pool, TokenVerifier::decode_only()));

    let any_signature = token_with("dev-user", 3600, "whatever");
    let response = app
        .oneshot(request("GET", "/api/items", Some(&any_signature), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Items
// =============================================================================

#[tokio::test]
async fn test_items_are_isolated_per_user() {
    let app = setup_app().await;
    create_item(&app, "u1", "Red shirt").await;
    create_item(&app, "u1", "Blue shirt").await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/items", Some(&token("u2")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));

    let response = app
        .clone()
        .oneshot(request("GET", "/api/items", Some(&token("u1")), None))
        .await
        .unwrap();
    let items = body_json(response).await;
    assert_eq!(items.as_array().unwrap().len(), 2);
    assert!(items.as_array().unwrap().iter().all(|i| i["userId"] == "u1"));
}

#[tokio::test]
async fn test_create_item_returns_generated_fields() {
    let app = setup_app().await;
    let item = create_item(&app, "u1", "Red shirt").await;

    assert!(item["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(item["userId"], "u1");
    assert_eq!(item["category"], "Tops");
    assert_eq!(item["tags"], json!([]));
    assert!(item["createdAt"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_create_item_validation_has_no_side_effect() {
    let app = setup_app().await;
    let t = token("u1");

    for body in [
        json!({"category": "Tops", "description": "No image reference"}),
        json!({"fileId": "f1", "description": "No category"}),
        json!({"fileId": "f1", "category": "Tops"}),
        json!({"fileId": "f1", "category": "Hats", "description": "Bad category"}),
    ] {
        let response = app
            .clone()
            .oneshot(request("POST", "/api/items", Some(&t), Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
    }

    let response = app
        .clone()
        .oneshot(request("GET", "/api/items", Some(&t), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_delete_item_scoped_to_caller() {
    let app = setup_app().await;
    let item = create_item(&app, "u1", "Red shirt").await;
    let id = item["id"].as_str().unwrap();

    // Another user's delete matches nothing but still answers 204
    let uri = format!("/api/items?id={}", id);
    let response = app
        .clone()
        .oneshot(request("DELETE", &uri, Some(&token("u2")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/items", Some(&token("u1")), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(request("DELETE", &uri, Some(&token("u1")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/items", Some(&token("u1")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_item_tags() {
    let app = setup_app().await;
    let item = create_item(&app, "u1", "Red shirt").await;
    let uri = format!("/api/items/{}/tags", item["id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &uri,
            Some(&token("u1")),
            Some(json!({"tags": ["Summer", " Summer", "", "Work"]})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["tags"], json!(["Summer", "Work"]));

    let response = app
        .clone()
        .oneshot(request("PUT", &uri, Some(&token("u2")), Some(json!({"tags": []}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Image blobs
// =============================================================================

#[tokio::test]
async fn test_image_upload_download_and_ownership() {
    let app = setup_app().await;

    // "hello" in base64
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/images",
            Some(&token("u1")),
            Some(json!({"base64": "aGVsbG8=", "mimeType": "image/png"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let uploaded = body_json(response).await;
    assert_eq!(uploaded["mimeType"], "image/png");
    let file_id = uploaded["fileId"].as_str().unwrap().to_string();

    // Anonymous download
    let response = app
        .clone()
        .oneshot(request("GET", &format!("/images/{}", file_id), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=31536000, immutable"
    );
    assert_eq!(body_bytes(response).await, b"hello");

    // Other user cannot delete
    let delete_uri = format!("/api/images/{}", file_id);
    let response = app
        .clone()
        .oneshot(request("DELETE", &delete_uri, Some(&token("u2")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Owner can
    let response = app
        .clone()
        .oneshot(request("DELETE", &delete_uri, Some(&token("u1")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request("DELETE", &delete_uri, Some(&token("u1")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/images/{}", file_id), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_image_upload_validation() {
    let app = setup_app().await;
    let t = token("u1");

    for body in [
        json!({"mimeType": "image/png"}),
        json!({"base64": "aGVsbG8="}),
        json!({"base64": "%%% not base64 %%%", "mimeType": "image/png"}),
        json!({"base64": "YWJj", "mimeType": "image/jpeg\r\nX-Evil: 1"}),
        json!({"base64": "YWJj", "mimeType": "jpeg"}),
    ] {
        let response = app
            .clone()
            .oneshot(request("POST", "/api/images", Some(&t), Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
    }
}

#[tokio::test]
async fn test_rejected_mime_type_stores_nothing() {
    let pool = db::init_in_memory().await.unwrap();
    let app = build_router(AppState::new(pool.clone(), TokenVerifier::hs256(SECRET, None)));

    let response = app
        .oneshot(request(
            "POST",
            "/api/images",
            Some(&token("u1")),
            Some(json!({"base64": "YWJj", "mimeType": "image/jpeg\r\nX-Evil: 1"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_line_wrapped_base64_upload() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/images",
            Some(&token("u1")),
            Some(json!({"base64": "YWJj\nZGVm\r\n", "mimeType": "image/gif"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let file_id = body_json(response).await["fileId"].as_str().unwrap().to_string();

    let response = app
        .oneshot(request("GET", &format!("/images/{}", file_id), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/gif");
    assert_eq!(body_bytes(response).await, b"abcdef");
}

// =============================================================================
// Outfits and profile
// =============================================================================

#[tokio::test]
async fn test_outfit_create_list_delete() {
    let app = setup_app().await;
    let t = token("u1");

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/outfits",
            Some(&t),
            Some(json!({
                "name": "Urban Casual",
                "styleTags": ["casual", "warm weather"],
                "reasoning": "Balanced colors",
                "itemIds": ["a", "b"],
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let outfit = body_json(response).await;
    assert_eq!(outfit["style"], "casual, warm weather");
    assert_eq!(outfit["description"], "Balanced colors");

    let response = app
        .clone()
        .oneshot(request("POST", "/api/outfits", Some(&t), Some(json!({"itemIds": []}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/outfits?id={}", outfit["id"].as_str().unwrap());
    let response = app
        .clone()
        .oneshot(request("DELETE", &uri, Some(&t), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/outfits", Some(&t), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_profile_put_get_clear() {
    let app = setup_app().await;
    let t = token("u1");

    let response = app
        .clone()
        .oneshot(request("GET", "/api/profile", Some(&t), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/profile",
            Some(&t),
            Some(json!({"imageUrl": "/images/abc", "traits": {"skinTone": "Olive"}})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/profile", Some(&t), None))
        .await
        .unwrap();
    let profile = body_json(response).await;
    assert_eq!(profile["id"], "user-profile");
    assert_eq!(profile["traits"]["skinTone"], "Olive");

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/profile", Some(&t), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/profile", Some(&t), None))
        .await
        .unwrap();
    let cleared = body_json(response).await;
    assert!(cleared["imageUrl"].is_null());
    assert_eq!(cleared["traits"], json!({}));

    // Other users see nothing
    let response = app
        .clone()
        .oneshot(request("GET", "/api/profile", Some(&token("u2")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// AI gateway endpoints
// =============================================================================

#[tokio::test]
async fn test_ai_endpoints_without_key_are_500() {
    let app = setup_app().await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/generate-outfits",
            Some(&token("u1")),
            Some(json!({"wardrobe": [{"id": "a", "category": "Tops", "description": "Shirt"}]})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_generate_outfits_requires_wardrobe() {
    let app = setup_app_with_model("[]").await;

    for body in [json!({}), json!({"wardrobe": []})] {
        let response = app
            .clone()
            .oneshot(request("POST", "/api/generate-outfits", Some(&token("u1")), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_generate_outfits_returns_validated_outfits() {
    let app = setup_app_with_model(
        r#"[{"name":"Duo","styleTags":["casual"],"reasoning":"Works","itemIds":["a","ghost"]}]"#,
    )
    .await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/generate-outfits",
            Some(&token("u1")),
            Some(json!({
                "wardrobe": [
                    {"id": "a", "category": "Tops", "description": "Shirt"},
                    {"id": "b", "category": "Bottoms", "description": "Jeans"}
                ],
                "userCriteria": "office"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let outfits = body_json(response).await;
    assert_eq!(outfits[0]["name"], "Duo");
    assert_eq!(outfits[0]["itemIds"], json!(["a"]));
}

#[tokio::test]
async fn test_classify_endpoint_falls_back_on_bad_model_output() {
    let app = setup_app_with_model("not json at all").await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/classify",
            Some(&token("u1")),
            Some(json!({"base64": "aGVsbG8=", "mimeType": "image/png"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([{"category": "Unknown", "description": "Unidentified Item"}])
    );
}

#[tokio::test]
async fn test_extract_traits_endpoint() {
    let app =
        setup_app_with_model(r#"{"skinTone":"Deep","hairColor":"Black","bodyType":"Tall"}"#)
            .await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/extract-traits",
            Some(&token("u1")),
            Some(json!({"base64": "aGVsbG8="})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"skinTone": "Deep", "hairColor": "Black", "bodyType": "Tall"})
    );

    let response = app
        .oneshot(request("POST", "/api/extract-traits", Some(&token("u1")), Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = setup_app().await;

    let response = app.oneshot(request("GET", "/health", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "stylemate-server");
    assert!(body["version"].is_string());
    assert_eq!(body["ai_gateway"], false);
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = setup_app().await;

    let response = app
        .oneshot(request("GET", "/api/buildinfo", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let pool = db::init_in_memory().await.unwrap();
    let app = build_router(
        AppState::new(pool, TokenVerifier::hs256(SECRET, None)).with_max_body_bytes(64),
    );

    let big = "A".repeat(1024);
    let response = app
        .oneshot(request(
            "POST",
            "/api/images",
            Some(&token("u1")),
            Some(json!({"base64": big, "mimeType": "image/png"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
