use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use quire::config::Config;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::span;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // Cheap hashing keeps the suite fast.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = quire::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    quire::api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn register_and_login(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({"name": "Ann", "email": email, "password": "secret123"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({"email": email, "password": "secret123"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_login_logout_flow() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"name": "Ann", "email": "a@x.com", "password": "secret123"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 201);
    assert_eq!(body["message"], "User registered");
    assert_eq!(body["data"]["email"], "a@x.com");
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"].get("password").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "a@x.com", "password": "secret123"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 40);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

    let (status, body) = send(&app, "GET", "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "a@x.com");

    let (status, body) = send(&app, "POST", "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out");

    let (status, body) = send(&app, "POST", "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_logout_revokes_only_presented_token() {
    let app = spawn_app().await;
    let first = register_and_login(&app, "a@x.com").await;

    let (_, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "a@x.com", "password": "secret123", "token_name": "cli"}).to_string()),
    )
    .await;
    let second = body["data"]["token"].as_str().unwrap().to_string();
    assert_ne!(first, second);

    let (status, _) = send(&app, "POST", "/logout", Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/me", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures() {
    let app = spawn_app().await;
    register_and_login(&app, "a@x.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "a@x.com", "password": "wrong-password"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let wrong_password_message = body["message"].clone();

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "nobody@x.com", "password": "secret123"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], wrong_password_message);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = spawn_app().await;
    register_and_login(&app, "a@x.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"name": "Bob", "email": "a@x.com", "password": "secret123"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"name": "Bob", "email": "not-an-email", "password": "secret123"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"name": "Bob", "email": "b@x.com", "password": "short"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some("{not json".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_auth_gate_messages() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing token");

    let (status, body) = send(&app, "GET", "/me", Some("not-a-real-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let request = Request::builder()
        .uri("/me")
        .header("Authorization", "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_section_lifecycle() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "a@x.com").await;
    let payload = json!({
        "name": "Hero",
        "section_type": "hero",
        "details": {"title": "Welcome"}
    })
    .to_string();

    let (status, _) = send(&app, "POST", "/sections", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "POST", "/sections", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Section created");
    assert_eq!(body["data"]["display_order"], 0);
    assert_eq!(body["data"]["is_active"], true);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/sections/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Section retrieved");
    assert_eq!(body["data"]["details"], json!({"title": "Welcome"}));

    let update = json!({
        "name": "Hero v2",
        "section_type": "hero",
        "display_order": 5,
        "is_active": false,
        "details": {"title": "Hello", "items": [1, 2]}
    })
    .to_string();
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/sections/{id}"),
        Some(&token),
        Some(update),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Section updated");
    assert_eq!(body["data"]["name"], "Hero v2");
    assert_eq!(body["data"]["details"]["items"], json!([1, 2]));

    let (status, body) = send(&app, "GET", "/sections", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sections retrieved");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/sections/{id}"), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "DELETE", &format!("/sections/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Section deleted");

    let (status, body) = send(&app, "GET", &format!("/sections/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Section not found");
}

#[tokio::test]
async fn test_section_errors() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "a@x.com").await;

    let (status, body) = send(&app, "GET", "/sections", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, _) = send(&app, "GET", "/sections/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/sections/0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/sections/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let valid = json!({"name": "X", "section_type": "text", "details": {}}).to_string();
    let (status, _) = send(&app, "PUT", "/sections/999", Some(&token), Some(valid)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/sections/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/sections",
        Some(&token),
        Some("{\"name\": \"X\"".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing_details = json!({"name": "X", "section_type": "text"}).to_string();
    let (status, _) = send(&app, "POST", "/sections", Some(&token), Some(missing_details)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long_type = json!({"name": "X", "section_type": "t".repeat(51), "details": {}}).to_string();
    let (status, _) = send(&app, "POST", "/sections", Some(&token), Some(long_type)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_unknown_routes_use_the_envelope() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
    assert!(body["message"].is_string());

    let (status, body) = send(&app, "PATCH", "/sections/1", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], 405);
    assert_eq!(body["message"], "Method not allowed");
}

/// Captures the last `user_id` recorded on any span.
#[derive(Clone, Default)]
struct UserIdRecorder(Arc<Mutex<Option<i64>>>);

struct UserIdVisitor(Option<i64>);

impl Visit for UserIdVisitor {
    fn record_i64(&mut self, field: &Field, value: i64) {
        if field.name() == "user_id" {
            self.0 = Some(value);
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S: tracing::Subscriber> Layer<S> for UserIdRecorder {
    fn on_record(&self, _id: &span::Id, values: &span::Record<'_>, _ctx: Context<'_, S>) {
        let mut visitor = UserIdVisitor(None);
        values.record(&mut visitor);
        if let Some(user_id) = visitor.0 {
            *self.0.lock().unwrap() = Some(user_id);
        }
    }
}

#[tokio::test]
async fn test_authenticated_requests_record_user_id_on_span() {
    let recorder = UserIdRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = spawn_app().await;
    let token = register_and_login(&app, "a@x.com").await;
    assert_eq!(*recorder.0.lock().unwrap(), None);

    let (status, body) = send(&app, "GET", "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let user_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(*recorder.0.lock().unwrap(), Some(user_id));
}
