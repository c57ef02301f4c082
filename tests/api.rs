use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use userhub::{
    app::build_app,
    auth::claims::SessionClaims,
    config::{AppConfig, HasherConfig, JwtConfig},
    state::AppState,
};
use uuid::Uuid;

const SECRET: &str = "integration-secret";

fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        database_url: None,
        max_connections: 1,
        jwt: JwtConfig {
            secret: SECRET.into(),
            issuer: "userhub".into(),
            audience: "userhub-users".into(),
            ttl_minutes: 15,
        },
        hasher: HasherConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
    }
}

fn test_app() -> Router {
    build_app(AppState::in_memory(test_config()).expect("state"))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register_alice(app: &Router) -> Value {
    let (status, body) = call(
        app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"name": "Alice", "email": "a@x.com", "password": "secret1", "age": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    call(
        app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"email": email, "password": password})),
    )
    .await
}

async fn alice_token(app: &Router) -> String {
    let (status, body) = login(app, "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app();
    let (status, body) = call(&app, "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn register_and_login_scenario() {
    let app = test_app();

    let user = register_alice(&app).await;
    assert_eq!(user["age"], 30);
    assert_eq!(user["name"], "Alice");
    assert_eq!(user["email"], "a@x.com");
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());

    let (status, body) = login(&app, "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 15 * 60);
    assert_eq!(body["user"]["id"], user["id"]);
    assert!(body["user"].get("password_hash").is_none());

    let (status, wrong) = login(&app, "a@x.com", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["error"], "authentication_failed");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = test_app();
    register_alice(&app).await;

    let unknown = login(&app, "ghost@x.com", "secret1").await;
    let wrong = login(&app, "a@x.com", "not-it").await;
    assert_eq!(unknown, wrong);
    assert_eq!(unknown.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app();
    register_alice(&app).await;
    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"name": "Alice Two", "email": "A@X.com", "password": "secret2", "age": 40})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_key");

    // the first account still logs in with its own password
    let (status, _) = login(&app, "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_registration_is_bad_request() {
    let app = test_app();
    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"name": "A", "email": "a@x.com", "password": "secret1", "age": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn user_routes_require_a_token() {
    let app = test_app();
    let user = register_alice(&app).await;
    let id = user["id"].as_str().unwrap();

    let (status, body) = call(&app, "GET", "/api/v1/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = call(&app, "GET", &format!("/api/v1/users/{id}"), Some("junk"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_and_foreign_tokens_are_unauthorized() {
    let app = test_app();
    let user = register_alice(&app).await;
    let id = user["id"].as_str().unwrap();
    let user_id: Uuid = id.parse().unwrap();

    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let expired = SessionClaims {
        sub: user_id,
        name: "Alice".into(),
        iat: now - 3600,
        exp: now - 60,
        iss: "userhub".into(),
        aud: "userhub-users".into(),
    };
    let expired_token = encode(
        &Header::default(),
        &expired,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let fresh = SessionClaims {
        exp: now + 600,
        ..expired.clone()
    };
    let foreign_token = encode(
        &Header::default(),
        &fresh,
        &EncodingKey::from_secret(b"someone-else"),
    )
    .unwrap();

    for token in [&expired_token, &foreign_token] {
        let (status, body) =
            call(&app, "GET", &format!("/api/v1/users/{id}"), Some(token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "invalid or expired token");
    }
}

#[tokio::test]
async fn crud_with_valid_token() {
    let app = test_app();
    let user = register_alice(&app).await;
    let id = user["id"].as_str().unwrap().to_string();
    let token = alice_token(&app).await;

    let (status, list) = call(&app, "GET", "/api/v1/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, fetched) =
        call(&app, "GET", &format!("/api/v1/users/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "a@x.com");

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/api/v1/users/{id}"),
        Some(&token),
        Some(json!({"name": "Alicia"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Alicia");
    assert_eq!(updated["email"], "a@x.com");
    assert_eq!(updated["age"], 30);

    // the password is untouched by updates
    let (status, _) = login(&app, "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        "DELETE",
        &format!("/api/v1/users/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    for method in ["GET", "DELETE"] {
        let (status, body) =
            call(&app, method, &format!("/api/v1/users/{id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(body["error"], "not_found");
    }
    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/v1/users/{id}"),
        Some(&token),
        Some(json!({"age": 31})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_cannot_change_password() {
    let app = test_app();
    let user = register_alice(&app).await;
    let id = user["id"].as_str().unwrap().to_string();
    let token = alice_token(&app).await;

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/v1/users/{id}"),
        Some(&token),
        Some(json!({"password": "hijacked"})),
    )
    .await;
    assert!(status.is_client_error());

    let (status, _) = login(&app, "a@x.com", "hijacked").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn update_rejects_bad_fields() {
    let app = test_app();
    let user = register_alice(&app).await;
    let id = user["id"].as_str().unwrap().to_string();
    let token = alice_token(&app).await;

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/v1/users/{id}"),
        Some(&token),
        Some(json!({"email": "broken"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn logout_checks_the_token() {
    let app = test_app();
    register_alice(&app).await;
    let token = alice_token(&app).await;

    let (status, body) = call(&app, "POST", "/api/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out");

    let (status, body) = call(&app, "POST", "/api/v1/auth/logout", Some("junk"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication_failed");

    let (status, _) = call(&app, "POST", "/api/v1/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
