//! Integration tests — ephemeral PostgreSQL, full router, real flows.
//!
//! Every test spins its own throwaway PostgreSQL instance and is skipped
//! (with a note on stderr) when no PG toolchain is on PATH.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Days, NaiveTime, Utc};
use tower::ServiceExt;

use domainkeeper_api::{AppState, config::ApiConfig};
use domainkeeper_core::clock::SystemClock;
use domainkeeper_core::db::LocalDbManager;
use domainkeeper_core::mailer::{MailError, Mailer};
use domainkeeper_core::notify::scheduler::NotificationScheduler;

/// Mailer that captures every envelope instead of sending.
#[derive(Default)]
struct RecordingMailer {
    sent: std::sync::Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    fn envelopes(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, MailError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(format!("msg-{}", sent.len()))
    }
}

struct TestApp {
    db: LocalDbManager,
    state: AppState,
    mailer: Arc<RecordingMailer>,
}

fn pg_available() -> bool {
    std::process::Command::new("pg_config")
        .arg("--bindir")
        .output()
        .is_ok_and(|o| o.status.success())
}

async fn spawn_app() -> Option<TestApp> {
    if !pg_available() {
        eprintln!("skipping: pg_config not found on PATH");
        return None;
    }

    let mut db = LocalDbManager::ephemeral().await.expect("ephemeral PG");
    db.setup().await.expect("db setup");
    db.start().await.expect("db start");

    let pool = sqlx::PgPool::connect(&db.connection_url())
        .await
        .expect("connect to ephemeral PG");
    domainkeeper_api::migrate(&pool).await.expect("migrations");

    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: db.connection_url(),
        jwt_secret: "test-secret".into(),
        token_ttl_hours: 24,
        // MIN_COST keeps the bcrypt work negligible in tests.
        bcrypt_cost: 4,
        base_url: "http://localhost:3000".into(),
        mail_relay_url: None,
        mail_from: "Domainkeeper <test@domainkeeper.local>".into(),
        domain_check_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        provider_check_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        notify_on_startup: false,
    };

    let mailer = Arc::new(RecordingMailer::default());
    let scheduler = NotificationScheduler::new(
        pool.clone(),
        mailer.clone(),
        Arc::new(SystemClock),
        config.scheduler_config(),
    );

    let state = AppState {
        pool,
        config,
        mailer: mailer.clone(),
        scheduler,
    };

    Some(TestApp { db, state, mailer })
}

async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let app = domainkeeper_api::router(state.clone());

    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    (status, json)
}

async fn register_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> serde_json::Value {
    let (status, json) = send(
        state,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {json}");
    json
}

async fn login_user(state: &AppState, email: &str, password: &str) -> (StatusCode, serde_json::Value) {
    send(
        state,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await
}

/// Promote an account directly in the store and log in again for a token
/// that carries the admin role.
async fn make_admin(state: &AppState, email: &str, password: &str) -> String {
    sqlx::query("UPDATE users SET role = 'admin' WHERE email = $1")
        .bind(email)
        .execute(&state.pool)
        .await
        .expect("promote to admin");
    let (status, json) = login_user(state, email, password).await;
    assert_eq!(status, StatusCode::OK);
    json["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_then_login_then_me() {
    let Some(mut app) = spawn_app().await else { return };

    let reg = register_user(&app.state, "alice", "alice@example.com", "Sup3rSecret").await;
    assert_eq!(reg["user"]["username"], "alice");
    assert_eq!(reg["user"]["role"], "user");

    let (status, login) = login_user(&app.state, "alice@example.com", "Sup3rSecret").await;
    assert_eq!(status, StatusCode::OK);
    let token = login["token"].as_str().unwrap();
    assert_eq!(login["user"]["id"], reg["user"]["id"]);

    let (status, me) = send(&app.state, "GET", "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["email"], "alice@example.com");

    app.db.stop().await.ok();
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let Some(mut app) = spawn_app().await else { return };

    register_user(&app.state, "bob", "bob@example.com", "Sup3rSecret").await;

    let (wrong_pw_status, wrong_pw) =
        login_user(&app.state, "bob@example.com", "WrongPass1").await;
    let (unknown_status, unknown) =
        login_user(&app.state, "nobody@example.com", "WrongPass1").await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);

    app.db.stop().await.ok();
}

#[tokio::test]
async fn missing_and_malformed_bearer_tokens_are_rejected() {
    let Some(mut app) = spawn_app().await else { return };

    let (status, body) = send(&app.state, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No authorization token provided");

    // Wrong scheme
    let appr = domainkeeper_api::router(app.state.clone());
    let req = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let resp = appr.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Garbage token
    let (status, body) = send(&app.state, "GET", "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    app.db.stop().await.ok();
}

#[tokio::test]
async fn forgot_password_response_never_reveals_the_account() {
    let Some(mut app) = spawn_app().await else { return };

    register_user(&app.state, "carol", "carol@example.com", "Sup3rSecret").await;

    let (known_status, known) = send(
        &app.state,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(serde_json::json!({ "email": "carol@example.com" })),
    )
    .await;
    let (unknown_status, unknown) = send(
        &app.state,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(serde_json::json!({ "email": "ghost@example.com" })),
    )
    .await;

    assert_eq!(known_status, StatusCode::OK);
    assert_eq!(unknown_status, StatusCode::OK);
    assert_eq!(known, unknown);

    // Only the real account got an email.
    assert_eq!(app.mailer.envelopes().len(), 1);

    app.db.stop().await.ok();
}

#[tokio::test]
async fn reset_secret_works_exactly_once() {
    let Some(mut app) = spawn_app().await else { return };

    register_user(&app.state, "dave", "dave@example.com", "OldPassw0rd").await;

    send(
        &app.state,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(serde_json::json!({ "email": "dave@example.com" })),
    )
    .await;

    let envelopes = app.mailer.envelopes();
    let body = &envelopes.last().expect("reset email").2;
    let secret = body
        .split("/reset-password/")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .expect("secret in reset link");
    assert_eq!(secret.len(), 64);

    // The raw secret is never persisted verbatim.
    let stored: Option<String> =
        sqlx::query_scalar("SELECT reset_token_hash FROM users WHERE email = 'dave@example.com'")
            .fetch_one(&app.state.pool)
            .await
            .unwrap();
    assert_ne!(stored.as_deref(), Some(secret));

    let uri = format!("/api/auth/reset-password/{secret}");
    let (status, _) = send(
        &app.state,
        "POST",
        &uri,
        None,
        Some(serde_json::json!({ "password": "NewPassw0rd" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password is dead, new one works.
    let (old_status, _) = login_user(&app.state, "dave@example.com", "OldPassw0rd").await;
    assert_eq!(old_status, StatusCode::UNAUTHORIZED);
    let (new_status, _) = login_user(&app.state, "dave@example.com", "NewPassw0rd").await;
    assert_eq!(new_status, StatusCode::OK);

    // A captured link cannot be replayed.
    let (replay_status, replay) = send(
        &app.state,
        "POST",
        &uri,
        None,
        Some(serde_json::json!({ "password": "AnotherPass1" })),
    )
    .await;
    assert_eq!(replay_status, StatusCode::BAD_REQUEST);
    assert_eq!(replay["message"], "Password reset token is invalid or has expired");

    app.db.stop().await.ok();
}

#[tokio::test]
async fn anonymous_admin_registration_is_downgraded() {
    let Some(mut app) = spawn_app().await else { return };

    let (status, json) = send(
        &app.state,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "username": "eve",
            "email": "eve@example.com",
            "password": "Sup3rSecret",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["user"]["role"], "user");

    // An acting admin can mint another admin.
    register_user(&app.state, "root", "root@example.com", "Sup3rSecret").await;
    let admin_token = make_admin(&app.state, "root@example.com", "Sup3rSecret").await;

    let (status, json) = send(
        &app.state,
        "POST",
        "/api/auth/register",
        Some(&admin_token),
        Some(serde_json::json!({
            "username": "operator",
            "email": "operator@example.com",
            "password": "Sup3rSecret",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["user"]["role"], "admin");

    app.db.stop().await.ok();
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let Some(mut app) = spawn_app().await else { return };

    register_user(&app.state, "frank", "frank@example.com", "Sup3rSecret").await;

    let (status, json) = send(
        &app.state,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "username": "frank",
            "email": "other@example.com",
            "password": "Sup3rSecret",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{json}");

    app.db.stop().await.ok();
}

#[tokio::test]
async fn self_role_change_is_rejected_before_any_mutation() {
    let Some(mut app) = spawn_app().await else { return };

    let reg = register_user(&app.state, "grace", "grace@example.com", "Sup3rSecret").await;
    let admin_id = reg["user"]["id"].as_str().unwrap().to_string();
    let admin_token = make_admin(&app.state, "grace@example.com", "Sup3rSecret").await;

    let (status, json) = send(
        &app.state,
        "PUT",
        "/api/auth/users/role",
        Some(&admin_token),
        Some(serde_json::json!({ "userId": admin_id, "role": "user" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "You cannot change your own role");

    // Still an admin afterwards.
    let role: String = sqlx::query_scalar("SELECT role::text FROM users WHERE id = $1::uuid")
        .bind(&admin_id)
        .fetch_one(&app.state.pool)
        .await
        .unwrap();
    assert_eq!(role, "admin");

    // Non-admins never reach the role endpoint.
    let reg = register_user(&app.state, "henry", "henry@example.com", "Sup3rSecret").await;
    let (status, _) = send(
        &app.state,
        "PUT",
        "/api/auth/users/role",
        Some(reg["token"].as_str().unwrap()),
        Some(serde_json::json!({ "userId": admin_id, "role": "user" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.db.stop().await.ok();
}

#[tokio::test]
async fn expiry_scan_dispatches_once_per_threshold_crossing() {
    let Some(mut app) = spawn_app().await else { return };

    let reg = register_user(&app.state, "ivy", "ivy@example.com", "Sup3rSecret").await;
    let token = reg["token"].as_str().unwrap().to_string();

    let today = Utc::now().date_naive();
    let in_seven = today.checked_add_days(Days::new(7)).unwrap();
    let in_thirty = today.checked_add_days(Days::new(30)).unwrap();
    let in_ninety = today.checked_add_days(Days::new(90)).unwrap();

    // Domain crossing the 7-day boundary today, plus one that is not.
    let (status, _) = send(
        &app.state,
        "POST",
        "/api/domains",
        Some(&token),
        Some(serde_json::json!({
            "domain_name": "soon.example.com",
            "expiry_date": in_seven.to_string(),
            "nameservers": ["ns1.example.com", "ns2.example.com"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app.state,
        "POST",
        "/api/domains",
        Some(&token),
        Some(serde_json::json!({
            "domain_name": "later.example.com",
            "expiry_date": in_ninety.to_string(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Provider account crossing the 30-day boundary.
    let (status, _) = send(
        &app.state,
        "POST",
        "/api/providers",
        Some(&token),
        Some(serde_json::json!({
            "provider_name": "HostCo",
            "provider_type": "hosting",
            "username": "ivy-account",
            "account_expiry_date": in_thirty.to_string(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // First tick: exactly one domain notification.
    assert_eq!(app.state.scheduler.run_domain_check().await, 1);
    let envelopes = app.mailer.envelopes();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].0, "ivy@example.com");
    assert!(envelopes[0].1.contains("soon.example.com"));
    assert!(envelopes[0].1.contains("expires in 7 days"));

    // Re-running the same day is a no-op thanks to the audit check.
    assert_eq!(app.state.scheduler.run_domain_check().await, 0);
    assert_eq!(app.mailer.envelopes().len(), 1);

    let audit_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications")
        .fetch_one(&app.state.pool)
        .await
        .unwrap();
    assert_eq!(audit_rows, 1);

    // The provider trigger is independent and records its own audit entry.
    assert_eq!(app.state.scheduler.run_provider_check().await, 1);
    let envelopes = app.mailer.envelopes();
    assert_eq!(envelopes.len(), 2);
    assert!(envelopes[1].1.contains("HostCo"));
    assert!(envelopes[1].1.contains("expires in 30 days"));

    app.db.stop().await.ok();
}

#[tokio::test]
async fn records_are_owner_scoped() {
    let Some(mut app) = spawn_app().await else { return };

    let a = register_user(&app.state, "owner_a", "a@example.com", "Sup3rSecret").await;
    let b = register_user(&app.state, "owner_b", "b@example.com", "Sup3rSecret").await;
    let token_a = a["token"].as_str().unwrap().to_string();
    let token_b = b["token"].as_str().unwrap().to_string();

    let expiry = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(120))
        .unwrap();
    let (status, created) = send(
        &app.state,
        "POST",
        "/api/domains",
        Some(&token_a),
        Some(serde_json::json!({
            "domain_name": "private.example.com",
            "expiry_date": expiry.to_string(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let domain_id = created["id"].as_str().unwrap().to_string();

    // The other user cannot see or delete it.
    let uri = format!("/api/domains/{domain_id}");
    let (status, _) = send(&app.state, "GET", &uri, Some(&token_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app.state, "DELETE", &uri, Some(&token_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // An admin sees everything.
    register_user(&app.state, "boss", "boss@example.com", "Sup3rSecret").await;
    let admin_token = make_admin(&app.state, "boss@example.com", "Sup3rSecret").await;
    let (status, listed) = send(&app.state, "GET", "/api/domains", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    app.db.stop().await.ok();
}
