//! End-to-end tests through the full router with in-memory stores.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use eventhub::config::Config;
use eventhub::notify::MockNotifier;
use eventhub::server::{build_router, in_memory_services};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    notifier: MockNotifier,
}

fn app() -> TestApp {
    let config = Config::from_lookup(|_| None);
    let notifier = MockNotifier::new();
    let state = in_memory_services()
        .into_state(&config, Arc::new(notifier.clone()))
        .unwrap();
    TestApp {
        router: build_router(state, &config.server.cors_allowed_origins),
        notifier,
    }
}

struct Reply {
    status: StatusCode,
    set_cookie: Option<String>,
    body: Value,
}

impl TestApp {
    async fn call(&self, method: Method, uri: &str, session: Option<&str>, body: Option<Value>) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            request = request.header(header::COOKIE, session);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Reply {
            status,
            set_cookie,
            body,
        }
    }

    /// Sign up and return the `jwt=...` pair to send back as a cookie.
    async fn signup(&self, username: &str, role: &str) -> String {
        let reply = self
            .call(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@campus.edu"),
                    "password": "correct horse battery",
                    "role": role,
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
        session_of(&reply)
    }

    async fn create_event(&self, admin: &str, name: &str, organizer: &str, date: &str) -> String {
        let reply = self
            .call(
                Method::POST,
                "/api/events",
                Some(admin),
                Some(json!({
                    "name": name,
                    "description": format!("{name} for everyone"),
                    "date": date,
                    "time": "6:00 PM",
                    "location": "Main Hall",
                    "organizer": organizer,
                    "tags": ["social"],
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
        reply.body["_id"].as_str().unwrap().to_string()
    }
}

fn session_of(reply: &Reply) -> String {
    let cookie = reply.set_cookie.as_deref().expect("session cookie");
    cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoints_are_public() {
    let app = app();

    let banner = app.call(Method::GET, "/", None, None).await;
    assert_eq!(banner.status, StatusCode::OK);
    assert_eq!(banner.body, "Event Management System API is running!");

    let health = app.call(Method::GET, "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "OK");
}

#[tokio::test]
async fn signup_sets_http_only_cookie_and_hides_password() {
    let app = app();
    let reply = app
        .call(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"username": "alice", "email": "alice@campus.edu", "password": "pw12345"})),
        )
        .await;

    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["username"], "alice");
    assert_eq!(reply.body["role"], "student");
    assert!(reply.body.get("password").is_none());
    assert!(reply.body.get("token").is_none());

    let cookie = reply.set_cookie.unwrap();
    assert!(cookie.starts_with("jwt="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let app = app();
    app.signup("alice", "student").await;

    let again = app
        .call(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"username": "alice2", "email": "alice@campus.edu", "password": "pw"})),
        )
        .await;

    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["message"], "User with that email or username already exists");
}

#[tokio::test]
async fn login_profile_logout() {
    let app = app();
    app.signup("alice", "student").await;

    let wrong = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "alice@campus.edu", "password": "nope"})),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["message"], "Invalid email or password");
    assert!(wrong.set_cookie.is_none());

    let login = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "alice@campus.edu", "password": "correct horse battery"})),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let session = session_of(&login);

    let profile = app.call(Method::GET, "/api/auth/profile", Some(&session), None).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["email"], "alice@campus.edu");

    let logout = app.call(Method::POST, "/api/auth/logout", Some(&session), None).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["message"], "Logged out successfully");
    let cleared = logout.set_cookie.unwrap();
    assert!(cleared.starts_with("jwt=;") || cleared.starts_with("jwt=\"\""));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn missing_or_bad_session_is_unauthorized() {
    let app = app();

    let none = app.call(Method::GET, "/api/auth/profile", None, None).await;
    assert_eq!(none.status, StatusCode::UNAUTHORIZED);
    assert_eq!(none.body["message"], "Not authorized, no token");
    assert_eq!(none.body["code"], "UNAUTHORIZED");

    let forged = app
        .call(Method::GET, "/api/auth/profile", Some("jwt=not.a.token"), None)
        .await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
    assert_eq!(forged.body["message"], "Not authorized, token failed");
}

#[tokio::test]
async fn event_writes_require_admin() {
    let app = app();
    let student = app.signup("sam", "student").await;
    let body = json!({
        "name": "Hack Night", "description": "d", "date": "2025-03-01",
        "time": "7 PM", "location": "Lab", "organizer": "CS Club",
    });

    let anonymous = app.call(Method::POST, "/api/events", None, Some(body.clone())).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forbidden = app.call(Method::POST, "/api/events", Some(&student), Some(body)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(
        forbidden.body["message"],
        "User role student is not authorized to access this route"
    );
}

#[tokio::test]
async fn event_crud_and_filters() {
    let app = app();
    let admin = app.signup("ada", "admin").await;

    let missing = app
        .call(
            Method::POST,
            "/api/events",
            Some(&admin),
            Some(json!({"description": "d", "date": "2025-03-01", "time": "t", "location": "l", "organizer": "o"})),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["message"], "Missing required field: name");

    let late = app.create_event(&admin, "Robot Wars", "Robotics Club", "2025-04-02").await;
    let early = app.create_event(&admin, "Poetry Slam", "Writers Guild", "2025-03-01").await;

    let all = app.call(Method::GET, "/api/events", None, None).await;
    let ids: Vec<_> = all.body.as_array().unwrap().iter().map(|e| e["_id"].clone()).collect();
    assert_eq!(ids, vec![json!(early), json!(late)]);

    let by_club = app.call(Method::GET, "/api/events?club=robotics", None, None).await;
    assert_eq!(by_club.body.as_array().unwrap().len(), 1);
    assert_eq!(by_club.body[0]["name"], "Robot Wars");

    let by_date = app.call(Method::GET, "/api/events?date=2025-03-01", None, None).await;
    assert_eq!(by_date.body.as_array().unwrap().len(), 1);
    assert_eq!(by_date.body[0]["_id"], early.as_str());

    let bad_date = app.call(Method::GET, "/api/events?date=March", None, None).await;
    assert_eq!(bad_date.status, StatusCode::BAD_REQUEST);

    let updated = app
        .call(
            Method::PUT,
            &format!("/api/events/{late}"),
            Some(&admin),
            Some(json!({"location": "Arena", "name": ""})),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["location"], "Arena");
    assert_eq!(updated.body["name"], "Robot Wars");

    let removed = app
        .call(Method::DELETE, &format!("/api/events/{late}"), Some(&admin), None)
        .await;
    assert_eq!(removed.body["message"], "Event removed");

    let gone = app.call(Method::GET, &format!("/api/events/{late}"), None, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["message"], "Event not found");

    let malformed = app.call(Method::GET, "/api/events/not-an-id", None, None).await;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registration_lifecycle() {
    let app = app();
    let admin = app.signup("ada", "admin").await;
    let alice = app.signup("alice", "student").await;
    let bob = app.signup("bob", "student").await;
    let event = app.create_event(&admin, "Career Fair", "Career Center", "2025-05-10").await;

    let anonymous = app
        .call(Method::POST, "/api/registrations/register", None, Some(json!({"eventId": event})))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let registered = app
        .call(Method::POST, "/api/registrations/register", Some(&alice), Some(json!({"eventId": event})))
        .await;
    assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);
    assert_eq!(registered.body["emailSent"], true);
    let registration = registered.body["registration"]["_id"].as_str().unwrap().to_string();
    assert_eq!(app.notifier.sent()[0].to, "alice@campus.edu");

    let duplicate = app
        .call(Method::POST, "/api/registrations/register", Some(&alice), Some(json!({"eventId": event})))
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.body["message"], "Already registered for this event");

    let attendees = app
        .call(Method::GET, &format!("/api/events/{event}/attendees"), Some(&admin), None)
        .await;
    assert_eq!(attendees.status, StatusCode::OK);
    assert_eq!(attendees.body.as_array().unwrap().len(), 1);
    assert_eq!(attendees.body[0]["username"], "alice");

    let student_view = app
        .call(Method::GET, &format!("/api/events/{event}/attendees"), Some(&alice), None)
        .await;
    assert_eq!(student_view.status, StatusCode::FORBIDDEN);

    let mine = app
        .call(Method::GET, "/api/registrations/my-registrations", Some(&alice), None)
        .await;
    assert_eq!(mine.body[0]["event"]["name"], "Career Fair");

    let theft = app
        .call(Method::DELETE, &format!("/api/registrations/{registration}"), Some(&bob), None)
        .await;
    assert_eq!(theft.status, StatusCode::FORBIDDEN);

    let cancelled = app
        .call(Method::DELETE, &format!("/api/registrations/{registration}"), Some(&alice), None)
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.body["message"], "Registration cancelled successfully");

    let event_after = app.call(Method::GET, &format!("/api/events/{event}"), None, None).await;
    assert_eq!(event_after.body["attendees"], json!([]));

    let again = app
        .call(Method::DELETE, &format!("/api/registrations/{registration}"), Some(&alice), None)
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_validates_event_id() {
    let app = app();
    let alice = app.signup("alice", "student").await;

    let missing = app
        .call(Method::POST, "/api/registrations/register", Some(&alice), Some(json!({})))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let unknown = app
        .call(
            Method::POST,
            "/api/registrations/register",
            Some(&alice),
            Some(json!({"eventId": uuid::Uuid::new_v4().to_string()})),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["message"], "Event not found");
}

#[tokio::test]
async fn failed_email_still_registers() {
    let app = app();
    let admin = app.signup("ada", "admin").await;
    let alice = app.signup("alice", "student").await;
    let event = app.create_event(&admin, "Open Mic", "Music Society", "2025-06-01").await;
    app.notifier.set_failing(true);

    let reply = app
        .call(Method::POST, "/api/registrations/register", Some(&alice), Some(json!({"eventId": event})))
        .await;

    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["emailSent"], false);
}

#[tokio::test]
async fn cors_allows_configured_origin_with_credentials() {
    let app = app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/events")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}
