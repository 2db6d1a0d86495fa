//! Integration tests for credential attachment, forced re-authentication
//! and error normalization against a live socket.

mod common;

use std::sync::Arc;

use axum::http::Method;
use common::MockBackend;
use lmnop_client::{
    AccountFamily, Config, Credentials, Identity, LmsContext, LmsError, Location, MemoryStorage,
    Navigator, Role,
};

fn student() -> Identity {
    Identity {
        id: Some(3),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        role: Role::User,
    }
}

// ============================================================================
// Credential attachment
// ============================================================================

/// Tests that no Authorization header is sent without a session.
#[tokio::test]
async fn test_logged_out_request_has_no_authorization_header() {
    let backend = MockBackend::start().await;
    backend.respond(Method::GET, "/courses/all", 200, "[]");
    let (ctx, _) = backend.context("/courses");

    let courses = ctx.courses().all().await.expect("request failed");

    assert!(courses.is_empty());
    let request = backend.last_request();
    assert_eq!(request.path, "/courses/all");
    assert_eq!(request.authorization(), None);
    assert_eq!(
        request.headers.get("accept").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
}

/// Tests that an active session attaches its bearer credential.
#[tokio::test]
async fn test_logged_in_request_carries_bearer_token() {
    let backend = MockBackend::start().await;
    backend.respond(Method::GET, "/courses/all", 200, "[]");
    let (ctx, _) = backend.context("/courses");
    ctx.session().save(&student(), "tok-123").expect("save failed");

    ctx.courses().all().await.expect("request failed");

    assert_eq!(
        backend.last_request().authorization().as_deref(),
        Some("Bearer tok-123")
    );
}

/// Tests that half a session (credential without identity) is not attached.
#[tokio::test]
async fn test_credential_without_identity_is_not_attached() {
    let backend = MockBackend::start().await;
    backend.respond(Method::GET, "/courses/all", 200, "[]");
    let (ctx, _) = backend.context("/courses");
    ctx.session()
        .storage()
        .write(&[("token", Some("orphan"))])
        .expect("write failed");

    ctx.courses().all().await.expect("request failed");

    assert_eq!(backend.last_request().authorization(), None);
}

// ============================================================================
// Forced re-authentication
// ============================================================================

/// Tests that a 401 clears the session and redirects to login exactly once.
#[tokio::test]
async fn test_rejected_credential_clears_session_and_redirects_once() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::GET,
        "/api/enrollments",
        401,
        r#"{"message":"Token expired"}"#,
    );
    let (ctx, location) = backend.context("/");
    ctx.session().save(&student(), "stale").expect("save failed");

    let err = ctx.enrollments().all().await.expect_err("401 must fail");

    assert!(
        matches!(&err, LmsError::AuthExpired { body } if body == "Token expired"),
        "Expected AuthExpired, got: {err:?}"
    );
    assert!(!ctx.session().is_active());
    assert_eq!(location.redirects(), vec!["/login"]);
    assert_eq!(location.current_path(), "/login");

    // Same call again: no credential now, and already on the login page
    let err = ctx.enrollments().all().await.expect_err("401 must fail");
    assert!(err.is_auth_expired());
    assert_eq!(backend.last_request().authorization(), None);
    assert_eq!(location.redirects().len(), 1);
}

/// Tests that a 401 on the login page itself does not redirect.
#[tokio::test]
async fn test_rejection_on_login_page_does_not_redirect() {
    let backend = MockBackend::start().await;
    backend.respond(Method::POST, "/customers/login", 401, "Bad credentials");
    let (ctx, location) = backend.context("/login");

    let err = ctx
        .login(
            AccountFamily::Customers,
            &Credentials::new("ada@example.com", "wrong"),
        )
        .await
        .expect_err("login must fail");

    assert_eq!(err.body(), Some("Bad credentials"));
    assert!(location.redirects().is_empty());
    assert!(!ctx.session().is_active());
}

/// Tests that other rejections leave the session alone.
#[tokio::test]
async fn test_forbidden_keeps_session() {
    let backend = MockBackend::start().await;
    backend.respond(Method::DELETE, "/courses/delete/4", 403, "");
    let (ctx, location) = backend.context("/");
    ctx.session().save(&student(), "tok").expect("save failed");

    let err = ctx.courses().delete(4).await.expect_err("403 must fail");

    assert_eq!(err.status(), Some(403));
    assert!(ctx.session().is_active());
    assert!(location.redirects().is_empty());
}

// ============================================================================
// Error normalization
// ============================================================================

/// Tests that every backend error shape collapses into one body string.
#[tokio::test]
async fn test_error_bodies_are_normalized() {
    let backend = MockBackend::start().await;
    backend.respond(Method::GET, "/courses/1", 404, r#"{"message":"Course not found"}"#);
    backend.respond(Method::GET, "/courses/2", 400, r#"{"error":"Bad Request"}"#);
    backend.respond(Method::GET, "/courses/3", 409, r#""Duplicate title""#);
    backend.respond(Method::GET, "/courses/4", 500, "Internal failure\n");
    let (ctx, _) = backend.context("/courses");

    let cases = [
        (1, 404, "Course not found"),
        (2, 400, "Bad Request"),
        (3, 409, "Duplicate title"),
        (4, 500, "Internal failure"),
    ];
    for (id, status, body) in cases {
        let err = ctx.courses().read(id).await.expect_err("must fail");
        assert!(
            matches!(&err, LmsError::ServerRejected { status: s, body: b } if *s == status && b == body),
            "course {id}: got {err:?}"
        );
    }
}

/// Tests that a 2xx body of the wrong shape is reported as such.
#[tokio::test]
async fn test_undecodable_success_body() {
    let backend = MockBackend::start().await;
    backend.respond(Method::GET, "/courses/all", 200, r#"{"not":"a list"}"#);
    let (ctx, _) = backend.context("/courses");

    let err = ctx.courses().all().await.expect_err("must fail");
    assert!(matches!(err, LmsError::InvalidResponse { .. }), "got {err:?}");
}

/// Tests that an unreachable backend yields `NetworkUnavailable`.
#[tokio::test]
async fn test_unreachable_backend_is_network_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("Failed to get local addr").port();
    drop(listener);

    let config = Config {
        api_base_url: format!("http://127.0.0.1:{port}"),
        ..Default::default()
    };
    let location = Arc::new(Location::new("/"));
    let ctx = LmsContext::init(config, Arc::new(MemoryStorage::new()), location.clone())
        .expect("Failed to build context");

    let err = ctx.courses().all().await.expect_err("must fail");

    assert!(err.is_network(), "got {err:?}");
    assert!(location.redirects().is_empty());
}
