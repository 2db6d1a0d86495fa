//! Integration tests for the resource clients' wire formats.

mod common;

use axum::http::Method;
use common::MockBackend;
use lmnop_client::{
    Account, AccountFamily, CourseForm, Credentials, EnrollmentStatus, ImageFormat, ImageUpload,
    Quiz, Role, SupportMessage,
};
use serde_json::json;

const ENROLLMENT: &str = r#"{
    "id": 11,
    "courseTitle": "Web Dev",
    "studentFirstName": "Ada",
    "studentLastName": "Lovelace",
    "status": "PENDING",
    "enrollmentDate": "2025-03-01T09:30:00"
}"#;

// ============================================================================
// Accounts
// ============================================================================

/// Tests that login stores the portal's role and the returned token.
#[tokio::test]
async fn test_login_stamps_portal_role() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::POST,
        "/admins/login",
        200,
        r#"{"token":"adm-1","id":1,"firstName":"Grace","lastName":"Hopper","email":"grace@example.com"}"#,
    );
    let (ctx, _) = backend.context("/login");

    let identity = ctx
        .login(
            AccountFamily::Admins,
            &Credentials::new("grace@example.com", "secret1"),
        )
        .await
        .expect("login failed");

    assert_eq!(identity.role, Role::Admin);
    assert_eq!(identity.full_name(), "Grace Hopper");
    assert_eq!(
        backend.last_request().json(),
        json!({"email": "grace@example.com", "password": "secret1"})
    );

    let session = ctx.session().load().expect("session missing");
    assert_eq!(session.credential, "adm-1");
    assert!(ctx.session().has_role(Role::Admin));
}

/// Tests the account verbs of both families.
#[tokio::test]
async fn test_account_paths_follow_family() {
    let backend = MockBackend::start().await;
    backend.respond(Method::GET, "/customers/read/5", 200, r#"{"id":5,"firstName":"A","lastName":"B","email":"a@b.co"}"#);
    backend.respond(Method::PUT, "/admins/update", 200, r#"{"id":2,"firstName":"C","lastName":"D","email":"c@d.co"}"#);
    backend.respond(Method::GET, "/customers/profile", 200, r#"{"id":5,"firstName":"A","lastName":"B","email":"a@b.co"}"#);
    let (ctx, _) = backend.context("/admin/users");

    let account = ctx.customers().read(5).await.expect("read failed");
    assert_eq!(account.id, Some(5));
    assert_eq!(account.password, None);

    let update = Account {
        id: Some(2),
        first_name: "C".to_string(),
        last_name: "D".to_string(),
        email: "c@d.co".to_string(),
        password: None,
    };
    ctx.admins().update(&update).await.expect("update failed");
    let body = backend.last_request().json();
    assert_eq!(body["firstName"], "C");
    assert!(body.get("password").is_none());

    ctx.accounts(AccountFamily::Admins)
        .delete(2)
        .await
        .expect("delete failed");
    let request = backend.last_request();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.path, "/admins/delete/2");

    ctx.customers().profile().await.expect("profile failed");
    assert_eq!(backend.last_request().path, "/customers/profile");
}

// ============================================================================
// Courses
// ============================================================================

/// Tests that course creation is a multipart form with the image part.
#[tokio::test]
async fn test_course_create_sends_multipart_form() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::POST,
        "/courses/create",
        200,
        r#"{"id":8,"title":"Rust","description":"Ownership"}"#,
    );
    let (ctx, _) = backend.context("/");

    let form = CourseForm::create("Rust", "Ownership").with_image(ImageUpload::new(
        "logo.png",
        ImageFormat::Png,
        vec![0x89, b'P', b'N', b'G'],
    ));
    let course = ctx.courses().create(&form).await.expect("create failed");

    assert_eq!(course.id, 8);
    let request = backend.last_request();
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"), "{content_type}");

    let body = request.text();
    assert!(body.contains(r#"name="title""#));
    assert!(body.contains("Rust"));
    assert!(body.contains(r#"name="description""#));
    assert!(body.contains(r#"name="image"; filename="logo.png""#));
    assert!(body.contains("image/png"));
    assert!(!body.contains(r#"name="id""#));
}

/// Tests that course update sends the id and may omit the image.
#[tokio::test]
async fn test_course_update_without_image() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::PUT,
        "/courses/update",
        200,
        r#"{"id":8,"title":"Rust 2","description":"Borrowing"}"#,
    );
    let (ctx, _) = backend.context("/course/update/8");

    ctx.courses()
        .update(&CourseForm::update(8, "Rust 2", "Borrowing"))
        .await
        .expect("update failed");

    let body = backend.last_request().text();
    assert!(body.contains(r#"name="id""#));
    assert!(body.contains("Borrowing"));
    assert!(!body.contains(r#"name="image""#));
}

/// Tests that the image address is pure and stable.
#[tokio::test]
async fn test_image_url_is_deterministic_and_offline() {
    let backend = MockBackend::start().await;
    let (ctx, _) = backend.context("/courses");

    let first = ctx.courses().image_url(42);
    let second = ctx.courses().image_url(42);

    assert_eq!(first, second);
    assert_eq!(first, format!("{}/courses/media/42", backend.base_url));
    assert!(backend.requests().is_empty());
}

// ============================================================================
// Enrollments
// ============================================================================

/// Tests that enrollment submits exactly the name triple.
#[tokio::test]
async fn test_enroll_submits_exact_triple() {
    let backend = MockBackend::start().await;
    backend.respond(Method::POST, "/api/enrollments/enroll", 200, ENROLLMENT);
    let (ctx, _) = backend.context("/enroll");

    let enrollment = ctx
        .enrollments()
        .enroll("Web Dev", "Ada", "Lovelace")
        .await
        .expect("enroll failed");

    assert!(enrollment.is_pending());
    assert_eq!(
        backend.last_request().json(),
        json!({"courseName": "Web Dev", "firstName": "Ada", "lastName": "Lovelace"})
    );
}

/// Tests the admin transitions and the status body.
#[tokio::test]
async fn test_enrollment_transitions() {
    let backend = MockBackend::start().await;
    for verb in ["approve", "reject", "reset", "status"] {
        backend.respond(Method::PUT, &format!("/api/enrollments/11/{verb}"), 200, ENROLLMENT);
    }
    let (ctx, _) = backend.context("/");
    let client = ctx.enrollments();

    client.approve(11).await.expect("approve failed");
    assert_eq!(backend.last_request().path, "/api/enrollments/11/approve");
    client.reject(11).await.expect("reject failed");
    assert_eq!(backend.last_request().path, "/api/enrollments/11/reject");
    client.reset(11).await.expect("reset failed");
    assert_eq!(backend.last_request().method, Method::PUT);

    client
        .set_status(11, EnrollmentStatus::Approved)
        .await
        .expect("set_status failed");
    assert_eq!(backend.last_request().json(), json!({"status": "APPROVED"}));
}

/// Tests the filtered listings.
#[tokio::test]
async fn test_enrollment_filters() {
    let backend = MockBackend::start().await;
    let list = format!("[{ENROLLMENT}]");
    backend.respond(Method::GET, "/api/enrollments/status/PENDING", 200, &list);
    backend.respond(Method::GET, "/api/enrollments/student/3", 200, &list);
    backend.respond(Method::GET, "/api/enrollments/course/9", 200, "[]");
    let (ctx, _) = backend.context("/");
    let client = ctx.enrollments();

    let pending = client
        .by_status(EnrollmentStatus::Pending)
        .await
        .expect("by_status failed");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].student_name(), "Ada Lovelace");

    assert_eq!(client.by_student(3).await.expect("by_student failed").len(), 1);
    assert!(client.by_course(9).await.expect("by_course failed").is_empty());
}

// ============================================================================
// Quizzes and support
// ============================================================================

/// Tests that unmodelled quiz fields survive a round trip through update.
#[tokio::test]
async fn test_quiz_update_preserves_unknown_fields() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::GET,
        "/quizzes/read/2",
        200,
        r#"{"id":2,"title":"Web Development","questions":[],"timeLimit":600}"#,
    );
    backend.respond(Method::PUT, "/quizzes/update", 200, r#"{"id":2}"#);
    let (ctx, _) = backend.context("/quizzes");

    let quiz: Quiz = ctx.quizzes().read(2).await.expect("read failed");
    ctx.quizzes().update(&quiz).await.expect("update failed");

    assert_eq!(backend.last_request().json()["timeLimit"], 600);
}

/// Tests the support routes.
#[tokio::test]
async fn test_support_routes() {
    let backend = MockBackend::start().await;
    backend.respond(Method::POST, "/api/contact-support", 200, r#"{"id":1}"#);
    backend.respond(Method::GET, "/api/allSupportMessages", 200, r#"[{"id":1,"message":"Help"}]"#);
    let (ctx, _) = backend.context("/support");

    let message = SupportMessage {
        name: Some("Ada".to_string()),
        email: Some("ada@example.com".to_string()),
        message: Some("Cannot see my course".to_string()),
        ..Default::default()
    };
    ctx.support().contact(&message).await.expect("contact failed");
    assert_eq!(backend.last_request().json()["message"], "Cannot see my course");

    let all = ctx.support().all().await.expect("list failed");
    assert_eq!(all[0].message.as_deref(), Some("Help"));
}

// ============================================================================
// Routes
// ============================================================================

/// Tests the method and path of each remaining resource call.
#[tokio::test]
async fn test_remaining_routes() {
    let routes = [
        (Method::POST, "/customers/register", "{}"),
        (Method::POST, "/admins/register", "{}"),
        (Method::GET, "/customers/all", "[]"),
        (Method::GET, "/admins/all", "[]"),
        (Method::POST, "/quizzes/create", r#"{"id":3}"#),
        (Method::GET, "/quizzes/all", "[]"),
        (Method::DELETE, "/quizzes/delete/3", ""),
        (Method::GET, "/api/read/7", r#"{"id":7,"message":"Help"}"#),
        (Method::POST, "/api/update", r#"{"id":7}"#),
    ];
    let backend = MockBackend::start().await;
    for (method, path, body) in &routes {
        backend.respond(method.clone(), path, 200, body);
    }
    let (ctx, _) = backend.context("/admin/users");

    let account = Account {
        id: None,
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        password: Some("secret1".to_string()),
    };
    ctx.customers().register(&account).await.expect("register failed");
    ctx.admins().register(&account).await.expect("admin register failed");
    assert!(ctx.customers().all().await.expect("list failed").is_empty());
    assert!(ctx.admins().all().await.expect("list failed").is_empty());

    let quiz = Quiz {
        title: Some("Networking Fundamentals".to_string()),
        ..Default::default()
    };
    let created = ctx.quizzes().create(&quiz).await.expect("create failed");
    assert_eq!(created.id, Some(3));
    assert!(ctx.quizzes().all().await.expect("list failed").is_empty());
    ctx.quizzes().delete(3).await.expect("delete failed");

    let mut message = ctx.support().read(7).await.expect("read failed");
    assert_eq!(message.message.as_deref(), Some("Help"));
    message.message = Some("Resolved".to_string());
    ctx.support().update(&message).await.expect("update failed");
    assert_eq!(backend.last_request().json()["message"], "Resolved");

    let seen: Vec<(Method, String)> = backend
        .requests()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    let expected: Vec<(Method, String)> = routes
        .iter()
        .map(|(method, path, _)| (method.clone(), (*path).to_string()))
        .collect();
    assert_eq!(seen, expected);
}
