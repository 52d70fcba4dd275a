use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use ocms::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Default admin seeded by the initial migration.
const ADMIN_EMAIL: &str = "admin@ocms.local";
const ADMIN_PASSWORD: &str = "admin123";

async fn spawn_app() -> Router {
    spawn_app_with(|_| {}).await
}

async fn spawn_app_with(tweak: impl FnOnce(&mut Config)) -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.uploads.path = std::env::temp_dir()
        .join(format!("ocms-test-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    // Keep password hashing cheap in tests
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    tweak(&mut config);

    let state = ocms::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    ocms::api::router(state).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    read_json(app, request).await
}

/// Posts a single-field multipart body, the shape course image uploads use.
async fn send_multipart(
    app: &Router,
    uri: &str,
    token: &str,
    content_type: &str,
    bytes: &[u8],
) -> (StatusCode, Value) {
    let boundary = "ocms-test-boundary";

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"image\"; filename=\"image.bin\"\r\n",
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    read_json(app, request).await
}

async fn read_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Registers a user and returns (token, user_id).
async fn register(app: &Router, email: &str, full_name: &str, role: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "password123",
            "full_name": full_name,
            "role": role,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    (
        body["data"]["access_token"].as_str().unwrap().to_string(),
        body["data"]["user"]["id"].as_str().unwrap().to_string(),
    )
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["access_token"].as_str().unwrap().to_string()
}

async fn create_category(app: &Router, admin_token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/categories",
        Some(admin_token),
        Some(json!({ "name": name })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "category create failed: {body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_course(app: &Router, token: &str, title: &str, category_ids: Vec<&str>) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/courses",
        Some(token),
        Some(json!({
            "title": title,
            "description": "A test course",
            "price": 49.99,
            "category_ids": category_ids,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "course create failed: {body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = spawn_app().await;

    let (token, user_id) = register(&app, "alice@example.com", "Alice", "student").await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user_id.as_str());
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["role"], "student");

    let token = login(&app, "alice@example.com", "password123").await;
    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Wrong password and unknown email are indistinguishable
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_and_conflicts() {
    let app = spawn_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "not-an-email", "password": "password123", "full_name": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "x@example.com", "password": "short", "full_name": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Admin accounts cannot be self-registered
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "evil@example.com",
            "password": "password123",
            "full_name": "Evil",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    register(&app, "dup@example.com", "Dup", "student").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "dup@example.com", "password": "password123", "full_name": "Dup" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_auth_check_ordering() {
    let app = spawn_app().await;
    let missing = uuid::Uuid::new_v4();

    // No token: 401, even though the course does not exist
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/courses/{missing}"),
        None,
        Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Wrong role: 403 before the lookup runs
    let (student, _) = register(&app, "s@example.com", "Student", "student").await;
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/courses/{missing}"),
        Some(&student),
        Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Right role, missing resource: 404 before any ownership decision
    let (instructor, _) = register(&app, "i@example.com", "Instructor", "instructor").await;
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/courses/{missing}"),
        Some(&instructor),
        Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_course_ownership() {
    let app = spawn_app().await;

    let (owner, _) = register(&app, "owner@example.com", "Owner", "instructor").await;
    let (other, _) = register(&app, "other@example.com", "Other", "instructor").await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let course_id = create_course(&app, &owner, "Rust Basics", vec![]).await;

    // Another instructor can neither update nor delete it
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/courses/{course_id}"),
        Some(&other),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/courses/{course_id}"),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner and an admin both can
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/courses/{course_id}"),
        Some(&owner),
        Some(json!({ "title": "Rust Basics, 2nd ed." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/courses/{course_id}"),
        Some(&admin),
        Some(json!({ "price": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Rust Basics, 2nd ed.");
    assert_eq!(body["data"]["price"], 0.0);
}

#[tokio::test]
async fn test_course_categories_replace_semantics() {
    let app = spawn_app().await;

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (instructor, _) = register(&app, "cat@example.com", "Cat", "instructor").await;

    let rust_id = create_category(&app, &admin, "Rust").await;
    let web_id = create_category(&app, &admin, "Web").await;

    // Unknown category IDs are dropped, not rejected
    let ghost = uuid::Uuid::new_v4().to_string();
    let course_id = create_course(&app, &instructor, "Tagged", vec![&rust_id, &ghost]).await;

    let (status, body) = send(&app, "GET", &format!("/api/courses/{course_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["categories"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["categories"][0]["name"], "Rust");

    // Absent category_ids leaves the set untouched
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/courses/{course_id}"),
        Some(&instructor),
        Some(json!({ "title": "Tagged v2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["categories"].as_array().unwrap().len(), 1);

    // A present list replaces the whole set
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/courses/{course_id}"),
        Some(&instructor),
        Some(json!({ "category_ids": [web_id] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["categories"][0]["name"], "Web");

    // An empty list clears it
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/courses/{course_id}"),
        Some(&instructor),
        Some(json!({ "category_ids": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["categories"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_category_name_uniqueness() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let science_id = create_category(&app, &admin, "Science").await;
    create_category(&app, &admin, "Arts").await;

    // Exact duplicate is a conflict; different case is a different name
    let (status, _) = send(
        &app,
        "POST",
        "/api/categories",
        Some(&admin),
        Some(json!({ "name": "Science" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/categories",
        Some(&admin),
        Some(json!({ "name": "science" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Renaming onto a taken name conflicts; renaming to itself does not
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/categories/{science_id}"),
        Some(&admin),
        Some(json!({ "name": "Arts" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/categories/{science_id}"),
        Some(&admin),
        Some(json!({ "name": "Science" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Category writes are admin-only
    let (instructor, _) = register(&app, "ci@example.com", "CI", "instructor").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/categories",
        Some(&instructor),
        Some(json!({ "name": "Instructor Made" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_enrollment_flow() {
    let app = spawn_app().await;

    let (instructor, _) = register(&app, "prof@example.com", "Prof", "instructor").await;
    let (student, student_id) = register(&app, "stud@example.com", "Stud", "student").await;

    let course_id = create_course(&app, &instructor, "Enrollable", vec![]).await;

    // Enroll requires authentication
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/courses/{course_id}/enroll"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/courses/{course_id}/enroll"),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let enrolled = body["data"]["enrolled_students"].as_array().unwrap();
    assert_eq!(enrolled.len(), 1);
    assert_eq!(enrolled[0]["id"], student_id.as_str());

    // Enrolling is not idempotent
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/courses/{course_id}/enroll"),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Instructors cannot enroll in their own course
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/courses/{course_id}/enroll"),
        Some(&instructor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unknown course is a 404
    let ghost = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/courses/{ghost}/enroll"),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Unenroll once: ok. Twice: 404.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/courses/{course_id}/enroll"),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/courses/{course_id}/enroll"),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_instructor_can_enroll_elsewhere() {
    let app = spawn_app().await;

    let (prof_a, _) = register(&app, "a@example.com", "A", "instructor").await;
    let (prof_b, _) = register(&app, "b@example.com", "B", "instructor").await;

    let course_id = create_course(&app, &prof_a, "A's Course", vec![]).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/courses/{course_id}/enroll"),
        Some(&prof_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_lessons_ordering_and_ownership() {
    let app = spawn_app().await;

    let (owner, _) = register(&app, "lo@example.com", "LO", "instructor").await;
    let (other, _) = register(&app, "lx@example.com", "LX", "instructor").await;
    let (student, _) = register(&app, "ls@example.com", "LS", "student").await;

    let course_id = create_course(&app, &owner, "Lessons 101", vec![]).await;

    // Only the owning instructor (or admin) may add lessons
    for (token, expected) in [
        (&student, StatusCode::FORBIDDEN),
        (&other, StatusCode::FORBIDDEN),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/lessons",
            Some(token),
            Some(json!({ "title": "Nope", "course_id": course_id, "sort_order": 1 })),
        )
        .await;
        assert_eq!(status, expected);
    }

    // Same sort_order twice: ties keep creation order
    for (title, sort_order) in [("Second", 2), ("First", 1), ("Also first", 1)] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/lessons",
            Some(&owner),
            Some(json!({ "title": title, "course_id": course_id, "sort_order": sort_order })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/lessons?course_id={course_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["First", "Also first", "Second"]);

    // Creating a lesson against an unknown course is a 404
    let ghost = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        "POST",
        "/api/lessons",
        Some(&owner),
        Some(json!({ "title": "Orphan", "course_id": ghost, "sort_order": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lesson_update_and_delete() {
    let app = spawn_app().await;

    let (owner, _) = register(&app, "lu@example.com", "LU", "instructor").await;
    let (other, _) = register(&app, "lv@example.com", "LV", "instructor").await;
    let (student, _) = register(&app, "lw@example.com", "LW", "student").await;

    let course_id = create_course(&app, &owner, "Editable", vec![]).await;
    let foreign_id = create_course(&app, &other, "Foreign", vec![]).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/lessons",
        Some(&owner),
        Some(json!({ "title": "Draft", "course_id": course_id, "sort_order": 1 })),
    )
    .await;
    let lesson_id = body["data"]["id"].as_str().unwrap().to_string();
    let lesson_uri = format!("/api/lessons/{lesson_id}");

    // Students and non-owning instructors cannot edit the lesson
    for token in [&student, &other] {
        let (status, _) = send(
            &app,
            "PATCH",
            &lesson_uri,
            Some(token),
            Some(json!({ "title": "Hijacked" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    // Moving a lesson requires owning the destination course as well
    let (status, _) = send(
        &app,
        "PATCH",
        &lesson_uri,
        Some(&owner),
        Some(json!({ "course_id": foreign_id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let ghost = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        "PATCH",
        &lesson_uri,
        Some(&owner),
        Some(json!({ "course_id": ghost })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner edits fields in place
    let (status, body) = send(
        &app,
        "PATCH",
        &lesson_uri,
        Some(&owner),
        Some(json!({ "title": "Final", "sort_order": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Final");
    assert_eq!(body["data"]["sort_order"], 5);

    let (status, _) = send(&app, "DELETE", &lesson_uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &lesson_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &lesson_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_course_image_upload() {
    let app = spawn_app_with(|config| {
        config.uploads.max_size_bytes = 1024;
    })
    .await;

    let (owner, _) = register(&app, "up@example.com", "UP", "instructor").await;
    let (other, _) = register(&app, "ux@example.com", "UX", "instructor").await;
    let course_id = create_course(&app, &owner, "Illustrated", vec![]).await;
    let uri = format!("/api/courses/{course_id}/upload-image");

    // Only the owning instructor (or admin) may attach an image
    let (status, _) =
        send_multipart(&app, &uri, &other, mime::IMAGE_PNG.as_ref(), &[0u8; 16]).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unsupported types and oversized payloads are rejected before storage
    let (status, _) =
        send_multipart(&app, &uri, &owner, mime::APPLICATION_PDF.as_ref(), &[0u8; 16]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        send_multipart(&app, &uri, &owner, mime::IMAGE_PNG.as_ref(), &[0u8; 2048]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        send_multipart(&app, &uri, &owner, mime::IMAGE_PNG.as_ref(), &[0u8; 16]).await;
    assert_eq!(status, StatusCode::OK);
    let image_url = body["data"]["image_url"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/uploads/"));
    assert!(image_url.ends_with(".png"));

    let (_, body) = send(&app, "GET", &format!("/api/courses/{course_id}"), None, None).await;
    assert_eq!(body["data"]["image_url"], image_url.as_str());
}

#[tokio::test]
async fn test_deleting_course_cascades() {
    let app = spawn_app().await;

    let (owner, _) = register(&app, "cc@example.com", "CC", "instructor").await;
    let (student, _) = register(&app, "cs@example.com", "CS", "student").await;

    let course_id = create_course(&app, &owner, "Doomed", vec![]).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/lessons",
        Some(&owner),
        Some(json!({ "title": "Doomed lesson", "course_id": course_id, "sort_order": 1 })),
    )
    .await;
    let lesson_id = body["data"]["id"].as_str().unwrap().to_string();

    send(
        &app,
        "POST",
        &format!("/api/courses/{course_id}/enroll"),
        Some(&student),
        None,
    )
    .await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/courses/{course_id}"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/api/courses/{course_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/api/lessons/{lesson_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_management_is_admin_only() {
    let app = spawn_app().await;

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (student, student_id) = register(&app, "um@example.com", "UM", "student").await;

    let (status, _) = send(&app, "GET", "/api/users", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().len() >= 2);

    // Anyone can manage their own profile
    let (status, body) = send(
        &app,
        "PATCH",
        "/api/users/profile",
        Some(&student),
        Some(json!({ "full_name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["full_name"], "Renamed");

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/users/{student_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/users/{student_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cannot_delete_instructor_of_record() {
    let app = spawn_app().await;

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (instructor, instructor_id) = register(&app, "ir@example.com", "IR", "instructor").await;
    let course_id = create_course(&app, &instructor, "Anchored", vec![]).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/users/{instructor_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Removing the course unblocks the deletion
    send(
        &app,
        "DELETE",
        &format!("/api/courses/{course_id}"),
        Some(&admin),
        None,
    )
    .await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/users/{instructor_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_roles_endpoints() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = send(&app, "GET", "/api/roles", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["admin", "instructor", "student"]);

    let (status, _) = send(
        &app,
        "POST",
        "/api/roles",
        Some(&admin),
        Some(json!({ "name": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Seeded roles are referenced by the seeded admin user
    let (status, _) = send(&app, "DELETE", "/api/roles/1", Some(&admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A rename cannot blank the name
    let (status, _) = send(
        &app,
        "PATCH",
        "/api/roles/1",
        Some(&admin),
        Some(json!({ "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (student, _) = register(&app, "rr@example.com", "RR", "student").await;
    let (status, _) = send(&app, "GET", "/api/roles", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_public_catalog_and_health() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/courses", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, "GET", "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "ok");
}
