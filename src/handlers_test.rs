//! Router-level tests for pages and JSON endpoints.
//!
//! Requests go through the full `Router` with `oneshot`. PDF extraction is
//! bypassed by seeding the document cache with page text, and the documents
//! directory points nowhere so any unseeded document fails to load.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::Config;
use crate::fixtures::Library;
use crate::viewer::DocumentText;
use crate::{router, AppState};

// ============================================================================
// Helpers
// ============================================================================

fn test_state() -> Arc<AppState> {
    let config = Config {
        addr: "127.0.0.1:0".into(),
        docs_dir: PathBuf::from("target/no-such-docs-dir"),
        secret: Some(b"handler-test-secret".to_vec()),
    };
    let state = AppState::new(config, Library::load().unwrap());

    // Document 2: 60 pages, page 50 mentions analytics twice.
    let pages = (1..=60)
        .map(|n| match n {
            50 => "Data Analytics in practice\nUsing analytics to steer the plan".to_string(),
            _ => format!("Page {} body text", n),
        })
        .collect();
    state.documents.insert(2, DocumentText::from_pages(pages));

    // Document 4: 3 pages.
    state.documents.insert(
        4,
        DocumentText::from_pages(vec![
            "Scope".into(),
            "Risk (Management) and risk management".into(),
            "Closing".into(),
        ]),
    );

    Arc::new(state)
}

fn app() -> (Arc<AppState>, Router) {
    let state = test_state();
    (state.clone(), router(state))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Option<String>, Value) {
    post_raw(app, uri, Some("application/json"), body.to_string()).await
}

async fn post_raw(
    app: &Router,
    uri: &str,
    content_type: Option<&str>,
    body: String,
) -> (StatusCode, Option<String>, Value) {
    let mut request = Request::post(uri);
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, cookie, json)
}

// ============================================================================
// Static Pages
// ============================================================================

#[tokio::test]
async fn test_pages_render() {
    let (_, app) = app();
    for uri in ["/", "/about", "/compare", "/analytics", "/search", "/search2", "/login", "/signup", "/forgot-password"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert!(body.contains("PM Codex"), "{}", uri);
    }
    let (status, body) = get(&app, "/healthz").await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "ok"));
}

#[tokio::test]
async fn test_home_suggestions_filter() {
    let (_, app) = app();
    let (_, body) = get(&app, "/?q=stake").await;
    assert!(body.contains("/compare?topic=Stakeholder%20Engagement"));
    assert!(body.contains("<mark>Stake</mark>holder Engagement"));
    assert!(!body.contains("/compare?topic=Risk%20Management"));
}

// ============================================================================
// Viewer
// ============================================================================

#[tokio::test]
async fn test_deep_link_opens_page_and_highlights() {
    let (_, app) = app();
    let (status, body) = get(&app, "/book?pdfId=2&pageNum=50&searchText=Analytics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Page 50 of 60"));
    assert!(body.contains("<mark>Analytics</mark>"));
    assert!(body.contains("<mark>analytics</mark>"));
    assert!(body.contains("2 matches for"));
    assert!(body.contains(r#"const pdfFile = "book2.pdf";"#));
}

#[tokio::test]
async fn test_page_number_clamped() {
    let (_, app) = app();
    let (_, body) = get(&app, "/book?pdfId=4&pageNum=8").await;
    assert!(body.contains("Page 3 of 3"));
    assert!(body.contains(r#"<span class="btn secondary disabled">Next</span>"#));

    let (_, body) = get(&app, "/pdf?pdfId=4&pageNum=-2").await;
    assert!(body.contains("Page 1 of 3"));
    assert!(body.contains(r#"<span class="btn secondary disabled">Previous</span>"#));
}

#[tokio::test]
async fn test_metacharacters_match_literally() {
    let (_, app) = app();
    let (_, body) = get(&app, "/book?pdfId=4&pageNum=2&searchText=Risk%20(Management)").await;
    assert!(body.contains("<mark>Risk (Management)</mark>"));
    assert!(body.contains("1 match for"));
}

#[tokio::test]
async fn test_repeated_params_keep_first_value() {
    let (_, app) = app();
    let (status, body) = get(&app, "/book?pdfId=2&pageNum=50&pageNum=3&searchText=Analytics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Page 50 of 60"));
    assert!(body.contains("2 matches for"));

    let (status, body) = get(&app, "/search?tab=pmbok&tab=agile&open=3").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Definition of a Project Manager"));
}

#[tokio::test]
async fn test_pdf_route_pages_within_itself() {
    let (_, app) = app();
    let (_, body) = get(&app, "/pdf?pdfId=4&pageNum=2").await;
    assert!(body.contains("/pdf?pdfId=4&amp;pageNum=1&amp;searchText="));
    assert!(body.contains("/pdf?pdfId=4&amp;pageNum=3&amp;searchText="));
    assert!(body.contains(r#"<form method="get" action="/pdf">"#));
}

#[tokio::test]
async fn test_missing_document_reports_failure() {
    let (_, app) = app();
    let (status, body) = get(&app, "/book?pdfId=1&pageNum=5&searchText=scope").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<div class="text-panel"><div class="pdf-error">Failed to load PDF.</div></div>"#));
    assert!(body.contains("Page 5 of ?"));
}

#[tokio::test]
async fn test_unknown_document_falls_back_to_default() {
    let (_, app) = app();
    let (_, body) = get(&app, "/book?pdfId=abc").await;
    assert!(body.contains(r#"const pdfFile = "book0.pdf";"#));
}

#[tokio::test]
async fn test_preset_route() {
    let (_, app) = app();
    let (status, body) = get(&app, "/book-123").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"const pdfFile = "book1.pdf";"#));
    assert!(body.contains(r#"value="Column-Oriented Storage""#));
}

#[tokio::test]
async fn test_page_text_api() {
    let (_, app) = app();
    let (status, body) = get(&app, "/api/pdf/2/page/50?searchText=analytics").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["document_id"], 2);
    assert_eq!(json["page"], 50);
    assert_eq!(json["page_count"], 60);
    assert_eq!(json["marks"], 2);
    assert_eq!(json["runs"][0][1], json!({"text": "Analytics", "is_match": true}));

    let (_, body) = get(&app, "/api/pdf/2/page/999").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["page"], 60);
    assert_eq!(json["marks"], 0);
}

#[tokio::test]
async fn test_page_text_api_load_failure() {
    let (_, app) = app();
    let (status, body) = get(&app, "/api/pdf/1/page/1").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_section_locator_shortens_title() {
    let (_, app) = app();
    let (status, body) = get(&app, "/api/pdf/4/section?title=Risk%20(Management)%20plan").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, json!({"document_id": 4, "page": 2, "matched": "Risk (Management)"}));

    let (_, body) = get(&app, "/api/pdf/4/section?title=closing&skip=1&skip=9").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["page"], 3);

    let (status, body) = get(&app, "/api/pdf/4/section?title=Stakeholders").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Section not found: Stakeholders");
}

// ============================================================================
// Comparison
// ============================================================================

#[tokio::test]
async fn test_compare_points_deep_link() {
    let (state, app) = app();
    let topic = &state.library.topics[0];
    let book = &topic.books[0];
    let point = &book.similar_points[0];

    let (_, body) = get(&app, "/compare?section=similar").await;
    let href = crate::viewer::DeepLink::new(book.book_id, i64::from(point.page_no), &point.start_text).href();
    assert!(body.contains(&crate::highlight::html_escape(&href)));
}

#[tokio::test]
async fn test_compare_filter() {
    let (_, app) = app();
    let (_, body) = get(&app, "/compare?topic=Risk%20Management&filter=prince").await;
    assert!(body.contains("<mark>PRINCE</mark>2"));
    assert!(!body.contains("PMBOK Guide</h3>"));

    let (_, body) = get(&app, "/compare?filter=zzzz").await;
    assert!(body.contains("No books match"));
}

// ============================================================================
// Knowledge Base
// ============================================================================

#[tokio::test]
async fn test_kb_expand_and_tab_switch() {
    let (_, app) = app();

    let (_, body) = get(&app, "/search?tab=pmbok&open=3").await;
    assert!(body.contains("Definition of a Project Manager"));
    // The other tabs' links carry no expanded rows.
    assert!(body.contains(r#"href="/search?tab=agile""#));

    let (_, body) = get(&app, "/search?tab=pmbok").await;
    assert!(!body.contains("Definition of a Project Manager"));
}

#[tokio::test]
async fn test_kb_subsections_link_to_document() {
    let (_, app) = app();
    let (_, body) = get(&app, "/search?tab=pmbok&open=1").await;
    assert!(body.contains("/book?pdfId=1&amp;pageNum=12&amp;searchText=What%20is%20a%20Project%3F"));

    // Tabs without a document show plain page numbers.
    let (_, body) = get(&app, "/search?tab=agile&open=1").await;
    assert!(body.contains(r#"<span class="page">p. 8</span>"#));
}

#[tokio::test]
async fn test_kb_search_blank_is_rejected() {
    let (_, app) = app();
    let (status, body) = get(&app, "/search2?q=%20%20").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(crate::kb::EMPTY_QUERY_MESSAGE));
    assert!(!body.contains(r#"<div class="search-results">"#));
}

#[tokio::test]
async fn test_kb_search_highlights_titles_not_badges() {
    let (_, app) = app();
    let (_, body) = get(&app, "/search2?q=leadership").await;
    assert!(body.contains("<mark>Leadership</mark> Fundamentals"));
    assert!(body.contains(r#"<span class="badge no-highlight">Leadership &amp; Strategy</span>"#));
}

#[tokio::test]
async fn test_data_endpoint() {
    let (_, app) = app();
    let (status, _, json) = post_json(&app, "/data", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pmbok"]["name"], "PMBOK Guide");
    assert_eq!(json["agile"]["color"], "cyan");
    assert!(json["leadership"]["sections"].as_array().is_some());
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_signup_login_forgot_flow() {
    let (_, app) = app();

    let (status, _, json) = post_json(
        &app,
        "/api/auth/signup",
        json!({"name": "Ada", "email": "ada@example.com", "password": "longenough", "confirmPassword": "longenough"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["user"]["id"], 1);
    assert!(json["user"].get("password").is_none());

    let (status, _, json) = post_json(
        &app,
        "/api/auth/signup",
        json!({"name": "Ada", "email": "ADA@example.com", "password": "longenough"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Email already registered");

    let (status, cookie, json) = post_json(
        &app,
        "/api/auth/login",
        json!({"email": "ada@example.com", "password": "longenough"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["token"].as_str().is_some());
    assert!(cookie.unwrap().starts_with("pmcodex_session="));

    let (status, _, json) = post_json(&app, "/api/auth/forgot-password", json!({"email": "ada@example.com"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Password reset link sent to ada@example.com");

    let (status, _, json) = post_json(&app, "/api/auth/forgot-password", json!({"email": "bob@example.com"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "User not found");
}

#[tokio::test]
async fn test_auth_validation_errors() {
    let (_, app) = app();

    let (status, _, json) = post_json(&app, "/api/auth/login", json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["errors"]["email"], "Email is required");
    assert_eq!(json["errors"]["password"], "Password is required");

    let (status, _, json) = post_json(
        &app,
        "/api/auth/signup",
        json!({"name": "Ada", "email": "a@b.c", "password": "short", "confirmPassword": "other"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["errors"]["password"], "Password must be at least 8 characters");
    assert_eq!(json["errors"]["confirmPassword"], "Passwords do not match");

    let (status, _, _) = post_json(&app, "/api/auth/forgot-password", json!({"email": " "})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let (_, app) = app();

    let (status, _, json) =
        post_raw(&app, "/api/auth/login", Some("application/json"), "{not json".into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().starts_with("Invalid request"));

    let (status, _, json) = post_raw(
        &app,
        "/api/auth/signup",
        None,
        json!({"name": "Ada", "email": "ada@example.com"}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json["success"], false);

    let (status, _, json) =
        post_raw(&app, "/api/auth/forgot-password", Some("application/json"), "[1, 2]".into()).await;
    assert!(status.is_client_error());
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_login_rate_limited_after_failures() {
    let (_, app) = app();
    for _ in 0..5 {
        let (status, _, json) = post_json(
            &app,
            "/api/auth/login",
            json!({"email": "nobody@example.com", "password": "wrong"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Invalid credentials");
    }

    let (status, _, _) = post_json(
        &app,
        "/api/auth/login",
        json!({"email": "nobody@example.com", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_session_cookie_shows_user() {
    let (state, app) = app();
    let token = crate::auth::create_session(&state.secret, "ada@example.com").unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::get("/login")
                .header(header::COOKIE, format!("pmcodex_session={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .oneshot(
            Request::get("/about")
                .header(header::COOKIE, format!("pmcodex_session={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("ada@example.com"));
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let (_, app) = app();
    let response = app
        .oneshot(Request::get("/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));
}
