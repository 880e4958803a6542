//! JSON endpoints: account actions, page text, and the knowledge-base feed.

use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::auth::{
    create_session, hash_password, normalize_email, session_cookie, validate_email_only,
    validate_login, validate_signup, verify_password,
};
use crate::error::{AppError, AuthError};
use crate::extract::{AppJson, FirstQuery};
use crate::models::{AuthResponse, ForgotPasswordRequest, LoginRequest, SignupRequest};
use crate::viewer::{
    clamp_page, parse_int_prefix, runs_of, PageCount, PageTextResponse, SectionLocation,
};
use crate::{lock, AppState};

// ============================================================================
// Auth
// ============================================================================

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Response, AppError> {
    if lock(&state.login_rate_limit)?.is_locked() {
        tracing::warn!("login rejected while rate limited");
        return Err(AuthError::RateLimited.into());
    }

    validate_login(&req)?;

    let found = lock(&state.users)?.credentials(&req.email);
    let user = match found {
        Some((user, hash)) if verify_password(&req.password, &hash) => user,
        _ => {
            lock(&state.login_rate_limit)?.record_failure();
            tracing::warn!(email = %normalize_email(&req.email), "login failed");
            return Err(AuthError::InvalidCredentials.into());
        }
    };
    lock(&state.login_rate_limit)?.reset();

    let token = create_session(&state.secret, &user.email).ok_or(AuthError::Session)?;
    let cookie = HeaderValue::from_str(&session_cookie(&token)).map_err(|_| AuthError::Session)?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    tracing::info!(user = user.id, "login succeeded");

    let body = AuthResponse {
        success: true,
        token: Some(token),
        user: Some(user),
        ..Default::default()
    };
    Ok((headers, Json(body)).into_response())
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<Response, AppError> {
    validate_signup(&req)?;

    // Cheap duplicate check before paying for the hash; insert re-checks.
    if lock(&state.users)?.contains(&req.email) {
        return Err(AuthError::EmailTaken.into());
    }

    let hash = hash_password(&req.password)?;
    let user = lock(&state.users)?.insert(&req.name, &req.email, hash)?;

    tracing::info!(user = user.id, "account created");

    let body = AuthResponse {
        success: true,
        message: Some("User created successfully".into()),
        user: Some(user),
        ..Default::default()
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ForgotPasswordRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_email_only(&req.email)?;

    let email = normalize_email(&req.email);
    if !lock(&state.users)?.contains(&email) {
        return Err(AuthError::UserNotFound.into());
    }

    // No mail transport: the reset link is only acknowledged.
    tracing::info!(email = %email, "password reset requested");

    Ok(Json(AuthResponse {
        success: true,
        message: Some(format!("Password reset link sent to {}", email)),
        ..Default::default()
    }))
}

// ============================================================================
// Page Text
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PageTextQuery {
    #[serde(rename = "searchText")]
    pub search_text: Option<String>,
}

/// Text runs of one page, split into matched and unmatched segments.
///
/// Unknown document ids fall back to the default document; the response
/// names the document and page actually served.
pub async fn page_text(
    State(state): State<Arc<AppState>>,
    Path((id, page)): Path<(String, String)>,
    FirstQuery(query): FirstQuery<PageTextQuery>,
) -> Result<Json<PageTextResponse>, AppError> {
    let requested = parse_int_prefix(&id).and_then(|id| u32::try_from(id).ok());
    let document = state.library.document_or_default(requested);
    let path = state.config.docs_dir.join(&document.file);

    let text = state.documents.get_or_load(document.id, &path).await?;
    let page_count = text.page_count();
    let page = clamp_page(parse_int_prefix(&page).unwrap_or(1), page_count);

    let search_text = query.search_text.unwrap_or_default();
    let (layer, marks) = text.highlighted_layer(page, &search_text);

    Ok(Json(PageTextResponse {
        document_id: document.id,
        page,
        page_count: match page_count {
            PageCount::Known(n) => n,
            PageCount::Unknown => 0,
        },
        search_text,
        marks,
        runs: runs_of(&layer),
    }))
}

// ============================================================================
// Section Locator
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SectionQuery {
    pub title: Option<String>,
    pub skip: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub document_id: u32,
    #[serde(flatten)]
    pub location: SectionLocation,
}

/// Page on which a section title appears, shortening the title on a miss.
pub async fn section_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    FirstQuery(query): FirstQuery<SectionQuery>,
) -> Result<Json<SectionResponse>, AppError> {
    let requested = parse_int_prefix(&id).and_then(|id| u32::try_from(id).ok());
    let document = state.library.document_or_default(requested);
    let path = state.config.docs_dir.join(&document.file);

    let text = state.documents.get_or_load(document.id, &path).await?;
    let title = query.title.unwrap_or_default();
    let skip = query
        .skip
        .as_deref()
        .and_then(parse_int_prefix)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0);

    let location = text
        .find_section_page(&title, skip)
        .ok_or_else(|| AppError::NotFound(format!("Section not found: {}", title.trim())))?;

    Ok(Json(SectionResponse {
        document_id: document.id,
        location,
    }))
}

// ============================================================================
// Knowledge Base Feed
// ============================================================================

/// All knowledge-base tabs keyed by tab key.
pub async fn knowledge_base_data(State(state): State<Arc<AppState>>) -> Json<Value> {
    let tabs: Map<String, Value> = state
        .library
        .knowledge_base
        .iter()
        .map(|tab| {
            (
                tab.key.clone(),
                json!({
                    "name": tab.name,
                    "color": tab.color,
                    "sections": tab.sections,
                }),
            )
        })
        .collect();

    Json(Value::Object(tabs))
}
