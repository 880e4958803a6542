//! Request extractors that never reject with axum's plain-text bodies.
//!
//! Page routes read their query leniently: repeated keys keep the first
//! value and anything that still fails to deserialize falls back to the
//! query type's default. JSON endpoints route body rejections through
//! `AppError` so clients always get the `{success, message}` envelope.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, Uri},
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::convert::Infallible;

use crate::error::AppError;

// ============================================================================
// Query
// ============================================================================

/// Query string with first-value-wins semantics for repeated keys.
#[derive(Debug, Clone, Default)]
pub struct FirstQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for FirstQuery<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts.uri.query().unwrap_or("");
        Ok(Self(parse_first(raw)))
    }
}

/// Deserialize `raw` after dropping every repeat of an already-seen key.
pub fn parse_first<T: DeserializeOwned + Default>(raw: &str) -> T {
    let deduped = first_occurrences(raw);
    let parsed = format!("/?{}", deduped)
        .parse::<Uri>()
        .ok()
        .and_then(|uri| Query::<T>::try_from_uri(&uri).ok());

    match parsed {
        Some(Query(value)) => value,
        None => {
            tracing::debug!(query = %raw, "unusable query string; using defaults");
            T::default()
        }
    }
}

fn first_occurrences(raw: &str) -> String {
    let mut seen = HashSet::new();
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(k, _)| k);
            seen.insert(decode_key(key))
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn decode_key(key: &str) -> String {
    let key = key.replace('+', " ");
    match urlencoding::decode(&key) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => key,
    }
}

// ============================================================================
// JSON Body
// ============================================================================

/// `axum::Json` whose rejection renders as an `AppError`.
#[derive(Debug, Clone)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
