//! Accounts, sessions, and login throttling.
//!
//! Users live in memory for the life of the process. Passwords are stored
//! as Argon2id hashes. Sessions are HMAC-signed tokens handed back in the
//! login response and also set as an HttpOnly cookie.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum_extra::extract::CookieJar;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AuthError, FieldErrors};
use crate::models::{LoginRequest, PublicUser, SignupRequest};

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name
pub const SESSION_COOKIE: &str = "pmcodex_session";

/// Session time-to-live in seconds
pub const SESSION_TTL_SECS: i64 = 3600;

pub const MIN_PASSWORD_LEN: usize = 8;

// ============================================================================
// Session Tokens
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    sub: String,
    created: i64,
    expires: i64,
    nonce: String,
}

/// Random signing key for processes started without a configured secret.
pub fn random_secret() -> Vec<u8> {
    let mut key = vec![0u8; 32];
    rand::thread_rng().fill(&mut key[..]);
    key
}

/// Create a signed session token for `subject`.
pub fn create_session(secret: &[u8], subject: &str) -> Option<String> {
    let now = Utc::now().timestamp();
    let nonce: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();

    let session = Session {
        sub: subject.to_string(),
        created: now,
        expires: now + SESSION_TTL_SECS,
        nonce,
    };
    let session_json = serde_json::to_string(&session).ok()?;

    Some(format!(
        "{}.{}",
        STANDARD.encode(session_json.as_bytes()),
        sign(secret, &session_json)?
    ))
}

/// Verify a session token, returning its subject when the signature holds
/// and the session has not expired.
pub fn verify_session(token: &str, secret: &[u8]) -> Option<String> {
    let (payload, signature) = token.split_once('.')?;
    let session_json = String::from_utf8(STANDARD.decode(payload).ok()?).ok()?;

    let expected = sign(secret, &session_json)?;
    let (given, expected) = (signature.as_bytes(), expected.as_bytes());
    if given.len() != expected.len() || given.ct_eq(expected).unwrap_u8() != 1 {
        return None;
    }

    let session: Session = serde_json::from_str(&session_json).ok()?;
    (Utc::now().timestamp() < session.expires).then_some(session.sub)
}

/// Subject of the request's session cookie, if it carries a valid one.
pub fn session_user(jar: &CookieJar, secret: &[u8]) -> Option<String> {
    verify_session(jar.get(SESSION_COOKIE)?.value(), secret)
}

pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE, token, SESSION_TTL_SECS
    )
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0", SESSION_COOKIE)
}

fn sign(secret: &[u8], payload: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    Some(hex_encode(mac.finalize().into_bytes().as_slice()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ============================================================================
// Password Hashing
// ============================================================================

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// ============================================================================
// User Store
// ============================================================================

#[derive(Debug, Clone)]
struct StoredUser {
    id: u64,
    name: String,
    email: String,
    password_hash: String,
}

impl StoredUser {
    fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// In-memory accounts. Emails are compared trimmed and lowercased.
#[derive(Debug)]
pub struct UserStore {
    users: Vec<StoredUser>,
    next_id: u64,
}

impl Default for UserStore {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            next_id: 1,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserStore {
    pub fn contains(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.users.iter().any(|u| u.email == email)
    }

    /// Add a user with an already-hashed password.
    pub fn insert(&mut self, name: &str, email: &str, password_hash: String) -> Result<PublicUser, AuthError> {
        if self.contains(email) {
            return Err(AuthError::EmailTaken);
        }

        let user = StoredUser {
            id: self.next_id,
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash,
        };
        self.next_id += 1;

        let public = user.public();
        self.users.push(user);
        Ok(public)
    }

    /// The user and their stored hash, for verification outside the lock.
    pub fn credentials(&self, email: &str) -> Option<(PublicUser, String)> {
        let email = normalize_email(email);
        self.users
            .iter()
            .find(|u| u.email == email)
            .map(|u| (u.public(), u.password_hash.clone()))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

// ============================================================================
// Request Validation
// ============================================================================

fn finish(errors: FieldErrors) -> Result<(), AuthError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(errors))
    }
}

pub fn validate_login(req: &LoginRequest) -> Result<(), AuthError> {
    let mut errors = FieldErrors::new();
    if req.email.trim().is_empty() {
        errors.insert("email".into(), "Email is required".into());
    }
    if req.password.is_empty() {
        errors.insert("password".into(), "Password is required".into());
    }
    finish(errors)
}

pub fn validate_signup(req: &SignupRequest) -> Result<(), AuthError> {
    let mut errors = FieldErrors::new();
    if req.name.trim().is_empty() {
        errors.insert("name".into(), "Name is required".into());
    }
    if req.email.trim().is_empty() {
        errors.insert("email".into(), "Email is required".into());
    }
    // The length message supersedes "required" for an empty password.
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            "password".into(),
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
    if let Some(confirm) = &req.confirm_password {
        if confirm != &req.password {
            errors.insert("confirmPassword".into(), "Passwords do not match".into());
        }
    }
    finish(errors)
}

pub fn validate_email_only(email: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() {
        return Err(AuthError::field("email", "Email is required"));
    }
    Ok(())
}

// ============================================================================
// Rate Limiting
// ============================================================================

/// Failures tolerated before lockouts start.
const FREE_FAILURES: u32 = 5;
const MAX_LOCKOUT_SECS: i64 = 64;

/// Tracks login failures for rate limiting with exponential backoff.
#[derive(Debug, Default)]
pub struct LoginRateLimit {
    pub failures: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LoginRateLimit {
    pub fn is_locked(&self) -> bool {
        self.locked_until.is_some_and(|until| Utc::now() < until)
    }

    /// After 5 failures, each further failure locks for 1, 2, 4, ... seconds
    /// up to 64.
    pub fn record_failure(&mut self) {
        self.failures += 1;
        if self.failures >= FREE_FAILURES {
            let shift = (self.failures - FREE_FAILURES).min(6);
            let delay_secs = (1i64 << shift).min(MAX_LOCKOUT_SECS);
            self.locked_until = Some(Utc::now() + chrono::Duration::seconds(delay_secs));
        }
    }

    pub fn reset(&mut self) {
        self.failures = 0;
        self.locked_until = None;
    }
}
