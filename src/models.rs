//! Data models for the reference library.
//!
//! Everything here is deserialized once from the bundled fixtures and then
//! read-only, except the auth request/response payloads at the bottom.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Presentation Colors
// ============================================================================

/// Accent color of a card or tab. Presentation only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    #[default]
    Blue,
    Purple,
    Emerald,
    Indigo,
    Cyan,
    #[serde(other)]
    Slate,
}

impl Accent {
    pub fn css_class(self) -> &'static str {
        match self {
            Accent::Blue => "accent-blue",
            Accent::Purple => "accent-purple",
            Accent::Emerald => "accent-emerald",
            Accent::Indigo => "accent-indigo",
            Accent::Cyan => "accent-cyan",
            Accent::Slate => "accent-slate",
        }
    }
}

// ============================================================================
// Book Comparison
// ============================================================================

/// One excerpt location inside a source document page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferencePoint {
    pub page_no: u32,
    /// Anchor phrase searched for on the page when the point is opened.
    pub start_text: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookEntry {
    pub book_id: u32,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub color: Accent,
    pub overview: String,
    /// Content overlapping with the other sources of the topic.
    #[serde(default)]
    pub similar_points: Vec<ReferencePoint>,
    /// Content unique to this source.
    #[serde(default)]
    pub distinct_points: Vec<ReferencePoint>,
}

impl BookEntry {
    /// Case-insensitive match on title or author.
    pub fn matches_filter(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term) || self.author.to_lowercase().contains(&term)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub name: String,
    pub books: Vec<BookEntry>,
}

// ============================================================================
// Knowledge Base
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subsection {
    /// Dotted numbering, e.g. "4.2".
    pub section: String,
    pub page: u32,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBaseSection {
    pub id: u32,
    pub number: String,
    pub title: String,
    /// Declared topic count; not checked against `subsections.len()`.
    pub count: u32,
    pub subsections: Vec<Subsection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBaseTab {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub color: Accent,
    /// Viewer document the subsection page numbers refer to, if any.
    #[serde(default)]
    pub document_id: Option<u32>,
    pub sections: Vec<KnowledgeBaseSection>,
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentInfo {
    pub id: u32,
    pub title: String,
    pub file: String,
}

// ============================================================================
// Analytics Dashboard
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatCard {
    pub title: String,
    pub value: String,
    /// Percent change versus the previous period.
    pub change: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderGrowth {
    pub month: String,
    pub free: u32,
    pub paid: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyActivity {
    pub time: String,
    pub users: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanShare {
    pub name: String,
    pub value: u32,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPerformance {
    pub category: String,
    pub views: u32,
    pub engagement: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analytics {
    pub stats: Vec<StatCard>,
    pub reader_growth: Vec<ReaderGrowth>,
    pub time_spent: Vec<HourlyActivity>,
    pub plans: Vec<PlanShare>,
    pub content: Vec<ContentPerformance>,
    pub revenue: Vec<MonthlyRevenue>,
}

// ============================================================================
// Auth API Payloads
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Only checked when the client sends it.
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// User as exposed over the API (never carries the password hash).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
    /// Per-field validation messages, keyed by form field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}
