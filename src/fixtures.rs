//! Bundled reference data.
//!
//! The JSON files under `data/` are compiled into the binary and parsed once
//! at startup. Nothing here is ever mutated afterwards.

use crate::error::FixtureError;
use crate::models::{Analytics, DocumentInfo, KnowledgeBaseTab, Topic};

const TOPICS_JSON: &str = include_str!("../data/topics.json");
const KNOWLEDGE_BASE_JSON: &str = include_str!("../data/knowledge_base.json");
const DOCUMENTS_JSON: &str = include_str!("../data/documents.json");
const ANALYTICS_JSON: &str = include_str!("../data/analytics.json");

/// Document shown when a deep link names no document or an unknown one.
pub const DEFAULT_DOCUMENT_ID: u32 = 0;

/// Upper bound on home page topic suggestions.
pub const MAX_SUGGESTIONS: usize = 8;

#[derive(Debug, Clone)]
pub struct Library {
    pub topics: Vec<Topic>,
    pub knowledge_base: Vec<KnowledgeBaseTab>,
    pub documents: Vec<DocumentInfo>,
    pub analytics: Analytics,
}

fn parse<T: serde::de::DeserializeOwned>(name: &'static str, json: &str) -> Result<T, FixtureError> {
    serde_json::from_str(json).map_err(|source| FixtureError::Parse { name, source })
}

impl Library {
    pub fn load() -> Result<Self, FixtureError> {
        let library = Self {
            topics: parse("topics", TOPICS_JSON)?,
            knowledge_base: parse("knowledge base", KNOWLEDGE_BASE_JSON)?,
            documents: parse("documents", DOCUMENTS_JSON)?,
            analytics: parse("analytics", ANALYTICS_JSON)?,
        };

        if library.documents.is_empty() {
            return Err(FixtureError::Invalid("document catalog is empty".into()));
        }
        if library.knowledge_base.is_empty() {
            return Err(FixtureError::Invalid("knowledge base has no tabs".into()));
        }
        if library.topics.is_empty() {
            return Err(FixtureError::Invalid("no comparison topics".into()));
        }

        Ok(library)
    }

    // ------------------------------------------------------------------------
    // Topics
    // ------------------------------------------------------------------------

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|t| t.name.as_str())
    }

    /// Lookup ignores case and surrounding whitespace.
    pub fn topic(&self, name: &str) -> Option<&Topic> {
        let wanted = name.trim().to_lowercase();
        self.topics
            .iter()
            .find(|t| t.name.trim().to_lowercase() == wanted)
    }

    /// Topic names containing `query` (case-insensitive), in fixture order.
    pub fn suggestions(&self, query: &str) -> Vec<&str> {
        let q = query.trim().to_lowercase();
        self.topic_names()
            .filter(|name| name.to_lowercase().contains(&q))
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    // ------------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------------

    pub fn document(&self, id: u32) -> Option<&DocumentInfo> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// The requested document, or the default one when `id` is absent or
    /// not in the catalog.
    pub fn document_or_default(&self, id: Option<u32>) -> &DocumentInfo {
        id.and_then(|id| self.document(id))
            .or_else(|| self.document(DEFAULT_DOCUMENT_ID))
            .unwrap_or(&self.documents[0])
    }

    // ------------------------------------------------------------------------
    // Knowledge Base
    // ------------------------------------------------------------------------

    pub fn tab(&self, key: &str) -> Option<&KnowledgeBaseTab> {
        self.knowledge_base.iter().find(|t| t.key == key)
    }

    pub fn first_tab(&self) -> &KnowledgeBaseTab {
        &self.knowledge_base[0]
    }
}
