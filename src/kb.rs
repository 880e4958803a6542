//! Knowledge-base browser state and search.
//!
//! The browser has one active tab and a set of expanded section rows. Both
//! live in the query string (`?tab=agile&open=1,3`), so every link on the
//! page carries the complete next state.

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::fixtures::Library;
use crate::highlight::Matcher;
use crate::models::{KnowledgeBaseSection, KnowledgeBaseTab, Subsection};

/// Message shown when a knowledge-base search is submitted without a term.
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a search term.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowserQuery {
    pub tab: Option<String>,
    pub open: Option<String>,
}

// ============================================================================
// Browser State
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserState {
    pub active_tab: String,
    pub expanded: BTreeSet<u32>,
}

impl BrowserState {
    /// Unknown tab keys fall back to the first tab; unparseable row ids are
    /// dropped.
    pub fn from_query(query: &BrowserQuery, library: &Library) -> Self {
        let active_tab = query
            .tab
            .as_deref()
            .and_then(|key| library.tab(key))
            .unwrap_or_else(|| library.first_tab())
            .key
            .clone();

        let expanded = query
            .open
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect();

        Self { active_tab, expanded }
    }

    pub fn is_expanded(&self, row: u32) -> bool {
        self.expanded.contains(&row)
    }

    /// Switch tabs. Expansion is cleared even when `key` is already active.
    pub fn select_tab(&self, key: &str) -> Self {
        Self {
            active_tab: key.to_string(),
            expanded: BTreeSet::new(),
        }
    }

    /// Flip one row, leaving the others as they are.
    pub fn toggle_row(&self, row: u32) -> Self {
        let mut expanded = self.expanded.clone();
        if !expanded.remove(&row) {
            expanded.insert(row);
        }
        Self {
            active_tab: self.active_tab.clone(),
            expanded,
        }
    }

    /// `/search` link reproducing this state.
    pub fn href(&self) -> String {
        if self.expanded.is_empty() {
            return format!("/search?tab={}", urlencoding::encode(&self.active_tab));
        }
        let open: Vec<String> = self.expanded.iter().map(u32::to_string).collect();
        format!(
            "/search?tab={}&open={}",
            urlencoding::encode(&self.active_tab),
            open.join(",")
        )
    }
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KbSearchQuery {
    pub q: Option<String>,
}

/// Outcome of validating a submitted search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchInput {
    /// Page opened without submitting anything.
    Idle,
    /// Submitted blank; show the validation message and do not search.
    Invalid(&'static str),
    Term(String),
}

impl SearchInput {
    pub fn from_query(query: &KbSearchQuery) -> Self {
        match query.q.as_deref() {
            None => SearchInput::Idle,
            Some(raw) if raw.trim().is_empty() => SearchInput::Invalid(EMPTY_QUERY_MESSAGE),
            Some(raw) => SearchInput::Term(raw.trim().to_string()),
        }
    }
}

/// A section or subsection whose title contains the search term.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub tab: &'a KnowledgeBaseTab,
    pub section: &'a KnowledgeBaseSection,
    /// `None` when the section title itself matched.
    pub subsection: Option<&'a Subsection>,
}

impl SearchHit<'_> {
    pub fn title(&self) -> &str {
        match self.subsection {
            Some(sub) => &sub.title,
            None => &self.section.title,
        }
    }

    pub fn number(&self) -> &str {
        match self.subsection {
            Some(sub) => &sub.section,
            None => &self.section.number,
        }
    }

    pub fn page(&self) -> Option<u32> {
        self.subsection.map(|sub| sub.page)
    }
}

/// Case-insensitive literal title search across every tab, in fixture order.
pub fn search_knowledge_base<'a>(library: &'a Library, term: &str) -> Vec<SearchHit<'a>> {
    let Some(matcher) = Matcher::new(term) else {
        return Vec::new();
    };

    let mut hits = Vec::new();
    for tab in &library.knowledge_base {
        for section in &tab.sections {
            if matcher.is_match(&section.title) {
                hits.push(SearchHit { tab, section, subsection: None });
            }
            for sub in &section.subsections {
                if matcher.is_match(&sub.title) {
                    hits.push(SearchHit { tab, section, subsection: Some(sub) });
                }
            }
        }
    }
    hits
}
