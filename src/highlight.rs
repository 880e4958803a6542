//! Literal, case-insensitive phrase matching.
//!
//! The matcher works on plain strings and produces an ordered list of
//! `{text, is_match}` segments. Tree rewriting lives in `text_layer`; this
//! module stays pure so the matching rules can be tested on their own.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::ops::Range;

// ============================================================================
// Segments
// ============================================================================

/// One run of text, either a match of the search phrase or the text between
/// matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub is_match: bool,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_match: false,
        }
    }

    pub fn matched(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_match: true,
        }
    }
}

// ============================================================================
// Matcher
// ============================================================================

/// Compiled search phrase. Regex metacharacters in the phrase are escaped,
/// so `"Risk (Management)"` only matches those exact characters.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Returns `None` for the empty phrase, which means "highlight nothing".
    pub fn new(phrase: &str) -> Option<Self> {
        if phrase.is_empty() {
            return None;
        }

        let regex = match RegexBuilder::new(&regex::escape(phrase))
            .case_insensitive(true)
            .build()
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, len = phrase.len(), "search phrase rejected");
                return None;
            }
        };

        Some(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Byte ranges of every non-overlapping match, left to right.
    pub fn find_ranges(&self, text: &str) -> Vec<Range<usize>> {
        self.regex.find_iter(text).map(|m| m.range()).collect()
    }

    pub fn count(&self, text: &str) -> usize {
        self.regex.find_iter(text).count()
    }

    /// Split `text` into plain and matched segments. Concatenating the
    /// segment texts always gives back `text`; empty runs are omitted.
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut last = 0;

        for range in self.find_ranges(text) {
            if range.start > last {
                segments.push(Segment::plain(&text[last..range.start]));
            }
            segments.push(Segment::matched(&text[range.clone()]));
            last = range.end;
        }

        if last < text.len() {
            segments.push(Segment::plain(&text[last..]));
        }

        segments
    }
}

// ============================================================================
// Text Escaping
// ============================================================================

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape `text` for HTML and wrap every match in `<mark>`.
pub fn mark_html(text: &str, matcher: Option<&Matcher>) -> String {
    let Some(matcher) = matcher else {
        return html_escape(text);
    };

    matcher
        .segments(text)
        .iter()
        .map(|seg| {
            if seg.is_match {
                format!("<mark>{}</mark>", html_escape(&seg.text))
            } else {
                html_escape(&seg.text)
            }
        })
        .collect()
}
