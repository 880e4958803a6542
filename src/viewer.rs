//! PDF viewer state: deep-link parsing, page clamping, and page text.
//!
//! A deep link names a document (`pdfId`), a page (`pageNum`) and a phrase
//! (`searchText`). The page is clamped once the document's page count is
//! known; the phrase is highlighted in that page's text layer as soon as the
//! document text has been extracted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::DocumentError;
use crate::fixtures::DEFAULT_DOCUMENT_ID;
use crate::highlight::Segment;
use crate::text_layer::{page_layer, Element, HighlightScope};

// ============================================================================
// Deep Links
// ============================================================================

/// Raw viewer query string. Values stay strings so that malformed numbers
/// fall back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewerQuery {
    #[serde(rename = "pdfId")]
    pub pdf_id: Option<String>,
    #[serde(rename = "pageNum")]
    pub page_num: Option<String>,
    #[serde(rename = "searchText")]
    pub search_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    /// Requested document; `None` when absent or not a non-negative integer.
    pub pdf_id: Option<u32>,
    /// Requested page before clamping.
    pub page: i64,
    pub search_text: String,
}

impl DeepLink {
    pub fn new(pdf_id: u32, page: i64, search_text: &str) -> Self {
        Self {
            pdf_id: Some(pdf_id),
            page,
            search_text: search_text.to_string(),
        }
    }

    pub fn from_query(query: &ViewerQuery) -> Self {
        let pdf_id = query
            .pdf_id
            .as_deref()
            .and_then(parse_int_prefix)
            .and_then(|id| u32::try_from(id).ok());
        let page = query
            .page_num
            .as_deref()
            .and_then(parse_int_prefix)
            .unwrap_or(1);

        Self {
            pdf_id,
            page,
            search_text: query.search_text.clone().unwrap_or_default(),
        }
    }

    /// Viewer URL for this link, percent-encoding the phrase.
    pub fn href(&self) -> String {
        self.href_on("/book")
    }

    /// Same link served by the viewer mounted at `base`.
    pub fn href_on(&self, base: &str) -> String {
        format!(
            "{}?pdfId={}&pageNum={}&searchText={}",
            base,
            self.pdf_id.unwrap_or(DEFAULT_DOCUMENT_ID),
            self.page,
            urlencoding::encode(&self.search_text)
        )
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: i64::from(page),
            ..self.clone()
        }
    }
}

/// Parse a leading integer the way browsers' `parseInt` does: optional
/// leading whitespace and sign, then digits; trailing garbage is ignored.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = match rest.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &rest[..end],
        None => rest,
    };
    if digits.is_empty() {
        return None;
    }

    // Saturate instead of failing on absurdly long numbers; clamping follows.
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

// ============================================================================
// Page Navigation
// ============================================================================

/// Page count of the open document. Unknown until the document has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    Unknown,
    Known(u32),
}

/// Clamp a requested page into `[1, count]`. With an unknown count only the
/// lower bound applies.
pub fn clamp_page(requested: i64, count: PageCount) -> u32 {
    let low = requested.max(1);
    let high = match count {
        PageCount::Known(n) => i64::from(n.max(1)),
        PageCount::Unknown => i64::from(u32::MAX),
    };
    u32::try_from(low.min(high)).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNav {
    pub page: u32,
    pub count: PageCount,
}

impl PageNav {
    pub fn new(requested: i64, count: PageCount) -> Self {
        Self {
            page: clamp_page(requested, count),
            count,
        }
    }

    /// Previous page, or `None` on the first page.
    pub fn prev(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }

    /// Next page, or `None` on the last page or while the count is unknown.
    pub fn next(&self) -> Option<u32> {
        match self.count {
            PageCount::Known(n) if self.page < n => Some(self.page + 1),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self.count {
            PageCount::Known(n) => format!("Page {} of {}", self.page, n),
            PageCount::Unknown => format!("Page {} of ?", self.page),
        }
    }
}

// ============================================================================
// Document Text
// ============================================================================

/// Extracted text of every page of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    pages: Vec<String>,
}

impl DocumentText {
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }

    pub fn page_count(&self) -> PageCount {
        PageCount::Known(u32::try_from(self.pages.len()).unwrap_or(u32::MAX))
    }

    /// 1-based page lookup.
    pub fn page(&self, number: u32) -> Option<&str> {
        let idx = usize::try_from(number).ok()?.checked_sub(1)?;
        self.pages.get(idx).map(String::as_str)
    }

    /// Text layer of `number` with `phrase` highlighted, plus the mark count.
    /// Pages past the end yield an empty layer.
    pub fn highlighted_layer(&self, number: u32, phrase: &str) -> (Element, usize) {
        let mut layer = page_layer(self.page(number).unwrap_or(""));
        let marks = layer.highlight(phrase, HighlightScope::TextLayer);
        (layer, marks)
    }
}

// ============================================================================
// Section Locator
// ============================================================================

/// Where a section title was found, and the form of the title that matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionLocation {
    pub page: u32,
    pub matched: String,
}

impl DocumentText {
    /// First page after `skip_pages` whose text contains `needle`,
    /// ignoring case.
    fn find_text(&self, needle: &str, skip_pages: u32) -> Option<u32> {
        let needle = needle.to_lowercase();
        self.pages
            .iter()
            .zip(1u32..)
            .skip(usize::try_from(skip_pages).unwrap_or(usize::MAX))
            .find(|(text, _)| text.to_lowercase().contains(&needle))
            .map(|(_, page)| page)
    }

    /// Locate the page where a section title appears.
    ///
    /// Extracted headings are often mangled, so a miss on the full title is
    /// retried with words dropped from the right (longest first), then with
    /// words dropped from the left. A single-word title is not shortened.
    pub fn find_section_page(&self, title: &str, skip_pages: u32) -> Option<SectionLocation> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let words: Vec<&str> = title.split_whitespace().collect();
        let right_trims = (1..words.len()).rev().map(|end| words[..end].join(" "));
        let left_trims = (1..words.len()).map(|start| words[start..].join(" "));

        std::iter::once(title.to_string())
            .chain(right_trims)
            .chain(left_trims)
            .find_map(|candidate| {
                let page = self.find_text(&candidate, skip_pages)?;
                tracing::debug!(title, matched = %candidate, page, "section located");
                Some(SectionLocation { page, matched: candidate })
            })
    }
}

/// Read and extract a PDF. Extraction is CPU-bound, so it runs on the
/// blocking pool; its completion is what lets highlighting start.
pub async fn load_document_text(path: &Path) -> Result<DocumentText, DocumentError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| DocumentError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
    })
    .await
    .map_err(|e| DocumentError::Task(e.to_string()))?
    .map_err(|e| DocumentError::Extract(e.to_string()))?;

    Ok(DocumentText::from_pages(pages))
}

/// Extracted documents by id. Failed loads are not cached.
#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: Mutex<HashMap<u32, Arc<DocumentText>>>,
}

impl DocumentCache {
    pub fn get(&self, id: u32) -> Option<Arc<DocumentText>> {
        self.entries.lock().ok()?.get(&id).cloned()
    }

    pub fn insert(&self, id: u32, text: DocumentText) -> Arc<DocumentText> {
        let text = Arc::new(text);
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(id, Arc::clone(&text));
        }
        text
    }

    pub async fn get_or_load(&self, id: u32, path: &Path) -> Result<Arc<DocumentText>, DocumentError> {
        if let Some(text) = self.get(id) {
            return Ok(text);
        }

        let started = std::time::Instant::now();
        let text = load_document_text(path).await?;
        tracing::info!(
            document = id,
            pages = text.pages.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "document text extracted"
        );
        Ok(self.insert(id, text))
    }
}

// ============================================================================
// Page Text API Payload
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTextResponse {
    pub document_id: u32,
    pub page: u32,
    pub page_count: u32,
    pub search_text: String,
    pub marks: usize,
    /// One entry per text run (line), each split into segments.
    pub runs: Vec<Vec<SegmentDto>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDto {
    pub text: String,
    pub is_match: bool,
}

impl From<Segment> for SegmentDto {
    fn from(seg: Segment) -> Self {
        Self {
            text: seg.text,
            is_match: seg.is_match,
        }
    }
}

pub fn runs_of(layer: &Element) -> Vec<Vec<SegmentDto>> {
    layer
        .child_elements()
        .map(|run| run.segments().into_iter().map(SegmentDto::from).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pdf: Option<&str>, page: Option<&str>, text: Option<&str>) -> ViewerQuery {
        ViewerQuery {
            pdf_id: pdf.map(str::to_string),
            page_num: page.map(str::to_string),
            search_text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("50"), Some(50));
        assert_eq!(parse_int_prefix("  7abc"), Some(7));
        assert_eq!(parse_int_prefix("-3"), Some(-3));
        assert_eq!(parse_int_prefix("+12"), Some(12));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_deep_link_from_query() {
        let link = DeepLink::from_query(&query(Some("2"), Some("50"), Some("Analytics")));
        assert_eq!(link, DeepLink::new(2, 50, "Analytics"));

        let defaults = DeepLink::from_query(&ViewerQuery::default());
        assert_eq!(defaults.pdf_id, None);
        assert_eq!(defaults.page, 1);
        assert_eq!(defaults.search_text, "");

        let bad = DeepLink::from_query(&query(Some("-1"), Some("x"), None));
        assert_eq!(bad.pdf_id, None);
        assert_eq!(bad.page, 1);
    }

    #[test]
    fn test_href_encodes_phrase() {
        let link = DeepLink::new(4, 43, "Assessing risk & more");
        assert_eq!(
            link.href(),
            "/book?pdfId=4&pageNum=43&searchText=Assessing%20risk%20%26%20more"
        );
        assert_eq!(link.with_page(44).page, 44);
    }

    #[test]
    fn test_clamp_page() {
        let n = 120;
        assert_eq!(clamp_page(n + 5, PageCount::Known(120)), 120);
        assert_eq!(clamp_page(0, PageCount::Known(120)), 1);
        assert_eq!(clamp_page(-8, PageCount::Known(120)), 1);
        assert_eq!(clamp_page(57, PageCount::Known(120)), 57);
        assert_eq!(clamp_page(500, PageCount::Unknown), 500);
        assert_eq!(clamp_page(-2, PageCount::Unknown), 1);
        assert_eq!(clamp_page(3, PageCount::Known(0)), 1);
    }

    #[test]
    fn test_nav_bounds() {
        let first = PageNav::new(1, PageCount::Known(3));
        assert_eq!((first.prev(), first.next()), (None, Some(2)));

        let last = PageNav::new(9, PageCount::Known(3));
        assert_eq!(last.page, 3);
        assert_eq!((last.prev(), last.next()), (Some(2), None));

        let unknown = PageNav::new(5, PageCount::Unknown);
        assert_eq!((unknown.prev(), unknown.next()), (Some(4), None));
        assert_eq!(unknown.label(), "Page 5 of ?");
        assert_eq!(last.label(), "Page 3 of 3");
    }

    #[test]
    fn test_document_text_pages() {
        let doc = DocumentText::from_pages(vec!["one".into(), "two".into()]);
        assert_eq!(doc.page_count(), PageCount::Known(2));
        assert_eq!(doc.page(1), Some("one"));
        assert_eq!(doc.page(2), Some("two"));
        assert_eq!(doc.page(0), None);
        assert_eq!(doc.page(3), None);
    }

    #[test]
    fn test_highlighted_layer_and_runs() {
        let doc = DocumentText::from_pages(vec![
            "cover".into(),
            "Data Analytics overview\nanalytics pipelines".into(),
        ]);
        let (layer, marks) = doc.highlighted_layer(2, "Analytics");
        assert_eq!(marks, 2);

        let runs = runs_of(&layer);
        assert_eq!(runs.len(), 2);
        assert_eq!(
            runs[0],
            vec![
                SegmentDto { text: "Data ".into(), is_match: false },
                SegmentDto { text: "Analytics".into(), is_match: true },
                SegmentDto { text: " overview".into(), is_match: false },
            ]
        );

        let (empty, none) = doc.highlighted_layer(7, "Analytics");
        assert_eq!(none, 0);
        assert!(empty.children.is_empty());
    }

    #[test]
    fn test_cache_roundtrip() {
        let cache = DocumentCache::default();
        assert!(cache.get(1).is_none());
        cache.insert(1, DocumentText::from_pages(vec!["p".into()]));
        assert_eq!(cache.get(1).unwrap().page(1), Some("p"));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let cache = DocumentCache::default();
        let err = cache
            .get_or_load(3, Path::new("definitely/not/here/book3.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
        assert!(cache.get(3).is_none());
    }

    fn handbook() -> DocumentText {
        DocumentText::from_pages(vec![
            "Contents\n6.2.1 The three project interests .... 78".into(),
            "6.2 Guidance for effective organizing".into(),
            "6.2.1 THE THREE PROJECT INTERESTS\nBusiness, user and supplier".into(),
            "Project log entries".into(),
            "the three project interests revisited".into(),
        ])
    }

    #[test]
    fn test_section_found_case_insensitively_after_skip() {
        let doc = handbook();
        let found = doc.find_section_page("6.2.1 The three project interests", 0).unwrap();
        assert_eq!(found.page, 1);

        let found = doc.find_section_page("6.2.1 The three project interests", 1).unwrap();
        assert_eq!(found.page, 3);
        assert_eq!(found.matched, "6.2.1 The three project interests");
    }

    #[test]
    fn test_section_title_shortened_from_right_first() {
        let doc = handbook();
        let found = doc.find_section_page("6.2 Guidance for effective planning", 0).unwrap();
        assert_eq!(found.matched, "6.2 Guidance for effective");
        assert_eq!(found.page, 2);
    }

    #[test]
    fn test_section_title_shortened_from_left_last() {
        let doc = handbook();
        // No right-trimmed prefix of "4.3.2 Project log" exists, but "Project log" does.
        let found = doc.find_section_page("4.3.2 Project log", 0).unwrap();
        assert_eq!(found.matched, "Project log");
        assert_eq!(found.page, 4);

        let found = doc.find_section_page("9.9 the three project interests", 3).unwrap();
        assert_eq!(found.matched, "the three project interests");
        assert_eq!(found.page, 5);
    }

    #[test]
    fn test_section_not_found() {
        let doc = handbook();
        assert!(doc.find_section_page("Stakeholders", 0).is_none());
        assert!(doc.find_section_page("   ", 0).is_none());
        assert!(doc.find_section_page("Project log", 5).is_none());
    }
}
