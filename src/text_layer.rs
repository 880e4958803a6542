//! Owned node tree for rendered page text, and the highlighter that runs on it.
//!
//! A page's text layer is a `div.text-layer` holding one `span.text-run` per
//! line of extracted text. Highlighting rewrites matching text nodes in
//! place: each one becomes a `span.hl-wrap` whose children alternate between
//! plain text and `mark` elements. Clearing reverses that exactly, so a
//! later search always sees whole, unfragmented text nodes.

use crate::highlight::{html_escape, Matcher, Segment};

pub const TEXT_LAYER_CLASS: &str = "text-layer";
pub const TEXT_RUN_CLASS: &str = "text-run";
pub const WRAP_CLASS: &str = "hl-wrap";
pub const NO_HIGHLIGHT_CLASS: &str = "no-highlight";
pub const MARK_TAG: &str = "mark";

const SKIPPED_TAGS: [&str; 2] = ["script", "style"];
const VOID_TAGS: [&str; 3] = ["br", "hr", "img"];

// ============================================================================
// Tree Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Text(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Which text nodes a highlight pass may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightScope {
    /// Every text node under the root, except inside `script`, `style`, and
    /// elements carrying the `no-highlight` class.
    Subtree,
    /// Only text nodes inside `.text-layer` elements (the root included).
    TextLayer,
}

// ============================================================================
// Construction
// ============================================================================

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn is_mark(&self) -> bool {
        self.tag == MARK_TAG
    }

    fn is_wrapper(&self) -> bool {
        self.tag == "span" && self.has_class(WRAP_CLASS)
    }

    fn is_excluded(&self) -> bool {
        SKIPPED_TAGS.contains(&self.tag.as_str()) || self.has_class(NO_HIGHLIGHT_CLASS)
    }
}

/// Build the text layer for one page of extracted text.
pub fn page_layer(page_text: &str) -> Element {
    page_text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .fold(Element::new("div").with_class(TEXT_LAYER_CLASS), |layer, line| {
            layer.child(Element::new("span").with_class(TEXT_RUN_CLASS).child(line))
        })
}

// ============================================================================
// Queries
// ============================================================================

impl Element {
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    pub fn mark_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                Node::Element(el) if el.is_mark() => 1 + el.mark_count(),
                Node::Element(el) => el.mark_count(),
                Node::Text(_) => 0,
            })
            .sum()
    }

    /// Document-order segments; text inside a `mark` is a match.
    pub fn segments(&self) -> Vec<Segment> {
        let mut out = Vec::new();
        self.collect_segments(&mut out);
        out
    }

    fn collect_segments(&self, out: &mut Vec<Segment>) {
        for child in &self.children {
            match child {
                Node::Text(t) if !t.is_empty() => out.push(Segment::plain(t.as_str())),
                Node::Text(_) => {}
                Node::Element(el) if el.is_mark() => out.push(Segment::matched(el.text_content())),
                Node::Element(el) => el.collect_segments(out),
            }
        }
    }

    /// Direct children that are elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }
}

// ============================================================================
// Clearing and Normalization
// ============================================================================

impl Element {
    /// Replace every `mark` with a text node of its content, unwrap the
    /// highlighter's own wrappers, and merge the resulting text nodes.
    pub fn clear_highlights(&mut self) {
        let children = std::mem::take(&mut self.children);
        for child in children {
            match child {
                Node::Element(el) if el.is_mark() => {
                    self.children.push(Node::Text(el.text_content()));
                }
                Node::Element(mut el) if el.is_wrapper() => {
                    el.clear_highlights();
                    self.children.extend(el.children);
                }
                Node::Element(mut el) => {
                    el.clear_highlights();
                    self.children.push(Node::Element(el));
                }
                text => self.children.push(text),
            }
        }
        self.merge_text_children();
    }

    /// Merge adjacent text nodes and drop empty ones, recursively.
    pub fn normalize(&mut self) {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.normalize();
            }
        }
        self.merge_text_children();
    }

    fn merge_text_children(&mut self) {
        let children = std::mem::take(&mut self.children);
        for child in children {
            match child {
                Node::Text(t) if t.is_empty() => {}
                Node::Text(t) => match self.children.last_mut() {
                    Some(Node::Text(prev)) => prev.push_str(&t),
                    _ => self.children.push(Node::Text(t)),
                },
                el => self.children.push(el),
            }
        }
    }
}

// ============================================================================
// Highlighting
// ============================================================================

impl Element {
    /// Mark every case-insensitive literal occurrence of `phrase`.
    ///
    /// An empty phrase is a no-op that leaves existing marks alone. Otherwise
    /// previous marks are cleared first, then each matching text node is
    /// replaced by a wrapper holding the split text. Returns the number of
    /// marks inserted. A phrase split across two text nodes is not found.
    pub fn highlight(&mut self, phrase: &str, scope: HighlightScope) -> usize {
        let Some(matcher) = Matcher::new(phrase) else {
            return 0;
        };

        match scope {
            HighlightScope::Subtree => {
                self.clear_highlights();
                self.mark_descendants(&matcher, true)
            }
            HighlightScope::TextLayer => {
                self.clear_text_layers();
                self.mark_text_layers(&matcher)
            }
        }
    }

    /// Clear marks inside `.text-layer` elements only.
    fn clear_text_layers(&mut self) {
        if self.has_class(TEXT_LAYER_CLASS) {
            self.clear_highlights();
            return;
        }
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.clear_text_layers();
            }
        }
    }

    fn mark_text_layers(&mut self, matcher: &Matcher) -> usize {
        if self.has_class(TEXT_LAYER_CLASS) {
            return self.mark_descendants(matcher, false);
        }

        self.children
            .iter_mut()
            .map(|child| match child {
                Node::Element(el) => el.mark_text_layers(matcher),
                Node::Text(_) => 0,
            })
            .sum()
    }

    fn mark_descendants(&mut self, matcher: &Matcher, honor_exclusions: bool) -> usize {
        let mut inserted = 0;

        for child in &mut self.children {
            match child {
                Node::Text(text) if matcher.is_match(text) => {
                    let wrapper = wrap_matches(text, matcher);
                    inserted += wrapper.mark_count();
                    *child = Node::Element(wrapper);
                }
                Node::Text(_) => {}
                Node::Element(el) if honor_exclusions && el.is_excluded() => {}
                Node::Element(el) => inserted += el.mark_descendants(matcher, honor_exclusions),
            }
        }

        inserted
    }
}

fn wrap_matches(text: &str, matcher: &Matcher) -> Element {
    matcher
        .segments(text)
        .into_iter()
        .fold(Element::new("span").with_class(WRAP_CLASS), |wrapper, seg| {
            if seg.is_match {
                wrapper.child(Element::new(MARK_TAG).child(seg.text))
            } else {
                wrapper.child(seg.text)
            }
        })
}

// ============================================================================
// HTML Rendering
// ============================================================================

impl Element {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if !self.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", html_escape(&self.classes.join(" "))));
        }
        for (name, value) in &self.attrs {
            out.push_str(&format!(" {}=\"{}\"", name, html_escape(value)));
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }

        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(&html_escape(t)),
                Node::Element(el) => el.write_html(out),
            }
        }

        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}
