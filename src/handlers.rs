//! HTTP route handlers for the HTML pages.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::{expired_session_cookie, session_user};
use crate::extract::FirstQuery;
use crate::highlight::{html_escape, mark_html, Matcher};
use crate::kb::{search_knowledge_base, BrowserQuery, BrowserState, KbSearchQuery, SearchInput};
use crate::models::{BookEntry, ReferencePoint, Topic};
use crate::templates::{
    bar_chart, base_html, forgot_password_form, login_form, render_viewer, signup_form, ViewerPage,
};
use crate::text_layer::{Element, HighlightScope, NO_HIGHLIGHT_CLASS};
use crate::viewer::{DeepLink, PageCount, PageNav, ViewerQuery};
use crate::AppState;

fn current_user(state: &AppState, jar: &CookieJar) -> Option<String> {
    session_user(jar, &state.secret)
}

// ============================================================================
// Home
// ============================================================================

#[derive(Deserialize, Default)]
pub struct HomeQuery {
    pub q: Option<String>,
}

pub async fn home(
    State(state): State<Arc<AppState>>,
    FirstQuery(query): FirstQuery<HomeQuery>,
    jar: CookieJar,
) -> Html<String> {
    let user = current_user(&state, &jar);
    let q = query.q.unwrap_or_default();

    let suggestions = state.library.suggestions(&q);
    let matcher = Matcher::new(q.trim());
    let list_html = if suggestions.is_empty() {
        r#"<p class="empty">No matching topics.</p>"#.to_string()
    } else {
        let items: String = suggestions
            .iter()
            .map(|name| {
                format!(
                    r#"<li><a href="/compare?topic={}">{}</a></li>"#,
                    urlencoding::encode(name.trim()),
                    mark_html(name, matcher.as_ref())
                )
            })
            .collect();
        format!(r#"<ul class="suggestions">{}</ul>"#, items)
    };

    let html = format!(
        r#"<section class="hero">
            <h1>PM Codex</h1>
            <p>Compare how PMBOK, PRINCE2, and ISO 21502 treat the same project management topic, then jump straight to the page that says it.</p>
            <div class="suggest-box">
                <form action="/" method="get">
                    <input type="text" name="q" placeholder="Search a topic, e.g. Risk Management" value="{q}" autofocus>
                    <button class="btn" type="submit">Search</button>
                </form>
                {list_html}
            </div>
        </section>
        <div class="feature-grid">
            <div class="feature"><h3>Side-by-side comparison</h3><p>Overview, shared ground, and unique points of each standard.</p><a href="/compare">Open comparison</a></div>
            <div class="feature"><h3>Knowledge base</h3><p>Browse the chapters of each guide and open the exact page.</p><a href="/search">Browse sections</a></div>
            <div class="feature"><h3>Highlighted reading</h3><p>Every reference opens the source PDF with the quoted phrase marked.</p><a href="/pdf">Open viewer</a></div>
            <div class="feature"><h3>Reader analytics</h3><p>Growth, engagement, and revenue at a glance.</p><a href="/analytics">View dashboard</a></div>
        </div>"#,
        q = html_escape(&q),
        list_html = list_html,
    );

    Html(base_html("Home", &html, "/", user.as_deref()))
}

// ============================================================================
// About
// ============================================================================

pub async fn about(State(state): State<Arc<AppState>>, jar: CookieJar) -> Html<String> {
    let user = current_user(&state, &jar);
    let html = r#"
        <h1>About PM Codex</h1>
        <p>PM Codex is a reading companion for the major project management standards.
        It lines up what the PMBOK Guide, PRINCE2, and ISO 21502 say about the same
        topic, and links each excerpt back to the page it came from.</p>
        <h2>How references work</h2>
        <p>Every excerpt carries a page number and the phrase it starts with. Opening
        it loads the document at that page and highlights the phrase wherever it
        appears in the page text.</p>
    "#;
    Html(base_html("About", html, "/about", user.as_deref()))
}

// ============================================================================
// PDF Viewer
// ============================================================================

/// Phrase and page shown by the fixed `/book-123` route.
pub const PRESET_LINK: (u32, i64, &str) = (1, 117, "Column-Oriented Storage");

pub async fn pdf_viewer(
    State(state): State<Arc<AppState>>,
    FirstQuery(query): FirstQuery<ViewerQuery>,
    jar: CookieJar,
) -> Html<String> {
    show_document(&state, DeepLink::from_query(&query), "/pdf", &jar).await
}

pub async fn book_viewer(
    State(state): State<Arc<AppState>>,
    FirstQuery(query): FirstQuery<ViewerQuery>,
    jar: CookieJar,
) -> Html<String> {
    show_document(&state, DeepLink::from_query(&query), "/book", &jar).await
}

pub async fn book_preset(State(state): State<Arc<AppState>>, jar: CookieJar) -> Html<String> {
    let (pdf_id, page, phrase) = PRESET_LINK;
    show_document(&state, DeepLink::new(pdf_id, page, phrase), "/book", &jar).await
}

/// Load the linked document, clamp the page, and highlight the phrase in
/// that page's text layer once extraction has finished.
async fn show_document(state: &AppState, link: DeepLink, active: &str, jar: &CookieJar) -> Html<String> {
    let user = current_user(state, jar);
    let document = state.library.document_or_default(link.pdf_id);
    let path = state.config.docs_dir.join(&document.file);

    let (nav, layer_html, marks) = match state.documents.get_or_load(document.id, &path).await {
        Ok(text) => {
            let nav = PageNav::new(link.page, text.page_count());
            let (layer, marks) = text.highlighted_layer(nav.page, &link.search_text);
            tracing::debug!(document = document.id, page = nav.page, marks, "page highlighted");
            (nav, Some(layer.to_html()), marks)
        }
        Err(e) => {
            tracing::warn!(document = document.id, error = %e, "failed to load document");
            (PageNav::new(link.page, PageCount::Unknown), None, 0)
        }
    };

    let page = ViewerPage {
        document,
        link: DeepLink {
            pdf_id: Some(document.id),
            page: i64::from(nav.page),
            search_text: link.search_text,
        },
        nav,
        layer_html,
        marks,
        active,
    };

    Html(render_viewer(&page, user.as_deref()))
}

// ============================================================================
// Book Comparison
// ============================================================================

#[derive(Deserialize, Default)]
pub struct CompareQuery {
    pub topic: Option<String>,
    pub section: Option<String>,
    pub filter: Option<String>,
}

const COMPARE_SECTIONS: [(&str, &str); 3] = [
    ("overview", "Overview"),
    ("similar", "Similarities"),
    ("unique", "Unique Points"),
];

fn compare_href(topic: &str, section: &str, filter: &str) -> String {
    let mut href = format!(
        "/compare?topic={}&section={}",
        urlencoding::encode(topic.trim()),
        section
    );
    if !filter.is_empty() {
        href.push_str(&format!("&filter={}", urlencoding::encode(filter)));
    }
    href
}

fn render_points(points: &[ReferencePoint], book: &BookEntry) -> String {
    if points.is_empty() {
        return r#"<p class="empty">Nothing listed.</p>"#.to_string();
    }
    points
        .iter()
        .map(|point| {
            let link = DeepLink::new(book.book_id, i64::from(point.page_no), &point.start_text);
            format!(
                r#"<div class="point">{}<div class="ref"><a href="{}">p. {} · “{}”</a></div></div>"#,
                html_escape(&point.content),
                html_escape(&link.href()),
                point.page_no,
                html_escape(&point.start_text)
            )
        })
        .collect()
}

fn render_book(book: &BookEntry, section: &str, matcher: Option<&Matcher>) -> String {
    let body = match section {
        "similar" => render_points(&book.similar_points, book),
        "unique" => render_points(&book.distinct_points, book),
        _ => format!("<p>{}</p>", html_escape(&book.overview)),
    };
    format!(
        r#"<div class="book-card {accent}">
            <h3>{title}</h3>
            <div class="author">{author}</div>
            {body}
        </div>"#,
        accent = book.color.css_class(),
        title = mark_html(&book.title, matcher),
        author = mark_html(&book.author, matcher),
        body = body,
    )
}

pub async fn compare(
    State(state): State<Arc<AppState>>,
    FirstQuery(query): FirstQuery<CompareQuery>,
    jar: CookieJar,
) -> Html<String> {
    let user = current_user(&state, &jar);
    let library = &state.library;

    let topic: &Topic = query
        .topic
        .as_deref()
        .and_then(|name| library.topic(name))
        .unwrap_or(&library.topics[0]);
    let section = query
        .section
        .as_deref()
        .filter(|s| COMPARE_SECTIONS.iter().any(|(key, _)| key == s))
        .unwrap_or("overview");
    let filter = query.filter.unwrap_or_default();
    let filter = filter.trim();

    let topic_tabs: String = library
        .topic_names()
        .map(|name| {
            let class = if name == topic.name { " class=\"active\"" } else { "" };
            format!(
                r#"<a href="{}"{}>{}</a>"#,
                html_escape(&compare_href(name, section, filter)),
                class,
                html_escape(name.trim())
            )
        })
        .collect();

    let section_tabs: String = COMPARE_SECTIONS
        .iter()
        .map(|(key, label)| {
            let class = if *key == section { " class=\"active\"" } else { "" };
            format!(
                r#"<a href="{}"{}>{}</a>"#,
                html_escape(&compare_href(&topic.name, key, filter)),
                class,
                label
            )
        })
        .collect();

    let matcher = Matcher::new(filter);
    let books: Vec<&BookEntry> = topic
        .books
        .iter()
        .filter(|b| filter.is_empty() || b.matches_filter(filter))
        .collect();
    let grid = if books.is_empty() {
        format!(r#"<p class="empty">No books match “{}”.</p>"#, html_escape(filter))
    } else {
        let cards: String = books
            .iter()
            .map(|b| render_book(b, section, matcher.as_ref()))
            .collect();
        format!(r#"<div class="book-grid">{}</div>"#, cards)
    };

    let html = format!(
        r#"<h1>{title}</h1>
        <div class="topic-tabs">{topic_tabs}</div>
        <div class="section-tabs">{section_tabs}</div>
        <form class="filter-box" action="/compare" method="get">
            <input type="hidden" name="topic" value="{topic_value}">
            <input type="hidden" name="section" value="{section}">
            <input type="text" name="filter" placeholder="Filter by title or author" value="{filter}">
            <button class="btn secondary" type="submit">Filter</button>
        </form>
        {grid}"#,
        title = html_escape(topic.name.trim()),
        topic_tabs = topic_tabs,
        section_tabs = section_tabs,
        topic_value = html_escape(topic.name.trim()),
        section = section,
        filter = html_escape(filter),
        grid = grid,
    );

    Html(base_html("Compare", &html, "/compare", user.as_deref()))
}

// ============================================================================
// Analytics
// ============================================================================

#[derive(Deserialize, Default)]
pub struct AnalyticsQuery {
    pub range: Option<String>,
}

const RANGES: [(&str, &str); 4] = [
    ("7d", "Last 7 days"),
    ("30d", "Last 30 days"),
    ("90d", "Last 90 days"),
    ("1y", "Last year"),
];

pub async fn analytics(
    State(state): State<Arc<AppState>>,
    FirstQuery(query): FirstQuery<AnalyticsQuery>,
    jar: CookieJar,
) -> Html<String> {
    let user = current_user(&state, &jar);
    let data = &state.library.analytics;

    // The range only changes the label; the fixtures have one period.
    let range = query
        .range
        .as_deref()
        .filter(|r| RANGES.iter().any(|(key, _)| key == r))
        .unwrap_or("30d");

    let picker: String = RANGES
        .iter()
        .map(|(key, label)| {
            let class = if *key == range { " class=\"active\"" } else { "" };
            format!(r#"<a href="/analytics?range={}"{}>{}</a>"#, key, class, label)
        })
        .collect();

    let cards: String = data
        .stats
        .iter()
        .map(|stat| {
            let (class, sign) = if stat.change >= 0.0 { ("up", "+") } else { ("down", "") };
            format!(
                r#"<div class="stat-card"><div>{}</div><div class="value">{}</div><div class="change {}">{}{:.1}%</div></div>"#,
                html_escape(&stat.title),
                html_escape(&stat.value),
                class,
                sign,
                stat.change
            )
        })
        .collect();

    let growth = bar_chart(
        "Reader growth",
        data.reader_growth
            .iter()
            .map(|m| (m.month.as_str(), m.total, format!("{} ({} paid)", m.total, m.paid))),
    );
    let activity = bar_chart(
        "Active readers by hour",
        data.time_spent
            .iter()
            .map(|h| (h.time.as_str(), h.users, h.users.to_string())),
    );
    let plans = bar_chart(
        "Plan distribution",
        data.plans
            .iter()
            .map(|p| (p.name.as_str(), p.value, format!("{}%", p.value))),
    );
    let content = bar_chart(
        "Content performance",
        data.content
            .iter()
            .map(|c| (c.category.as_str(), c.views, format!("{} · {}%", c.views, c.engagement))),
    );
    let revenue = bar_chart(
        "Revenue",
        data.revenue
            .iter()
            .map(|r| (r.month.as_str(), r.revenue, format!("${}", r.revenue))),
    );

    let label = RANGES
        .iter()
        .find(|(key, _)| *key == range)
        .map(|(_, label)| *label)
        .unwrap_or("Last 30 days");

    let html = format!(
        r#"<h1>Analytics</h1>
        <p class="range-picker">{picker}</p>
        <p class="match-count">Showing: {label}</p>
        <div class="stat-grid">{cards}</div>
        {growth}{activity}{plans}{content}{revenue}"#,
    );

    Html(base_html("Analytics", &html, "/analytics", user.as_deref()))
}

// ============================================================================
// Knowledge Base
// ============================================================================

pub async fn knowledge_base(
    State(state): State<Arc<AppState>>,
    FirstQuery(query): FirstQuery<BrowserQuery>,
    jar: CookieJar,
) -> Html<String> {
    let user = current_user(&state, &jar);
    let library = &state.library;
    let browser = BrowserState::from_query(&query, library);
    let tab = library
        .tab(&browser.active_tab)
        .unwrap_or_else(|| library.first_tab());

    let tabs: String = library
        .knowledge_base
        .iter()
        .map(|t| {
            let class = if t.key == tab.key { "active" } else { "" };
            format!(
                r#"<a href="{}" class="{} {}">{}</a>"#,
                html_escape(&browser.select_tab(&t.key).href()),
                t.color.css_class(),
                class,
                html_escape(&t.name)
            )
        })
        .collect();

    let mut rows = String::new();
    for section in &tab.sections {
        let expanded = browser.is_expanded(section.id);
        rows.push_str(&format!(
            r#"<tr class="kb-row"><td><a class="toggle" href="{}">{} {}. {}</a><span class="kb-count">{} topics</span></td></tr>"#,
            html_escape(&browser.toggle_row(section.id).href()),
            if expanded { "▾" } else { "▸" },
            html_escape(&section.number),
            html_escape(&section.title),
            section.count
        ));

        if !expanded {
            continue;
        }
        for sub in &section.subsections {
            let page = match tab.document_id {
                Some(id) => format!(
                    r#"<a class="page" href="{}">p. {}</a>"#,
                    html_escape(&DeepLink::new(id, i64::from(sub.page), &sub.title).href()),
                    sub.page
                ),
                None => format!(r#"<span class="page">p. {}</span>"#, sub.page),
            };
            rows.push_str(&format!(
                r#"<tr class="kb-sub"><td><span class="num">{}</span>{}{}</td></tr>"#,
                html_escape(&sub.section),
                html_escape(&sub.title),
                page
            ));
        }
    }

    let html = format!(
        r#"<h1>Knowledge Base</h1>
        <form class="filter-box" action="/search2" method="get">
            <input type="text" name="q" placeholder="Search all sections">
            <button class="btn secondary" type="submit">Search</button>
        </form>
        <div class="kb-tabs">{tabs}</div>
        <table class="kb-table {accent}">{rows}</table>"#,
        tabs = tabs,
        accent = tab.color.css_class(),
        rows = rows,
    );

    Html(base_html("Knowledge Base", &html, "/search", user.as_deref()))
}

pub async fn knowledge_base_search(
    State(state): State<Arc<AppState>>,
    FirstQuery(query): FirstQuery<KbSearchQuery>,
    jar: CookieJar,
) -> Html<String> {
    let user = current_user(&state, &jar);

    let (value, results) = match SearchInput::from_query(&query) {
        SearchInput::Idle => (String::new(), String::new()),
        SearchInput::Invalid(message) => (
            query.q.clone().unwrap_or_default(),
            format!(r#"<div class="message error">{}</div>"#, message),
        ),
        SearchInput::Term(term) => {
            let results = render_search_results(&state, &term);
            (term, results)
        }
    };

    let html = format!(
        r#"<h1>Search the Knowledge Base</h1>
        <form class="filter-box" action="/search2" method="get">
            <input type="text" name="q" placeholder="e.g. scope, Scrum, leadership" value="{}">
            <button class="btn" type="submit">Search</button>
        </form>
        {}"#,
        html_escape(&value),
        results
    );

    Html(base_html("Search", &html, "/search", user.as_deref()))
}

fn render_search_results(state: &AppState, term: &str) -> String {
    let hits = search_knowledge_base(&state.library, term);
    if hits.is_empty() {
        return format!(r#"<p class="empty">No sections mention “{}”.</p>"#, html_escape(term));
    }

    let mut root = Element::new("div").with_class("search-results");
    for hit in &hits {
        let href = match (hit.tab.document_id, hit.page()) {
            (Some(id), Some(page)) => DeepLink::new(id, i64::from(page), hit.title()).href(),
            _ => format!("/search?tab={}&open={}", urlencoding::encode(&hit.tab.key), hit.section.id),
        };
        let mut row = Element::new("div")
            .with_class("hit")
            .child(
                Element::new("span")
                    .with_class("badge")
                    .with_class(NO_HIGHLIGHT_CLASS)
                    .child(hit.tab.name.as_str()),
            )
            .child(
                Element::new("span")
                    .with_class("num")
                    .with_class(NO_HIGHLIGHT_CLASS)
                    .child(hit.number()),
            )
            .child(Element::new("a").with_attr("href", &href).child(hit.title()));
        if let Some(page) = hit.page() {
            row = row.child(
                Element::new("span")
                    .with_class("page")
                    .with_class(NO_HIGHLIGHT_CLASS)
                    .child(format!("p. {}", page)),
            );
        }
        root = root.child(row);
    }

    let marks = root.highlight(term, HighlightScope::Subtree);
    tracing::debug!(term, hits = hits.len(), marks, "knowledge base searched");

    format!(
        r#"<p class="match-count">{} result{}</p>{}"#,
        hits.len(),
        if hits.len() == 1 { "" } else { "s" },
        root.to_html()
    )
}

// ============================================================================
// Authentication Pages
// ============================================================================

pub async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if current_user(&state, &jar).is_some() {
        return Redirect::to("/").into_response();
    }
    Html(base_html("Login", &login_form(), "/login", None)).into_response()
}

pub async fn signup_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if current_user(&state, &jar).is_some() {
        return Redirect::to("/").into_response();
    }
    Html(base_html("Sign up", &signup_form(), "/signup", None)).into_response()
}

pub async fn forgot_password_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Html<String> {
    let user = current_user(&state, &jar);
    Html(base_html(
        "Reset password",
        &forgot_password_form(),
        "/forgot-password",
        user.as_deref(),
    ))
}

pub async fn logout() -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = HeaderValue::from_str(&expired_session_cookie()) {
        headers.insert(SET_COOKIE, cookie);
    }
    (headers, Redirect::to("/")).into_response()
}

pub async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
#[path = "handlers_test.rs"]
mod handlers_test;
