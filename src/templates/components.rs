//! Shared HTML components: navigation bar, base page, and chart rows.

use crate::highlight::html_escape;

use super::styles::STYLE;

// ============================================================================
// Navigation Bar
// ============================================================================

const NAV_LINKS: [(&str, &str); 5] = [
    ("/", "Home"),
    ("/compare", "Compare"),
    ("/search", "Knowledge Base"),
    ("/pdf", "PDF Viewer"),
    ("/analytics", "Analytics"),
];

/// `active` is the path of the current page; `user` the signed-in email.
pub fn nav_bar(active: &str, user: Option<&str>) -> String {
    let links: String = NAV_LINKS
        .iter()
        .map(|(href, label)| {
            let class = if *href == active { " class=\"active\"" } else { "" };
            format!(r#"<a href="{}"{}>{}</a>"#, href, class, label)
        })
        .collect();

    let auth_link = match user {
        Some(email) => format!(
            r#"<span class="user">{}</span><a href="/logout">Logout</a>"#,
            html_escape(email)
        ),
        None => r#"<a href="/login">Login</a><a href="/signup">Sign up</a>"#.to_string(),
    };

    format!(
        r#"<nav class="nav-bar">
            <a href="/" class="brand">PM Codex</a>
            {links}
            <a href="/about"{about_class}>About</a>
            <span class="spacer"></span>
            {auth_link}
        </nav>"#,
        links = links,
        about_class = if active == "/about" { " class=\"active\"" } else { "" },
        auth_link = auth_link,
    )
}

// ============================================================================
// Base HTML Template
// ============================================================================

pub fn base_html(title: &str, content: &str, active: &str, user: Option<&str>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} · PM Codex</title>
    <style>{STYLE}</style>
</head>
<body>
    {nav}
    <div class="container">
        {content}
    </div>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav_bar(active, user),
    )
}

// ============================================================================
// Charts
// ============================================================================

/// One horizontal bar, scaled against `max`.
pub fn bar_row(label: &str, value: u32, max: u32, display: &str) -> String {
    let pct = if max == 0 {
        0.0
    } else {
        f64::from(value) * 100.0 / f64::from(max)
    };
    format!(
        r#"<div class="bar-row"><span>{}</span><div class="bar-track"><div class="bar-fill" style="width:{:.1}%"></div></div><span>{}</span></div>"#,
        html_escape(label),
        pct.min(100.0),
        html_escape(display)
    )
}

/// A titled chart of bars, all scaled against the largest value.
pub fn bar_chart<'a>(title: &str, rows: impl IntoIterator<Item = (&'a str, u32, String)>) -> String {
    let rows: Vec<_> = rows.into_iter().collect();
    let max = rows.iter().map(|(_, v, _)| *v).max().unwrap_or(0);
    let bars: String = rows
        .iter()
        .map(|(label, value, display)| bar_row(label, *value, max, display))
        .collect();
    format!(r#"<div class="chart"><h3>{}</h3>{}</div>"#, html_escape(title), bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_marks_active_and_user() {
        let html = nav_bar("/compare", Some("ada@example.com"));
        assert!(html.contains(r#"<a href="/compare" class="active">Compare</a>"#));
        assert!(html.contains("ada@example.com"));
        assert!(html.contains("/logout"));
        assert!(!nav_bar("/", None).contains("/logout"));
    }

    #[test]
    fn test_bar_scaling() {
        assert!(bar_row("Jan", 50, 200, "50").contains("width:25.0%"));
        assert!(bar_row("Jan", 5, 0, "5").contains("width:0.0%"));

        let chart = bar_chart("Revenue", vec![("Jan", 10, "10".to_string()), ("Feb", 20, "20".to_string())]);
        assert!(chart.contains("width:50.0%"));
        assert!(chart.contains("width:100.0%"));
    }
}
