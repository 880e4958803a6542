//! PDF viewer page.
//!
//! The page canvas is drawn client-side by pdf.js; the highlighted text
//! layer next to it is rendered on the server.

use crate::highlight::html_escape;
use crate::models::DocumentInfo;
use crate::viewer::{DeepLink, PageNav};

use super::components::base_html;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load PDF.";

pub struct ViewerPage<'a> {
    pub document: &'a DocumentInfo,
    /// Deep link with the page already clamped.
    pub link: DeepLink,
    pub nav: PageNav,
    /// Highlighted text layer, or `None` when the document failed to load.
    pub layer_html: Option<String>,
    pub marks: usize,
    pub active: &'a str,
}

fn nav_button(label: &str, target: Option<&str>) -> String {
    match target {
        Some(href) => format!(r#"<a class="btn secondary" href="{}">{}</a>"#, html_escape(href), label),
        None => format!(r#"<span class="btn secondary disabled">{}</span>"#, label),
    }
}

pub fn render_viewer(page: &ViewerPage<'_>, user: Option<&str>) -> String {
    let prev_href = page.nav.prev().map(|p| page.link.with_page(p).href_on(page.active));
    let next_href = page.nav.next().map(|p| page.link.with_page(p).href_on(page.active));

    let text_panel = match &page.layer_html {
        Some(layer) => {
            let count = if page.link.search_text.is_empty() {
                String::new()
            } else {
                format!(
                    r#"<p class="match-count">{} match{} for "{}"</p>"#,
                    page.marks,
                    if page.marks == 1 { "" } else { "es" },
                    html_escape(&page.link.search_text)
                )
            };
            format!("{}{}", count, layer)
        }
        None => format!(r#"<div class="pdf-error">{}</div>"#, LOAD_FAILED_MESSAGE),
    };

    let file_json = serde_json::to_string(&page.document.file).unwrap_or_else(|_| "\"\"".to_string());

    let content = format!(
        r##"<h1>{title}</h1>
        <div class="viewer-toolbar">
            {prev}
            <span class="page-info" id="page-info">{label}</span>
            {next}
            <form method="get" action="{active}">
                <input type="hidden" name="pdfId" value="{pdf_id}">
                <input type="hidden" name="pageNum" value="{page_num}">
                <input type="text" name="searchText" placeholder="Highlight text..." value="{search}">
                <button class="btn" type="submit">Highlight</button>
            </form>
        </div>
        <div class="viewer-body">
            <div class="page-canvas" id="page-canvas"><canvas id="pdf-canvas"></canvas></div>
            <div class="text-panel">{text_panel}</div>
        </div>

    <script src="https://cdnjs.cloudflare.com/ajax/libs/pdf.js/3.11.174/pdf.min.js"></script>
    <script>
        pdfjsLib.GlobalWorkerOptions.workerSrc = 'https://cdnjs.cloudflare.com/ajax/libs/pdf.js/3.11.174/pdf.worker.min.js';

        const pdfFile = {file_json};
        const pageNum = {page_num};

        let pdfDoc = null;
        let renderTask = null;

        function showLoadError() {{
            document.getElementById('page-canvas').innerHTML = '<div class="pdf-error">{failed}</div>';
        }}

        async function renderPage() {{
            if (!pdfDoc) return;
            // A newer render supersedes any one still in flight.
            if (renderTask) {{
                renderTask.cancel();
                renderTask = null;
            }}

            const page = await pdfDoc.getPage(Math.min(pageNum, pdfDoc.numPages));
            const container = document.getElementById('page-canvas');
            const base = page.getViewport({{ scale: 1 }});
            const scale = Math.max(0.5, (container.clientWidth - 16) / base.width);
            const viewport = page.getViewport({{ scale }});
            const dpr = window.devicePixelRatio || 1;

            const canvas = document.getElementById('pdf-canvas');
            const ctx = canvas.getContext('2d');
            canvas.width = Math.floor(viewport.width * dpr);
            canvas.height = Math.floor(viewport.height * dpr);
            canvas.style.width = Math.floor(viewport.width) + 'px';
            canvas.style.height = Math.floor(viewport.height) + 'px';
            ctx.setTransform(dpr, 0, 0, dpr, 0, 0);

            renderTask = page.render({{ canvasContext: ctx, viewport }});
            try {{
                await renderTask.promise;
            }} catch (e) {{
                if (e && e.name !== 'RenderingCancelledException') console.error('Render error:', e);
            }}
        }}

        async function loadPdf() {{
            try {{
                pdfDoc = await pdfjsLib.getDocument('/pdfs/' + encodeURIComponent(pdfFile)).promise;
                await renderPage();
            }} catch (error) {{
                console.error('PDF load error:', error);
                showLoadError();
            }}
        }}

        let resizeTimer = null;
        window.addEventListener('resize', () => {{
            clearTimeout(resizeTimer);
            resizeTimer = setTimeout(renderPage, 150);
        }});

        loadPdf();
    </script>"##,
        title = html_escape(&page.document.title),
        prev = nav_button("Previous", prev_href.as_deref()),
        next = nav_button("Next", next_href.as_deref()),
        label = page.nav.label(),
        pdf_id = page.document.id,
        page_num = page.nav.page,
        search = html_escape(&page.link.search_text),
        text_panel = text_panel,
        file_json = file_json,
        failed = LOAD_FAILED_MESSAGE,
        active = page.active,
    );

    base_html(&page.document.title, &content, page.active, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::PageCount;

    fn doc() -> DocumentInfo {
        DocumentInfo {
            id: 2,
            title: "PRINCE2".into(),
            file: "book2.pdf".into(),
        }
    }

    #[test]
    fn test_nav_links_respect_bounds() {
        let document = doc();
        let page = ViewerPage {
            document: &document,
            link: DeepLink::new(2, 3, "risk"),
            nav: PageNav::new(3, PageCount::Known(3)),
            layer_html: Some("<div class=\"text-layer\"></div>".into()),
            marks: 1,
            active: "/book",
        };
        let html = render_viewer(&page, None);
        assert!(html.contains("/book?pdfId=2&amp;pageNum=2&amp;searchText=risk"));
        assert!(html.contains(r#"<span class="btn secondary disabled">Next</span>"#));
        assert!(html.contains("Page 3 of 3"));
        assert!(html.contains("1 match for"));
    }

    #[test]
    fn test_nav_links_stay_on_active_route() {
        let document = doc();
        let page = ViewerPage {
            document: &document,
            link: DeepLink::new(2, 2, ""),
            nav: PageNav::new(2, PageCount::Known(3)),
            layer_html: Some("<div class=\"text-layer\"></div>".into()),
            marks: 0,
            active: "/pdf",
        };
        let html = render_viewer(&page, None);
        assert!(html.contains("/pdf?pdfId=2&amp;pageNum=1&amp;searchText="));
        assert!(html.contains("/pdf?pdfId=2&amp;pageNum=3&amp;searchText="));
        assert!(html.contains(r#"<form method="get" action="/pdf">"#));
        assert!(!html.contains("/book?pdfId="));
    }

    #[test]
    fn test_failed_load_shows_message() {
        let document = doc();
        let page = ViewerPage {
            document: &document,
            link: DeepLink::new(2, 4, ""),
            nav: PageNav::new(4, PageCount::Unknown),
            layer_html: None,
            marks: 0,
            active: "/book",
        };
        let html = render_viewer(&page, None);
        assert!(html.contains(r#"<div class="text-panel"><div class="pdf-error">Failed to load PDF.</div></div>"#));
        assert!(html.contains("Page 4 of ?"));
        assert!(html.contains(r#"<span class="btn secondary disabled">Next</span>"#));
    }
}
