//! CSS styles for PM Codex.
//!
//! Contains the main STYLE constant with all CSS for the web interface.

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
/* Solarized Light Theme */
:root {
    --base03: #002b36;
    --base02: #073642;
    --base01: #586e75;
    --base00: #657b83;
    --base0: #839496;
    --base1: #93a1a1;
    --base2: #eee8d5;
    --base3: #fdf6e3;

    --yellow: #b58900;
    --orange: #cb4b16;
    --red: #dc322f;
    --magenta: #d33682;
    --violet: #6c71c4;
    --blue: #268bd2;
    --cyan: #2aa198;
    --green: #859900;

    --bg: var(--base3);
    --fg: var(--base00);
    --muted: var(--base1);
    --border: var(--base2);
    --link: var(--blue);
    --link-hover: var(--cyan);
    --accent: var(--base2);
    --mark-bg: #fde68a;
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
    color: var(--fg);
    background: var(--bg);
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 1rem;
}

a { color: var(--link); text-decoration: none; }
a:hover { color: var(--link-hover); text-decoration: underline; }

h1, h2, h3 { font-weight: 600; margin-top: 1.5em; margin-bottom: 0.5em; }
h1 { font-size: 1.5rem; }

mark { background: var(--mark-bg); color: inherit; padding: 0 1px; border-radius: 2px; }

/* Navigation */
.nav-bar {
    position: sticky;
    top: 0;
    background: var(--base03);
    padding: 0.6rem 1rem;
    display: flex;
    gap: 1.25rem;
    align-items: center;
    flex-wrap: wrap;
    z-index: 100;
}
.nav-bar .brand { font-weight: 700; color: var(--cyan); font-size: 1.1rem; }
.nav-bar a { font-size: 0.9rem; color: var(--base1); }
.nav-bar a.active { color: var(--base3); border-bottom: 2px solid var(--cyan); }
.nav-bar .spacer { flex: 1; }
.nav-bar .user { font-size: 0.8rem; color: var(--base0); }

/* Accents */
.accent-blue { --tone: var(--blue); }
.accent-purple { --tone: var(--violet); }
.accent-emerald { --tone: var(--green); }
.accent-indigo { --tone: var(--violet); }
.accent-cyan { --tone: var(--cyan); }
.accent-slate { --tone: var(--base01); }

/* Home */
.hero { text-align: center; padding: 3rem 1rem 2rem; }
.hero h1 { font-size: 2.2rem; margin-top: 0; color: var(--base02); }
.hero p { color: var(--base01); max-width: 640px; margin: 0 auto 1.5rem; }
.suggest-box { max-width: 560px; margin: 0 auto; }
.suggest-box form { display: flex; gap: 0.5rem; }
.suggest-box input {
    flex: 1;
    padding: 0.7rem 1rem;
    border: 1px solid var(--base1);
    border-radius: 24px;
    background: white;
    font-size: 1rem;
}
.suggestions { list-style: none; margin-top: 0.5rem; text-align: left; border: 1px solid var(--border); border-radius: 8px; background: white; }
.suggestions li a { display: block; padding: 0.5rem 1rem; }
.suggestions li + li { border-top: 1px solid var(--border); }
.feature-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 1rem; margin-top: 2rem; }
.feature { padding: 1.25rem; border: 1px solid var(--border); border-radius: 8px; background: white; }
.feature h3 { margin-top: 0; }

/* Buttons and forms */
.btn {
    padding: 0.5rem 1rem;
    border: 1px solid var(--base1);
    border-radius: 4px;
    background: var(--blue);
    color: var(--base3);
    cursor: pointer;
    font-size: 0.9rem;
    font-family: inherit;
    text-decoration: none;
    display: inline-block;
}
.btn:hover { background: var(--cyan); border-color: var(--cyan); text-decoration: none; }
.btn.secondary { background: var(--base2); color: var(--base00); border-color: var(--base1); }
.btn.disabled { opacity: 0.4; pointer-events: none; }

.message {
    padding: 0.75rem 1rem;
    border-radius: 4px;
    margin-bottom: 1rem;
}
.message.error { background: #fdf2f2; color: var(--red); border: 1px solid var(--red); }
.message.success { background: #f5f9f5; color: var(--green); border: 1px solid var(--green); }
.message.hidden { display: none; }

.auth-form {
    max-width: 360px;
    margin: 3rem auto;
    padding: 2rem;
    background: var(--accent);
    border-radius: 8px;
}
.auth-form h1 { margin-top: 0; margin-bottom: 1.5rem; text-align: center; }
.auth-form input {
    width: 100%;
    padding: 0.75rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    font-size: 1rem;
}
.auth-form .field { margin-bottom: 1rem; }
.auth-form .field-error { color: var(--red); font-size: 0.8rem; min-height: 1em; }
.auth-form button {
    width: 100%;
    padding: 0.75rem;
    background: var(--link);
    color: white;
    border: none;
    border-radius: 4px;
    font-size: 1rem;
    cursor: pointer;
}
.auth-form button:disabled { opacity: 0.6; }
.auth-form .links { margin-top: 1rem; font-size: 0.85rem; text-align: center; }

/* Comparison */
.topic-tabs, .section-tabs, .kb-tabs { display: flex; gap: 0.5rem; flex-wrap: wrap; margin: 1rem 0; }
.topic-tabs a, .section-tabs a, .kb-tabs a {
    padding: 0.35rem 0.9rem;
    border-radius: 16px;
    border: 1px solid var(--border);
    font-size: 0.85rem;
}
.topic-tabs a.active, .section-tabs a.active, .kb-tabs a.active { background: var(--tone, var(--blue)); color: white; border-color: transparent; }
.book-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 1rem; }
.book-card { border: 1px solid var(--border); border-top: 4px solid var(--tone); border-radius: 8px; padding: 1rem; background: white; }
.book-card h3 { margin-top: 0; }
.book-card .author { font-size: 0.8rem; color: var(--muted); }
.point { padding: 0.6rem 0; border-bottom: 1px solid var(--border); font-size: 0.9rem; }
.point:last-child { border-bottom: none; }
.point .ref { font-size: 0.75rem; }
.filter-box { display: flex; gap: 0.5rem; margin: 1rem 0; }
.filter-box input { flex: 1; padding: 0.45rem 0.75rem; border: 1px solid var(--border); border-radius: 4px; }
.empty { color: var(--muted); font-style: italic; padding: 1rem 0; }

/* Knowledge base */
.kb-table { width: 100%; border-collapse: collapse; background: white; border-radius: 8px; overflow: hidden; }
.kb-table td { padding: 0.6rem 0.8rem; border-bottom: 1px solid var(--border); vertical-align: top; }
.kb-row a.toggle { font-weight: 600; color: var(--base02); }
.kb-count {
    font-size: 0.7rem;
    padding: 0.1rem 0.5rem;
    background: var(--accent);
    border-radius: 10px;
    margin-left: 0.5rem;
}
.kb-sub { background: #fbf8ef; font-size: 0.88rem; }
.kb-sub .num { font-family: "SF Mono", "Consolas", "Liberation Mono", monospace; color: var(--muted); margin-right: 0.5rem; }
.kb-sub .page { float: right; font-size: 0.8rem; }
.search-results .hit { padding: 0.6rem 0; border-bottom: 1px solid var(--border); }
.search-results .badge {
    font-size: 0.65rem;
    padding: 0.1rem 0.4rem;
    background: var(--accent);
    border-radius: 3px;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    margin-right: 0.5rem;
}

/* Viewer */
.viewer-toolbar { display: flex; gap: 0.75rem; align-items: center; flex-wrap: wrap; margin: 1rem 0; }
.viewer-toolbar .page-info { font-size: 0.9rem; color: var(--base01); }
.viewer-toolbar form { display: flex; gap: 0.5rem; margin-left: auto; }
.viewer-toolbar input { padding: 0.4rem 0.6rem; border: 1px solid var(--border); border-radius: 4px; }
.viewer-body { display: grid; grid-template-columns: minmax(0, 3fr) minmax(0, 2fr); gap: 1rem; }
.page-canvas { background: white; border: 1px solid var(--border); min-height: 400px; display: flex; justify-content: center; align-items: flex-start; }
.page-canvas canvas { max-width: 100%; }
.text-layer { background: white; border: 1px solid var(--border); padding: 1rem; font-size: 0.85rem; max-height: 80vh; overflow: auto; }
.text-layer .text-run { display: block; white-space: pre-wrap; }
.pdf-error { padding: 2rem; color: var(--red); text-align: center; }
.match-count { font-size: 0.8rem; color: var(--muted); }

/* Analytics */
.stat-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 1rem; }
.stat-card { background: white; border: 1px solid var(--border); border-radius: 8px; padding: 1rem; }
.stat-card .value { font-size: 1.6rem; font-weight: 700; color: var(--base02); }
.stat-card .change.up { color: var(--green); }
.stat-card .change.down { color: var(--red); }
.chart { background: white; border: 1px solid var(--border); border-radius: 8px; padding: 1rem; margin-top: 1rem; }
.bar-row { display: grid; grid-template-columns: 110px 1fr 70px; gap: 0.5rem; align-items: center; font-size: 0.8rem; margin: 0.2rem 0; }
.bar-track { background: var(--accent); height: 14px; border-radius: 3px; overflow: hidden; }
.bar-fill { background: var(--blue); height: 100%; }
.range-picker a { margin-right: 0.75rem; font-size: 0.85rem; }
.range-picker a.active { font-weight: 700; }
"#;
