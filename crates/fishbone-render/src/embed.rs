//! Self-contained embedding of graph text for hosts without a native Mermaid renderer.

use fishbone_core::EmbedSettings;

const MERMAID_CDN: &str = "https://cdn.jsdelivr.net/npm/mermaid";

/// JSON string literal that is also safe inside an inline `<script>`.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
}

/// Wraps graph text in an HTML fragment that loads Mermaid (ESM) and renders it on page load.
pub fn wrap(graph_text: &str, settings: &EmbedSettings) -> String {
    let module = format!(
        "{MERMAID_CDN}@{}/dist/mermaid.esm.min.mjs",
        settings.mermaid_version.trim()
    );
    format!(
        "<div class=\"mermaid\">\n{}</div>\n\
         <script type=\"module\">\n\
         \x20 import mermaid from {};\n\
         \x20 mermaid.initialize({{ startOnLoad: true, theme: {} }});\n\
         </script>\n",
        htmlize::escape_text(graph_text),
        js_string(&module),
        js_string(settings.theme.trim()),
    )
}

/// Wraps graph text in a fenced ```` ```mermaid ```` block for Markdown hosts.
pub fn wrap_markdown(graph_text: &str) -> String {
    let body = graph_text.trim_end_matches('\n');
    format!("```mermaid\n{body}\n```\n")
}
