/// Turns a free-text label into a graph-text caption.
///
/// The caption is only ever shown inside a quoted node label; it is never an identifier.
/// Whitespace runs (including newlines) collapse to a single space and characters that carry
/// meaning in graph text are replaced by Mermaid entity codes.
pub fn caption(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_space = false;
    for ch in label.trim().chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match ch {
            '#' => out.push_str("#35;"),
            '(' => out.push_str("#40;"),
            ')' => out.push_str("#41;"),
            '"' => out.push_str("#quot;"),
            '<' => out.push_str("#lt;"),
            '>' => out.push_str("#gt;"),
            '`' => out.push_str("#96;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Derives a filesystem-safe file name for an exported image from the problem statement.
///
/// Keeps Unicode alphanumerics, `-` and `_`; everything else becomes `-`. Runs of `-` collapse,
/// the stem is capped at 64 characters and falls back to `fishbone` when nothing survives.
pub fn export_filename(problem_statement: &str, ext: &str) -> String {
    let mut stem = String::with_capacity(problem_statement.len());
    for ch in problem_statement.trim().chars() {
        let ok = ch.is_alphanumeric() || ch == '-' || ch == '_';
        let ch = if ok { ch } else { '-' };
        if ch == '-' && stem.ends_with('-') {
            continue;
        }
        stem.push(ch);
    }
    let stem: String = stem.trim_matches('-').chars().take(64).collect();
    let stem = stem.trim_end_matches('-');
    let stem = if stem.is_empty() { "fishbone" } else { stem };

    let ext = ext.trim().trim_start_matches('.');
    if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{ext}")
    }
}
