//! SVG emission for [`FishboneLayout`].

use crate::model::{BoneSide, FishboneLayout, TextLineKind, TextLineLayout};
use std::fmt::Write as _;

const FONT_FAMILY: &str = r#""trebuchet ms",verdana,arial,"Noto Sans CJK TC","Microsoft JhengHei",sans-serif"#;
const INK: &str = "#333333";

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Root `id`; also prefixes marker ids and scopes the stylesheet.
    pub diagram_id: Option<String>,
    /// Optional CSS color painted behind the diagram.
    pub background: Option<String>,
    /// Pixels per logical canvas unit.
    pub px_per_unit: f64,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            background: None,
            px_per_unit: 100.0,
        }
    }
}

/// Makes a string usable as an SVG/CSS id: ASCII alphanumerics plus `-`, `_`, `:` and `.`,
/// starting with a letter.
pub fn sanitize_svg_id(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "fishbone".to_string();
    }

    let mut out = String::with_capacity(raw.len() + 3);
    for ch in raw.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':' || ch == '.';
        out.push(if ok { ch } else { '-' });
    }

    let starts_ok = out.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_ok {
        out.insert_str(0, "fb-");
    }

    while out.contains("--") {
        out = out.replace("--", "-");
    }
    let out = out.trim_matches('-');
    if out.is_empty() || out == "fb" {
        return "fishbone".to_string();
    }
    out.to_string()
}

/// Shortest round-trippable decimal without `-0` or float noise.
pub(crate) fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let rounded = (v * 1000.0).round() / 1000.0;
    if (v - rounded).abs() < 1e-6 {
        v = rounded;
    }
    if v == -0.0 {
        v = 0.0;
    }
    format!("{v}")
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn css(id: &str) -> String {
    format!(
        "#{id}{{font-family:{FONT_FAMILY};fill:{INK};}}\
         #{id} .spine{{stroke:{INK};stroke-width:4;fill:none;}}\
         #{id} .bone{{stroke:{INK};stroke-width:2.5;fill:none;stroke-linecap:round;}}\
         #{id} .head rect{{fill:#fde2e1;stroke:#c0392b;stroke-width:2;}}\
         #{id} .head text{{fill:#1f2937;}}\
         #{id} .category-label{{fill:#1e40af;}}\
         #{id} .subcause{{fill:#1f2937;}}\
         #{id} .rootcause{{fill:#4b5563;}}\
         #{id} .ellipsis{{fill:#9ca3af;}}"
    )
}

fn line_class(kind: TextLineKind) -> &'static str {
    match kind {
        TextLineKind::Problem => "problem",
        TextLineKind::Category => "category-label",
        TextLineKind::SubCause => "subcause",
        TextLineKind::RootCause => "rootcause",
        TextLineKind::Ellipsis => "ellipsis",
    }
}

fn write_text(out: &mut String, line: &TextLineLayout, scale: f64, anchor: &str, bold: bool) {
    let _ = write!(
        out,
        r#"<text class="{class}" x="{x}" y="{y}" font-size="{size}" text-anchor="{anchor}"{weight}>{text}</text>"#,
        class = line_class(line.kind),
        x = fmt(line.x * scale),
        y = fmt(line.y * scale),
        size = fmt(line.font_size * scale),
        anchor = anchor,
        weight = if bold { r#" font-weight="bold""# } else { "" },
        text = escape_xml(&line.text),
    );
}

/// Renders the layout as a standalone SVG document.
pub fn render_fishbone_svg(layout: &FishboneLayout, options: &SvgRenderOptions) -> String {
    let scale = if options.px_per_unit.is_finite() && options.px_per_unit > 0.0 {
        options.px_per_unit
    } else {
        SvgRenderOptions::default().px_per_unit
    };
    let id = sanitize_svg_id(options.diagram_id.as_deref().unwrap_or("fishbone"));
    let w = fmt(layout.width * scale);
    let h = fmt(layout.height * scale);

    let mut out = String::with_capacity(4096);
    let _ = write!(
        &mut out,
        r#"<svg id="{id}" width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" role="graphics-document document" aria-roledescription="fishbone">"#
    );
    let _ = write!(&mut out, "<style>{}</style>", css(&id));
    let _ = write!(
        &mut out,
        r#"<defs><marker id="{id}-arrowhead" viewBox="0 0 10 10" refX="9" refY="5" markerUnits="strokeWidth" markerWidth="4" markerHeight="4" orient="auto"><path d="M0,0L10,5L0,10z" fill="{INK}"/></marker></defs>"#
    );
    if let Some(bg) = options.background.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let _ = write!(
            &mut out,
            r#"<rect class="background" x="0" y="0" width="{w}" height="{h}" fill="{}"/>"#,
            escape_xml(bg)
        );
    }

    let _ = write!(
        &mut out,
        r#"<line class="spine" x1="{}" y1="{}" x2="{}" y2="{}" marker-end="url(#{id}-arrowhead)"/>"#,
        fmt(layout.spine.start.x * scale),
        fmt(layout.spine.start.y * scale),
        fmt(layout.spine.end.x * scale),
        fmt(layout.spine.end.y * scale),
    );

    for bone in &layout.bones {
        let side = match bone.side {
            BoneSide::Top => "top",
            BoneSide::Bottom => "bottom",
        };
        let _ = write!(
            &mut out,
            r#"<g class="category" id="{id}-M{index}" data-side="{side}" data-slot="{slot}">"#,
            index = bone.index,
            slot = bone.slot,
        );
        let _ = write!(
            &mut out,
            r#"<line class="bone" x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
            fmt(bone.start.x * scale),
            fmt(bone.start.y * scale),
            fmt(bone.end.x * scale),
            fmt(bone.end.y * scale),
        );
        write_text(&mut out, &bone.label_line, scale, "middle", true);
        if !bone.detail.lines.is_empty() {
            out.push_str(r#"<g class="detail">"#);
            for line in &bone.detail.lines {
                write_text(&mut out, line, scale, "start", false);
            }
            out.push_str("</g>");
        }
        out.push_str("</g>");
    }

    let head = &layout.head;
    let _ = write!(
        &mut out,
        r#"<g class="head"><rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}"/>"#,
        fmt(head.x * scale),
        fmt(head.y * scale),
        fmt(head.width * scale),
        fmt(head.height * scale),
        r = fmt(head.corner_radius * scale),
    );
    for line in &head.lines {
        write_text(&mut out, line, scale, "middle", true);
    }
    out.push_str("</g></svg>");

    tracing::debug!(id = %id, bones = layout.bones.len(), bytes = out.len(), "rendered fishbone svg");
    out
}
