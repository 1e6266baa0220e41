use fishbone::render::{Artifact, HeadlessError, HeadlessRenderer};
use fishbone::{DegradationKind, Dialect, FishboneConfig, ParseOptions};
use serde_json::json;

const REPLY: &str = r#"Here is the analysis you asked for:
```json
{
  "Man": {"Training gap": ["No refresher course"]},
  "Machine": ["Dishwasher", "Ice machine"],
  "Material": {"Produce": ["Unwashed lettuce"]},
  "Method": {"Hand hygiene": ["No audit"]},
  "Measurement": {"Symptom tracking": "none"},
  "Environment": {"Shared toilets": ["Cleaning once a day"]},
  "Management": {"Staffing": ["Understaffed weekends"]}
}
```
Let me know if you need more detail."#;

#[test]
fn graph_text_merges_parse_and_render_degradations() {
    let rendered = HeadlessRenderer::new()
        .graph_text_sync(REPLY, "Norovirus outbreak")
        .unwrap();
    let kinds: Vec<&DegradationKind> = rendered.degradations.iter().map(|d| &d.kind).collect();
    assert_eq!(
        kinds,
        [
            &DegradationKind::CategoryNotMapping,
            &DegradationKind::RootCausesNotSequence,
            &DegradationKind::CategoriesTruncated {
                kept: 6,
                dropped: 1
            },
        ]
    );
    let Artifact::GraphText(text) = rendered.artifact else {
        panic!("expected graph text");
    };
    assert!(text.starts_with("graph LR\n"));
    assert!(text.contains("M1[\"Machine\"] --> Problem"));
    assert!(!text.contains("Management"));
}

#[test]
fn config_selects_styled_dialect_and_arity() {
    let mut config = FishboneConfig::defaults();
    config.deep_merge(&json!({ "dialect": "styled", "majorCategoryArity": 2 }));
    let renderer = HeadlessRenderer::from_config(&config).unwrap();
    assert_eq!(renderer.settings.dialect, Dialect::Styled);

    let rendered = renderer.graph_text_sync(REPLY, "P").unwrap();
    let text = rendered.artifact.as_str();
    assert!(text.starts_with("flowchart LR\n"));
    assert!(text.contains("    class M0,M1 category\n"));
    assert!(!text.contains("M2"));
}

#[test]
fn strict_parse_rejects_degraded_branches() {
    let err = HeadlessRenderer::new()
        .with_parse_options(ParseOptions::strict())
        .render_svg_sync(REPLY, "P")
        .unwrap_err();
    assert!(matches!(
        err,
        HeadlessError::Parse(fishbone::Error::MalformedTaxonomy { .. })
    ));
    assert!(!err.hint().is_empty());
}

#[test]
fn malformed_reply_is_an_error_not_an_empty_diagram() {
    let err = HeadlessRenderer::new()
        .render_svg_sync("{not json", "P")
        .unwrap_err();
    let HeadlessError::Parse(inner) = &err else {
        panic!("expected parse error, got {err:?}");
    };
    assert_eq!(inner.raw_text(), Some("{not json"));
}

#[test]
fn svg_uses_sanitized_diagram_id() {
    let rendered = HeadlessRenderer::new()
        .render_svg_sync_with_diagram_id(REPLY, "P", "chart #1")
        .unwrap();
    let svg = rendered.artifact.as_str();
    let doc = roxmltree::Document::parse(svg).unwrap();
    assert_eq!(doc.root_element().attribute("id"), Some("chart-1"));
}

#[test]
fn embed_wraps_graph_text() {
    let rendered = HeadlessRenderer::new().embed_sync(REPLY, "P", false).unwrap();
    assert!(matches!(rendered.artifact, Artifact::Html(_)));
    assert!(rendered.artifact.as_str().contains("<div class=\"mermaid\">"));

    let md = HeadlessRenderer::new().embed_sync(REPLY, "P", true).unwrap();
    assert!(md.artifact.as_str().starts_with("```mermaid\n"));
}

#[test]
fn layout_reports_three_over_three() {
    let (layout, degradations) = HeadlessRenderer::new().layout_sync(REPLY, "P").unwrap();
    assert_eq!((layout.top_count(), layout.bottom_count()), (3, 3));
    assert_eq!(degradations.len(), 3);
}

#[cfg(feature = "raster")]
#[test]
fn png_export_has_png_signature() {
    use fishbone::render::raster::RasterOptions;

    let (png, _) = HeadlessRenderer::new()
        .render_png_sync(REPLY, "P", &RasterOptions::default())
        .unwrap();
    assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[test]
fn canvas_background_reaches_the_svg() {
    let mut config = FishboneConfig::defaults();
    config.set_value("canvas.background", json!("#fafafa"));
    let svg = HeadlessRenderer::from_config(&config)
        .unwrap()
        .render_svg_sync(REPLY, "P")
        .unwrap()
        .artifact
        .into_string();
    let doc = roxmltree::Document::parse(&svg).unwrap();
    assert!(
        doc.descendants()
            .any(|n| n.attribute("class") == Some("background")
                && n.attribute("fill") == Some("#fafafa"))
    );
}

#[cfg(feature = "raster")]
#[test]
fn jpeg_export_uses_canvas_background() {
    use fishbone::render::raster::{RasterError, RasterOptions};

    let mut config = FishboneConfig::defaults();
    config.set_value("canvas.background", json!("transparent"));
    let renderer = HeadlessRenderer::from_config(&config).unwrap();

    let err = renderer
        .render_jpeg_sync(REPLY, "P", &RasterOptions::default())
        .unwrap_err();
    assert!(matches!(err, RasterError::JpegOpaqueBackgroundRequired(ref bg) if bg == "transparent"));

    let explicit = RasterOptions {
        background: Some("white".to_string()),
        ..RasterOptions::default()
    };
    let (jpeg, _) = renderer.render_jpeg_sync(REPLY, "P", &explicit).unwrap();
    assert!(jpeg.starts_with(&[0xFF, 0xD8]));
}
