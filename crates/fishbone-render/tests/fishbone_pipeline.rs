use fishbone_core::{Dialect, ParseOptions, RenderSettings, parse_taxonomy};
use fishbone_render::graph_text::compile;
use fishbone_render::svg::{SvgRenderOptions, render_fishbone_svg};
use fishbone_render::{CanvasRenderer, RenderBackend};
use std::collections::HashSet;

const SIX_M: &str = r#"```json
{
  "Man": {"Training gap": ["No refresher course", "High turnover"], "Fatigue": ["Double shifts"]},
  "Machine": {"Dishwasher": ["Below sanitising temperature"]},
  "Material": {"Produce": ["Unwashed lettuce"]},
  "Method": {"Hand hygiene": ["No audit", "Gel instead of soap"]},
  "Measurement": {"Symptom tracking": []},
  "Environment": {"Shared toilets": ["Cleaning once a day"]}
}
```"#;

fn graph_node_lines(text: &str) -> Vec<&str> {
    text.lines().skip(1).map(str::trim).collect()
}

#[test]
fn norovirus_compiles_to_the_inward_chain() {
    let parsed = parse_taxonomy(
        r#"{"People": {"Training gap": ["No refresher course"]}}"#,
        "Norovirus outbreak",
        ParseOptions::default(),
    )
    .unwrap();
    let text = compile(&parsed.taxonomy, Dialect::Minimal);
    assert_eq!(
        graph_node_lines(&text),
        [
            "Problem((\"Norovirus outbreak\"))",
            "M0[\"People\"] --> Problem",
            "M0S0[\"Training gap\"] --> M0",
            "M0S0T0[\"No refresher course\"] --> M0S0",
        ]
    );
}

#[test]
fn minimal_output_declares_every_node_once() {
    let parsed = parse_taxonomy(SIX_M, "Norovirus outbreak", ParseOptions::default()).unwrap();
    let t = &parsed.taxonomy;
    let text = compile(t, Dialect::Minimal);
    let lines = graph_node_lines(&text);

    let problem_lines = lines.iter().filter(|l| l.starts_with("Problem(")).count();
    assert_eq!(problem_lines, 1);

    let ids: Vec<&str> = lines
        .iter()
        .filter(|l| l.contains(" --> "))
        .filter_map(|l| l.split('[').next())
        .collect();
    assert_eq!(ids.len(), t.node_count());
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
}

#[test]
fn compile_is_byte_identical_across_runs() {
    let a = parse_taxonomy(SIX_M, "P", ParseOptions::default()).unwrap();
    let b = parse_taxonomy(SIX_M, "P", ParseOptions::default()).unwrap();
    for dialect in [Dialect::Minimal, Dialect::Styled] {
        assert_eq!(compile(&a.taxonomy, dialect), compile(&b.taxonomy, dialect));
    }
}

#[test]
fn canvas_svg_is_well_formed_and_splits_bones() {
    let parsed = parse_taxonomy(SIX_M, "Norovirus outbreak", ParseOptions::default()).unwrap();
    let rendered = CanvasRenderer::default().render(&parsed.taxonomy).unwrap();
    let svg = rendered.artifact.as_str();

    let doc = roxmltree::Document::parse(svg).expect("svg parses");
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("width"), Some("1200"));
    assert_eq!(root.attribute("height"), Some("1000"));

    let bones: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("g") && n.attribute("class") == Some("category"))
        .collect();
    assert_eq!(bones.len(), 6);
    let top = bones
        .iter()
        .filter(|n| n.attribute("data-side") == Some("top"))
        .count();
    assert_eq!(top, 3);

    let spine = doc
        .descendants()
        .find(|n| n.attribute("class") == Some("spine"))
        .expect("spine");
    assert_eq!(
        spine.attribute("marker-end"),
        Some("url(#fishbone-arrowhead)")
    );

    let head_text: String = doc
        .descendants()
        .filter(|n| n.attribute("class") == Some("problem"))
        .filter_map(|n| n.text())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(head_text, "Norovirus outbreak");
}

#[test]
fn five_categories_render_three_over_two() {
    let five = r#"{"A": {}, "B": {}, "C": {}, "D": {}, "E": {}}"#;
    let parsed = parse_taxonomy(five, "P", ParseOptions::default()).unwrap();
    let (layout, degradations) = CanvasRenderer::default().layout(&parsed.taxonomy).unwrap();
    assert!(degradations.is_empty());
    assert_eq!((layout.top_count(), layout.bottom_count()), (3, 2));
}

#[test]
fn list_category_still_gets_a_bone() {
    let text = r#"{"People": ["not", "a", "mapping"], "Machine": {"Old oven": ["No service"]}}"#;
    let parsed = parse_taxonomy(text, "P", ParseOptions::default()).unwrap();
    assert_eq!(parsed.degradations.len(), 1);

    let rendered = CanvasRenderer::default().render(&parsed.taxonomy).unwrap();
    let doc = roxmltree::Document::parse(rendered.artifact.as_str()).unwrap();
    let labels: Vec<&str> = doc
        .descendants()
        .filter(|n| n.attribute("class") == Some("category-label"))
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(labels, ["People", "Machine"]);
    let details = doc
        .descendants()
        .filter(|n| n.attribute("class") == Some("detail"))
        .count();
    assert_eq!(details, 1);
}

#[test]
fn markup_in_labels_is_escaped_in_svg() {
    let text = r#"{"<b>People</b>": {"Tom & Jerry": ["\"quoted\""]}}"#;
    let parsed = parse_taxonomy(text, "A < B", ParseOptions::default()).unwrap();
    let svg = CanvasRenderer::default()
        .render(&parsed.taxonomy)
        .unwrap()
        .artifact
        .into_string();
    let doc = roxmltree::Document::parse(&svg).expect("escaped svg parses");
    assert!(doc.descendants().all(|n| !n.has_tag_name("b")));
    assert!(svg.contains("&lt;b&gt;People&lt;/b&gt;"));
    assert!(svg.contains("Tom &amp; Jerry"));
}

#[test]
fn svg_honours_id_background_and_scale() {
    let parsed = parse_taxonomy(r#"{"A": {"b": ["c"]}}"#, "P", ParseOptions::default()).unwrap();
    let settings = RenderSettings::default();
    let (layout, _) = CanvasRenderer::from_settings(&settings)
        .layout(&parsed.taxonomy)
        .unwrap();
    let svg = render_fishbone_svg(
        &layout,
        &SvgRenderOptions {
            diagram_id: Some("my chart".to_string()),
            background: Some("white".to_string()),
            px_per_unit: 50.0,
        },
    );
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let root = doc.root_element();
    assert_eq!(root.attribute("id"), Some("my-chart"));
    assert_eq!(root.attribute("width"), Some("600"));
    assert!(
        doc.descendants()
            .any(|n| n.attribute("class") == Some("background")
                && n.attribute("fill") == Some("white"))
    );
    assert!(doc.descendants().any(|n| n.attribute("id") == Some("my-chart-arrowhead")));
}
