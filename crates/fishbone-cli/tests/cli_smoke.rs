use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

const REPLY: &str = r#"```json
{
  "People": {"Training gap": ["No refresher course"]},
  "Machine": ["Dishwasher"],
  "Method": {"Hand hygiene": ["No audit"]}
}
```"#;

fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("reply.txt");
    fs::write(&path, REPLY).expect("write fixture");
    path
}

fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("fishbone-cli"));
    cmd.env_remove("FISHBONE_LOG");
    cmd
}

#[test]
fn parse_prints_taxonomy_and_degradations() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let fixture = write_fixture(tmp.path());

    let out = cli()
        .args(["parse", fixture.to_string_lossy().as_ref()])
        .output()
        .expect("run");
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(json["taxonomy"]["problemStatement"], "Problem");
    assert_eq!(json["taxonomy"]["categories"][0]["label"], "People");
    assert_eq!(json["degradations"][0]["kind"]["type"], "categoryNotMapping");
}

#[test]
fn strict_parse_fails_with_hint() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let fixture = write_fixture(tmp.path());

    let out = cli()
        .args(["parse", "--strict", fixture.to_string_lossy().as_ref()])
        .output()
        .expect("run");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Malformed taxonomy"));
    assert!(stderr.contains("hint: "));
}

#[test]
fn graph_reads_stdin_and_prints_minimal_dialect() {
    let out = cli()
        .args(["graph", "--problem", "Norovirus outbreak"])
        .write_stdin(r#"{"People": {"Training gap": ["No refresher course"]}}"#)
        .output()
        .expect("run");
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "graph LR\n    Problem((\"Norovirus outbreak\"))\n    M0[\"People\"] --> Problem\n    M0S0[\"Training gap\"] --> M0\n    M0S0T0[\"No refresher course\"] --> M0S0\n"
    );
}

#[test]
fn graph_honours_dialect_and_config_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let fixture = write_fixture(tmp.path());
    let config = tmp.path().join("fishbone.yaml");
    fs::write(&config, "majorCategoryArity: 2\ndialect: styled\n").expect("write config");

    let out = cli()
        .args([
            "graph",
            "--problem",
            "P",
            "--config",
            config.to_string_lossy().as_ref(),
            fixture.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.starts_with("flowchart LR\n"));
    assert!(!text.contains("M2"));

    // Flags win over the file.
    let out = cli()
        .args([
            "graph",
            "--problem",
            "P",
            "--dialect",
            "minimal",
            "--arity",
            "6",
            "--config",
            config.to_string_lossy().as_ref(),
            fixture.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.starts_with("graph LR\n"));
    assert!(text.contains("M2[\"Method\"] --> Problem"));
}

#[test]
fn embed_prints_html_or_markdown() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let fixture = write_fixture(tmp.path());

    let out = cli()
        .args(["embed", "--problem", "P", fixture.to_string_lossy().as_ref()])
        .output()
        .expect("run");
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("<div class=\"mermaid\">"));

    let out = cli()
        .args([
            "embed",
            "--problem",
            "P",
            "--markdown",
            fixture.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("```mermaid\n"));
}

#[test]
fn layout_prints_geometry_json() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let fixture = write_fixture(tmp.path());

    let out = cli()
        .args([
            "layout",
            "--problem",
            "P",
            "--pretty",
            fixture.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(json["width"], 12.0);
    assert_eq!(json["bones"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["bones"][2]["side"], "top");
    assert_eq!(json["bones"][2]["slot"], 2);
}

#[test]
fn render_svg_to_stdout() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let fixture = write_fixture(tmp.path());

    let out = cli()
        .args([
            "render",
            "--problem",
            "P",
            "--id",
            "chart 1",
            fixture.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    assert!(out.status.success());
    let svg = String::from_utf8_lossy(&out.stdout);
    assert!(svg.starts_with("<svg id=\"chart-1\""));
    assert!(svg.ends_with("</svg>"));
}

#[test]
fn render_png_to_explicit_out() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let fixture = write_fixture(tmp.path());
    let out_path = tmp.path().join("out.png");

    cli()
        .args([
            "render",
            "--problem",
            "P",
            "--format",
            "png",
            "--out",
            out_path.to_string_lossy().as_ref(),
            fixture.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let bytes = fs::read(&out_path).expect("read png");
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "output is not a PNG");
}

#[test]
fn render_jpg_defaults_to_problem_file_name() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let fixture = write_fixture(tmp.path());

    cli()
        .current_dir(tmp.path())
        .args([
            "render",
            "--problem",
            "Late deliveries: Q3?",
            "--format",
            "jpg",
            fixture.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let bytes = fs::read(tmp.path().join("Late-deliveries-Q3.jpg")).expect("read jpg");
    assert!(bytes.starts_with(&[0xFF, 0xD8]));
}

#[test]
fn malformed_input_exits_with_one() {
    let out = cli()
        .args(["graph", "--problem", "P"])
        .write_stdin("{not json")
        .output()
        .expect("run");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Malformed taxonomy"));
}

#[test]
fn usage_errors_exit_with_two() {
    for args in [
        vec!["graph"],
        vec!["graph", "--problem"],
        vec!["render", "--problem", "P", "--format", "pdf"],
        vec!["graph", "--problem", "P", "--dialect", "fancy"],
        vec!["--bogus"],
    ] {
        let out = cli().args(&args).output().expect("run");
        assert_eq!(out.status.code(), Some(2), "{args:?}");
    }
}

#[test]
fn invalid_arity_is_a_config_error() {
    let out = cli()
        .args(["graph", "--problem", "P", "--arity", "0"])
        .write_stdin("{}")
        .output()
        .expect("run");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid configuration"));
}

#[test]
fn jpg_with_transparent_background_fails_with_hint() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let fixture = write_fixture(tmp.path());

    let out = cli()
        .current_dir(tmp.path())
        .args([
            "render",
            "--problem",
            "P",
            "--format",
            "jpg",
            "--background",
            "transparent",
            fixture.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("opaque background"));
    assert!(stderr.contains("hint: "));
}
