use fishbone::render::raster::{RasterError, RasterOptions};
use fishbone::render::{HeadlessError, HeadlessRenderer, sanitize_svg_id};
use fishbone::sanitize::export_filename;
use fishbone::{Dialect, FishboneConfig, ParseOptions};
use serde::Serialize;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "FISHBONE_LOG";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Fishbone(fishbone::Error),
    Headless(HeadlessError),
    Raster(RasterError),
    Json(serde_json::Error),
}

impl CliError {
    fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Usage(_) | CliError::Json(_) => None,
            CliError::Io(_) => Some("Check the input/output paths and permissions."),
            CliError::Fishbone(err) => Some(err.hint()),
            CliError::Headless(err) => Some(err.hint()),
            CliError::Raster(err) => Some(err.hint()),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Fishbone(err) => write!(f, "{err}"),
            CliError::Headless(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<fishbone::Error> for CliError {
    fn from(value: fishbone::Error) -> Self {
        Self::Fishbone(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Headless(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Parse,
    Graph,
    Embed,
    Layout,
    Render,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
}

impl RenderFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    problem: Option<String>,
    arity: Option<i64>,
    config: Option<String>,
    dialect: Option<Dialect>,
    markdown: bool,
    pretty: bool,
    strict: bool,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    diagram_id: Option<String>,
    out: Option<String>,
    verbosity: u8,
}

fn usage() -> &'static str {
    "fishbone-cli\n\
\n\
USAGE:\n\
  fishbone-cli [parse] [--problem <text>] [--pretty] [--strict] [<path>|-]\n\
  fishbone-cli graph --problem <text> [--dialect minimal|styled] [--arity <n>] [<path>|-]\n\
  fishbone-cli embed --problem <text> [--dialect minimal|styled] [--markdown] [<path>|-]\n\
  fishbone-cli layout --problem <text> [--pretty] [--arity <n>] [<path>|-]\n\
  fishbone-cli render --problem <text> [--format svg|png|jpg] [--scale <n>] [--background <css-color>] [--id <diagram-id>] [--out <path>] [<path>|-]\n\
\n\
SHARED FLAGS:\n\
  --config <path>   JSON or YAML settings (majorCategoryArity, dialect, canvas, embed)\n\
  --strict          fail on any malformed branch instead of degrading it\n\
  -v, -vv           log info / debug to stderr (FISHBONE_LOG overrides)\n\
\n\
NOTES:\n\
  - Input is the raw model reply (category -> {subcause -> [root causes]}); fences and\n\
    surrounding prose are stripped.\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG/JPG output defaults to a file named after the problem statement in the working dir.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "parse" => args.command = Command::Parse,
            "graph" => args.command = Command::Graph,
            "embed" => args.command = Command::Embed,
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--strict" => args.strict = true,
            "--markdown" => args.markdown = true,
            "-v" | "--verbose" => args.verbosity = args.verbosity.saturating_add(1),
            "-vv" => args.verbosity = args.verbosity.saturating_add(2),
            "--problem" => args.problem = Some(next_value(&mut it)?.clone()),
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--arity" => {
                let n = next_value(&mut it)?;
                args.arity = Some(n.parse::<i64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--dialect" => {
                let d = next_value(&mut it)?;
                args.dialect = Some(d.parse::<Dialect>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--format" => {
                args.render_format = next_value(&mut it)?
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let scale = next_value(&mut it)?;
                args.render_scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let bg = next_value(&mut it)?;
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--id" => args.diagram_id = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if args.command != Command::Parse && args.problem.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_filter(filter),
        )
        .init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

/// Defaults, then the config file, then command-line overrides.
fn load_config(args: &Args) -> Result<FishboneConfig, CliError> {
    let mut config = FishboneConfig::defaults();
    if let Some(path) = args.config.as_deref() {
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path.ends_with(".yaml") || path.ends_with(".yml");
        let file = if is_yaml {
            FishboneConfig::from_yaml_str(&text)?
        } else {
            FishboneConfig::from_json_str(&text)?
        };
        config.deep_merge(file.as_value());
        tracing::info!(path, "loaded config file");
    }
    if let Some(arity) = args.arity {
        config.set_value("majorCategoryArity", Value::from(arity));
    }
    if let Some(dialect) = args.dialect {
        config.set_value("dialect", Value::from(dialect.to_string()));
    }
    if let Some(background) = args.background.as_deref() {
        config.set_value("canvas.background", Value::from(background));
    }
    Ok(config)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let raw = read_input(args.input.as_deref())?;
    let problem = args.problem.as_deref().unwrap_or("Problem");
    let parse = if args.strict {
        ParseOptions::strict()
    } else {
        ParseOptions::lenient()
    };
    let mut renderer = HeadlessRenderer::from_config(&load_config(&args)?)?.with_parse_options(parse);
    tracing::debug!(command = ?args.command, settings = ?renderer.settings, "running");

    match args.command {
        Command::Parse => {
            let parsed = renderer.parse_sync(&raw, problem)?;
            write_json(&parsed, args.pretty)
        }
        Command::Graph => {
            let rendered = renderer.graph_text_sync(&raw, problem)?;
            write_text(rendered.artifact.as_str(), args.out.as_deref())
        }
        Command::Embed => {
            let rendered = renderer.embed_sync(&raw, problem, args.markdown)?;
            write_text(rendered.artifact.as_str(), args.out.as_deref())
        }
        Command::Layout => {
            let (layout, _) = renderer.layout_sync(&raw, problem)?;
            write_json(&layout, args.pretty)
        }
        Command::Render => {
            renderer.svg.diagram_id = args.diagram_id.as_deref().map(sanitize_svg_id);
            let raster = RasterOptions {
                scale: args.render_scale,
                ..RasterOptions::default()
            };
            let bytes = match args.render_format {
                RenderFormat::Svg => {
                    let rendered = renderer.render_svg_sync(&raw, problem)?;
                    return write_text(rendered.artifact.as_str(), args.out.as_deref());
                }
                RenderFormat::Png => renderer.render_png_sync(&raw, problem, &raster)?.0,
                RenderFormat::Jpeg => renderer.render_jpeg_sync(&raw, problem, &raster)?.0,
            };
            let out = args.out.map(PathBuf::from).unwrap_or_else(|| {
                PathBuf::from(export_filename(problem, args.render_format.extension()))
            });
            std::fs::write(&out, bytes)?;
            tracing::info!(path = %out.display(), "wrote image");
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    setup_logging(args.verbosity);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        if let Some(hint) = err.hint() {
            eprintln!("hint: {hint}");
        }
        std::process::exit(1);
    }
}
