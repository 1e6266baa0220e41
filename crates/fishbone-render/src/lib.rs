#![forbid(unsafe_code)]

//! Headless render backends for causal taxonomies: Mermaid graph text, an embeddable HTML
//! wrapper, and a geometric fishbone canvas emitted as SVG.

pub mod embed;
pub mod fishbone;
pub mod graph_text;
pub mod model;
pub mod svg;
pub mod text;

use crate::model::FishboneLayout;
use crate::svg::SvgRenderOptions;
use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use fishbone_core::{CausalTaxonomy, Degradation, Dialect, EmbedSettings, RenderSettings};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] fishbone_core::Error),
    #[error("unknown render backend `{name}` (expected graph, embed or canvas)")]
    UnknownBackend { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::Core(fishbone_core::Error::InvalidConfig {
            message: message.into(),
        })
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Self::Core(err) => err.hint(),
            Self::UnknownBackend { .. } => "Pick one of: graph, embed, canvas.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Mermaid graph text.
    GraphText(String),
    /// Graph text fenced for a Markdown renderer.
    Markdown(String),
    /// Self-contained HTML fragment.
    Html(String),
    /// Standalone SVG document.
    Svg(String),
}

impl Artifact {
    pub fn as_str(&self) -> &str {
        match self {
            Self::GraphText(s) | Self::Markdown(s) | Self::Html(s) | Self::Svg(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::GraphText(s) | Self::Markdown(s) | Self::Html(s) | Self::Svg(s) => s,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::GraphText(_) => "mmd",
            Self::Markdown(_) => "md",
            Self::Html(_) => "html",
            Self::Svg(_) => "svg",
        }
    }
}

/// Backend output plus every soft degradation applied while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub artifact: Artifact,
    pub degradations: Vec<Degradation>,
}

/// A swappable rendering strategy over the taxonomy model.
pub trait RenderBackend {
    fn name(&self) -> &'static str;
    fn render(&self, taxonomy: &CausalTaxonomy) -> Result<Rendered>;
}

pub(crate) fn clamp_to_arity(
    taxonomy: &CausalTaxonomy,
    arity: usize,
) -> Result<(std::borrow::Cow<'_, CausalTaxonomy>, Vec<Degradation>)> {
    if arity == 0 {
        return Err(Error::invalid_config(
            "majorCategoryArity must be at least 1, got 0",
        ));
    }
    let (taxonomy, truncation) = taxonomy.truncate_to_arity(arity);
    let degradations: Vec<Degradation> = truncation.into_iter().collect();
    for d in &degradations {
        tracing::warn!("{d}");
    }
    Ok((taxonomy, degradations))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphTextRenderer {
    pub dialect: Dialect,
    pub arity: usize,
}

impl GraphTextRenderer {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            dialect: settings.dialect,
            arity: settings.major_category_arity,
        }
    }
}

impl Default for GraphTextRenderer {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default())
    }
}

impl RenderBackend for GraphTextRenderer {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn render(&self, taxonomy: &CausalTaxonomy) -> Result<Rendered> {
        let (taxonomy, degradations) = clamp_to_arity(taxonomy, self.arity)?;
        Ok(Rendered {
            artifact: Artifact::GraphText(graph_text::compile(&taxonomy, self.dialect)),
            degradations,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedRenderer {
    pub graph: GraphTextRenderer,
    pub embed: EmbedSettings,
    /// Emit a fenced Markdown block instead of the HTML fragment.
    pub markdown: bool,
}

impl EmbedRenderer {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            graph: GraphTextRenderer::from_settings(settings),
            embed: settings.embed.clone(),
            markdown: false,
        }
    }

    pub fn markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }
}

impl RenderBackend for EmbedRenderer {
    fn name(&self) -> &'static str {
        "embed"
    }

    fn render(&self, taxonomy: &CausalTaxonomy) -> Result<Rendered> {
        let Rendered {
            artifact,
            degradations,
        } = self.graph.render(taxonomy)?;
        let graph_text = artifact.into_string();
        let artifact = if self.markdown {
            Artifact::Markdown(embed::wrap_markdown(&graph_text))
        } else {
            Artifact::Html(embed::wrap(&graph_text, &self.embed))
        };
        Ok(Rendered {
            artifact,
            degradations,
        })
    }
}

#[derive(Clone)]
pub struct CanvasRenderer {
    pub settings: RenderSettings,
    pub svg: SvgRenderOptions,
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl fmt::Debug for CanvasRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasRenderer")
            .field("settings", &self.settings)
            .field("svg", &self.svg)
            .finish_non_exhaustive()
    }
}

impl CanvasRenderer {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            settings: settings.clone(),
            svg: SvgRenderOptions {
                px_per_unit: settings.canvas.px_per_unit,
                ..SvgRenderOptions::default()
            },
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }

    pub fn with_svg_options(mut self, svg: SvgRenderOptions) -> Self {
        self.svg = svg;
        self
    }

    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        self.text_measurer = measurer;
        self
    }

    pub fn layout(&self, taxonomy: &CausalTaxonomy) -> Result<(FishboneLayout, Vec<Degradation>)> {
        fishbone::layout_fishbone(taxonomy, &self.settings, self.text_measurer.as_ref())
    }
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default())
    }
}

impl RenderBackend for CanvasRenderer {
    fn name(&self) -> &'static str {
        "canvas"
    }

    fn render(&self, taxonomy: &CausalTaxonomy) -> Result<Rendered> {
        let (layout, degradations) = self.layout(taxonomy)?;
        Ok(Rendered {
            artifact: Artifact::Svg(svg::render_fishbone_svg(&layout, &self.svg)),
            degradations,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Graph,
    Embed,
    Canvas,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graph" | "mermaid" => Ok(Self::Graph),
            "embed" | "html" => Ok(Self::Embed),
            "canvas" | "svg" => Ok(Self::Canvas),
            _ => Err(Error::UnknownBackend {
                name: s.to_string(),
            }),
        }
    }
}

/// Builds the backend for `kind` from validated settings.
pub fn backend_for(kind: BackendKind, settings: &RenderSettings) -> Box<dyn RenderBackend> {
    match kind {
        BackendKind::Graph => Box::new(GraphTextRenderer::from_settings(settings)),
        BackendKind::Embed => Box::new(EmbedRenderer::from_settings(settings)),
        BackendKind::Canvas => Box::new(CanvasRenderer::from_settings(settings)),
    }
}
