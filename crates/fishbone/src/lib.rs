#![forbid(unsafe_code)]

//! `fishbone` turns a problem statement's causal taxonomy into fishbone (Ishikawa) diagrams,
//! headlessly.
//!
//! The pipeline is one-way: model reply text → validated [`CausalTaxonomy`] → one of three
//! artifacts (Mermaid graph text, an embeddable HTML fragment, or a geometric SVG canvas).
//!
//! # Features
//!
//! - `render`: enable the graph-text, embed and canvas backends (`fishbone::render`)
//! - `raster`: enable PNG/JPG output via pure-Rust SVG rasterization

pub use fishbone_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use fishbone_render::model::FishboneLayout;
    pub use fishbone_render::svg::{SvgRenderOptions, render_fishbone_svg, sanitize_svg_id};
    pub use fishbone_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use fishbone_render::{
        Artifact, BackendKind, CanvasRenderer, EmbedRenderer, GraphTextRenderer, RenderBackend,
        Rendered, backend_for,
    };

    use fishbone_core::{
        CausalTaxonomy, Degradation, FishboneConfig, ParseOptions, ParsedTaxonomy, RenderSettings,
    };

    #[cfg(feature = "raster")]
    pub mod raster;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Parse(#[from] fishbone_core::Error),
        #[error(transparent)]
        Render(#[from] fishbone_render::Error),
    }

    impl HeadlessError {
        pub fn hint(&self) -> &'static str {
            match self {
                Self::Parse(err) => err.hint(),
                Self::Render(err) => err.hint(),
            }
        }
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Parse + render settings bundled for one-call pipelines from raw model text.
    ///
    /// Every `*_sync` method is CPU-bound and performs no I/O. Degradations from parsing and
    /// from rendering are merged, in that order, into the returned [`Rendered`].
    #[derive(Debug, Clone)]
    pub struct HeadlessRenderer {
        pub settings: RenderSettings,
        pub parse: ParseOptions,
        pub svg: SvgRenderOptions,
    }

    impl Default for HeadlessRenderer {
        fn default() -> Self {
            Self::with_settings(RenderSettings::default())
        }
    }

    impl HeadlessRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_settings(settings: RenderSettings) -> Self {
            let svg = SvgRenderOptions {
                background: settings.canvas.background.clone(),
                px_per_unit: settings.canvas.px_per_unit,
                ..SvgRenderOptions::default()
            };
            Self {
                settings,
                parse: ParseOptions::default(),
                svg,
            }
        }

        pub fn from_config(config: &FishboneConfig) -> Result<Self> {
            Ok(Self::with_settings(config.resolve()?))
        }

        pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
            self.parse = parse;
            self
        }

        pub fn with_svg_options(mut self, svg: SvgRenderOptions) -> Self {
            self.svg = svg;
            self
        }

        pub fn parse_sync(&self, raw: &str, problem_statement: &str) -> Result<ParsedTaxonomy> {
            Ok(fishbone_core::parse_taxonomy(
                raw,
                problem_statement,
                self.parse,
            )?)
        }

        pub fn canvas(&self) -> CanvasRenderer {
            CanvasRenderer::from_settings(&self.settings).with_svg_options(self.svg.clone())
        }

        fn render_with(
            &self,
            backend: &dyn RenderBackend,
            raw: &str,
            problem_statement: &str,
        ) -> Result<Rendered> {
            let ParsedTaxonomy {
                taxonomy,
                mut degradations,
            } = self.parse_sync(raw, problem_statement)?;
            let rendered = backend.render(&taxonomy)?;
            degradations.extend(rendered.degradations);
            Ok(Rendered {
                artifact: rendered.artifact,
                degradations,
            })
        }

        pub fn graph_text_sync(&self, raw: &str, problem_statement: &str) -> Result<Rendered> {
            let backend = GraphTextRenderer::from_settings(&self.settings);
            self.render_with(&backend, raw, problem_statement)
        }

        pub fn embed_sync(
            &self,
            raw: &str,
            problem_statement: &str,
            markdown: bool,
        ) -> Result<Rendered> {
            let backend = EmbedRenderer::from_settings(&self.settings).markdown(markdown);
            self.render_with(&backend, raw, problem_statement)
        }

        pub fn layout_sync(
            &self,
            raw: &str,
            problem_statement: &str,
        ) -> Result<(FishboneLayout, Vec<Degradation>)> {
            let ParsedTaxonomy {
                taxonomy,
                mut degradations,
            } = self.parse_sync(raw, problem_statement)?;
            let (layout, more) = self.layout_taxonomy(&taxonomy)?;
            degradations.extend(more);
            Ok((layout, degradations))
        }

        pub fn layout_taxonomy(
            &self,
            taxonomy: &CausalTaxonomy,
        ) -> Result<(FishboneLayout, Vec<Degradation>)> {
            Ok(self.canvas().layout(taxonomy)?)
        }

        pub fn render_svg_sync(&self, raw: &str, problem_statement: &str) -> Result<Rendered> {
            self.render_with(&self.canvas(), raw, problem_statement)
        }

        pub fn render_svg_sync_with_diagram_id(
            &self,
            raw: &str,
            problem_statement: &str,
            diagram_id: &str,
        ) -> Result<Rendered> {
            let mut svg = self.svg.clone();
            svg.diagram_id = Some(sanitize_svg_id(diagram_id));
            let canvas = self.canvas().with_svg_options(svg);
            self.render_with(&canvas, raw, problem_statement)
        }

        #[cfg(feature = "raster")]
        pub fn render_png_sync(
            &self,
            raw: &str,
            problem_statement: &str,
            raster: &raster::RasterOptions,
        ) -> raster::Result<(Vec<u8>, Vec<Degradation>)> {
            let rendered = self.render_svg_sync(raw, problem_statement)?;
            let raster = raster.clone().or_canvas_background(&self.settings.canvas);
            let png = raster::svg_to_png(rendered.artifact.as_str(), &raster)?;
            Ok((png, rendered.degradations))
        }

        #[cfg(feature = "raster")]
        pub fn render_jpeg_sync(
            &self,
            raw: &str,
            problem_statement: &str,
            raster: &raster::RasterOptions,
        ) -> raster::Result<(Vec<u8>, Vec<Degradation>)> {
            let rendered = self.render_svg_sync(raw, problem_statement)?;
            let raster = raster.clone().or_canvas_background(&self.settings.canvas);
            let jpeg = raster::svg_to_jpeg(rendered.artifact.as_str(), &raster)?;
            Ok((jpeg, rendered.degradations))
        }
    }
}
