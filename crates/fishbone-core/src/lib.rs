#![forbid(unsafe_code)]

//! Causal taxonomy parser + semantic model for fishbone (Ishikawa) diagrams (headless).
//!
//! Design goals:
//! - tolerate the wrappers and quoting quirks of language-model output
//! - deterministic, index-derived node identifiers (labels never become identifiers)
//! - no I/O: every entry point is a pure function of its input

pub mod config;
pub mod error;
pub mod ident;
pub mod model;
pub mod parse;
pub mod preprocess;
pub mod sanitize;
pub mod upstream;

pub use config::{
    CanvasSettings, DEFAULT_MAJOR_CATEGORY_ARITY, Dialect, EmbedSettings, FishboneConfig,
    RenderSettings,
};
pub use error::{Error, Result};
pub use ident::{NodeId, NodeRole, identify};
pub use model::{
    CausalTaxonomy, Degradation, DegradationKind, MajorCategory, ParsedTaxonomy, SubCause,
};
pub use parse::parse_taxonomy;
pub use preprocess::{PreprocessResult, preprocess_taxonomy_text};
pub use upstream::{ModelCandidate, ModelSelector, TextGenerator, analyze, six_m_prompt};

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// When true, any malformed branch fails the whole parse instead of degrading to empty
    /// detail.
    pub strict_branches: bool,
}

impl ParseOptions {
    /// Strict parsing: a malformed branch is a [`Error::MalformedTaxonomy`].
    pub fn strict() -> Self {
        Self {
            strict_branches: true,
        }
    }

    /// Lenient parsing: malformed branches render as empty detail and are reported as
    /// [`Degradation`]s.
    pub fn lenient() -> Self {
        Self {
            strict_branches: false,
        }
    }
}
