//! The boundary to the external text-generation service.
//!
//! The service itself is a black box behind [`TextGenerator`]; this module only builds the
//! prompt, picks a model, and turns the reply (or its absence) into a parsed taxonomy.

use crate::model::ParsedTaxonomy;
use crate::parse::parse_taxonomy;
use crate::{Error, ParseOptions, Result};

pub const DEFAULT_PREFERRED_MODEL: &str = "models/gemini-1.5-flash";
pub const GENERATE_CONTENT: &str = "generateContent";

/// The six canonical cause dimensions used to seed the top-level taxonomy.
pub const SIX_M_CATEGORIES: [&str; 6] = [
    "Man",
    "Machine",
    "Material",
    "Method",
    "Measurement",
    "Environment",
];

pub trait TextGenerator {
    /// Sends `prompt` to `model` and returns the raw reply text.
    fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

impl<F> TextGenerator for F
where
    F: Fn(&str, &str) -> Result<String>,
{
    fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self(model, prompt)
    }
}

/// Builds the 6M root-cause analysis instruction for a problem statement.
pub fn six_m_prompt(problem_statement: &str) -> String {
    format!(
        "You are a Toyota Production System expert. Perform a 6M cause-and-effect analysis of \
\"{problem}\" using the categories {categories}. Reply with strict JSON only, shaped as \
{{\"<category>\": {{\"<subcause>\": [\"<root cause>\", ...]}}}}. No commentary.",
        problem = problem_statement.trim(),
        categories = SIX_M_CATEGORIES.join(", "),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    pub name: String,
    pub capabilities: Vec<String>,
}

impl ModelCandidate {
    pub fn new<I, S>(name: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// Model selection as data: an ordered preference list plus a required capability.
///
/// Adding a candidate means adding a name to `preferred`; [`ModelSelector::select`] does not
/// change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelector {
    pub preferred: Vec<String>,
    pub required_capability: String,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self {
            preferred: vec![DEFAULT_PREFERRED_MODEL.to_string()],
            required_capability: GENERATE_CONTENT.to_string(),
        }
    }
}

impl ModelSelector {
    pub fn new<I, S>(preferred: I, required_capability: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferred: preferred.into_iter().map(Into::into).collect(),
            required_capability: required_capability.into(),
        }
    }

    /// First preferred candidate that is available and capable, else the first capable
    /// candidate in `available` order.
    pub fn select<'a>(&self, available: &'a [ModelCandidate]) -> Option<&'a ModelCandidate> {
        let capable = |c: &&ModelCandidate| c.supports(&self.required_capability);
        self.preferred
            .iter()
            .find_map(|name| available.iter().filter(capable).find(|c| &c.name == name))
            .or_else(|| available.iter().find(capable))
    }

    pub fn select_or_unavailable<'a>(
        &self,
        available: &'a [ModelCandidate],
    ) -> Result<&'a ModelCandidate> {
        self.select(available).ok_or_else(|| Error::UpstreamUnavailable {
            message: format!(
                "no model among {} candidate(s) supports {}",
                available.len(),
                self.required_capability
            ),
        })
    }
}

/// Runs one analysis request: prompt, generate, parse.
///
/// Generator failures and empty replies are reported as [`Error::UpstreamUnavailable`]; no
/// retry is attempted here.
pub fn analyze(
    generator: &dyn TextGenerator,
    model: &str,
    problem_statement: &str,
    options: ParseOptions,
) -> Result<ParsedTaxonomy> {
    let prompt = six_m_prompt(problem_statement);
    tracing::debug!(model, prompt_len = prompt.len(), "requesting taxonomy");

    let reply = generator.generate(model, &prompt).map_err(|err| match err {
        Error::UpstreamUnavailable { .. } => err,
        other => Error::UpstreamUnavailable {
            message: other.to_string(),
        },
    })?;
    if reply.trim().is_empty() {
        return Err(Error::UpstreamUnavailable {
            message: format!("{model} returned an empty reply"),
        });
    }

    parse_taxonomy(&reply, problem_statement, options)
}
