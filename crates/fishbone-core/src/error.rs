pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The text could not be decoded as a category -> subcause -> root-cause mapping.
    ///
    /// `raw` holds the input after wrapper stripping so callers can show what the model sent.
    #[error("Malformed taxonomy: {message}")]
    MalformedTaxonomy { message: String, raw: String },

    #[error("Upstream text generation unavailable: {message}")]
    UpstreamUnavailable { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Config decode error: {message}")]
    ConfigDecode { message: String },
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>, raw: &str) -> Self {
        Self::MalformedTaxonomy {
            message: message.into(),
            raw: raw.to_string(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// The offending raw text for [`Error::MalformedTaxonomy`].
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::MalformedTaxonomy { raw, .. } => Some(raw.as_str()),
            _ => None,
        }
    }

    /// A short, actionable hint for user-facing error reports.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::MalformedTaxonomy { .. } => {
                "The model reply was not a category -> subcause -> root-cause mapping; run the analysis again."
            }
            Self::UpstreamUnavailable { .. } => {
                "Verify the generation service credentials and connectivity, then retry."
            }
            Self::InvalidConfig { .. } | Self::ConfigDecode { .. } => {
                "Check the configuration values (majorCategoryArity must be a positive integer, dialect is minimal or styled)."
            }
        }
    }
}
