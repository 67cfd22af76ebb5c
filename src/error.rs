//! Error types shared by the mapping and delivery layers.
//!
//! Only structurally invalid states end up here. Unmatched mappers,
//! disqualified methods and template failures are decided locally and never
//! surface as errors.

use thiserror::Error;

/// Errors raised while converting or delivering a mapped request.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A conversion result reached delivery without any configuration.
    #[error("a configuration for handling this redirect is missing")]
    MissingConfiguration,

    /// The conversion target is neither a literal URL nor a supported resource kind.
    #[error("unhandled resource reference type: {0}")]
    UnsupportedTarget(String),

    /// Writing the redirect to the response failed.
    #[error("failed to redirect")]
    Transport(#[source] std::io::Error),

    /// A mapper pattern did not compile.
    #[error("invalid mapping pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl MappingError {
    /// Static label for metrics and log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingConfiguration => "missing_configuration",
            Self::UnsupportedTarget(_) => "unsupported_target",
            Self::Transport(_) => "transport",
            Self::Pattern(_) => "pattern",
        }
    }
}
