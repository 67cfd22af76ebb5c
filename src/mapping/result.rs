//! Outcome of a conversion, consumed by the redirector.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::mapping::block::Block;
use crate::mapping::configuration::Configuration;

/// Status used for synthesized not-found results.
pub const NOT_FOUND_STATUS: u16 = 404;

/// A reference to a resource that a resolver turns into a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceRef {
    /// A page addressed by its path segments, viewed through `action`.
    Page { segments: Vec<String>, action: String },
    /// Any other kind of reference; the default resolver rejects these.
    Other { kind: String, reference: String },
}

impl ResourceRef {
    /// A page viewed with the `view` action.
    pub fn page<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::page_with_action(segments, "view")
    }

    pub fn page_with_action<I, S>(segments: I, action: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResourceRef::Page {
            segments: segments.into_iter().map(Into::into).collect(),
            action: action.into(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            ResourceRef::Page { .. } => "page",
            ResourceRef::Other { kind, .. } => kind,
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRef::Page { segments, action } => write!(f, "page:{}@{}", segments.join("/"), action),
            ResourceRef::Other { kind, reference } => write!(f, "{}:{}", kind, reference),
        }
    }
}

/// Where a conversion points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Target {
    /// A resource resolved to a URL at delivery time.
    Resource(ResourceRef),
    /// A literal URL; an empty one means "no target".
    Url(String),
}

/// The outcome of converting a path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionResult {
    target: Option<Target>,
    suggestions: Option<Block>,
    http_status: u16,
    #[serde(skip)]
    configuration: Option<Arc<Configuration>>,
}

impl ConversionResult {
    /// Redirect to a literal URL.
    pub fn url(configuration: Arc<Configuration>, url: impl Into<String>) -> Self {
        Self {
            target: Some(Target::Url(url.into())),
            configuration: Some(configuration),
            ..Self::default()
        }
    }

    /// Redirect to a resource.
    pub fn resource(configuration: Arc<Configuration>, reference: ResourceRef) -> Self {
        Self {
            target: Some(Target::Resource(reference)),
            configuration: Some(configuration),
            ..Self::default()
        }
    }

    /// No target, but suggestions to show.
    pub fn suggestions(configuration: Arc<Configuration>, suggestions: Block) -> Self {
        Self {
            suggestions: Some(suggestions),
            configuration: Some(configuration),
            ..Self::default()
        }
    }

    /// An empty URL with the not-found status.
    pub fn not_found(configuration: Arc<Configuration>) -> Self {
        Self::url(configuration, "").with_status(NOT_FOUND_STATUS)
    }

    /// A result carrying no configuration; delivery refuses these.
    pub fn unconfigured(target: Option<Target>) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Explicit HTTP status; 0 means "use the default".
    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = status;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Block) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Literal URL of the result, empty when there is none.
    pub fn target_url(&self) -> &str {
        match &self.target {
            Some(Target::Url(url)) => url,
            _ => "",
        }
    }

    pub fn target_resource(&self) -> Option<&ResourceRef> {
        match &self.target {
            Some(Target::Resource(r)) => Some(r),
            _ => None,
        }
    }

    /// True when the result points somewhere: a resource or a non-empty URL.
    pub fn has_target(&self) -> bool {
        match &self.target {
            Some(Target::Resource(_)) => true,
            Some(Target::Url(url)) => !url.is_empty(),
            None => false,
        }
    }

    pub fn suggestion_block(&self) -> Option<&Block> {
        self.suggestions.as_ref()
    }

    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    pub fn configuration(&self) -> Option<&Arc<Configuration>> {
        self.configuration.as_ref()
    }
}
