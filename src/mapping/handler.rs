//! Prefix handlers: ordered mapper chains sharing one configuration.
//!
//! # Dispatch
//! ```text
//! for each mapper, in order:
//!     method excluded?            → skip
//!     patterns declared, none full-match? → skip
//!     convert(match) = Some(r)    → return r
//!     suggestions(match) = Some(b) → return 404 + b
//! nothing answered                → return "" + 404
//! ```
//! Every returned result carries a configuration, so delivery always has
//! settings to work with.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::config::schema::HandlerConfig;
use crate::error::MappingError;
use crate::mapping::configuration::{Configuration, ConfigurationOverrides};
use crate::mapping::mapper::Mapper;
use crate::mapping::matching::{Match, RequestContext};
use crate::mapping::result::{ConversionResult, NOT_FOUND_STATUS};
use crate::mapping::rules::RuleMapper;
use crate::mapping::source::ConfigurationSource;

/// Converts the paths under one URL prefix.
pub trait PrefixHandler: Send + Sync {
    /// Name the handler is registered under.
    fn name(&self) -> &str;

    /// The handler's resolved configuration.
    fn configuration(&self) -> Arc<Configuration>;

    /// The prefix this handler serves, as configured.
    fn prefix(&self) -> String {
        self.configuration().prefix().to_string()
    }

    /// Convert `path` (prefix segment already stripped) for `method`.
    fn dispatch(&self, path: &str, method: &str, context: &RequestContext) -> ConversionResult;
}

/// The standard prefix handler: a mapper list plus lazily resolved settings.
pub struct MappingHandler {
    name: String,
    mappers: Vec<Box<dyn Mapper>>,
    overrides: ConfigurationOverrides,
    source: Arc<dyn ConfigurationSource>,
    configuration: OnceLock<Arc<Configuration>>,
}

impl MappingHandler {
    pub fn builder(name: impl Into<String>) -> MappingHandlerBuilder {
        MappingHandlerBuilder {
            name: name.into(),
            mappers: Vec::new(),
            overrides: ConfigurationOverrides::default(),
        }
    }

    /// Build a rule-based handler from the configuration file.
    pub fn from_config(
        name: &str,
        config: &HandlerConfig,
        source: Arc<dyn ConfigurationSource>,
    ) -> Result<Self, MappingError> {
        let mut builder = Self::builder(name);
        for rule in &config.rules {
            builder = builder.mapper(RuleMapper::from_config(rule)?);
        }
        Ok(builder.build(source))
    }

    fn try_mapper(
        &self,
        mapper: &dyn Mapper,
        path: &str,
        method: &str,
        context: &RequestContext,
        configuration: &Arc<Configuration>,
    ) -> Option<ConversionResult> {
        let spec = mapper.specification();
        if !spec.accepts_method(method) {
            return None;
        }

        let matched = if spec.is_catch_all() {
            None
        } else {
            let (pattern, captures) = spec.match_path(path)?;
            Some((pattern.regex(), captures))
        };

        let m = Match::new(path, method, matched, context, configuration);
        if let Some(result) = mapper.convert(&m) {
            return Some(result);
        }

        let suggestions = mapper.suggestion_provider()?.suggestions(&m)?;
        Some(ConversionResult::suggestions(configuration.clone(), suggestions).with_status(NOT_FOUND_STATUS))
    }
}

impl PrefixHandler for MappingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn configuration(&self) -> Arc<Configuration> {
        self.configuration
            .get_or_init(|| {
                Arc::new(Configuration::resolve(
                    self.source.as_ref(),
                    Some(&self.name),
                    &self.overrides,
                ))
            })
            .clone()
    }

    fn dispatch(&self, path: &str, method: &str, context: &RequestContext) -> ConversionResult {
        let configuration = self.configuration();

        for (index, mapper) in self.mappers.iter().enumerate() {
            if let Some(result) = self.try_mapper(mapper.as_ref(), path, method, context, &configuration) {
                tracing::debug!(
                    handler = %self.name,
                    mapper = index,
                    path = %path,
                    method = %method,
                    status = result.http_status(),
                    "Mapper converted path"
                );
                return result;
            }
        }

        tracing::debug!(handler = %self.name, path = %path, method = %method, "No mapper converted path");
        ConversionResult::not_found(configuration)
    }
}

impl fmt::Debug for MappingHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingHandler")
            .field("name", &self.name)
            .field("mappers", &self.mappers.len())
            .field("configuration", &self.configuration.get())
            .finish()
    }
}

/// Assembles a [`MappingHandler`].
pub struct MappingHandlerBuilder {
    name: String,
    mappers: Vec<Box<dyn Mapper>>,
    overrides: ConfigurationOverrides,
}

impl MappingHandlerBuilder {
    /// Append a mapper; mappers are tried in insertion order.
    pub fn mapper(mut self, mapper: impl Mapper + 'static) -> Self {
        self.mappers.push(Box::new(mapper));
        self
    }

    /// Replace built-in configuration defaults for this handler.
    pub fn overrides(mut self, overrides: ConfigurationOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn build(self, source: Arc<dyn ConfigurationSource>) -> MappingHandler {
        MappingHandler {
            name: self.name,
            mappers: self.mappers,
            overrides: self.overrides,
            source,
            configuration: OnceLock::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::block::Block;
    use crate::mapping::mapper::FnMapper;
    use crate::mapping::source::MapSource;
    use crate::mapping::specification::Specification;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn source() -> Arc<dyn ConfigurationSource> {
        Arc::new(
            MapSource::new()
                .with("urlmapping.prefixhandlers.test.prefix", "myprefix")
                .with("urlmapping.prefixhandlers.test.delay", 0),
        )
    }

    #[test]
    fn test_first_match_wins() {
        let later = Arc::new(AtomicUsize::new(0));
        let counter = later.clone();
        let handler = MappingHandler::builder("test")
            .mapper(FnMapper::new(Specification::patterns(["[a-z]+"]).unwrap(), |m| {
                Some(ConversionResult::url(m.configuration().clone(), "/first"))
            }))
            .mapper(FnMapper::new(Specification::any(), move |m| {
                counter.fetch_add(1, Ordering::SeqCst);
                Some(ConversionResult::url(m.configuration().clone(), "/second"))
            }))
            .build(source());

        let ctx = RequestContext::default();
        assert_eq!(handler.dispatch("hello", "GET", &ctx).target_url(), "/first");
        assert_eq!(later.load(Ordering::SeqCst), 0);

        assert_eq!(handler.dispatch("HELLO", "GET", &ctx).target_url(), "/second");
        assert_eq!(later.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_method_mismatch_never_invokes_mapper() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = MappingHandler::builder("test")
            .mapper(FnMapper::new(Specification::any().with_methods(["GET"]), move |m| {
                counter.fetch_add(1, Ordering::SeqCst);
                Some(ConversionResult::url(m.configuration().clone(), "/get"))
            }))
            .build(source());

        let result = handler.dispatch("anything", "POST", &RequestContext::default());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.http_status(), NOT_FOUND_STATUS);
    }

    #[test]
    fn test_suggestions_stop_the_chain() {
        let handler = MappingHandler::builder("test")
            .mapper(
                FnMapper::resource(Specification::patterns(["(?<part>[a-z]+)"]).unwrap(), |_| None)
                    .with_suggestions(|m| Some(Block::paragraph(["Try", m.named("part").unwrap_or("")]))),
            )
            .mapper(FnMapper::new(Specification::any(), |m| {
                Some(ConversionResult::url(m.configuration().clone(), "/unreachable"))
            }))
            .build(source());

        let result = handler.dispatch("typo", "GET", &RequestContext::default());
        assert_eq!(result.http_status(), NOT_FOUND_STATUS);
        assert_eq!(result.suggestion_block(), Some(&Block::paragraph(["Try", "typo"])));
        assert!(Arc::ptr_eq(result.configuration().unwrap(), &handler.configuration()));
    }

    #[test]
    fn test_no_match_carries_handler_configuration() {
        let handler = MappingHandler::builder("test").build(source());
        let result = handler.dispatch("missing", "GET", &RequestContext::default());

        assert_eq!(result.target_url(), "");
        assert_eq!(result.http_status(), NOT_FOUND_STATUS);
        assert_eq!(result.configuration().unwrap().prefix(), "myprefix");
    }

    #[test]
    fn test_configuration_resolved_once() {
        let handler = MappingHandler::builder("test")
            .overrides(ConfigurationOverrides::new().delay(3))
            .build(Arc::new(MapSource::new()));

        let first = handler.configuration();
        assert_eq!(first.delay(), 3);
        assert!(Arc::ptr_eq(&first, &handler.configuration()));
        assert_eq!(handler.prefix(), "");
    }
}
