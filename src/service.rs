//! Request-level glue between the prefix registry, the live handlers and
//! the redirector.
//!
//! # Data Flow
//! ```text
//! /<prefix>/<path>
//!     → PrefixRegistry::resolve (unknown prefix → Outcome::Unmapped)
//!     → HandlerCatalog::get (lookup failure → global not-found result)
//!     → PrefixHandler::dispatch
//!     → Redirector::deliver
//! ```
//!
//! # Design Decisions
//! - Settings, redirector and the global not-found result are swapped as one
//!   snapshot on reload
//! - Handlers built from the configuration file are replaced by fresh
//!   instances on reload; handlers registered in code are left alone

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::config::schema::UrlMappingConfig;
use crate::error::MappingError;
use crate::mapping::configuration::Configuration;
use crate::mapping::handler::{MappingHandler, PrefixHandler};
use crate::mapping::matching::RequestContext;
use crate::mapping::result::ConversionResult;
use crate::mapping::source::ConfigurationSource;
use crate::observability::metrics;
use crate::redirect::redirector::{Delivery, Redirector};
use crate::redirect::resolver::PageUrlResolver;
use crate::redirect::sink::ResponseSink;
use crate::redirect::templates::{RenderError, TemplateSet};
use crate::registry::catalog::{HandlerCatalog, HandlerSet};
use crate::registry::prefixes::{MappingReference, PrefixRegistry, RegistryEvent};

/// Errors raised while assembling the service from configuration.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to build prefix handler '{handler}': {source}")]
    Handler {
        handler: String,
        #[source]
        source: MappingError,
    },

    #[error("failed to load screen templates: {0}")]
    Templates(#[from] RenderError),

    #[error("invalid resource base: {0}")]
    ResourceBase(#[from] url::ParseError),
}

/// What happened to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No handler serves the first path segment; the host should fall through.
    Unmapped,
    Delivered(Delivery),
}

struct Runtime {
    settings: Arc<dyn ConfigurationSource>,
    redirector: Redirector,
    /// Used when the registry names a handler that cannot be found.
    not_found: ConversionResult,
}

impl Runtime {
    fn new(settings: Arc<dyn ConfigurationSource>, redirector: Redirector) -> Self {
        let global = Arc::new(Configuration::global(settings.as_ref()));
        Self {
            settings,
            redirector,
            not_found: ConversionResult::not_found(global),
        }
    }
}

/// Resolves prefixes, dispatches to handlers and delivers the result.
pub struct MappingService {
    registry: PrefixRegistry,
    handlers: HandlerSet,
    runtime: ArcSwap<Runtime>,
    /// Names of the handlers built from the configuration file.
    configured: Mutex<BTreeSet<String>>,
}

impl MappingService {
    /// A service without handlers.
    pub fn new(redirector: Redirector, settings: Arc<dyn ConfigurationSource>) -> Self {
        Self {
            registry: PrefixRegistry::new(),
            handlers: HandlerSet::new(),
            runtime: ArcSwap::from_pointee(Runtime::new(settings, redirector)),
            configured: Mutex::new(BTreeSet::new()),
        }
    }

    /// Build the service and every configured handler, then register them
    /// all at once.
    pub fn from_config(config: &UrlMappingConfig) -> Result<Self, ServiceError> {
        let settings: Arc<dyn ConfigurationSource> = Arc::new(config.settings());
        let handlers = build_handlers(config, &settings)?;
        let service = Self::new(build_redirector(config)?, settings);

        {
            let mut configured = service.configured.lock().unwrap_or_else(PoisonError::into_inner);
            for handler in handlers {
                configured.insert(handler.name().to_string());
                service.handlers.insert(handler);
            }
        }
        service.start();
        Ok(service)
    }

    /// Register every handler in the catalog, as on process start.
    pub fn start(&self) {
        self.registry.apply(&RegistryEvent::Started, &self.handlers);
        tracing::info!(
            handlers = self.handlers.len(),
            prefixes = ?self.registry.supported_prefixes(),
            "URL mapping prefix handlers registered"
        );
    }

    /// Add or replace a handler at runtime.
    pub fn register(&self, handler: Arc<dyn PrefixHandler>) {
        let name = handler.name().to_string();
        self.handlers.insert(handler);
        self.registry.apply(&RegistryEvent::Added(name), &self.handlers);
    }

    /// Remove a handler at runtime. Its prefix is unbound before the
    /// instance leaves the catalog.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn PrefixHandler>> {
        self.registry
            .apply(&RegistryEvent::Removed(name.to_string()), &self.handlers);
        self.handlers.remove(name)
    }

    /// Replace the settings and every configured handler with fresh instances.
    pub fn reload(&self, config: &UrlMappingConfig) -> Result<(), ServiceError> {
        let settings: Arc<dyn ConfigurationSource> = Arc::new(config.settings());
        let handlers = build_handlers(config, &settings)?;
        let redirector = build_redirector(config)?;

        let mut configured = self.configured.lock().unwrap_or_else(PoisonError::into_inner);
        self.runtime.store(Arc::new(Runtime::new(settings, redirector)));

        let names: BTreeSet<String> = handlers.iter().map(|h| h.name().to_string()).collect();
        for stale in configured.difference(&names) {
            self.unregister(stale);
        }
        for handler in handlers {
            self.register(handler);
        }

        tracing::info!(
            handlers = names.len(),
            removed = configured.difference(&names).count(),
            prefixes = ?self.registry.supported_prefixes(),
            "URL mapping configuration reloaded"
        );
        *configured = names;
        Ok(())
    }

    /// Settings source current handlers should be built with.
    pub fn settings(&self) -> Arc<dyn ConfigurationSource> {
        self.runtime.load().settings.clone()
    }

    /// Prefixes that currently receive traffic, sorted.
    pub fn supported_prefixes(&self) -> Vec<String> {
        self.registry.supported_prefixes()
    }

    pub fn registry(&self) -> &PrefixRegistry {
        &self.registry
    }

    pub fn handlers(&self) -> &HandlerSet {
        &self.handlers
    }

    /// Map `path` (the full request path, `/<prefix>/<rest>`) and deliver
    /// the outcome to `response`.
    pub fn handle(
        &self,
        path: &str,
        method: &str,
        context: &RequestContext,
        response: &mut dyn ResponseSink,
    ) -> Result<Outcome, MappingError> {
        let (prefix, rest) = split_prefix(path);
        let Some(reference) = self.registry.resolve(prefix, rest) else {
            tracing::debug!(prefix = %prefix, "No URL mapping prefix handler registered");
            metrics::record_dispatch("", "unmapped");
            return Ok(Outcome::Unmapped);
        };

        let runtime = self.runtime.load();
        let conversion = self.convert(&reference, method, context);
        let conversion = conversion.as_ref().unwrap_or(&runtime.not_found);

        match runtime.redirector.deliver(conversion, response) {
            Ok(delivery) => {
                metrics::record_delivery(delivery.kind(), delivery.status());
                Ok(Outcome::Delivered(delivery))
            }
            Err(e) => {
                tracing::error!(
                    prefix = %reference.prefix,
                    handler = %reference.handler_name,
                    path = %reference.path,
                    error = %e,
                    "Failed to redirect"
                );
                metrics::record_delivery_error(e.error_code());
                Err(e)
            }
        }
    }

    fn convert(
        &self,
        reference: &MappingReference,
        method: &str,
        context: &RequestContext,
    ) -> Option<ConversionResult> {
        let Some(handler) = self.handlers.get(&reference.handler_name) else {
            tracing::error!(handler = %reference.handler_name, "Could not get the URL prefix handler");
            metrics::record_dispatch(&reference.prefix, "missing_handler");
            return None;
        };

        tracing::debug!(
            path = %reference.path,
            method = %method,
            handler = %reference.handler_name,
            request_id = ?context.request_id,
            "Converting path"
        );
        let conversion = handler.dispatch(&reference.path, method, context);
        let outcome = if conversion.has_target() { "converted" } else { "not_found" };
        metrics::record_dispatch(&reference.prefix, outcome);
        Some(conversion)
    }
}

impl std::fmt::Debug for MappingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingService")
            .field("registry", &self.registry)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

/// Split `/<prefix>/<rest>` into its first segment and the remainder.
pub fn split_prefix(path: &str) -> (&str, &str) {
    let path = path.trim_start_matches('/');
    path.split_once('/').unwrap_or((path, ""))
}

fn build_handlers(
    config: &UrlMappingConfig,
    settings: &Arc<dyn ConfigurationSource>,
) -> Result<Vec<Arc<dyn PrefixHandler>>, ServiceError> {
    config
        .prefixhandlers
        .iter()
        .map(|(name, handler_config)| {
            MappingHandler::from_config(name, handler_config, settings.clone())
                .map(|handler| Arc::new(handler) as Arc<dyn PrefixHandler>)
                .map_err(|source| ServiceError::Handler {
                    handler: name.clone(),
                    source,
                })
        })
        .collect()
}

fn build_redirector(config: &UrlMappingConfig) -> Result<Redirector, ServiceError> {
    let resolver = PageUrlResolver::new(&config.resource_base)?;
    let templates = match &config.templates_dir {
        Some(dir) => TemplateSet::load_dir(Path::new(dir))?,
        None => TemplateSet::builtin(),
    };
    Ok(Redirector::new(Arc::new(resolver), Arc::new(templates)))
}
