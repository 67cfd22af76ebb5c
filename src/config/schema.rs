//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the URL
//! mapping service. All types derive Serde traits for deserialization from
//! config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mapping::configuration::CONFIGURATION_PREFIX;
use crate::mapping::source::{MapSource, SettingValue};

/// Root configuration for the URL mapping service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Prefix handlers and their redirection settings.
    pub urlmapping: UrlMappingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// The `[urlmapping]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UrlMappingConfig {
    /// Base that page targets are resolved against: a path (`/wiki/`) or an
    /// absolute URL.
    pub resource_base: String,

    /// Directory of `*.html` screen templates.
    pub templates_dir: Option<String>,

    /// Global fallbacks, `urlmapping.default.<key>`.
    pub default: BTreeMap<String, SettingValue>,

    /// Handlers by name, `urlmapping.prefixhandlers.<name>.<key>`.
    pub prefixhandlers: BTreeMap<String, HandlerConfig>,
}

impl Default for UrlMappingConfig {
    fn default() -> Self {
        Self {
            resource_base: "/".to_string(),
            templates_dir: None,
            default: BTreeMap::new(),
            prefixhandlers: BTreeMap::new(),
        }
    }
}

impl UrlMappingConfig {
    /// Flatten the section into the key/value settings read by
    /// configuration resolution.
    pub fn settings(&self) -> MapSource {
        let mut source = MapSource::new();
        for (key, value) in &self.default {
            source.insert(format!("{}default.{}", CONFIGURATION_PREFIX, key), value.clone());
        }
        for (name, handler) in &self.prefixhandlers {
            for (key, value) in &handler.settings {
                source.insert(
                    format!("{}prefixhandlers.{}.{}", CONFIGURATION_PREFIX, name, key),
                    value.clone(),
                );
            }
        }
        source
    }
}

/// A `[urlmapping.prefixhandlers.<name>]` table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HandlerConfig {
    /// Mappers, tried in order.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,

    /// Every other key: `prefix`, `delay`, `title`, ...
    #[serde(flatten)]
    pub settings: BTreeMap<String, SettingValue>,
}

/// One declarative mapper.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Accepted methods; empty accepts all.
    pub methods: Vec<String>,

    /// Full-match patterns, tried in order; empty matches every path.
    pub patterns: Vec<String>,

    /// Literal URL template (`$1`, `${name}`).
    pub target: Option<String>,

    /// Page path template, resolved against `resource_base`.
    pub page: Option<String>,

    /// Action used with `page` (default "view").
    pub action: Option<String>,

    /// Explicit HTTP status; 0 uses the configured default.
    pub status: u16,

    /// Links offered on the not-found screen when the rule has no target.
    pub suggestions: Vec<LinkConfig>,
}

/// A suggestion link.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    pub href: String,
    pub label: String,
}
