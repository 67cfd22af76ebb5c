//! Redirection settings of a prefix handler, or of the global fallback.
//!
//! # Resolution
//! ```text
//! urlmapping.prefixhandlers.<name>.<key>   (skipped for the global configuration)
//!     → urlmapping.default.<key>
//!     → handler override (ConfigurationOverrides)
//!     → built-in default
//! ```
//!
//! # Design Decisions
//! - Resolved eagerly when built; a handler builds it once and caches it
//! - Empty strings count as absent at every tier
//! - `prefix` never falls back: a handler without its own prefix has none

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::mapping::source::{ConfigurationSource, SettingValue};

/// Root of every settings key.
pub const CONFIGURATION_PREFIX: &str = "urlmapping.";

const HANDLERS_PREFIX: &str = "urlmapping.prefixhandlers.";

pub const DEFAULT_REDIRECT_SCREEN_TEMPLATE: &str = "url-mapping/redirectscreen.html";
pub const DEFAULT_NOT_FOUND_SCREEN_TEMPLATE: &str = "url-mapping/notfoundscreen.html";

/// The settings a configuration resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigKey {
    Prefix,
    /// Seconds before the interstitial screen navigates; 0 skips the screen.
    Delay,
    RedirectScreenTemplate,
    NotFoundScreenTemplate,
    IntroMessage,
    NotFoundIntroMessage,
    Title,
    RedirectHttpStatus,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 8] = [
        ConfigKey::Prefix,
        ConfigKey::Delay,
        ConfigKey::RedirectScreenTemplate,
        ConfigKey::NotFoundScreenTemplate,
        ConfigKey::IntroMessage,
        ConfigKey::NotFoundIntroMessage,
        ConfigKey::Title,
        ConfigKey::RedirectHttpStatus,
    ];

    /// Name used in settings keys.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::Prefix => "prefix",
            ConfigKey::Delay => "delay",
            ConfigKey::RedirectScreenTemplate => "redirectScreenTemplate",
            ConfigKey::NotFoundScreenTemplate => "notFoundScreenTemplate",
            ConfigKey::IntroMessage => "introMessage",
            ConfigKey::NotFoundIntroMessage => "notFoundIntroMessage",
            ConfigKey::Title => "title",
            ConfigKey::RedirectHttpStatus => "redirectHttpStatus",
        }
    }

    /// Lookup a key by its settings name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn is_int(&self) -> bool {
        matches!(self, ConfigKey::Delay | ConfigKey::RedirectHttpStatus)
    }

    fn builtin_default(&self) -> Option<SettingValue> {
        match self {
            ConfigKey::Delay => Some(SettingValue::Int(0)),
            ConfigKey::RedirectScreenTemplate => Some(DEFAULT_REDIRECT_SCREEN_TEMPLATE.into()),
            ConfigKey::NotFoundScreenTemplate => Some(DEFAULT_NOT_FOUND_SCREEN_TEMPLATE.into()),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-key replacements of the built-in defaults, declared by a handler at
/// assembly time.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationOverrides {
    values: HashMap<ConfigKey, SettingValue>,
}

impl ConfigurationOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: ConfigKey, value: impl Into<SettingValue>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn delay(self, seconds: i64) -> Self {
        self.set(ConfigKey::Delay, seconds)
    }

    pub fn redirect_http_status(self, status: u16) -> Self {
        self.set(ConfigKey::RedirectHttpStatus, i64::from(status))
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.set(ConfigKey::Title, title.into())
    }

    pub fn intro_message(self, message: impl Into<String>) -> Self {
        self.set(ConfigKey::IntroMessage, message.into())
    }

    pub fn not_found_intro_message(self, message: impl Into<String>) -> Self {
        self.set(ConfigKey::NotFoundIntroMessage, message.into())
    }

    pub fn get(&self, key: ConfigKey) -> Option<&SettingValue> {
        self.values.get(&key)
    }
}

/// Resolved settings for one prefix handler, or the global defaults.
#[derive(Debug, Clone, Serialize)]
pub struct Configuration {
    handler: Option<String>,
    values: HashMap<ConfigKey, SettingValue>,
}

impl Configuration {
    /// Resolve every key for `handler`, or the global configuration when `None`.
    pub fn resolve(
        source: &dyn ConfigurationSource,
        handler: Option<&str>,
        overrides: &ConfigurationOverrides,
    ) -> Self {
        let mut values = HashMap::new();
        for key in ConfigKey::ALL {
            let specific = handler.and_then(|name| {
                read(source, &format!("{}{}.{}", HANDLERS_PREFIX, name, key), key)
            });
            let value = if key == ConfigKey::Prefix {
                specific
            } else {
                specific
                    .or_else(|| read(source, &format!("{}default.{}", CONFIGURATION_PREFIX, key), key))
                    .or_else(|| overrides.get(key).cloned())
                    .or_else(|| key.builtin_default())
            };
            if let Some(value) = value {
                values.insert(key, value);
            }
        }

        tracing::debug!(handler = ?handler, keys = values.len(), "Resolved URL mapping configuration");
        Self {
            handler: handler.map(str::to_string),
            values,
        }
    }

    /// Resolve the global configuration, used when no handler answered.
    pub fn global(source: &dyn ConfigurationSource) -> Self {
        Self::resolve(source, None, &ConfigurationOverrides::default())
    }

    /// Name of the owning handler; `None` for the global configuration.
    pub fn handler_name(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    pub fn get(&self, key: ConfigKey) -> Option<&SettingValue> {
        self.values.get(&key)
    }

    /// The handler's prefix; always empty for the global configuration.
    pub fn prefix(&self) -> &str {
        if self.handler.is_none() {
            return "";
        }
        self.string(ConfigKey::Prefix).unwrap_or("")
    }

    pub fn delay(&self) -> i64 {
        self.int(ConfigKey::Delay)
    }

    pub fn redirect_screen_template(&self) -> Option<&str> {
        self.string(ConfigKey::RedirectScreenTemplate)
    }

    pub fn not_found_screen_template(&self) -> Option<&str> {
        self.string(ConfigKey::NotFoundScreenTemplate)
    }

    pub fn intro_message(&self) -> Option<&str> {
        self.string(ConfigKey::IntroMessage)
    }

    pub fn not_found_intro_message(&self) -> Option<&str> {
        self.string(ConfigKey::NotFoundIntroMessage)
    }

    pub fn title(&self) -> Option<&str> {
        self.string(ConfigKey::Title)
    }

    /// Configured redirect status; 0 when unset or out of range.
    pub fn redirect_http_status(&self) -> u16 {
        let status = self.int(ConfigKey::RedirectHttpStatus);
        match u16::try_from(status) {
            Ok(s) if s <= 999 => s,
            _ => {
                tracing::warn!(handler = ?self.handler, status, "Ignoring out of range redirect HTTP status");
                0
            }
        }
    }

    fn string(&self, key: ConfigKey) -> Option<&str> {
        match self.values.get(&key)? {
            SettingValue::Str(s) => Some(s.as_str()),
            SettingValue::Int(_) => None,
        }
    }

    fn int(&self, key: ConfigKey) -> i64 {
        match self.values.get(&key) {
            Some(SettingValue::Int(i)) => *i,
            _ => 0,
        }
    }
}

impl Default for Configuration {
    /// Built-in defaults only, as the global configuration of an empty source.
    fn default() -> Self {
        Self::global(&crate::mapping::source::MapSource::new())
    }
}

fn read(source: &dyn ConfigurationSource, key: &str, config_key: ConfigKey) -> Option<SettingValue> {
    if config_key.is_int() {
        source.int(key).map(SettingValue::Int)
    } else {
        source
            .string(key)
            .filter(|s| !s.is_empty())
            .map(SettingValue::Str)
    }
}
