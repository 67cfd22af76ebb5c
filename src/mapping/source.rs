//! Key/value settings lookup consumed by configuration resolution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A typed settings value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Int(i64),
    Str(String),
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Int(v)
    }
}

impl From<i32> for SettingValue {
    fn from(v: i32) -> Self {
        SettingValue::Int(i64::from(v))
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::Str(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        SettingValue::Str(v)
    }
}

/// Backing store for `urlmapping.*` settings.
pub trait ConfigurationSource: Send + Sync {
    /// String value stored under `key`.
    fn string(&self, key: &str) -> Option<String>;

    /// Integer value stored under `key`.
    fn int(&self, key: &str) -> Option<i64>;
}

/// In-memory settings, usually flattened from the configuration file.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, SettingValue>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigurationSource for MapSource {
    fn string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            SettingValue::Str(s) => Some(s.clone()),
            SettingValue::Int(i) => Some(i.to_string()),
        }
    }

    fn int(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            SettingValue::Int(i) => Some(*i),
            SettingValue::Str(s) => match s.trim().parse() {
                Ok(i) => Some(i),
                Err(_) => {
                    tracing::warn!(key = %key, value = %s, "Setting is not an integer, ignoring");
                    None
                }
            },
        }
    }
}
