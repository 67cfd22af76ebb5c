//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (statuses, bind address)
//! - Check that every rule pattern compiles and every setting is known
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::mapping::configuration::ConfigKey;
use crate::mapping::source::SettingValue;
use crate::mapping::specification::Pattern;

/// A semantic problem in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("handler '{handler}': invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        handler: String,
        pattern: String,
        reason: String,
    },

    #[error("{location}: HTTP status {status} is out of range")]
    InvalidStatus { location: String, status: i64 },

    #[error("handler '{handler}' rule {rule}: both target and page are set")]
    ConflictingTarget { handler: String, rule: usize },

    #[error("handler '{handler}': invalid method '{method}'")]
    InvalidMethod { handler: String, method: String },

    #[error("{location}: unknown setting '{key}'")]
    UnknownSetting { location: String, key: String },
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }

    let urlmapping = &config.urlmapping;
    validate_settings("urlmapping.default", urlmapping.default.iter(), &mut errors);

    for (name, handler) in &urlmapping.prefixhandlers {
        let location = format!("urlmapping.prefixhandlers.{}", name);
        validate_settings(&location, handler.settings.iter(), &mut errors);

        for (index, rule) in handler.rules.iter().enumerate() {
            if rule.target.is_some() && rule.page.is_some() {
                errors.push(ValidationError::ConflictingTarget {
                    handler: name.clone(),
                    rule: index,
                });
            }
            if !is_valid_status(i64::from(rule.status)) {
                errors.push(ValidationError::InvalidStatus {
                    location: format!("{} rule {}", location, index),
                    status: i64::from(rule.status),
                });
            }
            for method in &rule.methods {
                if Method::from_bytes(method.as_bytes()).is_err() {
                    errors.push(ValidationError::InvalidMethod {
                        handler: name.clone(),
                        method: method.clone(),
                    });
                }
            }
            for pattern in &rule.patterns {
                if let Err(e) = Pattern::new(pattern.as_str()) {
                    errors.push(ValidationError::InvalidPattern {
                        handler: name.clone(),
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_settings<'a>(
    location: &str,
    settings: impl Iterator<Item = (&'a String, &'a SettingValue)>,
    errors: &mut Vec<ValidationError>,
) {
    for (key, value) in settings {
        match ConfigKey::from_name(key) {
            None => errors.push(ValidationError::UnknownSetting {
                location: location.to_string(),
                key: key.clone(),
            }),
            Some(ConfigKey::RedirectHttpStatus) => {
                if let SettingValue::Int(status) = value {
                    if !is_valid_status(*status) {
                        errors.push(ValidationError::InvalidStatus {
                            location: format!("{}.{}", location, key),
                            status: *status,
                        });
                    }
                }
            }
            Some(_) => {}
        }
    }
}

/// 0 means "use the default"; anything else must be a three digit code.
fn is_valid_status(status: i64) -> bool {
    status == 0 || (100..=999).contains(&status)
}
