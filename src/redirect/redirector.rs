//! Delivery of conversion results to the client.
//!
//! # State Machine
//! ```text
//! configuration missing           → error, nothing written
//! url = literal URL | resolve(resource) | ""
//! url present AND (delay == 0 OR no template)
//!     → redirect: result status → configured status → bare 302
//! otherwise
//!     → screen: result status → 200 (url) / 404 (no url)
//!     → render failure: redirect with the result status as-is
//! ```

use std::sync::Arc;

use crate::error::MappingError;
use crate::mapping::result::ConversionResult;
use crate::redirect::resolver::ResourceResolver;
use crate::redirect::sink::{ResponseSink, CONTENT_TYPE_HTML};
use crate::redirect::templates::{logical_name, RenderContext, TemplateRenderer};

/// Status of a bare redirect.
pub const FOUND: u16 = 302;

/// What the redirector wrote to the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Redirect { status: u16 },
    Screen { status: u16, template: String },
}

impl Delivery {
    pub fn status(&self) -> u16 {
        match self {
            Delivery::Redirect { status } | Delivery::Screen { status, .. } => *status,
        }
    }

    /// Metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Delivery::Redirect { .. } => "redirect",
            Delivery::Screen { .. } => "screen",
        }
    }
}

/// Turns conversion results into redirects or interstitial screens.
#[derive(Clone)]
pub struct Redirector {
    resolver: Arc<dyn ResourceResolver>,
    renderer: Arc<dyn TemplateRenderer>,
}

impl Redirector {
    pub fn new(resolver: Arc<dyn ResourceResolver>, renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self { resolver, renderer }
    }

    /// Write `conversion` to `response`.
    pub fn deliver(
        &self,
        conversion: &ConversionResult,
        response: &mut dyn ResponseSink,
    ) -> Result<Delivery, MappingError> {
        let Some(configuration) = conversion.configuration() else {
            tracing::error!("A configuration for handling this redirect is missing");
            return Err(MappingError::MissingConfiguration);
        };

        let url = self.url(conversion)?;
        let is_url_present = !url.is_empty();
        let template = if is_url_present {
            configuration.redirect_screen_template()
        } else {
            configuration.not_found_screen_template()
        }
        .unwrap_or("");
        let http_status = conversion.http_status();

        if is_url_present && (configuration.delay() == 0 || template.is_empty()) {
            let status = redirect_status(http_status, configuration.redirect_http_status());
            return send_redirect(response, &url, status);
        }

        let context = RenderContext {
            url: &url,
            suggestions: conversion.suggestion_block(),
            conversion,
            configuration,
        };
        let status = screen_status(http_status, is_url_present);
        response.set_status(status);

        let name = logical_name(template);
        match self.renderer.render(name, &context) {
            Ok(html) => {
                response
                    .set_content_type(CONTENT_TYPE_HTML)
                    .map_err(MappingError::Transport)?;
                response.write_body(html).map_err(MappingError::Transport)?;
                tracing::debug!(template = %name, status, url = %url, "Rendered redirection screen");
                Ok(Delivery::Screen {
                    status,
                    template: name.to_string(),
                })
            }
            Err(e) => {
                tracing::error!(
                    template = %name,
                    error = %e,
                    "An error occurred while rendering the redirection screen, falling back to a simple redirection"
                );
                send_redirect(response, &url, http_status)
            }
        }
    }

    fn url(&self, conversion: &ConversionResult) -> Result<String, MappingError> {
        let url = conversion.target_url();
        if !url.is_empty() {
            return Ok(url.to_string());
        }
        match conversion.target_resource() {
            Some(reference) => self.resolver.resolve(reference),
            None => Ok(String::new()),
        }
    }
}

impl std::fmt::Debug for Redirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redirector").finish_non_exhaustive()
    }
}

fn redirect_status(http_status: u16, configured: u16) -> u16 {
    if http_status == 0 {
        configured
    } else {
        http_status
    }
}

fn screen_status(http_status: u16, is_url_present: bool) -> u16 {
    match (http_status, is_url_present) {
        (0, true) => 200,
        (0, false) => 404,
        (status, _) => status,
    }
}

fn send_redirect(response: &mut dyn ResponseSink, url: &str, status: u16) -> Result<Delivery, MappingError> {
    if status == 0 || status == FOUND {
        response.send_redirect(url).map_err(MappingError::Transport)?;
        return Ok(Delivery::Redirect { status: FOUND });
    }
    response.set_status(status);
    response
        .set_header("location", url)
        .map_err(MappingError::Transport)?;
    Ok(Delivery::Redirect { status })
}
