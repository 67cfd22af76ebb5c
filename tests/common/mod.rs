//! Shared fixtures for integration tests.
//!
//! Five prefix handlers, one per redirection behaviour:
//!
//! | handler               | prefix                | behaviour                         |
//! |-----------------------|-----------------------|-----------------------------------|
//! | `test`                | `myprefix`            | resources, URLs, suggestions      |
//! | `testdelayed`         | `delayedprefix`       | 2 second interstitial             |
//! | `testcustomintro`     | `customintro`         | custom title/intro, status 429    |
//! | `testcustomredirect`  | `customredirect`      | configured 307 redirects          |
//! | `customruntimeconfig` | `customruntimeconfig` | not-found intro from overrides    |

#![allow(dead_code)]

use std::sync::Arc;

use url_mapping::error::MappingError;
use url_mapping::http::BufferedResponse;
use url_mapping::mapping::{
    Block, ConfigKey, Configuration, ConfigurationOverrides, ConfigurationSource, ConversionResult, FnMapper,
    MapSource, MappingHandler, PrefixHandler, RequestContext, ResourceRef, Specification,
};
use url_mapping::redirect::{Redirector, TemplateRenderer, TemplateSet};
use url_mapping::{MappingService, Outcome};

pub fn settings() -> MapSource {
    MapSource::new()
        .with("urlmapping.prefixhandlers.test.prefix", "myprefix")
        .with("urlmapping.prefixhandlers.test.delay", 0)
        .with("urlmapping.prefixhandlers.testdelayed.prefix", "delayedprefix")
        .with("urlmapping.prefixhandlers.testdelayed.delay", 2)
        .with("urlmapping.prefixhandlers.testcustomintro.prefix", "customintro")
        .with("urlmapping.prefixhandlers.testcustomintro.title", "Custom title")
        .with(
            "urlmapping.prefixhandlers.testcustomintro.introMessage",
            "<Redirecting>. Please update your bookmarks.",
        )
        .with("urlmapping.prefixhandlers.testcustomredirect.prefix", "customredirect")
        .with("urlmapping.prefixhandlers.testcustomredirect.redirectHttpStatus", 307)
        .with("urlmapping.prefixhandlers.customruntimeconfig.prefix", "customruntimeconfig")
}

/// `MySpace/MyDoc` lives at `/hello`, every other page at `/bye`.
pub fn resolve(reference: &ResourceRef) -> Result<String, MappingError> {
    match reference {
        ResourceRef::Page { segments, .. } if segments == &["MySpace", "MyDoc"] => Ok("/hello".to_string()),
        ResourceRef::Page { .. } => Ok("/bye".to_string()),
        other => Err(MappingError::UnsupportedTarget(other.kind().to_string())),
    }
}

pub fn redirector() -> Redirector {
    redirector_with(Arc::new(TemplateSet::builtin()))
}

pub fn redirector_with(renderer: Arc<dyn TemplateRenderer>) -> Redirector {
    Redirector::new(Arc::new(resolve), renderer)
}

pub fn test_handler(source: Arc<dyn ConfigurationSource>) -> MappingHandler {
    MappingHandler::builder("test")
        .mapper(
            FnMapper::resource(
                Specification::patterns(["(?<matchedpart>[a-z]+)"]).unwrap(),
                |m| match m.named("matchedpart") {
                    Some("expectedmatch") => Some(ResourceRef::page(["MySpace", "MyDoc"])),
                    _ => None,
                },
            )
            .with_suggestions(|_| Some(Block::paragraph(["My", "Suggestion"]))),
        )
        .mapper(FnMapper::new(
            Specification::patterns(["00GETURL", "0GETURL"]).unwrap(),
            |m| Some(ConversionResult::url(m.configuration().clone(), "/transformedUrl").with_status(200)),
        ))
        .mapper(FnMapper::new(
            Specification::patterns(["1GETURL(/[A-Z]+)"]).unwrap(),
            |m| Some(ConversionResult::url(m.configuration().clone(), m.group(1)?)),
        ))
        .mapper(FnMapper::new(Specification::any(), |m| {
            m.path()
                .contains("missinglink")
                .then(|| ConversionResult::url(m.configuration().clone(), "/mycustomnotfound").with_status(404))
        }))
        .build(source)
}

pub fn delayed_handler(source: Arc<dyn ConfigurationSource>) -> MappingHandler {
    MappingHandler::builder("testdelayed")
        .mapper(FnMapper::new(Specification::any(), |m| {
            Some(ConversionResult::url(m.configuration().clone(), "/delayed"))
        }))
        .build(source)
}

pub fn custom_intro_handler(source: Arc<dyn ConfigurationSource>) -> MappingHandler {
    // Answers wrong-method requests with its own immediate-redirect settings.
    let immediate = Arc::new(Configuration::resolve(
        &MapSource::new(),
        Some("wrongmethod"),
        &ConfigurationOverrides::new()
            .set(ConfigKey::RedirectScreenTemplate, "")
            .set(ConfigKey::NotFoundScreenTemplate, ""),
    ));

    MappingHandler::builder("testcustomintro")
        .overrides(ConfigurationOverrides::new().delay(3))
        .mapper(FnMapper::new(Specification::any().with_methods(["get"]), |m| {
            Some(
                ConversionResult::resource(m.configuration().clone(), ResourceRef::page(["Main", "RedirectTarget"]))
                    .with_status(429),
            )
        }))
        .mapper(FnMapper::new(Specification::any(), move |_| {
            Some(ConversionResult::resource(
                immediate.clone(),
                ResourceRef::page(["Main", "RedirectWrongMethod"]),
            ))
        }))
        .build(source)
}

pub fn custom_redirect_handler(source: Arc<dyn ConfigurationSource>) -> MappingHandler {
    MappingHandler::builder("testcustomredirect")
        .mapper(FnMapper::resource(Specification::patterns(["hello"]).unwrap(), |_| {
            Some(ResourceRef::page(["Main", "RedirectTarget"]))
        }))
        .build(source)
}

pub fn custom_runtime_config_handler(source: Arc<dyn ConfigurationSource>) -> MappingHandler {
    MappingHandler::builder("customruntimeconfig")
        .overrides(ConfigurationOverrides::new().not_found_intro_message("Custom intro"))
        .build(source)
}

/// Every fixture handler, as built at startup.
pub fn handlers(source: Arc<dyn ConfigurationSource>) -> Vec<Arc<dyn PrefixHandler>> {
    vec![
        Arc::new(test_handler(source.clone())),
        Arc::new(delayed_handler(source.clone())),
        Arc::new(custom_intro_handler(source.clone())),
        Arc::new(custom_redirect_handler(source.clone())),
        Arc::new(custom_runtime_config_handler(source)),
    ]
}

/// A started service serving every fixture handler.
pub fn service_with(redirector: Redirector) -> Arc<MappingService> {
    let service = MappingService::new(redirector, Arc::new(settings()));
    for handler in handlers(service.settings()) {
        service.handlers().insert(handler);
    }
    service.start();
    Arc::new(service)
}

pub fn service() -> Arc<MappingService> {
    service_with(redirector())
}

/// Send one request through `service`.
pub fn request(
    service: &MappingService,
    method: &str,
    path: &str,
) -> (Result<Outcome, MappingError>, BufferedResponse) {
    let mut response = BufferedResponse::new();
    let outcome = service.handle(path, method, &RequestContext::default(), &mut response);
    (outcome, response)
}

pub fn get(service: &MappingService, path: &str) -> BufferedResponse {
    let (outcome, response) = request(service, "get", path);
    assert!(matches!(outcome, Ok(Outcome::Delivered(_))), "{} was not delivered: {:?}", path, outcome);
    response
}

pub fn post(service: &MappingService, path: &str) -> BufferedResponse {
    let (outcome, response) = request(service, "post", path);
    assert!(matches!(outcome, Ok(Outcome::Delivered(_))), "{} was not delivered: {:?}", path, outcome);
    response
}
