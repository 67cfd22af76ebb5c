//! Interstitial screen templates.
//!
//! # Responsibilities
//! - Render the built-in redirect and not-found screens
//! - Load user templates (`*.html`) from a directory
//! - Expose the rendering context `{url, suggestions, conversion, configuration}`
//!
//! # Design Decisions
//! - Templates are looked up by logical name; callers strip file suffixes
//! - Every interpolated value is HTML-escaped except pre-rendered blocks
//! - A positive delay adds a meta refresh; zero or negative never navigates

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use thiserror::Error;

use crate::mapping::block::Block;
use crate::mapping::configuration::Configuration;
use crate::mapping::result::ConversionResult;

pub const REDIRECT_SCREEN: &str = "url-mapping/redirectscreen";
pub const NOT_FOUND_SCREEN: &str = "url-mapping/notfoundscreen";

/// File suffixes stripped from configured template names.
pub const TEMPLATE_SUFFIXES: [&str; 2] = [".vm", ".html"];

const DEFAULT_REDIRECT_TITLE: &str = "Redirecting";
const DEFAULT_NOT_FOUND_TITLE: &str = "Page not found";
const DEFAULT_INTRO: &str = "This page has moved. Please update your bookmarks.";
const DEFAULT_NOT_FOUND_INTRO: &str = "The page you requested does not exist.";

/// Errors raised while rendering or loading templates.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Data available to an interstitial template.
#[derive(Debug, Serialize)]
pub struct RenderContext<'a> {
    pub url: &'a str,
    pub suggestions: Option<&'a Block>,
    pub conversion: &'a ConversionResult,
    pub configuration: &'a Configuration,
}

impl RenderContext<'_> {
    /// The context as JSON, for renderers backed by a template engine.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn is_url_present(&self) -> bool {
        !self.url.is_empty()
    }

    fn title(&self) -> &str {
        self.configuration.title().unwrap_or(if self.is_url_present() {
            DEFAULT_REDIRECT_TITLE
        } else {
            DEFAULT_NOT_FOUND_TITLE
        })
    }

    fn intro(&self) -> &str {
        if self.is_url_present() {
            self.configuration.intro_message().unwrap_or(DEFAULT_INTRO)
        } else {
            self.configuration
                .not_found_intro_message()
                .unwrap_or(DEFAULT_NOT_FOUND_INTRO)
        }
    }

    fn refresh(&self) -> String {
        let delay = self.configuration.delay();
        if self.is_url_present() && delay > 0 {
            format!(
                "<meta http-equiv=\"refresh\" content=\"{}; url={}\" />",
                delay,
                encode_double_quoted_attribute(self.url)
            )
        } else {
            String::new()
        }
    }

    fn suggestions_html(&self) -> String {
        self.suggestions
            .map(|block| format!("<div class=\"url-mapping-suggestions\">{}</div>", block.to_html()))
            .unwrap_or_default()
    }
}

/// Renders a template by logical name.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, name: &str, context: &RenderContext<'_>) -> Result<String, RenderError>;
}

#[derive(Debug, Clone)]
enum Template {
    RedirectScreen,
    NotFoundScreen,
    /// Placeholder template: `{{title}}`, `{{intro}}`, `{{url}}`, `{{delay}}`,
    /// `{{refresh}}`, `{{suggestions}}`.
    Custom(String),
}

/// Built-in screens plus any user templates.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: HashMap<String, Template>,
}

impl TemplateSet {
    /// Only the built-in screens.
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        templates.insert(REDIRECT_SCREEN.to_string(), Template::RedirectScreen);
        templates.insert(NOT_FOUND_SCREEN.to_string(), Template::NotFoundScreen);
        Self { templates }
    }

    /// Built-in screens plus every `*.html` file under `dir`, named by its
    /// relative path without the suffix (`url-mapping/redirectscreen`).
    pub fn load_dir(dir: &Path) -> Result<Self, RenderError> {
        let mut set = Self::builtin();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let io_err = |source| RenderError::Io {
                path: current.clone(),
                source,
            };
            for entry in fs::read_dir(&current).map_err(io_err)? {
                let path = entry.map_err(io_err)?.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                if path.extension().and_then(|e| e.to_str()) != Some("html") {
                    continue;
                }
                let Some(name) = template_name(dir, &path) else {
                    continue;
                };
                let source = fs::read_to_string(&path).map_err(|source| RenderError::Io {
                    path: path.clone(),
                    source,
                })?;
                tracing::debug!(template = %name, path = ?path, "Loaded screen template");
                set.insert(name, source);
            }
        }
        Ok(set)
    }

    /// Register a placeholder template, replacing any template of that name.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), Template::Custom(source.into()));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateRenderer for TemplateSet {
    fn render(&self, name: &str, context: &RenderContext<'_>) -> Result<String, RenderError> {
        match self.templates.get(name) {
            Some(Template::RedirectScreen) | Some(Template::NotFoundScreen) => Ok(render_screen(context)),
            Some(Template::Custom(source)) => Ok(render_custom(source, context)),
            None => Err(RenderError::UnknownTemplate(name.to_string())),
        }
    }
}

/// Strip a recognized template file suffix.
pub fn logical_name(template: &str) -> &str {
    TEMPLATE_SUFFIXES
        .iter()
        .find_map(|suffix| template.strip_suffix(suffix))
        .unwrap_or(template)
}

fn template_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

fn render_screen(ctx: &RenderContext<'_>) -> String {
    let title = encode_text(ctx.title());
    let mut body = format!(
        "<h1>{}</h1>\n<p class=\"url-mapping-intro\">{}</p>\n",
        title,
        encode_text(ctx.intro())
    );

    if ctx.is_url_present() {
        body.push_str(&format!(
            "<p class=\"url-mapping-target\"><a href=\"{}\">{}</a></p>\n",
            encode_double_quoted_attribute(ctx.url),
            encode_text(ctx.url)
        ));
        let delay = ctx.configuration.delay();
        if delay > 0 {
            body.push_str(&format!(
                "<p class=\"url-mapping-delay\">You will be redirected in {} seconds.</p>\n",
                delay
            ));
        }
    }
    body.push_str(&ctx.suggestions_html());

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>{}</title>\n{}\n</head>\n<body>\n<main class=\"url-mapping-screen\">\n{}</main>\n</body>\n</html>\n",
        title,
        ctx.refresh(),
        body
    )
}

/// Fill placeholders in one left-to-right pass; substituted values are
/// never scanned again.
fn render_custom(source: &str, ctx: &RenderContext<'_>) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let filled = after
            .find("}}")
            .and_then(|end| placeholder(&after[..end], ctx).map(|value| (end, value)));
        match filled {
            Some((end, value)) => {
                out.push_str(&value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Value of a custom template placeholder. Text values are escaped for
/// use inside double-quoted attributes as well as element content.
fn placeholder(name: &str, ctx: &RenderContext<'_>) -> Option<String> {
    let value = match name {
        "title" => encode_double_quoted_attribute(ctx.title()).into_owned(),
        "intro" => encode_double_quoted_attribute(ctx.intro()).into_owned(),
        "url" => encode_double_quoted_attribute(ctx.url).into_owned(),
        "delay" => ctx.configuration.delay().to_string(),
        "refresh" => ctx.refresh(),
        "suggestions" => ctx.suggestions_html(),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::configuration::ConfigurationOverrides;
    use crate::mapping::result::ResourceRef;
    use crate::mapping::source::MapSource;
    use std::sync::Arc;

    fn conf(overrides: ConfigurationOverrides) -> Arc<Configuration> {
        Arc::new(Configuration::resolve(&MapSource::new(), Some("t"), &overrides))
    }

    #[test]
    fn test_logical_name() {
        assert_eq!(logical_name("url-mapping/redirectscreen.vm"), REDIRECT_SCREEN);
        assert_eq!(logical_name("url-mapping/notfoundscreen.html"), NOT_FOUND_SCREEN);
        assert_eq!(logical_name("custom"), "custom");
    }

    #[test]
    fn test_redirect_screen_refresh() {
        let conf = conf(ConfigurationOverrides::new().delay(2));
        let conversion = ConversionResult::url(conf.clone(), "/delayed");
        let ctx = RenderContext {
            url: "/delayed",
            suggestions: None,
            conversion: &conversion,
            configuration: &conf,
        };
        let html = TemplateSet::builtin().render(REDIRECT_SCREEN, &ctx).unwrap();
        assert!(html.contains("<meta http-equiv=\"refresh\" content=\"2; url=/delayed\" />"));
        assert!(html.contains("<title>Redirecting</title>"));
        assert!(html.contains(DEFAULT_INTRO));
    }

    #[test]
    fn test_negative_delay_never_navigates() {
        let conf = conf(ConfigurationOverrides::new().delay(-1));
        let conversion = ConversionResult::url(conf.clone(), "/target");
        let ctx = RenderContext {
            url: "/target",
            suggestions: None,
            conversion: &conversion,
            configuration: &conf,
        };
        let html = TemplateSet::builtin().render(REDIRECT_SCREEN, &ctx).unwrap();
        assert!(!html.contains("http-equiv"));
        assert!(html.contains("<a href=\"/target\">/target</a>"));
    }

    #[test]
    fn test_not_found_screen_escapes_and_shows_suggestions() {
        let conf = conf(ConfigurationOverrides::new().not_found_intro_message("<Gone> & lost"));
        let block = Block::paragraph(["My", "Suggestion"]);
        let conversion = ConversionResult::suggestions(conf.clone(), block.clone());
        let ctx = RenderContext {
            url: "",
            suggestions: Some(&block),
            conversion: &conversion,
            configuration: &conf,
        };
        let html = TemplateSet::builtin().render(NOT_FOUND_SCREEN, &ctx).unwrap();
        assert!(html.contains("&lt;Gone&gt; &amp; lost"));
        assert!(html.contains("<div class=\"url-mapping-suggestions\"><p>My Suggestion</p></div>"));
        assert!(html.contains(DEFAULT_NOT_FOUND_TITLE));
    }

    #[test]
    fn test_custom_template() {
        let mut set = TemplateSet::builtin();
        set.insert("plain", "{{title}}|{{url}}|{{delay}}");
        let conf = conf(ConfigurationOverrides::new().delay(4).title("A&B"));
        let conversion = ConversionResult::url(conf.clone(), "/x");
        let ctx = RenderContext {
            url: "/x",
            suggestions: None,
            conversion: &conversion,
            configuration: &conf,
        };
        assert_eq!(set.render("plain", &ctx).unwrap(), "A&amp;B|/x|4");
        assert!(matches!(set.render("missing", &ctx), Err(RenderError::UnknownTemplate(_))));
    }

    #[test]
    fn test_custom_template_values_are_not_reexpanded() {
        let mut set = TemplateSet::builtin();
        set.insert("link", "<a href=\"{{url}}\">{{title}}</a>{{suggestions}}{{unknown}}");
        let conf = conf(ConfigurationOverrides::new().title("{{url}}"));
        let block = Block::paragraph(["SUGG"]);
        let conversion = ConversionResult::url(conf.clone(), "/x/{{suggestions}}");
        let ctx = RenderContext {
            url: "/x/{{suggestions}}",
            suggestions: Some(&block),
            conversion: &conversion,
            configuration: &conf,
        };
        assert_eq!(
            set.render("link", &ctx).unwrap(),
            "<a href=\"/x/{{suggestions}}\">{{url}}</a>\
             <div class=\"url-mapping-suggestions\"><p>SUGG</p></div>{{unknown}}"
        );
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("moved.html"), "<p>{{intro}}</p>").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("url-mapping")).unwrap();
        fs::write(dir.path().join("url-mapping/redirectscreen.html"), "custom {{url}}").unwrap();

        let set = TemplateSet::load_dir(dir.path()).unwrap();
        assert!(set.contains("moved"));
        assert!(!set.contains("notes"));
        assert!(set.contains(NOT_FOUND_SCREEN));

        let conf = conf(ConfigurationOverrides::new());
        let conversion = ConversionResult::url(conf.clone(), "/x");
        let ctx = RenderContext {
            url: "/x",
            suggestions: None,
            conversion: &conversion,
            configuration: &conf,
        };
        assert_eq!(set.render(REDIRECT_SCREEN, &ctx).unwrap(), "custom /x");
    }

    #[test]
    fn test_context_json() {
        let conf = conf(ConfigurationOverrides::new());
        let conversion = ConversionResult::url(conf.clone(), "/x").with_status(301);
        let ctx = RenderContext {
            url: "/x",
            suggestions: None,
            conversion: &conversion,
            configuration: &conf,
        };
        let json = ctx.to_json();
        assert_eq!(json["url"], "/x");
        assert_eq!(json["conversion"]["http_status"], 301);
        assert_eq!(json["configuration"]["values"]["delay"], 0);
    }

    #[test]
    fn test_context_json_with_resource_target() {
        let conf = conf(ConfigurationOverrides::new());
        let conversion = ConversionResult::resource(conf.clone(), ResourceRef::page(["Main", "WebHome"]));
        let ctx = RenderContext {
            url: "/view/Main/WebHome",
            suggestions: None,
            conversion: &conversion,
            configuration: &conf,
        };
        let json = ctx.to_json();
        let target = &json["conversion"]["target"];
        assert_eq!(target["type"], "resource");
        assert_eq!(target["value"]["type"], "page");
        assert_eq!(target["value"]["segments"][1], "WebHome");
        assert_eq!(target["value"]["action"], "view");

        let other = ResourceRef::Other {
            kind: "attachment".into(),
            reference: "a.png".into(),
        };
        let json = serde_json::to_value(&other).unwrap();
        assert_eq!(json["type"], "other");
        assert_eq!(json["kind"], "attachment");
    }
}
