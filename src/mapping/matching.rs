//! The value handed to a mapper once its specification accepted a request.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::HeaderMap;
use regex::Regex;

use crate::mapping::configuration::Configuration;

/// Capture groups of a successful pattern match, owned so the Match does not
/// borrow the haystack's regex state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    groups: Vec<Option<String>>,
    named: BTreeMap<String, String>,
}

impl Captures {
    pub(crate) fn from_regex(regex: &Regex, caps: &regex::Captures<'_>) -> Self {
        let groups = caps
            .iter()
            .map(|g| g.map(|m| m.as_str().to_string()))
            .collect();
        let named = regex
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
            .collect();
        Self { groups, named }
    }

    /// Group by index; 0 is the whole match.
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }

    /// Group by name.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// Number of groups, including group 0.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn named(&self) -> &BTreeMap<String, String> {
        &self.named
    }
}

/// Request data passed through to mappers unmodified.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub headers: HeaderMap,
    pub query: Option<String>,
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A path accepted by a mapper's specification.
#[derive(Debug)]
pub struct Match<'a> {
    path: &'a str,
    method: &'a str,
    pattern: Option<&'a Regex>,
    captures: Option<Captures>,
    context: &'a RequestContext,
    configuration: &'a Arc<Configuration>,
}

impl<'a> Match<'a> {
    pub fn new(
        path: &'a str,
        method: &'a str,
        matched: Option<(&'a Regex, Captures)>,
        context: &'a RequestContext,
        configuration: &'a Arc<Configuration>,
    ) -> Self {
        let (pattern, captures) = match matched {
            Some((regex, caps)) => (Some(regex), Some(caps)),
            None => (None, None),
        };
        Self {
            path,
            method,
            pattern,
            captures,
            context,
            configuration,
        }
    }

    /// The path that was matched, without its prefix segment.
    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn method(&self) -> &'a str {
        self.method
    }

    /// Captures of the matching pattern; `None` for catch-all mappers.
    pub fn captures(&self) -> Option<&Captures> {
        self.captures.as_ref()
    }

    /// Shorthand for an indexed group.
    pub fn group(&self, index: usize) -> Option<&str> {
        self.captures.as_ref().and_then(|c| c.group(index))
    }

    /// Shorthand for a named group.
    pub fn named(&self, name: &str) -> Option<&str> {
        self.captures.as_ref().and_then(|c| c.name(name))
    }

    pub fn context(&self) -> &'a RequestContext {
        self.context
    }

    /// Configuration of the handler that dispatched this match.
    pub fn configuration(&self) -> &'a Arc<Configuration> {
        self.configuration
    }

    /// Expand `$1` / `${name}` references against the matching pattern.
    /// Catch-all matches have no pattern and return the template verbatim.
    pub fn expand(&self, template: &str) -> String {
        match self.pattern {
            // The pattern is anchored on both ends, so replacing its only
            // match yields exactly the expanded template.
            Some(regex) => regex.replace(self.path, template).into_owned(),
            None => template.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::specification::Specification;

    #[test]
    fn test_named_and_indexed_groups() {
        let spec = Specification::patterns(["(?<space>[a-z]+)/(?<page>[a-z]+)"]).unwrap();
        let (pattern, caps) = spec.match_path("main/home").unwrap();
        let ctx = RequestContext::default();
        let conf = Arc::new(Configuration::default());
        let m = Match::new("main/home", "GET", Some((pattern.regex(), caps)), &ctx, &conf);

        assert_eq!(m.named("space"), Some("main"));
        assert_eq!(m.named("page"), Some("home"));
        assert_eq!(m.group(2), Some("home"));
        assert_eq!(m.named("missing"), None);
        assert_eq!(m.expand("/view/${space}/$page"), "/view/main/home");
    }

    #[test]
    fn test_catch_all_has_no_captures() {
        let ctx = RequestContext::default();
        let conf = Arc::new(Configuration::default());
        let m = Match::new("anything", "POST", None, &ctx, &conf);

        assert!(m.captures().is_none());
        assert_eq!(m.group(0), None);
        assert_eq!(m.expand("/static"), "/static");
    }
}
