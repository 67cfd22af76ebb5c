//! Method and pattern predicates advertised by mappers.
//!
//! # Design Decisions
//! - Patterns must match the whole path, so every source is compiled as
//!   `^(?:source)$`; group indices and names are left untouched
//! - Method comparison is ASCII case-insensitive
//! - Empty method set = any method, no patterns = catch-all

use regex::Regex;

use crate::error::MappingError;
use crate::mapping::matching::Captures;

/// A compiled mapper pattern, keeping the source it was written with.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern with full-match semantics.
    pub fn new(source: impl Into<String>) -> Result<Self, MappingError> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self { source, regex })
    }

    /// The pattern as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The anchored regex used for matching.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Which HTTP methods and paths a mapper accepts.
#[derive(Debug, Clone, Default)]
pub struct Specification {
    methods: Vec<String>,
    patterns: Vec<Pattern>,
}

impl Specification {
    /// Accept every method and every path.
    pub fn any() -> Self {
        Self::default()
    }

    /// Accept paths fully matching one of the given patterns, tried in order.
    pub fn patterns<I, S>(sources: I) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = sources
            .into_iter()
            .map(Pattern::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            methods: Vec::new(),
            patterns,
        })
    }

    /// Restrict the specification to the given methods.
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods
            .into_iter()
            .map(|m| m.into().to_ascii_uppercase())
            .collect();
        self
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// True when no pattern is declared.
    pub fn is_catch_all(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns true if `method` is not excluded by a non-empty method set.
    pub fn accepts_method(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }

    /// Find the first pattern fully matching `path`.
    pub fn match_path(&self, path: &str) -> Option<(&Pattern, Captures)> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .regex
                .captures(path)
                .map(|caps| (pattern, Captures::from_regex(&pattern.regex, &caps)))
        })
    }
}
