//! Declarative mappers defined in the configuration file.

use percent_encoding::percent_decode_str;

use crate::config::schema::RuleConfig;
use crate::error::MappingError;
use crate::mapping::block::Block;
use crate::mapping::mapper::{Mapper, SuggestionProvider};
use crate::mapping::matching::Match;
use crate::mapping::result::{ConversionResult, ResourceRef};
use crate::mapping::specification::Specification;

#[derive(Debug, Clone, PartialEq, Eq)]
enum RuleTarget {
    /// URL template, `$n` / `${name}` expanded from the match.
    Url(String),
    /// Page path template, split on `/` after expansion. Segments are
    /// percent-decoded; the resolver encodes them again.
    Page { template: String, action: String },
}

/// A mapper configured by a `[[urlmapping.prefixhandlers.<name>.rules]]` entry.
///
/// A rule without a target never converts; with suggestions it answers
/// not-found with them.
#[derive(Debug, Clone)]
pub struct RuleMapper {
    specification: Specification,
    target: Option<RuleTarget>,
    status: u16,
    suggestions: Option<Block>,
}

impl RuleMapper {
    pub fn from_config(rule: &RuleConfig) -> Result<Self, MappingError> {
        let specification =
            Specification::patterns(rule.patterns.iter().cloned())?.with_methods(rule.methods.iter().cloned());

        let target = match (&rule.target, &rule.page) {
            (Some(url), _) => Some(RuleTarget::Url(url.clone())),
            (None, Some(page)) => Some(RuleTarget::Page {
                template: page.clone(),
                action: rule.action.clone().unwrap_or_else(|| "view".to_string()),
            }),
            (None, None) => None,
        };

        let suggestions = if rule.suggestions.is_empty() {
            None
        } else {
            Some(Block::links(
                rule.suggestions.iter().map(|l| (l.href.clone(), l.label.clone())),
            ))
        };

        Ok(Self {
            specification,
            target,
            status: rule.status,
            suggestions,
        })
    }
}

impl Mapper for RuleMapper {
    fn specification(&self) -> &Specification {
        &self.specification
    }

    fn convert(&self, m: &Match<'_>) -> Option<ConversionResult> {
        let configuration = m.configuration().clone();
        let result = match self.target.as_ref()? {
            RuleTarget::Url(template) => ConversionResult::url(configuration, m.expand(template)),
            RuleTarget::Page { template, action } => {
                let expanded = m.expand(template);
                let segments = expanded
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned());
                ConversionResult::resource(configuration, ResourceRef::page_with_action(segments, action.clone()))
            }
        };
        Some(result.with_status(self.status))
    }

    fn suggestion_provider(&self) -> Option<&dyn SuggestionProvider> {
        match self.suggestions {
            Some(_) => Some(self),
            None => None,
        }
    }
}

impl SuggestionProvider for RuleMapper {
    fn suggestions(&self, _m: &Match<'_>) -> Option<Block> {
        self.suggestions.clone()
    }
}
