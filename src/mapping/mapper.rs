//! Mapper and suggestion capabilities.

use std::fmt;

use crate::mapping::block::Block;
use crate::mapping::matching::Match;
use crate::mapping::result::{ConversionResult, ResourceRef};
use crate::mapping::specification::Specification;

/// Converts matched paths into conversion results.
pub trait Mapper: Send + Sync {
    /// Methods and patterns this mapper accepts.
    fn specification(&self) -> &Specification;

    /// Convert a match, or return `None` when the mapper does not handle it.
    fn convert(&self, m: &Match<'_>) -> Option<ConversionResult>;

    /// Optional suggestions capability, queried when `convert` declines.
    fn suggestion_provider(&self) -> Option<&dyn SuggestionProvider> {
        None
    }
}

/// Produces suggestions for a match no mapper converted.
pub trait SuggestionProvider: Send + Sync {
    fn suggestions(&self, m: &Match<'_>) -> Option<Block>;
}

type ConvertFn = dyn Fn(&Match<'_>) -> Option<ConversionResult> + Send + Sync;
type SuggestFn = dyn Fn(&Match<'_>) -> Option<Block> + Send + Sync;

/// A mapper built from closures.
pub struct FnMapper {
    specification: Specification,
    convert: Box<ConvertFn>,
    suggest: Option<Box<SuggestFn>>,
}

impl FnMapper {
    /// Mapper whose closure builds the whole conversion result.
    pub fn new<F>(specification: Specification, convert: F) -> Self
    where
        F: Fn(&Match<'_>) -> Option<ConversionResult> + Send + Sync + 'static,
    {
        Self {
            specification,
            convert: Box::new(convert),
            suggest: None,
        }
    }

    /// Mapper whose closure only picks a resource; the result carries the
    /// handler's configuration and the default status.
    pub fn resource<F>(specification: Specification, convert: F) -> Self
    where
        F: Fn(&Match<'_>) -> Option<ResourceRef> + Send + Sync + 'static,
    {
        Self::new(specification, move |m| {
            convert(m).map(|r| ConversionResult::resource(m.configuration().clone(), r))
        })
    }

    /// Attach a suggestions hook.
    pub fn with_suggestions<F>(mut self, suggest: F) -> Self
    where
        F: Fn(&Match<'_>) -> Option<Block> + Send + Sync + 'static,
    {
        self.suggest = Some(Box::new(suggest));
        self
    }
}

impl fmt::Debug for FnMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMapper")
            .field("specification", &self.specification)
            .field("suggestions", &self.suggest.is_some())
            .finish()
    }
}

impl Mapper for FnMapper {
    fn specification(&self) -> &Specification {
        &self.specification
    }

    fn convert(&self, m: &Match<'_>) -> Option<ConversionResult> {
        (self.convert)(m)
    }

    fn suggestion_provider(&self) -> Option<&dyn SuggestionProvider> {
        match self.suggest {
            Some(_) => Some(self),
            None => None,
        }
    }
}

impl SuggestionProvider for FnMapper {
    fn suggestions(&self, m: &Match<'_>) -> Option<Block> {
        self.suggest.as_ref().and_then(|f| f(m))
    }
}
