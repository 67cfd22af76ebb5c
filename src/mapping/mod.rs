//! Path conversion subsystem.
//!
//! # Data Flow
//! ```text
//! (path, method, request context)
//!     → handler.rs (ordered mapper chain, first match wins)
//!     → specification.rs (method filter, full-match patterns)
//!     → mapper.rs / rules.rs (Match → ConversionResult)
//!     → result.rs (target, suggestions, status, configuration)
//!
//! Settings:
//!     source.rs (key/value lookup)
//!     → configuration.rs (per-handler → default → override → built-in)
//!     → cached once per handler instance
//! ```
//!
//! # Design Decisions
//! - Specifications and mappers are immutable once a handler is built
//! - Match and ConversionResult are request-local
//! - A handler never answers "no opinion": unmatched paths still carry its
//!   configuration

pub mod block;
pub mod configuration;
pub mod handler;
pub mod mapper;
pub mod matching;
pub mod result;
pub mod rules;
pub mod source;
pub mod specification;

pub use block::Block;
pub use configuration::{ConfigKey, Configuration, ConfigurationOverrides};
pub use handler::{MappingHandler, PrefixHandler};
pub use mapper::{FnMapper, Mapper, SuggestionProvider};
pub use matching::{Captures, Match, RequestContext};
pub use result::{ConversionResult, ResourceRef, Target};
pub use source::{ConfigurationSource, MapSource, SettingValue};
pub use specification::Specification;
