//! Dynamic prefix registration.
//!
//! # Data Flow
//! ```text
//! register / unregister
//!     → catalog.rs (live handler instances by name)
//!     → RegistryEvent
//!     → prefixes.rs (prefix → handler name, supported prefixes)
//! ```
//!
//! # Design Decisions
//! - One resolver per prefix; a second handler on the same prefix replaces it
//! - Removing a handler drops every entry bound to its name
//! - Handlers without a prefix stay in the catalog but receive no traffic

pub mod catalog;
pub mod prefixes;

pub use catalog::{HandlerCatalog, HandlerSet};
pub use prefixes::{MappingReference, PrefixRegistry, RegistryEvent};
