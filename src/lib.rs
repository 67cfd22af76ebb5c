//! URL mapping service library.
//!
//! Routes request paths, grouped under configurable prefixes, through
//! ordered mapper chains and delivers the outcome as a redirect or an
//! interstitial screen.

// Core subsystems
pub mod error;
pub mod mapping;
pub mod redirect;
pub mod registry;
pub mod service;

// Host
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use error::MappingError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use service::{MappingService, Outcome};
