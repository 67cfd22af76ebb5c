//! Redirect delivery.
//!
//! # Data Flow
//! ```text
//! ConversionResult
//!     → resolver.rs (resource reference → URL)
//!     → redirector.rs (immediate redirect or interstitial screen)
//!     → templates.rs (screen rendering)
//!     → sink.rs (host response primitives)
//! ```
//!
//! # Design Decisions
//! - The redirector never builds transport responses itself; it writes
//!   through a `ResponseSink`
//! - Rendering failures degrade to a plain redirect instead of an error page

pub mod redirector;
pub mod resolver;
pub mod sink;
pub mod templates;

pub use redirector::{Delivery, Redirector};
pub use resolver::{PageUrlResolver, ResourceResolver};
pub use sink::ResponseSink;
pub use templates::{RenderContext, RenderError, TemplateRenderer, TemplateSet};
