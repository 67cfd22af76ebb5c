//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, request context)
//!     → MappingService (prefix → handler → conversion → delivery)
//!     → response.rs (buffered response → Axum response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_context, X_REQUEST_ID};
pub use response::BufferedResponse;
pub use server::{AppState, HttpServer};
