//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, dispatch)
//!         OPTIONS            → preflight (204)
//!         not GET/HEAD       → 405
//!         ?target=<url>      → media.rs (stream passthrough)
//!         otherwise          → api.rs (legacy query translation)
//!     → error.rs (ProxyError → JSON / plain response, always with CORS)
//!     → Send to client
//! ```

pub mod api;
pub mod error;
pub mod media;
pub mod server;

pub use error::ProxyError;
pub use server::{AppState, HttpServer, X_REQUEST_ID};
