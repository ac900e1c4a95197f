//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream response headers:
//!     → headers.rs (allow-list copy, no-store default, CORS)
//!     → Client
//! ```
//!
//! # Design Decisions
//! - Fail closed: an upstream header is dropped unless explicitly allowed
//! - No trust in upstream input

pub mod headers;
