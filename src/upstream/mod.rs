//! Upstream access subsystem.
//!
//! # Data Flow
//! ```text
//! API path:   UpstreamQuery → client.rs fetch_api (15s deadline, no redirects)
//! Media path: target Url    → client.rs fetch_media (no deadline, Range relayed)
//! ```

pub mod client;

pub use client::{ForwardedHeaders, UpstreamClient, UpstreamSetupError};
