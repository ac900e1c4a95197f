//! Legacy query translation.
//!
//! # Data Flow
//! ```text
//! incoming query string
//!     → query.rs (LegacyQuery → LegacyType + UpstreamQuery)
//!     → [upstream API call]
//!     → envelope.rs (redirect → JSON envelope)
//! ```
//!
//! # Design Decisions
//! - `types` is resolved once into a closed enum; every branch is a match arm
//! - Field defaults live in config, not in the mapping code
//! - Pure functions only; no I/O in this module

pub mod envelope;
pub mod query;

pub use envelope::StreamUrlEnvelope;
pub use query::{translate, LegacyQuery, LegacyType, Translation, UpstreamQuery};
