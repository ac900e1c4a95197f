//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build server → Bind listener
//!
//! Per API request (init.rs):
//!     EnvironmentInit::init(&Environment) → proceed or fail with 500
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger → stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - The init hook is injected, never global, so tests can swap it
//! - Shutdown is a shared flag so several tasks can observe it, even late

pub mod init;
pub mod shutdown;
pub mod signals;

pub use init::{Environment, EnvironmentInit, InitError, NoopInit};
pub use shutdown::{Shutdown, ShutdownSignal};
