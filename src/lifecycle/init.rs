//! Per-request environment initialization hook.
//!
//! The API path calls [`EnvironmentInit::init`] before building any upstream
//! call. What it initializes (a database, a cache warmup) belongs to the
//! implementor; the proxy only cares whether it succeeded.

use std::collections::BTreeMap;

use thiserror::Error;

/// Opaque key/value handle handed to the hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Failure reported by an initialization hook.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct InitError(pub String);

/// Capability invoked once per API request before the upstream call.
pub trait EnvironmentInit: Send + Sync {
    fn init(&self, env: &Environment) -> Result<(), InitError>;
}

/// Hook that does nothing beyond a trace event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInit;

impl EnvironmentInit for NoopInit {
    fn init(&self, env: &Environment) -> Result<(), InitError> {
        tracing::trace!(vars = env.len(), "Environment init (noop)");
        Ok(())
    }
}
