//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and the upstream base URL
//! - Validate value ranges (timeouts > 0, non-empty defaults)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.api_base_url: '{0}' is not an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    match url::Url::parse(&config.upstream.api_base_url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(
            config.upstream.api_base_url.clone(),
        )),
    }

    if config.upstream.api_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration("upstream.api_timeout_secs"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration("upstream.connect_timeout_secs"));
    }

    let required = [
        ("defaults.source", &config.defaults.source),
        ("defaults.bitrate", &config.defaults.bitrate),
        ("defaults.search_limit", &config.defaults.search_limit),
        ("upstream.default_user_agent", &config.upstream.default_user_agent),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::Empty(field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
