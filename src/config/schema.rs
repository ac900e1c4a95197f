//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the music proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream API and media fetch settings.
    pub upstream: UpstreamConfig,

    /// Fallback values used when translating legacy queries.
    pub defaults: QueryDefaults,

    /// Cache-Control lifetimes per response category.
    pub cache: CacheConfig,

    /// Opaque key/value handle passed to the initialization hook.
    pub environment: BTreeMap<String, String>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Fixed base URL every translated API query is sent to.
    pub api_base_url: String,

    /// Referer attached to media fetches; the CDN rejects requests without it.
    pub referer: String,

    /// User-Agent used when the caller did not send one.
    pub default_user_agent: String,

    /// Wall-clock bound for a single API call, in seconds.
    pub api_timeout_secs: u64,

    /// TCP connect timeout for both clients, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://music-dl.sayqz.com/api".to_string(),
            referer: "https://music-api.gdstudio.xyz/".to_string(),
            default_user_agent: "Mozilla/5.0".to_string(),
            api_timeout_secs: 15,
            connect_timeout_secs: 10,
        }
    }
}

/// Per-field defaults consulted by the query translator.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueryDefaults {
    /// Music source when the caller omits `source`.
    pub source: String,

    /// Bitrate when a `url` query omits `br`.
    pub bitrate: String,

    /// Result limit when a `search` query omits `count`.
    pub search_limit: String,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            source: "netease".to_string(),
            bitrate: "320k".to_string(),
            search_limit: "20".to_string(),
        }
    }
}

/// Cache lifetimes, in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Proxied media when upstream sent no Cache-Control.
    pub media_max_age_secs: u64,

    /// Search results.
    pub search_max_age_secs: u64,

    /// Stream URL, lyric and cover lookups (stable per ID).
    pub detail_max_age_secs: u64,

    /// `Access-Control-Max-Age` on preflight responses.
    pub preflight_max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            media_max_age_secs: 3600,
            search_max_age_secs: 300,
            detail_max_age_secs: 3600,
            preflight_max_age_secs: 86400,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
