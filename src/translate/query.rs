//! Legacy → upstream query mapping.
//!
//! # Mapping
//! ```text
//! types=search  → source, type=search, keyword=<name>, limit=<count>
//! types=url     → source, id, type=url, br
//! types=lyric   → source, id, type=lrc
//! types=pic     → source, id, type=pic
//! anything else → every incoming pair except `target` / `callback`
//! ```
//!
//! Defaults for omitted fields come from [`QueryDefaults`]. An empty value
//! counts as omitted.

use axum::http::Uri;
use url::Url;

use crate::config::{CacheConfig, QueryDefaults};

/// Query keys that are never forwarded by the passthrough branch.
const PASSTHROUGH_EXCLUDED: [&str; 2] = ["target", "callback"];

/// The request kind selected by the legacy `types` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyType {
    Search,
    Url,
    Lyric,
    Pic,
    /// Unrecognized or absent `types`; the caller's query is forwarded as-is.
    Passthrough,
}

impl LegacyType {
    /// Classify the raw `types` value. Comparison is literal and case-sensitive.
    pub fn parse(types: Option<&str>) -> Self {
        match types {
            Some("search") => Self::Search,
            Some("url") => Self::Url,
            Some("lyric") => Self::Lyric,
            Some("pic") => Self::Pic,
            _ => Self::Passthrough,
        }
    }

    /// The upstream `type` this kind maps to, if it has a fixed one.
    pub fn upstream_type(self) -> Option<&'static str> {
        match self {
            Self::Search => Some("search"),
            Self::Url => Some("url"),
            Self::Lyric => Some("lrc"),
            Self::Pic => Some("pic"),
            Self::Passthrough => None,
        }
    }

    /// Cache lifetime forced onto a successful response of this kind.
    /// `None` leaves whatever the sanitized upstream headers carry.
    pub fn cache_max_age(self, cache: &CacheConfig) -> Option<u64> {
        match self {
            Self::Search => Some(cache.search_max_age_secs),
            Self::Url | Self::Lyric | Self::Pic => Some(cache.detail_max_age_secs),
            Self::Passthrough => None,
        }
    }

    /// Whether the upstream call may follow redirects. A stream-URL lookup
    /// answers with a 302 whose `Location` is the result.
    pub fn follows_redirects(self) -> bool {
        self != Self::Url
    }

    /// Short label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Url => "url",
            Self::Lyric => "lyric",
            Self::Pic => "pic",
            Self::Passthrough => "passthrough",
        }
    }
}

/// The caller's decoded query parameters, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyQuery {
    pairs: Vec<(String, String)>,
}

impl LegacyQuery {
    /// Decode an `application/x-www-form-urlencoded` query string.
    pub fn parse(query: &str) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn from_uri(uri: &Uri) -> Self {
        Self::parse(uri.query().unwrap_or_default())
    }

    /// First value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First non-empty value for `key`, else `default`.
    fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key) {
            Some(v) if !v.is_empty() => v,
            _ => default,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Ordered upstream parameters with set-semantics: each key appears once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamQuery {
    pairs: Vec<(String, String)>,
}

impl UpstreamQuery {
    /// Set `key` to `value`, replacing an earlier value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Form-encoded query string, e.g. `source=netease&type=search`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Attach the parameters to `base`, keeping any parameters it already has.
    pub fn apply_to(&self, base: &Url) -> Url {
        let mut url = base.clone();
        if !self.pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(self.pairs.iter());
        }
        url
    }
}

/// Result of translating one legacy query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub kind: LegacyType,
    pub upstream: UpstreamQuery,
}

impl Translation {
    /// Upstream calls are only made once a `type` is known.
    pub fn has_type(&self) -> bool {
        self.upstream.contains("type")
    }
}

/// Map a legacy query onto the upstream schema.
pub fn translate(query: &LegacyQuery, defaults: &QueryDefaults) -> Translation {
    let kind = LegacyType::parse(query.get("types"));
    let mut upstream = UpstreamQuery::default();

    match kind {
        LegacyType::Search => {
            upstream.set("source", query.get_or("source", &defaults.source));
            upstream.set("type", "search");
            upstream.set("keyword", query.get("name").unwrap_or_default());
            upstream.set("limit", query.get_or("count", &defaults.search_limit));
        }
        LegacyType::Url => {
            upstream.set("source", query.get_or("source", &defaults.source));
            if let Some(id) = query.get("id") {
                upstream.set("id", id);
            }
            upstream.set("type", "url");
            upstream.set("br", query.get_or("br", &defaults.bitrate));
        }
        LegacyType::Lyric | LegacyType::Pic => {
            upstream.set("source", query.get_or("source", &defaults.source));
            if let Some(id) = query.get("id") {
                upstream.set("id", id);
            }
            if let Some(ty) = kind.upstream_type() {
                upstream.set("type", ty);
            }
        }
        LegacyType::Passthrough => {
            for (key, value) in query.iter() {
                if !PASSTHROUGH_EXCLUDED.contains(&key) {
                    upstream.set(key, value);
                }
            }
        }
    }

    Translation { kind, upstream }
}
