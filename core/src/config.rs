//! Client configuration and the defaults-merge policy.
//!
//! # Design
//! `ClientOptions` is the caller-facing, all-optional shape. It is deep-merged
//! over `ClientConfig::default()` through their JSON representations: objects
//! merge key by key, any other value replaces the default, and absent or
//! `null` values keep the default. The merged `ClientConfig` is immutable for
//! the lifetime of the client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::error::ApiError;

pub const DEFAULT_URL: &str = "http://localhost:1337";
pub const DEFAULT_PREFIX: &str = "/api";
pub const DEFAULT_STORE_KEY: &str = "strapi_jwt";

/// Fully-resolved client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub url: String,
    pub prefix: String,
    pub store: StoreConfig,
    #[serde(default)]
    pub transport: TransportOptions,
}

/// Where the session token is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub key: String,
    /// `true` selects the persistent key-value store, `false` the cookie jar.
    pub use_local_storage: bool,
    pub cookie_options: CookieOptions,
}

/// Attributes applied when the token is written as a cookie.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CookieOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Lifetime in days; a session cookie when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// Options passed through to the transport.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransportOptions {
    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Any other keys, kept verbatim for custom transports.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            store: StoreConfig {
                key: DEFAULT_STORE_KEY.to_string(),
                use_local_storage: false,
                cookie_options: CookieOptions {
                    path: Some("/".to_string()),
                    ..CookieOptions::default()
                },
            },
            transport: TransportOptions::default(),
        }
    }
}

impl ClientConfig {
    /// Deep-merge `options` over the defaults.
    pub fn from_options(options: &ClientOptions) -> Result<Self, ApiError> {
        let mut merged = serde_json::to_value(Self::default())
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let overrides =
            serde_json::to_value(options).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        deep_merge(&mut merged, overrides);
        serde_json::from_value(merged).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// `prefix` resolved against `url`, without a trailing slash.
    pub fn api_url(&self) -> Result<String, ApiError> {
        let resolved = Url::parse(&self.url)?.join(&self.prefix)?;
        Ok(resolved.as_str().trim_end_matches('/').to_string())
    }
}

/// Caller overrides. Every field is optional; see the module docs for how
/// they combine with the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportOptions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_local_storage: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_options: Option<CookieOptions>,
}

impl ClientOptions {
    /// Read overrides from `STRAPI_URL`, `STRAPI_PREFIX`, `STRAPI_STORE_KEY`
    /// and `STRAPI_USE_LOCAL_STORAGE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup("STRAPI_STORE_KEY");
        let use_local_storage = lookup("STRAPI_USE_LOCAL_STORAGE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        let store = (key.is_some() || use_local_storage.is_some()).then(|| StoreOptions {
            key,
            use_local_storage,
            cookie_options: None,
        });

        Self {
            url: lookup("STRAPI_URL"),
            prefix: lookup("STRAPI_PREFIX"),
            store,
            transport: None,
        }
    }
}

/// Recursively merge `overrides` into `base`. Objects merge per key; `null`
/// leaves the base value alone; anything else replaces it.
pub(crate) fn deep_merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        if !value.is_null() {
                            base.insert(key, value);
                        }
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overrides) => *base = overrides,
    }
}
