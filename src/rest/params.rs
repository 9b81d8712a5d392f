/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub const METHOD_KEY: &str = "method";
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

static NONCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Parameters sent with a request.
///
/// Keys are unique; setting a key twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiParams {
    params: BTreeMap<String, String>,
}

impl ApiParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter. Numbers and other displayable values are stringified.
    pub fn add(mut self, key: &str, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds a parameter only when a value is present
    pub fn add_opt<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    pub fn insert(&mut self, key: &str, value: impl ToString) {
        self.params.insert(key.to_string(), value.to_string());
    }

    /// Copies every entry of `other` into this set, overwriting existing keys
    pub fn merge(&mut self, other: &ApiParams) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for ApiParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        }
    }
}

/// A value that is never repeated within this process, and very unlikely across processes
pub fn nonce() -> String {
    let count = NONCE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:016x}{:x}", rand::random::<u64>(), count)
}

/// Current unix time in seconds
pub fn timestamp() -> i64 {
    Utc::now().timestamp()
}

/// The `oauth_*` protocol parameters every signed request carries
pub fn oauth_params(consumer_key: &str, token: Option<&str>) -> ApiParams {
    ApiParams::new()
        .add("oauth_consumer_key", consumer_key)
        .add("oauth_nonce", nonce())
        .add("oauth_timestamp", timestamp())
        .add("oauth_signature_method", SIGNATURE_METHOD)
        .add("oauth_version", OAUTH_VERSION)
        .add_opt("oauth_token", token)
}

/// Full parameter set for a REST method call.
///
/// Caller parameters are merged last but cannot replace the method name or the
/// protocol parameters.
pub fn api_call_params(
    method: &str,
    consumer_key: &str,
    token: Option<&str>,
    caller: &ApiParams,
) -> ApiParams {
    let mut params = oauth_params(consumer_key, token)
        .add(METHOD_KEY, method)
        .add("format", "json")
        .add("nojsoncallback", "1");
    for (k, v) in caller.iter() {
        if k == METHOD_KEY || k.starts_with("oauth_") {
            log::warn!("Ignoring reserved parameter '{}' for {}", k, method);
            continue;
        }
        params.insert(k, v);
    }
    params
}
