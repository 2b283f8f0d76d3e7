//! Cache Key Derivation
//!
//! Maps the shape of a request (path, query, body, headers) to a stable key
//! of the form `path:sha256(canonical {query, body, headers})`.

use std::collections::BTreeMap;

use axum::{extract::Query, http::request::Parts};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Headers that carry a fresh value on every request and would otherwise
/// make every key unique.
pub const PER_REQUEST_HEADERS: &[&str] = &["x-request-id", "traceparent", "tracestate"];

// == Header Scope ==
/// Which request headers participate in the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderScope {
    /// Every header the request carries
    All,
    /// Every header except the listed (lowercase) names
    Except(Vec<String>),
}

impl HeaderScope {
    fn includes(&self, name: &str) -> bool {
        match self {
            HeaderScope::All => true,
            HeaderScope::Except(skipped) => !skipped.iter().any(|s| s == name),
        }
    }
}

impl Default for HeaderScope {
    fn default() -> Self {
        HeaderScope::Except(PER_REQUEST_HEADERS.iter().map(|h| h.to_string()).collect())
    }
}

// == Request Shape ==
/// The parts of a request that decide whether two requests are equivalent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestShape {
    /// Request path without the query string
    pub path: String,
    /// Query parameters sorted by name then value; repeated names are kept
    pub query: Vec<(String, String)>,
    /// Parsed body, `None` when empty
    pub body: Option<Value>,
    /// Header values by lowercase name, in arrival order per name
    pub headers: BTreeMap<String, Vec<String>>,
}

impl RequestShape {
    /// Captures the shape of a buffered request.
    pub fn from_parts(parts: &Parts, body: &[u8], scope: &HeaderScope) -> Self {
        let mut query = match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
            Ok(Query(params)) => params,
            // Unparsable query strings still key on their raw text
            Err(_) => parts
                .uri
                .query()
                .map(|raw| vec![(raw.to_string(), String::new())])
                .unwrap_or_default(),
        };
        query.sort();

        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in parts.headers.iter() {
            if !scope.includes(name.as_str()) {
                continue;
            }
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        Self {
            path: parts.uri.path().to_string(),
            query,
            body: parse_body(body),
            headers,
        }
    }
}

/// JSON bodies are kept structured, anything else as text.
fn parse_body(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    Some(
        serde_json::from_slice(body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())),
    )
}

// == Derive Key ==
/// Derives the un-namespaced key for a request shape.
///
/// Equivalent shapes always produce the same key; JSON object keys inside the
/// body are sorted before hashing, so key order in the payload is irrelevant.
pub fn derive_key(shape: &RequestShape) -> String {
    let canonical = canonicalize(&serde_json::json!({
        "query": shape.query,
        "body": shape.body.as_ref().map(canonicalize),
        "headers": shape.headers,
    }));

    // Serializing a Value never fails
    let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
    format!("{}:{}", shape.path, hex::encode(Sha256::digest(&bytes)))
}

// == Namespaced ==
/// Prefixes a key with the cache namespace.
pub fn namespaced(namespace: &str, key: &str) -> String {
    format!("{}:{}", namespace, key)
}

/// Rebuilds objects with their keys in sorted order, recursively.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
