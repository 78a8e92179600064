//! Header manipulation for forwarded requests.
//!
//! # Responsibilities
//! - Represent inbound headers, including repeated fields
//! - Rewrite the Host header to match the forwarding target
//! - Collapse multi-valued fields into single strings
//!
//! # Design Decisions
//! - Field lookup is ASCII case-insensitive, names are stored as given
//! - Field order is preserved
//! - Helpers borrow their input and return a fresh copy; the caller's
//!   header set stays valid for logging after forwarding

use std::fmt;

use hyper::header::{HeaderMap, HeaderName};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::net::transport::Target;

const HOST: &str = "host";

/// Value of a header field: a single string or, for repeated fields,
/// every value in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// An empty single value counts as absent; a sequence never does.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Single(v) => !v.is_empty(),
            FieldValue::Multi(_) => true,
        }
    }

    /// First value, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::Single(v) => Some(v),
            FieldValue::Multi(values) => values.first().map(String::as_str),
        }
    }

    /// Single-string form. Repeated values are joined with one space.
    pub fn flatten(&self) -> String {
        match self {
            FieldValue::Single(v) => v.clone(),
            FieldValue::Multi(values) => values.join(" "),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Single(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Single(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::Multi(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::Multi(values.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flatten())
    }
}

/// Ordered set of HTTP header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    fields: Vec<(String, FieldValue)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a field, replacing an existing one in place.
    /// Returns the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(existing) => Some(std::mem::replace(existing, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Add a value, turning the field multi-valued if it already exists.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(existing) => match existing {
                FieldValue::Multi(values) => values.push(value),
                FieldValue::Single(first) => {
                    let first = std::mem::take(first);
                    *existing = FieldValue::Multi(vec![first, value]);
                }
            },
            None => self.fields.push((name, FieldValue::Single(value))),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = HeaderSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl From<&HeaderMap> for HeaderSet {
    /// Repeated fields become multi-valued. Non UTF-8 bytes are replaced.
    fn from(map: &HeaderMap) -> Self {
        let mut set = HeaderSet::new();
        for name in map.keys() {
            let mut values: Vec<String> = map
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            let value = if values.len() == 1 {
                FieldValue::Single(values.remove(0))
            } else {
                FieldValue::Multi(values)
            };
            set.fields.push((name.as_str().to_string(), value));
        }
        set
    }
}

impl Serialize for HeaderSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Header fields with exactly one string value each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatHeaders {
    fields: Vec<(String, String)>,
}

impl FlatHeaders {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Convert for an outbound HTTP client.
    /// Fields that are not valid HTTP are skipped.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            let header_name = match HeaderName::from_bytes(name.as_bytes()) {
                Ok(n) => n,
                Err(_) => {
                    tracing::warn!(header = %name, "Skipping invalid header name");
                    continue;
                }
            };
            match hyper::header::HeaderValue::from_str(value) {
                Ok(v) => {
                    map.insert(header_name, v);
                }
                Err(_) => tracing::warn!(header = %name, "Skipping invalid header value"),
            }
        }
        map
    }
}

impl Serialize for FlatHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Copy `headers` with the Host field pointed at `target`.
///
/// A missing or empty Host field is left alone, never added.
pub fn fix_headers(target: &Target, headers: &HeaderSet) -> HeaderSet {
    let mut fixed = headers.clone();

    let Some(host) = target.host() else {
        tracing::debug!("Target has no host, forwarding headers unchanged");
        return fixed;
    };

    if let Some(value) = fixed.get_mut(HOST) {
        if value.is_truthy() {
            tracing::trace!(from = %value, to = %host, "Rewriting Host header");
            *value = FieldValue::Single(host.to_string());
        }
    }
    fixed
}

/// Collapse every field of `headers` into a single string.
pub fn flatten_headers(headers: &HeaderSet) -> FlatHeaders {
    FlatHeaders {
        fields: headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.flatten()))
            .collect(),
    }
}
