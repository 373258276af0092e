//! Outbound header composition

use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

pub const USER_AGENT_HEADER: &str = "User-Agent";
pub const API_KEY_HEADER: &str = "api-key";

/// Header name to value; a `None` value means the header is omitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderSet(IndexMap<String, Option<String>>);

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.0.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of a header that will actually be sent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.as_deref())
    }

    /// Whether an entry exists, even one that will be omitted
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Convert to a `HeaderMap`, dropping omitted entries
    ///
    /// Names or values that are not valid HTTP are skipped with a warning.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.0.len());
        for (name, value) in self.iter() {
            let Some(value) = value else {
                continue;
            };
            let name = match HeaderName::from_bytes(name.as_bytes()) {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(header = %name, error = %e, "skipping invalid header name");
                    continue;
                }
            };
            match HeaderValue::from_str(value) {
                Ok(v) => {
                    map.insert(name, v);
                }
                Err(e) => {
                    tracing::warn!(header = ?name, error = %e, "skipping invalid header value");
                }
            }
        }
        map
    }
}

impl FromIterator<(String, Option<String>)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(String, Option<String>)> for HeaderSet {
    fn extend<I: IntoIterator<Item = (String, Option<String>)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for HeaderSet {
    type Item = (String, Option<String>);
    type IntoIter = indexmap::map::IntoIter<String, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omitted_values_are_not_sent() {
        let headers = HeaderSet::new()
            .with(USER_AGENT_HEADER, Some("QwenCode/1.0 (linux; x64)".to_string()))
            .with(API_KEY_HEADER, None);

        assert!(headers.contains(API_KEY_HEADER));
        assert_eq!(headers.get(API_KEY_HEADER), None);

        let map = headers.to_header_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("user-agent").unwrap(), "QwenCode/1.0 (linux; x64)");
        assert!(map.get("api-key").is_none());
    }

    #[test]
    fn test_invalid_value_is_skipped() {
        let headers = HeaderSet::new()
            .with(API_KEY_HEADER, Some("bad\nkey".to_string()))
            .with(USER_AGENT_HEADER, Some("ok".to_string()));

        let map = headers.to_header_map();
        assert!(map.get("api-key").is_none());
        assert_eq!(map.get("user-agent").unwrap(), "ok");
    }

    #[test]
    fn test_later_insert_overrides() {
        let mut headers = HeaderSet::new().with(USER_AGENT_HEADER, Some("a".to_string()));
        headers.extend([(USER_AGENT_HEADER.to_string(), Some("b".to_string()))]);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(USER_AGENT_HEADER), Some("b"));
    }
}
