use crate::base::neterror::NetError;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::str::FromStr;

/// A header map that preserves insertion order and the caller's key casing.
///
/// Keys are compared case-sensitively on insert, as given by the caller.
/// Validation against HTTP token rules happens only when converting to an
/// [`http::HeaderMap`] at the transport boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedHeaderMap {
    headers: Vec<(String, String)>,
}

impl OrderedHeaderMap {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    /// Update in place if the exact key exists, else append.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        if let Some((_, v)) = self.headers.iter_mut().find(|(n, _)| *n == name) {
            *v = value;
        } else {
            self.headers.push((name, value));
        }
    }

    /// Append a value, joining with `", "` if any key matches case-insensitively.
    pub fn append(&mut self, name: impl Into<String>, value: &str) {
        let name = name.into();

        if let Some((_, v)) = self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            v.push_str(", ");
            v.push_str(value);
        } else {
            self.headers.push((name, value.to_owned()));
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.headers.retain(|(n, _)| n != name);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.get_ignore_case(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Converts to a standard `http::HeaderMap`, validating names and values.
    pub fn to_header_map(&self) -> Result<HeaderMap, NetError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_str(name).map_err(|_| NetError::InvalidHeader)?;
            let value = HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader)?;
            map.append(name, value);
        }
        Ok(map)
    }

    /// Flatten an `http::HeaderMap`, joining repeated names with `", "`.
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut headers = Self::new();
        for (name, value) in map {
            headers.append(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }
        headers
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedHeaderMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}
