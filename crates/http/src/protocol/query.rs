//! Query-string decoding for request targets.

/// Ordered query parameters decoded from a request target.
///
/// Keys keep the position of their first occurrence; a duplicate key updates
/// the stored value in place, so the last occurrence wins without disturbing
/// the ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    pairs: Vec<(String, String)>,
}

impl QueryMap {
    /// Decodes the raw query portion of a target (everything after `?`).
    ///
    /// Pairs are separated by `&` and split at the first `=`; a segment
    /// without `=` maps to the empty value. Empty segments are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut query = QueryMap::default();
        for item in raw.split('&') {
            if item.is_empty() {
                continue;
            }
            let (key, value) = item.split_once('=').unwrap_or((item, ""));
            query.insert(key, value);
        }
        query
    }

    fn insert(&mut self, key: &str, value: &str) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.pairs.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Splits a request target into its path and decoded query parameters.
///
/// Only the first `?` separates path from query; later question marks stay
/// part of the query string.
pub fn split_target(target: &str) -> (String, QueryMap) {
    match target.split_once('?') {
        Some((path, raw_query)) => (path.to_string(), QueryMap::parse(raw_query)),
        None => (target.to_string(), QueryMap::default()),
    }
}
