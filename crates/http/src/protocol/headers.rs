//! Ordered header storage with HTTP field-name semantics.

/// An ordered collection of header fields.
///
/// Names are stored exactly as they arrived on the wire, but every lookup
/// compares names ASCII-case-insensitively, so `headers.get("content-length")`
/// finds a `Content-Length` field. Iteration yields fields in insertion order,
/// which is also the order they are serialized in; nothing in the protocol
/// relies on that order beyond determinism.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first field whose name matches, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Appends a field without touching existing ones with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replaces the first matching field in place, or appends when absent.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some((_, v)) => *v = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Removes every field with the given name.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.append("Content-Type", "text/plain");

        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(headers.get("content-length"), None);
    }

    #[test]
    fn test_name_stored_as_received() {
        let mut headers = HeaderMap::new();
        headers.append("X-CuStOm", "1");

        let (name, _) = headers.iter().next().unwrap();
        assert_eq!(name, "X-CuStOm");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut headers = HeaderMap::new();
        headers.append("Connection", "keep-alive");
        headers.append("Host", "example.com");
        headers.set("connection", "close");

        assert_eq!(headers.get("Connection"), Some("close"));
        assert_eq!(headers.len(), 2);
        // position of the replaced field is preserved
        assert_eq!(headers.iter().next().unwrap().0, "Connection");
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let mut headers = HeaderMap::new();
        headers.append("A", "1");
        headers.append("B", "2");
        headers.append("C", "3");

        let names: Vec<_> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_remove() {
        let mut headers = HeaderMap::new();
        headers.append("A", "1");
        headers.append("a", "2");
        headers.append("B", "3");
        headers.remove("A");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("B"), Some("3"));
    }
}
