//! Cookies set by an action and cookies sent by the client.

use http::header::COOKIE;
use http::HeaderMap;

/// Cookies an action wants sent back with its response.
///
/// Setting a name twice keeps only the last value, in the position of the
/// first assignment.
///
/// # Example
///
/// ```
/// use ferrule_core::CookieJar;
///
/// let mut jar = CookieJar::new();
/// jar.set("session", "abc");
/// jar.set("theme", "dark");
/// jar.set("session", "def");
///
/// assert_eq!(jar.get("session"), Some("def"));
/// assert_eq!(jar.to_header_values(), vec!["session=def", "theme=dark"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a cookie, replacing any earlier value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Returns the value of a cookie.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Removes a cookie, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates over the cookies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no cookie was set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders each cookie as a `Set-Cookie` header value.
    #[must_use]
    pub fn to_header_values(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect()
    }
}

/// Finds a cookie in the request `Cookie` headers.
#[must_use]
pub fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_remove() {
        let mut jar = CookieJar::new();
        jar.set("a", "1");
        jar.set("b", "2");
        assert_eq!(jar.remove("a"), Some("1".to_string()));
        assert_eq!(jar.remove("a"), None);
        assert_eq!(jar.len(), 1);
        assert!(!jar.is_empty());
    }

    #[test]
    fn test_request_cookie_lookup() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; session=\"xyz\""));
        headers.append(COOKIE, HeaderValue::from_static("lang=en"));

        assert_eq!(request_cookie(&headers, "session"), Some("xyz".to_string()));
        assert_eq!(request_cookie(&headers, "lang"), Some("en".to_string()));
        assert_eq!(request_cookie(&headers, "missing"), None);
    }
}
